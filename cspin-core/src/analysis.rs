// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2026, cspin authors.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License.  You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the
// License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either
// express or implied.  See the License for the specific language governing permissions and
// limitations under the License.
// ------------------------------------------------------------------------------------------------

//! Static validation of process definitions, run before any fiber is launched.
//!
//! The pass stamps every node with its enclosing process name, verifies events against declared
//! alphabets, propagates alphabets through process references, checks channel-input alphabets,
//! and rejects deterministic choices with colliding head events.  The first offending location
//! aborts the pass.

use thiserror::Error;

use crate::event::AlphabetTable;
use crate::event::ChannelTable;
use crate::process::ProcessKind;
use crate::process::ProcessNode;
use crate::process::ProcessTable;

/// A fatal, pre-execution error in the process definitions.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum StaticError {
    #[error("event {event} is not in {process}'s alphabet")]
    AlphabetViolation { process: String, event: String },

    #[error("{process}'s alphabet is not a superset of channel {channel}'s alphabet")]
    ChannelAlphabetViolation { process: String, channel: String },

    #[error("cannot have a choice between identical events ({event} [] {event})")]
    IdenticalChoiceHeads { process: String, event: String },

    #[error("process {name} is not defined")]
    UndefinedProcess { process: String, name: String },
}

/// Returns whether `process` may engage in `event`.  The empty name is the root expression,
/// whose alphabet is universal.
pub(crate) fn event_in_alphabet(alphabets: &AlphabetTable, process: &str, event: &str) -> bool {
    process.is_empty()
        || alphabets
            .get(process)
            .is_some_and(|alphabet| alphabet.contains(event))
}

/// Runs the static pass over every definition and the root expression, in declaration order.
///
/// Alphabet propagation mutates the alphabet table as the walk proceeds, so a definition sees the
/// propagations of the definitions before it.  Re-running the pass on an already-stamped program
/// changes nothing: stamps are overwritten with the same names and alphabets grow by union.
pub fn check(
    processes: &mut ProcessTable,
    alphabets: &mut AlphabetTable,
    channels: &ChannelTable,
    root: &mut ProcessNode,
) -> Result<(), StaticError> {
    for i in 0..processes.len() {
        if let Some((name, tree)) = processes.get_index_mut(i) {
            let name = name.clone();
            stamp(tree, &name);
        }
    }
    stamp(root, "");

    for i in 0..processes.len() {
        if let Some((_, tree)) = processes.get_index(i) {
            check_node(tree, processes, alphabets, channels)?;
        }
    }
    check_node(root, processes, alphabets, channels)
}

fn stamp(node: &mut ProcessNode, process: &str) {
    node.process = process.to_owned();
    match &mut node.kind {
        ProcessKind::Prefix(_, after)
        | ProcessKind::ChannelOut { after, .. }
        | ProcessKind::ChannelIn { after, .. } => stamp(after, process),
        ProcessKind::ExternalChoice(branches)
        | ProcessKind::GeneralChoice(branches)
        | ProcessKind::InternalChoice(branches)
        | ProcessKind::Parallel(branches) => {
            for branch in branches {
                stamp(branch, process);
            }
        }
        ProcessKind::Stop | ProcessKind::Event(_) | ProcessKind::ProcessRef(_) => {}
    }
}

fn check_node(
    node: &ProcessNode,
    processes: &ProcessTable,
    alphabets: &mut AlphabetTable,
    channels: &ChannelTable,
) -> Result<(), StaticError> {
    match &node.kind {
        ProcessKind::Event(e) | ProcessKind::Prefix(e, _) => {
            if !event_in_alphabet(alphabets, &node.process, e) {
                return Err(StaticError::AlphabetViolation {
                    process: node.process.clone(),
                    event: e.clone(),
                });
            }
        }
        ProcessKind::ProcessRef(name) => {
            if !processes.contains_key(name) {
                return Err(StaticError::UndefinedProcess {
                    process: node.process.clone(),
                    name: name.clone(),
                });
            }
            if !node.process.is_empty() {
                if let Some(referenced) = alphabets.get(name).cloned() {
                    alphabets
                        .entry(node.process.clone())
                        .or_default()
                        .union_with(&referenced);
                }
            }
        }
        ProcessKind::ChannelIn {
            channel, variable, ..
        } => {
            if !node.process.is_empty() {
                alphabets
                    .entry(node.process.clone())
                    .or_default()
                    .insert(variable.clone());
                if let Some(tags) = channels.get(channel) {
                    let subset_ok = alphabets
                        .get(&node.process)
                        .is_some_and(|own| own.is_superset(tags));
                    if !subset_ok {
                        return Err(StaticError::ChannelAlphabetViolation {
                            process: node.process.clone(),
                            channel: channel.clone(),
                        });
                    }
                }
            }
        }
        ProcessKind::ExternalChoice(branches) => check_choice_heads(node, branches, processes)?,
        _ => {}
    }

    match &node.kind {
        ProcessKind::Prefix(_, after)
        | ProcessKind::ChannelOut { after, .. }
        | ProcessKind::ChannelIn { after, .. } => check_node(after, processes, alphabets, channels),
        ProcessKind::ExternalChoice(branches)
        | ProcessKind::GeneralChoice(branches)
        | ProcessKind::InternalChoice(branches)
        | ProcessKind::Parallel(branches) => {
            for branch in branches {
                check_node(branch, processes, alphabets, channels)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// The event identifier a choice branch leads with: its own head event, or for a reference the
/// head event of the referenced definition (one level only — reference chains are not followed).
fn head_identifier<'a>(node: &'a ProcessNode, processes: &'a ProcessTable) -> Option<&'a str> {
    match &node.kind {
        ProcessKind::Event(e) | ProcessKind::Prefix(e, _) => Some(e.as_str()),
        ProcessKind::ProcessRef(name) => processes.get(name).and_then(|def| match &def.kind {
            ProcessKind::Event(e) | ProcessKind::Prefix(e, _) => Some(e.as_str()),
            _ => None,
        }),
        _ => None,
    }
}

fn check_choice_heads(
    node: &ProcessNode,
    branches: &[ProcessNode],
    processes: &ProcessTable,
) -> Result<(), StaticError> {
    let heads: Vec<Option<&str>> = branches
        .iter()
        .map(|branch| head_identifier(branch, processes))
        .collect();
    for (i, head) in heads.iter().enumerate() {
        let Some(head) = head else { continue };
        if heads[i + 1..].iter().flatten().any(|other| other == head) {
            return Err(StaticError::IdenticalChoiceHeads {
                process: node.process.clone(),
                event: (*head).to_owned(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod analysis_tests {
    use super::*;

    use crate::process::*;
    use crate::test_support::alphabet;

    fn singleton(name: &str, tree: ProcessNode) -> ProcessTable {
        let mut processes = ProcessTable::new();
        processes.insert(name.to_owned(), tree);
        processes
    }

    #[test]
    fn accepts_events_inside_the_alphabet() {
        let mut processes = singleton("P", prefix("a", event("b")));
        let mut alphabets = AlphabetTable::new();
        alphabets.insert("P".to_owned(), alphabet(&["a", "b"]));
        let mut root = process_ref("P");
        let result = check(
            &mut processes,
            &mut alphabets,
            &ChannelTable::new(),
            &mut root,
        );
        assert_eq!(result, Ok(()));
        assert_eq!(processes["P"].process(), "P");
        assert_eq!(root.process(), "");
    }

    #[test]
    fn rejects_events_outside_the_alphabet() {
        let mut processes = singleton("P", prefix("a", event("z")));
        let mut alphabets = AlphabetTable::new();
        alphabets.insert("P".to_owned(), alphabet(&["a"]));
        let mut root = process_ref("P");
        let result = check(
            &mut processes,
            &mut alphabets,
            &ChannelTable::new(),
            &mut root,
        );
        assert_eq!(
            result,
            Err(StaticError::AlphabetViolation {
                process: "P".to_owned(),
                event: "z".to_owned(),
            })
        );
    }

    #[test]
    fn root_expression_has_a_universal_alphabet() {
        let mut processes = ProcessTable::new();
        let mut alphabets = AlphabetTable::new();
        let mut root = prefix("anything", event("goes"));
        let result = check(
            &mut processes,
            &mut alphabets,
            &ChannelTable::new(),
            &mut root,
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn propagates_alphabets_through_references() {
        let mut processes = ProcessTable::new();
        processes.insert("Q".to_owned(), event("b"));
        processes.insert("P".to_owned(), prefix("a", process_ref("Q")));
        let mut alphabets = AlphabetTable::new();
        alphabets.insert("Q".to_owned(), alphabet(&["b"]));
        alphabets.insert("P".to_owned(), alphabet(&["a"]));
        let mut root = process_ref("P");
        let result = check(
            &mut processes,
            &mut alphabets,
            &ChannelTable::new(),
            &mut root,
        );
        assert_eq!(result, Ok(()));
        assert_eq!(alphabets["P"], alphabet(&["a", "b"]));
    }

    #[test]
    fn rejects_references_to_undefined_processes() {
        let mut processes = singleton("P", process_ref("MISSING"));
        let mut alphabets = AlphabetTable::new();
        let mut root = process_ref("P");
        let result = check(
            &mut processes,
            &mut alphabets,
            &ChannelTable::new(),
            &mut root,
        );
        assert_eq!(
            result,
            Err(StaticError::UndefinedProcess {
                process: "P".to_owned(),
                name: "MISSING".to_owned(),
            })
        );
    }

    #[test]
    fn channel_input_binds_the_variable_into_the_alphabet() {
        let mut processes = singleton("R", channel_in("c", "v", event("v")));
        let mut alphabets = AlphabetTable::new();
        alphabets.insert("R".to_owned(), alphabet(&["x"]));
        let mut channels = ChannelTable::new();
        channels.insert("c".to_owned(), alphabet(&["x"]));
        let mut root = process_ref("R");
        let result = check(&mut processes, &mut alphabets, &channels, &mut root);
        assert_eq!(result, Ok(()));
        assert!(alphabets["R"].contains("v"));
    }

    #[test]
    fn rejects_readers_missing_the_channel_alphabet() {
        let mut processes = singleton("R", channel_in("c", "v", stop()));
        let mut alphabets = AlphabetTable::new();
        alphabets.insert("R".to_owned(), alphabet(&["x"]));
        let mut channels = ChannelTable::new();
        channels.insert("c".to_owned(), alphabet(&["x", "y"]));
        let mut root = process_ref("R");
        let result = check(&mut processes, &mut alphabets, &channels, &mut root);
        assert_eq!(
            result,
            Err(StaticError::ChannelAlphabetViolation {
                process: "R".to_owned(),
                channel: "c".to_owned(),
            })
        );
    }

    #[test]
    fn rejects_identical_choice_heads() {
        let mut processes = singleton("P", external_choice(vec![event("a"), event("a")]));
        let mut alphabets = AlphabetTable::new();
        alphabets.insert("P".to_owned(), alphabet(&["a"]));
        let mut root = process_ref("P");
        let result = check(
            &mut processes,
            &mut alphabets,
            &ChannelTable::new(),
            &mut root,
        );
        assert_eq!(
            result,
            Err(StaticError::IdenticalChoiceHeads {
                process: "P".to_owned(),
                event: "a".to_owned(),
            })
        );
    }

    #[test]
    fn choice_heads_see_through_references() {
        let mut processes = ProcessTable::new();
        processes.insert("Q".to_owned(), prefix("a", event("b")));
        processes.insert(
            "P".to_owned(),
            external_choice(vec![event("a"), process_ref("Q")]),
        );
        let mut alphabets = AlphabetTable::new();
        alphabets.insert("Q".to_owned(), alphabet(&["a", "b"]));
        alphabets.insert("P".to_owned(), alphabet(&["a", "b"]));
        let mut root = process_ref("P");
        let result = check(
            &mut processes,
            &mut alphabets,
            &ChannelTable::new(),
            &mut root,
        );
        assert_eq!(
            result,
            Err(StaticError::IdenticalChoiceHeads {
                process: "P".to_owned(),
                event: "a".to_owned(),
            })
        );
    }

    #[test]
    fn distinct_choice_heads_pass() {
        let mut processes = singleton("P", external_choice(vec![event("a"), event("b")]));
        let mut alphabets = AlphabetTable::new();
        alphabets.insert("P".to_owned(), alphabet(&["a", "b"]));
        let mut root = process_ref("P");
        let result = check(
            &mut processes,
            &mut alphabets,
            &ChannelTable::new(),
            &mut root,
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn rerunning_the_pass_changes_nothing() {
        let mut processes = ProcessTable::new();
        processes.insert("Q".to_owned(), event("b"));
        processes.insert(
            "P".to_owned(),
            external_choice(vec![event("a"), process_ref("Q")]),
        );
        let mut alphabets = AlphabetTable::new();
        alphabets.insert("Q".to_owned(), alphabet(&["b"]));
        alphabets.insert("P".to_owned(), alphabet(&["a"]));
        let mut root = process_ref("P");
        let channels = ChannelTable::new();

        assert_eq!(
            check(&mut processes, &mut alphabets, &channels, &mut root),
            Ok(())
        );
        let processes_snapshot = processes.clone();
        let alphabets_snapshot = alphabets.clone();
        let root_snapshot = root.clone();

        assert_eq!(
            check(&mut processes, &mut alphabets, &channels, &mut root),
            Ok(())
        );
        assert_eq!(processes, processes_snapshot);
        assert_eq!(alphabets, alphabets_snapshot);
        assert_eq!(root, root_snapshot);
    }
}

#[cfg(test)]
mod analysis_properties {
    use super::*;

    use proptest_attr_macro::proptest;

    use crate::test_support::universal_alphabet;

    // Re-running the pass on an already-stamped tree is a no-op, whatever the tree shape.
    #[proptest]
    fn static_pass_is_idempotent(tree: ProcessNode) {
        let mut processes = ProcessTable::new();
        processes.insert("P".to_owned(), tree);
        let mut alphabets = AlphabetTable::new();
        alphabets.insert("P".to_owned(), universal_alphabet());
        let mut root = crate::process::process_ref("P");
        let channels = ChannelTable::new();

        if check(&mut processes, &mut alphabets, &channels, &mut root).is_ok() {
            let processes_snapshot = processes.clone();
            let alphabets_snapshot = alphabets.clone();
            let second = check(&mut processes, &mut alphabets, &channels, &mut root);
            assert_eq!(second, Ok(()));
            assert_eq!(processes, processes_snapshot);
            assert_eq!(alphabets, alphabets_snapshot);
        }
    }
}
