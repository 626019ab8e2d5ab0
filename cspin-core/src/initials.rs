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

//! Head-event sets and synchronization sets.

use itertools::Itertools;

use crate::event::Alphabet;
use crate::event::AlphabetTable;
use crate::process::ProcessKind;
use crate::process::ProcessNode;

/// Returns the set of events a subtree can engage in.
///
/// A process reference contributes the referenced process's whole alphabet — an
/// over-approximation, but a sound one for detecting which events siblings share.  Channel
/// operations contribute nothing; they synchronize through the channel itself.
pub fn initials(node: &ProcessNode, alphabets: &AlphabetTable) -> Alphabet {
    match &node.kind {
        ProcessKind::Stop | ProcessKind::ChannelOut { .. } | ProcessKind::ChannelIn { .. } => {
            Alphabet::new()
        }
        ProcessKind::Event(e) => [e.as_str()].into_iter().collect(),
        ProcessKind::Prefix(e, after) => {
            let mut events = initials(after, alphabets);
            events.insert(e.as_str());
            events
        }
        ProcessKind::ProcessRef(name) => alphabets.get(name).cloned().unwrap_or_default(),
        ProcessKind::ExternalChoice(branches)
        | ProcessKind::GeneralChoice(branches)
        | ProcessKind::InternalChoice(branches)
        | ProcessKind::Parallel(branches) => {
            let mut events = Alphabet::new();
            for branch in branches {
                events.union_with(&initials(branch, alphabets));
            }
            events
        }
    }
}

/// Returns the events that appear in the head sets of at least two sibling branches of a parallel
/// composition — the events the composition must rendezvous on.  The result is sorted and
/// deduplicated.
pub fn sync_set(branches: &[ProcessNode], alphabets: &AlphabetTable) -> Vec<String> {
    let heads: Vec<Vec<String>> = branches
        .iter()
        .map(|branch| {
            initials(branch, alphabets)
                .iter()
                .map(str::to_owned)
                .sorted()
                .collect()
        })
        .collect();

    let mut shared: Vec<String> = Vec::new();
    for (i, head) in heads.iter().enumerate() {
        for event in head {
            let elsewhere = heads
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.binary_search(event).is_ok());
            if elsewhere && !shared.contains(event) {
                shared.push(event.clone());
            }
        }
    }
    shared.sort();
    shared
}
