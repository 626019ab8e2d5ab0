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

//! Defines the process tree — a tagged sum over all of the language's operators.

use std::fmt::Debug;
use std::fmt::Display;

use indexmap::IndexMap;

/// Maps each process name to the root of its definition (keys unique).
pub type ProcessTable = IndexMap<String, ProcessNode>;

/// One node of a process tree.
///
/// Every node remembers the name of the process whose definition encloses it; the static pass
/// stamps this before execution.  The root expression's nodes carry the empty name, which denotes
/// a universal alphabet.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct ProcessNode {
    pub(crate) process: String,
    pub kind: ProcessKind,
}

/// The operator at a node.  Polymorphism over kinds is exhaustive pattern matching — there is no
/// open hierarchy to extend.
#[derive(Clone, Eq, Hash, PartialEq)]
pub enum ProcessKind {
    /// The inert process: terminates without engaging any event.
    Stop,
    /// A final event: engage it, then behave like `Stop`.
    Event(String),
    /// `a -> P`: engage the event, then behave like the continuation.
    Prefix(String, Box<ProcessNode>),
    /// `P [] Q`: deterministic choice resolved by the environment; head events must be distinct.
    ExternalChoice(Vec<ProcessNode>),
    /// `P | Q`: like `[]`, but tolerates equal head events, resolved by uniform random selection.
    GeneralChoice(Vec<ProcessNode>),
    /// `P |~| Q`: internal choice, resolved randomly without consulting the environment.
    InternalChoice(Vec<ProcessNode>),
    /// `P || Q || …`: n-ary parallel composition; shared events rendezvous, others interleave.
    Parallel(Vec<ProcessNode>),
    /// A reference to a named process, resolved by name at evaluation time.
    ProcessRef(String),
    /// `c!v -> P`: channel output.
    ChannelOut {
        channel: String,
        value: String,
        after: Box<ProcessNode>,
    },
    /// `c?x -> P`: channel input, binding the received value to `x`.
    ChannelIn {
        channel: String,
        variable: String,
        after: Box<ProcessNode>,
    },
}

impl ProcessNode {
    /// The name of the enclosing process (empty for the root expression).
    pub fn process(&self) -> &str {
        &self.process
    }

    fn new(kind: ProcessKind) -> ProcessNode {
        ProcessNode {
            process: String::new(),
            kind,
        }
    }
}

/// Constructs the inert `STOP` process.
pub fn stop() -> ProcessNode {
    ProcessNode::new(ProcessKind::Stop)
}

/// Constructs a final event `a -> STOP`.
pub fn event(name: impl Into<String>) -> ProcessNode {
    ProcessNode::new(ProcessKind::Event(name.into()))
}

/// Constructs a new _prefix_ process `a -> P`.  This process engages event `a` and then behaves
/// like process `P`.
pub fn prefix(name: impl Into<String>, after: ProcessNode) -> ProcessNode {
    ProcessNode::new(ProcessKind::Prefix(name.into(), Box::new(after)))
}

/// Constructs a new _deterministic choice_ process over the given branches.
pub fn external_choice(branches: Vec<ProcessNode>) -> ProcessNode {
    ProcessNode::new(ProcessKind::ExternalChoice(branches))
}

/// Constructs a new _general choice_ process over the given branches.
pub fn general_choice(branches: Vec<ProcessNode>) -> ProcessNode {
    ProcessNode::new(ProcessKind::GeneralChoice(branches))
}

/// Constructs a new _internal choice_ process over the given branches.
pub fn internal_choice(branches: Vec<ProcessNode>) -> ProcessNode {
    ProcessNode::new(ProcessKind::InternalChoice(branches))
}

/// Constructs a new _parallel composition_ over the given branches.
pub fn parallel(branches: Vec<ProcessNode>) -> ProcessNode {
    ProcessNode::new(ProcessKind::Parallel(branches))
}

/// Constructs a reference to the named process.
pub fn process_ref(name: impl Into<String>) -> ProcessNode {
    ProcessNode::new(ProcessKind::ProcessRef(name.into()))
}

/// Constructs a channel output `c!v -> P`.
pub fn channel_out(
    channel: impl Into<String>,
    value: impl Into<String>,
    after: ProcessNode,
) -> ProcessNode {
    ProcessNode::new(ProcessKind::ChannelOut {
        channel: channel.into(),
        value: value.into(),
        after: Box::new(after),
    })
}

/// Constructs a channel input `c?x -> P`.
pub fn channel_in(
    channel: impl Into<String>,
    variable: impl Into<String>,
    after: ProcessNode,
) -> ProcessNode {
    ProcessNode::new(ProcessKind::ChannelIn {
        channel: channel.into(),
        variable: variable.into(),
        after: Box::new(after),
    })
}

impl ProcessKind {
    /// A short name for the operator, used in messages.
    pub fn operator(&self) -> &'static str {
        match self {
            ProcessKind::Stop => "STOP",
            ProcessKind::Event(_) => "event",
            ProcessKind::Prefix(_, _) => "prefix",
            ProcessKind::ExternalChoice(_) => "choice",
            ProcessKind::GeneralChoice(_) => "general choice",
            ProcessKind::InternalChoice(_) => "internal choice",
            ProcessKind::Parallel(_) => "parallel composition",
            ProcessKind::ProcessRef(_) => "process reference",
            ProcessKind::ChannelOut { .. } => "channel output",
            ProcessKind::ChannelIn { .. } => "channel input",
        }
    }

    fn is_composite(&self) -> bool {
        matches!(
            self,
            ProcessKind::ExternalChoice(_)
                | ProcessKind::GeneralChoice(_)
                | ProcessKind::InternalChoice(_)
                | ProcessKind::Parallel(_)
        )
    }
}

fn fmt_operand(node: &ProcessNode, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    if node.kind.is_composite() {
        write!(f, "({})", node)
    } else {
        write!(f, "{}", node)
    }
}

fn fmt_branches(
    branches: &[ProcessNode],
    separator: &str,
    f: &mut std::fmt::Formatter,
) -> std::fmt::Result {
    for (i, branch) in branches.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        fmt_operand(branch, f)?;
    }
    Ok(())
}

impl Display for ProcessNode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.kind {
            ProcessKind::Stop => f.write_str("STOP"),
            ProcessKind::Event(e) => write!(f, "{} -> STOP", e),
            ProcessKind::Prefix(e, after) => {
                write!(f, "{} -> ", e)?;
                fmt_operand(after, f)
            }
            ProcessKind::ExternalChoice(branches) => fmt_branches(branches, " [] ", f),
            ProcessKind::GeneralChoice(branches) => fmt_branches(branches, " | ", f),
            ProcessKind::InternalChoice(branches) => fmt_branches(branches, " |~| ", f),
            ProcessKind::Parallel(branches) => fmt_branches(branches, " || ", f),
            ProcessKind::ProcessRef(name) => f.write_str(name),
            ProcessKind::ChannelOut {
                channel,
                value,
                after,
            } => {
                write!(f, "{}!{} -> ", channel, value)?;
                fmt_operand(after, f)
            }
            ProcessKind::ChannelIn {
                channel,
                variable,
                after,
            } => {
                write!(f, "{}?{} -> ", channel, variable)?;
                fmt_operand(after, f)
            }
        }
    }
}

impl Debug for ProcessNode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.process.is_empty() {
            (self as &dyn Display).fmt(f)
        } else {
            write!(f, "[{}] {}", self.process, self)
        }
    }
}
