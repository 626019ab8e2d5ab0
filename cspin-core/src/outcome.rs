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

//! Run outcomes and the report fibers write incidents into.

use std::fmt::Display;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::sync::PoisonError;

use thiserror::Error;

use crate::analysis::StaticError;

/// The result of executing a program against its environment trace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The root process terminated; any environment events it never reached are left over.
    Completed { leftover: Vec<String> },
    /// Some fiber wanted another event after the environment ran dry.  Informational, not an
    /// error.
    EnvironmentExhausted,
    /// A fiber could neither match nor skip the current environment event.
    Deadlocked(Deadlock),
    /// The definitions failed validation; nothing was executed.
    StaticError(StaticError),
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Outcome::Completed { leftover } if leftover.is_empty() => {
                f.write_str("completed: all environment events executed")
            }
            Outcome::Completed { leftover } => {
                write!(
                    f,
                    "completed: unexecuted environment events: {}",
                    leftover.join(", ")
                )
            }
            Outcome::EnvironmentExhausted => f.write_str("environment ran out of events"),
            Outcome::Deadlocked(deadlock) => deadlock.fmt(f),
            Outcome::StaticError(error) => write!(f, "static error: {}", error),
        }
    }
}

/// Where and why a fiber stopped dead.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deadlock {
    /// The enclosing process name; empty for the root expression.
    pub process: String,
    pub reason: DeadlockReason,
}

impl Display for Deadlock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let process = if self.process.is_empty() {
            "root"
        } else {
            &self.process
        };
        write!(f, "{}: deadlock: {}", process, self.reason)
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DeadlockReason {
    #[error("environment event {} matches none of the choice events {{{}}}", .event, .offered.join(", "))]
    NoChoiceMatch { event: String, offered: Vec<String> },

    #[error("environment event {} matches none of the general choice events {{{}}}", .event, .offered.join(", "))]
    NoGeneralChoiceMatch { event: String, offered: Vec<String> },

    #[error("environment event {event} does not match prefixed event {expected}")]
    PrefixMismatch { event: String, expected: String },

    #[error("expected an output event of the form channel.value, found {event}")]
    MalformedChannelEvent { event: String },

    #[error("channel {channel} is not declared")]
    UndefinedChannel { channel: String },

    #[error("process {name} is not defined")]
    UndefinedProcess { name: String },

    #[error("a choice cannot resolve through a general choice with several matching branches")]
    AmbiguousGeneralChoice,

    #[error("a choice cannot select over a {operand} operand")]
    UnsupportedChoiceOperand { operand: &'static str },
}

/// Shared, append-once record of what went wrong during a run.  Fibers on any thread write into
/// it; the root driver reads it after the last fiber reports dead.
#[derive(Default)]
pub(crate) struct RunReport {
    deadlock: Mutex<Option<Deadlock>>,
    exhausted: AtomicBool,
}

impl RunReport {
    pub(crate) fn new() -> RunReport {
        RunReport::default()
    }

    /// Records a deadlock; the first report wins.
    pub(crate) fn record_deadlock(&self, deadlock: Deadlock) {
        let mut slot = self
            .deadlock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slot.get_or_insert(deadlock);
    }

    pub(crate) fn record_exhausted(&self) {
        self.exhausted.store(true, Ordering::Release);
    }

    pub(crate) fn take_deadlock(&self) -> Option<Deadlock> {
        self.deadlock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod outcome_tests {
    use super::*;

    #[test]
    fn first_deadlock_report_wins() {
        let report = RunReport::new();
        report.record_deadlock(Deadlock {
            process: "P".to_owned(),
            reason: DeadlockReason::PrefixMismatch {
                event: "a".to_owned(),
                expected: "b".to_owned(),
            },
        });
        report.record_deadlock(Deadlock {
            process: "Q".to_owned(),
            reason: DeadlockReason::AmbiguousGeneralChoice,
        });
        let deadlock = report.take_deadlock().expect("a deadlock was recorded");
        assert_eq!(deadlock.process, "P");
    }

    #[test]
    fn deadlocks_render_the_offending_process_and_events() {
        let deadlock = Deadlock {
            process: "P".to_owned(),
            reason: DeadlockReason::NoChoiceMatch {
                event: "c".to_owned(),
                offered: vec!["a".to_owned(), "b".to_owned()],
            },
        };
        assert_eq!(
            deadlock.to_string(),
            "P: deadlock: environment event c matches none of the choice events {a, b}"
        );

        let root = Deadlock {
            process: String::new(),
            reason: DeadlockReason::PrefixMismatch {
                event: "b".to_owned(),
                expected: "a".to_owned(),
            },
        };
        assert!(root.to_string().starts_with("root: deadlock:"));
    }

    #[test]
    fn outcomes_render_leftovers() {
        let done = Outcome::Completed { leftover: vec![] };
        assert_eq!(done.to_string(), "completed: all environment events executed");
        let leftover = Outcome::Completed {
            leftover: vec!["a".to_owned(), "b".to_owned()],
        };
        assert_eq!(
            leftover.to_string(),
            "completed: unexecuted environment events: a, b"
        );
    }
}
