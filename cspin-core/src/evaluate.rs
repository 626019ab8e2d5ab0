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

//! The process evaluator — one cooperatively scheduled fiber per running subtree.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::RngCore;
use rand::SeedableRng;
use smallvec::SmallVec;
use tracing::debug;
use tracing::warn;

use crate::channel::ChannelBus;
use crate::fiber;
use crate::fiber::Fiber;
use crate::initials::sync_set;
use crate::monitor;
use crate::outcome::Deadlock;
use crate::outcome::DeadlockReason;
use crate::outcome::RunReport;
use crate::process::ProcessKind;
use crate::process::ProcessNode;
use crate::program::Program;

/// Per-fiber variable bindings, populated by channel input.
pub(crate) type Bindings = HashMap<String, String>;

/// Read-only state shared by every fiber of a run.
#[derive(Clone, Copy)]
pub(crate) struct RunContext<'a> {
    pub(crate) program: &'a Program,
    pub(crate) bus: &'a ChannelBus,
    pub(crate) report: &'a RunReport,
}

/// Walks a process tree against the environment trace.
///
/// Written as a loop rather than tail recursion: each iteration either rewrites `node` to the
/// subtree to continue with, or leaves `node` in place after skipping a foreign event.  Entry
/// obligations come first on every iteration — wait if the previous step consumed a shared event,
/// terminate if the tree or the environment has run out.
pub(crate) fn evaluate<'a>(
    mut node: &'a ProcessNode,
    mut fiber: Fiber,
    mut bindings: Bindings,
    mut rng: SmallRng,
    ctx: RunContext<'a>,
) {
    loop {
        fiber.block_if_needed();

        if let ProcessKind::Stop = node.kind {
            debug!(process = node.process(), "process terminated");
            fiber.complete();
            return;
        }

        let environment = &ctx.program.environment;
        if fiber.cursor() >= environment.len() {
            debug!(process = node.process(), "environment ran out of events");
            ctx.report.record_exhausted();
            fiber.terminate();
            return;
        }
        let trace = environment[fiber.cursor()].as_str();

        match &node.kind {
            ProcessKind::Stop => return,

            ProcessKind::Event(expected) => {
                if !ctx.program.in_alphabet(node.process(), trace) {
                    fiber.consume(trace);
                    continue;
                }
                if !event_matches(trace, expected, &bindings) {
                    report(ctx, node, DeadlockReason::PrefixMismatch {
                        event: trace.to_owned(),
                        expected: expected.clone(),
                    });
                    fiber.terminate();
                    return;
                }
                debug!(process = node.process(), event = trace, "process ran out of events");
                fiber.advance_past_final();
                fiber.complete();
                return;
            }

            ProcessKind::Prefix(expected, after) => {
                if !ctx.program.in_alphabet(node.process(), trace) {
                    fiber.consume(trace);
                    continue;
                }
                if !event_matches(trace, expected, &bindings) {
                    report(ctx, node, DeadlockReason::PrefixMismatch {
                        event: trace.to_owned(),
                        expected: expected.clone(),
                    });
                    fiber.terminate();
                    return;
                }
                fiber.consume(trace);
                node = after.as_ref();
            }

            ProcessKind::ExternalChoice(_) => {
                let mut offered = Offered::new();
                match choice_match(trace, node, ctx.program, &mut offered) {
                    Ok(Some(branch)) => node = branch,
                    Ok(None) => {
                        if !ctx.program.in_alphabet(node.process(), trace) {
                            fiber.consume(trace);
                            continue;
                        }
                        report(ctx, node, DeadlockReason::NoChoiceMatch {
                            event: trace.to_owned(),
                            offered: offered.into_vec(),
                        });
                        fiber.terminate();
                        return;
                    }
                    Err(fault) => {
                        report(ctx, node, fault.into_reason());
                        fiber.terminate();
                        return;
                    }
                }
            }

            ProcessKind::GeneralChoice(_) => {
                let mut offered = Offered::new();
                match gen_choice_match(trace, node, ctx.program, &mut offered) {
                    Ok(matches) => match matches.choose(&mut rng).copied() {
                        Some(branch) => node = branch,
                        None => {
                            if !ctx.program.in_alphabet(node.process(), trace) {
                                fiber.consume(trace);
                                continue;
                            }
                            report(ctx, node, DeadlockReason::NoGeneralChoiceMatch {
                                event: trace.to_owned(),
                                offered: offered.into_vec(),
                            });
                            fiber.terminate();
                            return;
                        }
                    },
                    Err(fault) => {
                        report(ctx, node, fault.into_reason());
                        fiber.terminate();
                        return;
                    }
                }
            }

            ProcessKind::InternalChoice(branches) => match branches.choose(&mut rng) {
                Some(branch) => node = branch,
                None => {
                    fiber.terminate();
                    return;
                }
            },

            ProcessKind::Parallel(branches) => {
                run_parallel(branches, fiber, &bindings, &mut rng, ctx);
                return;
            }

            ProcessKind::ProcessRef(name) => match ctx.program.processes.get(name) {
                Some(definition) => node = definition,
                None => {
                    report(ctx, node, DeadlockReason::UndefinedProcess { name: name.clone() });
                    fiber.terminate();
                    return;
                }
            },

            ProcessKind::ChannelOut { after, .. } => {
                let Some((channel, value)) = split_dotted(trace) else {
                    report(ctx, node, DeadlockReason::MalformedChannelEvent {
                        event: trace.to_owned(),
                    });
                    fiber.terminate();
                    return;
                };
                if ctx.bus.send(channel, value.to_owned()).is_err() {
                    report(ctx, node, DeadlockReason::UndefinedChannel {
                        channel: channel.to_owned(),
                    });
                    fiber.terminate();
                    return;
                }
                fiber.consume(trace);
                node = after.as_ref();
            }

            ProcessKind::ChannelIn {
                channel,
                variable,
                after,
            } => {
                match ctx.bus.receive(channel) {
                    Ok(value) => {
                        bindings.insert(variable.clone(), value);
                    }
                    Err(_) => {
                        report(ctx, node, DeadlockReason::UndefinedChannel {
                            channel: channel.clone(),
                        });
                        fiber.terminate();
                        return;
                    }
                }
                fiber.consume(trace);
                node = after.as_ref();
            }
        }
    }
}

/// A prefixed event accepts the trace event directly, or indirectly through a value bound earlier
/// by channel input (parametric events).
fn event_matches(trace: &str, expected: &str, bindings: &Bindings) -> bool {
    trace == expected || bindings.get(expected).map(String::as_str) == Some(trace)
}

fn split_dotted(trace: &str) -> Option<(&str, &str)> {
    let mut parts = trace.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(channel), Some(value), None) => Some((channel, value)),
        _ => None,
    }
}

/// Forks one fiber per branch and shepherds them with the barrier monitor.  The branches inherit
/// this fiber's synchronization set when it is already inside a composition, and otherwise block
/// on the events they share with each other.
fn run_parallel<'a>(
    branches: &'a [ProcessNode],
    fiber: Fiber,
    bindings: &Bindings,
    rng: &mut SmallRng,
    ctx: RunContext<'a>,
) {
    let blocked: Arc<[String]> = if fiber.blocked().is_empty() {
        Arc::from(sync_set(branches, &ctx.program.alphabets))
    } else {
        fiber.blocked().clone()
    };
    let start = fiber.cursor();

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(branches.len());
        for branch in branches {
            let (child, handle) = fiber::link(blocked.clone(), start, false);
            let child_bindings = bindings.clone();
            let child_rng = SmallRng::seed_from_u64(rng.next_u64());
            scope.spawn(move || evaluate(branch, child, child_bindings, child_rng, ctx));
            handles.push(handle);
        }
        monitor::run(handles, fiber);
    });
}

fn report(ctx: RunContext, node: &ProcessNode, reason: DeadlockReason) {
    let deadlock = Deadlock {
        process: node.process().to_owned(),
        reason,
    };
    warn!(%deadlock);
    ctx.report.record_deadlock(deadlock);
}

type Offered = SmallVec<[String; 8]>;
type Matches<'a> = SmallVec<[&'a ProcessNode; 4]>;

/// A semantic fault raised while resolving a choice; reported like a deadlock.
enum MatchFault {
    Ambiguous,
    Undefined(String),
    Unsupported(&'static str),
}

impl MatchFault {
    fn into_reason(self) -> DeadlockReason {
        match self {
            MatchFault::Ambiguous => DeadlockReason::AmbiguousGeneralChoice,
            MatchFault::Undefined(name) => DeadlockReason::UndefinedProcess { name },
            MatchFault::Unsupported(operand) => {
                DeadlockReason::UnsupportedChoiceOperand { operand }
            }
        }
    }
}

/// Walks the branches of a deterministic choice looking for the one whose head event is the trace
/// event.  Accumulates every head event seen into `offered` for the deadlock message.
fn choice_match<'a>(
    trace: &str,
    node: &'a ProcessNode,
    program: &'a Program,
    offered: &mut Offered,
) -> Result<Option<&'a ProcessNode>, MatchFault> {
    match &node.kind {
        ProcessKind::Event(e) | ProcessKind::Prefix(e, _) => {
            offered.push(e.clone());
            Ok((e == trace).then_some(node))
        }
        ProcessKind::ProcessRef(name) => match program.processes.get(name) {
            Some(definition) => choice_match(trace, definition, program, offered),
            None => Err(MatchFault::Undefined(name.clone())),
        },
        ProcessKind::ExternalChoice(branches) => {
            for branch in branches {
                if let Some(matched) = choice_match(trace, branch, program, offered)? {
                    return Ok(Some(matched));
                }
            }
            Ok(None)
        }
        ProcessKind::GeneralChoice(_) => {
            let matches = gen_choice_match(trace, node, program, offered)?;
            match matches.as_slice() {
                [] => Ok(None),
                [only] => Ok(Some(*only)),
                _ => Err(MatchFault::Ambiguous),
            }
        }
        other => Err(MatchFault::Unsupported(other.operator())),
    }
}

/// The general-choice analogue: collects every branch whose head event is the trace event.
fn gen_choice_match<'a>(
    trace: &str,
    node: &'a ProcessNode,
    program: &'a Program,
    offered: &mut Offered,
) -> Result<Matches<'a>, MatchFault> {
    match &node.kind {
        ProcessKind::Event(e) | ProcessKind::Prefix(e, _) => {
            offered.push(e.clone());
            if e == trace {
                Ok(SmallVec::from_slice(&[node]))
            } else {
                Ok(Matches::new())
            }
        }
        ProcessKind::ProcessRef(name) => match program.processes.get(name) {
            Some(definition) => gen_choice_match(trace, definition, program, offered),
            None => Err(MatchFault::Undefined(name.clone())),
        },
        ProcessKind::GeneralChoice(branches) => {
            let mut matches = Matches::new();
            for branch in branches {
                matches.extend(gen_choice_match(trace, branch, program, offered)?);
            }
            Ok(matches)
        }
        ProcessKind::ExternalChoice(_) => {
            Ok(choice_match(trace, node, program, offered)?
                .into_iter()
                .collect())
        }
        other => Err(MatchFault::Unsupported(other.operator())),
    }
}
