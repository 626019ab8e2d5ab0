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

//! Whole programs and the root driver that executes them.

use std::sync::Arc;
use std::thread;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use crate::analysis;
use crate::analysis::event_in_alphabet;
use crate::channel::ChannelBus;
use crate::evaluate::evaluate;
use crate::evaluate::Bindings;
use crate::evaluate::RunContext;
use crate::event::AlphabetTable;
use crate::event::ChannelTable;
use crate::fiber;
use crate::outcome::Outcome;
use crate::outcome::RunReport;
use crate::process::ProcessNode;
use crate::process::ProcessTable;

/// Everything the evaluator consumes: the parsed tables, the environment trace, and the root
/// expression to run.  All of it is read-only once the static pass has stamped the trees.
#[derive(Clone, Debug)]
pub struct Program {
    pub processes: ProcessTable,
    pub alphabets: AlphabetTable,
    pub channels: ChannelTable,
    pub environment: Vec<String>,
    pub root: ProcessNode,
}

impl Program {
    pub(crate) fn in_alphabet(&self, process: &str, event: &str) -> bool {
        event_in_alphabet(&self.alphabets, process, event)
    }
}

/// Validates and executes a program, resolving nondeterministic choices from entropy.
pub fn evaluate_program(program: Program) -> Outcome {
    run(program, SmallRng::from_rng(&mut rand::rng()))
}

/// Validates and executes a program with a fixed seed, so a nondeterministic run can be
/// reproduced exactly.
pub fn evaluate_program_seeded(program: Program, seed: u64) -> Outcome {
    run(program, SmallRng::seed_from_u64(seed))
}

fn run(mut program: Program, rng: SmallRng) -> Outcome {
    if let Err(error) = analysis::check(
        &mut program.processes,
        &mut program.alphabets,
        &program.channels,
        &mut program.root,
    ) {
        return Outcome::StaticError(error);
    }

    let bus = ChannelBus::new(program.channels.keys().map(String::as_str));
    let report = RunReport::new();
    let (root_fiber, handle) = fiber::link(Arc::from(Vec::new()), 0, true);

    // The driver is a degenerate monitor for a single child: release the root fiber, take its
    // next signal, and stop once it reports dead.
    thread::scope(|scope| {
        let ctx = RunContext {
            program: &program,
            bus: &bus,
            report: &report,
        };
        let root = &program.root;
        scope.spawn(move || evaluate(root, root_fiber, Bindings::new(), rng, ctx));

        loop {
            handle.release();
            if !handle.receive() {
                break;
            }
        }
    });

    if let Some(deadlock) = report.take_deadlock() {
        return Outcome::Deadlocked(deadlock);
    }
    if report.exhausted() {
        info!("environment ran out of events");
        return Outcome::EnvironmentExhausted;
    }
    let consumed = handle.cursor().min(program.environment.len());
    let leftover = program.environment[consumed..].to_vec();
    if !leftover.is_empty() {
        info!(leftover = leftover.join(", "), "unexecuted environment events");
    }
    Outcome::Completed { leftover }
}
