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

//! Helpers for building programs and random process trees in test cases.

use proptest::arbitrary::Arbitrary;
use proptest::collection::vec;
use proptest::prop_oneof;
use proptest::strategy::BoxedStrategy;
use proptest::strategy::Just;
use proptest::strategy::Strategy;

use crate::event::Alphabet;
use crate::event::AlphabetTable;
use crate::event::ChannelTable;
use crate::outcome::Outcome;
use crate::process::*;
use crate::program::evaluate_program_seeded;
use crate::program::Program;

pub(crate) fn alphabet(events: &[&str]) -> Alphabet {
    events.iter().copied().collect()
}

/// An alphabet covering every event [`arb_process`] can generate.
pub(crate) fn universal_alphabet() -> Alphabet {
    (0..8).map(|n| format!("e{n}")).collect()
}

/// A program with empty tables around the given root expression.
pub(crate) fn program(root: ProcessNode) -> Program {
    Program {
        processes: ProcessTable::new(),
        alphabets: AlphabetTable::new(),
        channels: ChannelTable::new(),
        environment: Vec::new(),
        root,
    }
}

pub(crate) fn define(program: &mut Program, name: &str, events: &[&str], tree: ProcessNode) {
    program.processes.insert(name.to_owned(), tree);
    program.alphabets.insert(name.to_owned(), alphabet(events));
}

pub(crate) fn declare_channel(program: &mut Program, name: &str, tags: &[&str]) {
    program.channels.insert(name.to_owned(), alphabet(tags));
}

/// Runs the program against the given environment with a fixed seed, so tests that exercise
/// nondeterministic operators stay reproducible.
pub(crate) fn run_with(mut program: Program, environment: &[&str]) -> Outcome {
    program.environment = environment.iter().map(|event| (*event).to_owned()).collect();
    evaluate_program_seeded(program, 0x05eed)
}

impl Arbitrary for ProcessNode {
    type Parameters = ();
    type Strategy = BoxedStrategy<ProcessNode>;

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        arb_process().boxed()
    }
}

/// Generates a random process tree over the events of [`universal_alphabet`].  References only
/// ever name `P`, so a tree inserted as the definition of `P` is closed.
pub(crate) fn arb_process() -> impl Strategy<Value = ProcessNode> {
    let event_name = || (0..8u32).prop_map(|n| format!("e{n}"));
    let leaf = prop_oneof![
        Just(stop()),
        event_name().prop_map(|name| event(name)),
        Just(process_ref("P")),
    ];
    leaf.prop_recursive(4, 16, 3, move |inner| {
        prop_oneof![
            (event_name(), inner.clone()).prop_map(|(e, after)| prefix(e, after)),
            vec(inner.clone(), 2..4).prop_map(external_choice),
            vec(inner.clone(), 2..4).prop_map(general_choice),
            vec(inner.clone(), 2..4).prop_map(internal_choice),
            vec(inner.clone(), 2..4).prop_map(parallel),
        ]
    })
}
