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

//! End-to-end runs of whole source programs through the parser and the evaluator.

use cspin_cli::parse_program;
use cspin_core::evaluate_program_seeded;
use cspin_core::Outcome;

fn run_program(source: &str) -> Outcome {
    let program = parse_program(source).expect("fixture parses");
    evaluate_program_seeded(program, 7)
}

#[test]
fn parallel_program_deadlocks_while_its_sibling_drains() {
    let outcome = run_program(include_str!("programs/parallel.csp"));
    assert!(
        matches!(&outcome, Outcome::Deadlocked(deadlock) if deadlock.process == "P1"),
        "unexpected outcome: {outcome:?}"
    );
}

#[test]
fn philosophers_sit_together_and_eat_in_turn() {
    let outcome = run_program(include_str!("programs/philosophers.csp"));
    assert_eq!(outcome, Outcome::Completed { leftover: vec![] });
}

#[test]
fn client_and_server_complete_a_round_trip() {
    let outcome = run_program(include_str!("programs/clientserver.csp"));
    assert_eq!(outcome, Outcome::Completed { leftover: vec![] });
}

#[test]
fn channel_handoff_binds_the_payload() {
    let outcome = run_program(include_str!("programs/channels.csp"));
    assert_eq!(outcome, Outcome::Completed { leftover: vec![] });
}

#[test]
fn truncated_environments_exhaust_gracefully() {
    let source = "\
alphabet P = a, b
P = a -> b -> STOP
= a
P
";
    assert_eq!(run_program(source), Outcome::EnvironmentExhausted);
}

#[test]
fn static_errors_surface_before_execution() {
    let source = "\
alphabet P = a
P = (a -> STOP) [] (a -> STOP)
= a
P
";
    let outcome = run_program(source);
    assert!(
        matches!(outcome, Outcome::StaticError(_)),
        "unexpected outcome: {outcome:?}"
    );
}
