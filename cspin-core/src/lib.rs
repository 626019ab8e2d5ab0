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

//! The operational-semantics engine of the cspin interpreter: process trees, static validation,
//! and the concurrent evaluator that runs them against an environment trace.

mod analysis;
mod channel;
mod evaluate;
mod event;
mod fiber;
mod initials;
mod monitor;
mod outcome;
mod process;
mod program;

pub use analysis::StaticError;
pub use event::Alphabet;
pub use event::AlphabetTable;
pub use event::ChannelTable;
pub use initials::initials;
pub use initials::sync_set;
pub use outcome::Deadlock;
pub use outcome::DeadlockReason;
pub use outcome::Outcome;
pub use process::channel_in;
pub use process::channel_out;
pub use process::event;
pub use process::external_choice;
pub use process::general_choice;
pub use process::internal_choice;
pub use process::parallel;
pub use process::prefix;
pub use process::process_ref;
pub use process::stop;
pub use process::ProcessKind;
pub use process::ProcessNode;
pub use process::ProcessTable;
pub use program::evaluate_program;
pub use program::evaluate_program_seeded;
pub use program::Program;

#[cfg(test)]
mod test_support;
