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

//! The barrier coordinator a fiber runs after forking the branches of a parallel composition.

use crate::fiber::Fiber;
use crate::fiber::FiberHandle;

// Operational semantics for P₁ ∥ … ∥ Pₙ over a shared trace
//
//         Pᵢ -a→ Pᵢ'
//  1)  ─────────────── a shared by fewer than two siblings (interleave)
//       ∥ Ps -a→ ∥ Ps'
//
//       Pᵢ -a→ Pᵢ' for every Pᵢ with a in its head set
//  2)  ──────────────────────────────────────────────── a shared (rendezvous)
//       ∥ Ps -a→ ∥ Ps'
//
// Each round, every live child performs exactly one step: a child consuming a shared event
// signals in and suspends; a child on unshared events runs ahead silently until its next signal.
// The monitor releases everyone together once it has itself synchronized with its own parent, so
// an outer composition's round encloses the full round of an inner one.

/// Shepherds the forked children of a parallel composition until all of them have terminated,
/// then reconciles this fiber's cursor and reports dead to its own parent.
pub(crate) fn run(mut children: Vec<FiberHandle>, fiber: Fiber) {
    let mut still_running = children.len();
    while still_running > 0 {
        for child in children.iter_mut().filter(|child| child.open) {
            if !child.receive() {
                child.open = false;
                still_running -= 1;
            }
        }
        if still_running == 0 {
            break;
        }

        fiber.signal_alive();
        fiber.await_proceed();
        for child in children.iter().filter(|child| child.open) {
            child.release();
        }
    }

    // Siblings advance independently past interleaved events, so their cursors diverge; the
    // parent's position is wherever the furthest child got to.
    let furthest = children
        .iter()
        .map(FiberHandle::cursor)
        .max()
        .unwrap_or_else(|| fiber.cursor());
    if furthest > fiber.cursor() {
        fiber.set_cursor(furthest);
    }
    fiber.terminate();
}
