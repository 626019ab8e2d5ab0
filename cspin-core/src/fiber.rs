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

//! Fiber control records and the parent/child rendezvous protocol.
//!
//! Every fiber is linked to its parent by a pair of zero-capacity channels.  The child sends
//! booleans upward — `true` for "I advanced one step and am alive", `false` for "I have
//! terminated" — and the parent sends proceed signals downward.  Both directions rendezvous, so a
//! signalling child is suspended until its parent takes the signal; the monitor's round structure
//! depends on this.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crossbeam_channel::bounded;
use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;

/// The child end of a control link.  Owned by the fiber it controls.
pub(crate) struct Fiber {
    blocked: Arc<[String]>,
    need_to_block: bool,
    cursor: Arc<AtomicUsize>,
    signal_tx: Sender<bool>,
    proceed_rx: Receiver<bool>,
}

/// The parent end of a control link.  Held by the monitor (or root driver) shepherding the fiber.
pub(crate) struct FiberHandle {
    pub(crate) open: bool,
    cursor: Arc<AtomicUsize>,
    signal_rx: Receiver<bool>,
    proceed_tx: Sender<bool>,
}

/// Creates a control link.  `blocked` is the synchronization set the fiber inherits from its
/// enclosing parallel composition; `start` is the trace position the fiber begins at.
pub(crate) fn link(
    blocked: Arc<[String]>,
    start: usize,
    need_to_block: bool,
) -> (Fiber, FiberHandle) {
    let (signal_tx, signal_rx) = bounded(0);
    let (proceed_tx, proceed_rx) = bounded(0);
    let cursor = Arc::new(AtomicUsize::new(start));
    let fiber = Fiber {
        blocked,
        need_to_block,
        cursor: cursor.clone(),
        signal_tx,
        proceed_rx,
    };
    let handle = FiberHandle {
        open: true,
        cursor,
        signal_rx,
        proceed_tx,
    };
    (fiber, handle)
}

impl Fiber {
    pub(crate) fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub(crate) fn set_cursor(&self, position: usize) {
        self.cursor.store(position, Ordering::Release);
    }

    fn advance(&self) {
        self.cursor.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn blocked(&self) -> &Arc<[String]> {
        &self.blocked
    }

    /// Waits for the parent's proceed signal if the previous step left this fiber obliged to.
    pub(crate) fn block_if_needed(&mut self) {
        if self.need_to_block {
            let _ = self.proceed_rx.recv();
            self.need_to_block = false;
        }
    }

    /// Executes one environment event.  If the event is one the enclosing composition must
    /// rendezvous on, the fiber reports in and will wait at its next entry so every sharing
    /// sibling reaches the event before anyone moves past it.
    pub(crate) fn consume(&mut self, event: &str) {
        if self.blocked.iter().any(|blocked| blocked == event) {
            let _ = self.signal_tx.send(true);
            self.need_to_block = true;
        }
        self.advance();
    }

    /// Counts the fiber's final event without the shared-event handshake; `complete` follows it.
    pub(crate) fn advance_past_final(&self) {
        self.advance();
    }

    pub(crate) fn signal_alive(&self) {
        let _ = self.signal_tx.send(true);
    }

    pub(crate) fn await_proceed(&self) {
        let _ = self.proceed_rx.recv();
    }

    /// The final handshake of a successfully terminated fiber: report alive, let the parent
    /// advance once more, then report dead.
    pub(crate) fn complete(&self) {
        if self.signal_tx.send(true).is_err() {
            return;
        }
        if self.proceed_rx.recv().is_err() {
            return;
        }
        let _ = self.signal_tx.send(false);
    }

    /// Reports dead without a handshake, for fibers stopping early (deadlock or an exhausted
    /// environment).
    pub(crate) fn terminate(&self) {
        let _ = self.signal_tx.send(false);
    }
}

impl FiberHandle {
    pub(crate) fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Receives the child's next signal; a vanished child counts as terminated.
    pub(crate) fn receive(&self) -> bool {
        self.signal_rx.recv().unwrap_or(false)
    }

    pub(crate) fn release(&self) {
        let _ = self.proceed_tx.send(true);
    }
}
