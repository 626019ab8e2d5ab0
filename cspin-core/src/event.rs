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

//! Defines alphabets — sets of event names.

use std::fmt::Display;

use indexmap::IndexMap;
use indexmap::IndexSet;

/// The set of events a process is permitted to engage in.
///
/// Events are plain strings.  An alphabet preserves the order events were declared in, which keeps
/// error messages and synchronization sets stable across runs; equality is still set equality.
/// The static pass only ever grows alphabets (union semantics), so growth is idempotent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Alphabet(IndexSet<String>);

/// Maps each process name to its declared (and propagated) alphabet.  The empty process name
/// denotes the root expression, whose alphabet is universal.
pub type AlphabetTable = IndexMap<String, Alphabet>;

/// Maps each channel name to the set of tag values allowed to travel on it.
pub type ChannelTable = IndexMap<String, Alphabet>;

impl Alphabet {
    pub fn new() -> Alphabet {
        Alphabet(IndexSet::new())
    }

    /// Returns whether this alphabet contains a particular event.
    pub fn contains(&self, event: &str) -> bool {
        self.0.contains(event)
    }

    /// Adds an event, returning whether it was newly inserted.
    pub fn insert(&mut self, event: impl Into<String>) -> bool {
        self.0.insert(event.into())
    }

    /// Grows this alphabet by every event of `other`.
    pub fn union_with(&mut self, other: &Alphabet) {
        for event in other.iter() {
            self.insert(event);
        }
    }

    /// Returns whether this alphabet contains every event of `other`.
    pub fn is_superset(&self, other: &Alphabet) -> bool {
        other.iter().all(|event| self.contains(event))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<S> for Alphabet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Alphabet {
        Alphabet(iter.into_iter().map(Into::into).collect())
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, event) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(event)?;
        }
        f.write_str("}")
    }
}
