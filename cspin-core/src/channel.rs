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

//! The runtime channel table — one zero-capacity rendezvous channel per declared channel name.

use crossbeam_channel::bounded;
use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use indexmap::IndexMap;

/// Named rendezvous points carrying string values between fibers.
///
/// Every link is zero-capacity: a channel output blocks until the matching input arrives, and
/// vice versa.  The bus keeps both ends of every link alive for the whole run, so transfers only
/// fail when the named channel was never declared.
pub(crate) struct ChannelBus {
    links: IndexMap<String, (Sender<String>, Receiver<String>)>,
}

/// The named channel does not exist in the bus.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct NoSuchChannel;

impl ChannelBus {
    pub(crate) fn new<'a>(channels: impl Iterator<Item = &'a str>) -> ChannelBus {
        ChannelBus {
            links: channels
                .map(|name| (name.to_owned(), bounded(0)))
                .collect(),
        }
    }

    /// Sends `value` on the named channel, blocking until a reader takes it.
    pub(crate) fn send(&self, channel: &str, value: String) -> Result<(), NoSuchChannel> {
        let (sender, _) = self.links.get(channel).ok_or(NoSuchChannel)?;
        sender.send(value).map_err(|_| NoSuchChannel)
    }

    /// Receives a value from the named channel, blocking until a writer offers one.
    pub(crate) fn receive(&self, channel: &str) -> Result<String, NoSuchChannel> {
        let (_, receiver) = self.links.get(channel).ok_or(NoSuchChannel)?;
        receiver.recv().map_err(|_| NoSuchChannel)
    }
}

#[cfg(test)]
mod channel_tests {
    use super::*;

    use std::thread;

    #[test]
    fn transfers_rendezvous_between_threads() {
        let bus = ChannelBus::new(["c"].into_iter());
        thread::scope(|s| {
            s.spawn(|| {
                assert_eq!(bus.send("c", "x".to_owned()), Ok(()));
            });
            assert_eq!(bus.receive("c"), Ok("x".to_owned()));
        });
    }

    #[test]
    fn unknown_channels_are_reported() {
        let bus = ChannelBus::new(std::iter::empty::<&str>());
        assert_eq!(bus.send("c", "x".to_owned()), Err(NoSuchChannel));
        assert_eq!(bus.receive("c"), Err(NoSuchChannel));
    }
}
