/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::time::Duration;

/// Binds a handler to a source channel, optionally with a polling period and
/// a concurrent dispatch degree.
///
/// Immutable once registered; owned by the bus for the lifetime of the
/// registration.
#[derive(Clone, Debug)]
pub struct Subscription {
    channel_name: String,
    period: Option<Duration>,
    concurrency: usize,
}

impl Subscription {
    /// Subscribes to the named source channel with event-driven dispatch and
    /// a single dispatch task.
    pub fn new(channel_name: impl Into<String>) -> Self {
        Subscription {
            channel_name: channel_name.into(),
            period: None,
            concurrency: 1,
        }
    }

    /// Switches the source channel to polled consumption: the dispatch loop
    /// drains it every `period` instead of blocking on receive.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = Some(period);
        self
    }

    /// Requests `concurrency` parallel dispatch tasks for the source channel.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The name of the subscribed source channel.
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// The polling period, if polled consumption was requested.
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// The concurrent dispatch degree.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}
