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

/// Declares a channel's delivery semantics: point-to-point (exactly one
/// subscriber consumes each message) or publish-subscribe (every subscriber
/// receives every message).
///
/// Immutable once attached to a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatcherPolicy {
    publish_subscribe: bool,
    failover: bool,
}

impl Default for DispatcherPolicy {
    fn default() -> Self {
        Self::point_to_point()
    }
}

impl DispatcherPolicy {
    /// Point-to-point delivery: the first subscriber (in registration order)
    /// that accepts the message claims it. Failed or declining candidates are
    /// skipped in favor of the next one.
    pub fn point_to_point() -> Self {
        DispatcherPolicy {
            publish_subscribe: false,
            failover: true,
        }
    }

    /// Publish-subscribe delivery: every subscriber receives an independent
    /// dispatch of each message.
    pub fn publish_subscribe() -> Self {
        DispatcherPolicy {
            publish_subscribe: true,
            failover: true,
        }
    }

    /// Disables point-to-point failover: the first handler failure ends the
    /// dispatch instead of trying the next candidate.
    pub fn fail_fast(mut self) -> Self {
        self.failover = false;
        self
    }

    /// Whether this policy broadcasts to all subscribers.
    pub fn is_publish_subscribe(&self) -> bool {
        self.publish_subscribe
    }

    /// Whether point-to-point dispatch tries the next candidate after a
    /// handler failure.
    pub fn failover(&self) -> bool {
        self.failover
    }
}
