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

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::message::Message;

/// An observer/veto hook invoked around every channel send and receive.
///
/// All hooks default to no-ops; implement only the ones you need. Hooks run
/// in insertion order. A `false` from [`pre_send`](Self::pre_send) or
/// [`pre_receive`](Self::pre_receive) short-circuits the remaining chain and
/// the operation itself.
pub trait ChannelInterceptor: Send + Sync {
    /// Invoked before a message is enqueued. Returning `false` vetoes the
    /// send; the channel's buffer is never touched.
    fn pre_send(&self, _message: &Message, _channel: &str) -> bool {
        true
    }

    /// Invoked after the enqueue attempt, with the outcome.
    fn post_send(&self, _message: &Message, _channel: &str, _sent: bool) {}

    /// Invoked before a dequeue attempt. Returning `false` vetoes the
    /// receive; the caller observes `None`.
    fn pre_receive(&self, _channel: &str) -> bool {
        true
    }

    /// Invoked after the dequeue attempt, whether or not a message arrived.
    fn post_receive(&self, _message: Option<&Message>, _channel: &str) {}
}

type Chain = Arc<Vec<Arc<dyn ChannelInterceptor>>>;

/// An ordered interceptor chain with snapshot-on-iterate semantics.
///
/// The chain is stored as an immutable snapshot swapped atomically on
/// [`set`](Self::set) and [`add`](Self::add), so invocations that are in
/// flight while the list is replaced complete using the snapshot they began
/// with and always observe one consistent ordering.
#[derive(Default)]
pub struct InterceptorList {
    chain: RwLock<Chain>,
}

impl fmt::Debug for InterceptorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorList")
            .field("len", &self.snapshot().len())
            .finish()
    }
}

impl InterceptorList {
    /// Replaces the chain. Clears any existing interceptors.
    pub fn set(&self, interceptors: Vec<Arc<dyn ChannelInterceptor>>) {
        let mut guard = self.chain.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(interceptors);
    }

    /// Appends an interceptor to the end of the chain.
    pub fn add(&self, interceptor: Arc<dyn ChannelInterceptor>) {
        let mut guard = self.chain.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.as_ref().clone();
        next.push(interceptor);
        *guard = Arc::new(next);
    }

    fn snapshot(&self) -> Chain {
        self.chain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn pre_send(&self, message: &Message, channel: &str) -> bool {
        for interceptor in self.snapshot().iter() {
            if !interceptor.pre_send(message, channel) {
                trace!(channel, message_id = %message.id(), "send vetoed by interceptor");
                return false;
            }
        }
        true
    }

    pub(crate) fn post_send(&self, message: &Message, channel: &str, sent: bool) {
        for interceptor in self.snapshot().iter() {
            interceptor.post_send(message, channel, sent);
        }
    }

    pub(crate) fn pre_receive(&self, channel: &str) -> bool {
        for interceptor in self.snapshot().iter() {
            if !interceptor.pre_receive(channel) {
                trace!(channel, "receive vetoed by interceptor");
                return false;
            }
        }
        true
    }

    pub(crate) fn post_receive(&self, message: Option<&Message>, channel: &str) {
        for interceptor in self.snapshot().iter() {
            interceptor.post_receive(message, channel);
        }
    }
}
