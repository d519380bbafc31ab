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

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::channel::{DispatcherPolicy, InterceptorList};
use crate::common::MessagingError;
use crate::message::Message;

/// The hand-off contract between producers and the dispatch engine.
///
/// A channel is a named, thread-safe FIFO buffer. Sends and receives run the
/// channel's [`ChannelInterceptor`](crate::channel::ChannelInterceptor) chain
/// around the buffer operation and honor a three-way timeout convention:
///
/// *   `None` blocks until the operation completes or the awaiting task is
///     cancelled (cancellation yields `false`/`None`, never a panic).
/// *   `Some(Duration::ZERO)` attempts the operation exactly once and reports
///     the outcome immediately.
/// *   `Some(duration)` blocks for at most `duration`.
///
/// A channel never loses a successfully accepted message except by explicit
/// consumption, and it is usable before the bus starts (buffering) and after
/// the bus stops (draining).
#[async_trait]
pub trait MessageChannel: Debug + Send + Sync {
    /// Returns the channel's name, or an empty string if it has not been
    /// named yet.
    fn name(&self) -> &str;

    /// Assigns the channel's name. A channel is named exactly once, normally
    /// by the bus at registration time.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Configuration`] if the channel already
    /// carries a different name.
    fn set_name(&self, name: &str) -> Result<(), MessagingError>;

    /// Returns the dispatch policy attached to this channel.
    fn dispatcher_policy(&self) -> DispatcherPolicy;

    /// Returns the channel's interceptor chain.
    fn interceptors(&self) -> &InterceptorList;

    /// Sends a message, waiting up to `timeout` for buffer space.
    ///
    /// Returns `true` if the message was accepted, `false` if the send was
    /// vetoed by an interceptor, timed out, or was cancelled.
    async fn send_timeout(&self, message: Message, timeout: Option<Duration>) -> bool;

    /// Receives the first available message, waiting up to `timeout`.
    ///
    /// Returns `None` if the receive was vetoed by an interceptor, timed out,
    /// or was cancelled.
    async fn receive_timeout(&self, timeout: Option<Duration>) -> Option<Message>;

    /// Sends a message, blocking until space is available.
    async fn send(&self, message: Message) -> bool {
        self.send_timeout(message, None).await
    }

    /// Attempts to send a message without blocking.
    async fn try_send(&self, message: Message) -> bool {
        self.send_timeout(message, Some(Duration::ZERO)).await
    }

    /// Receives the first available message, blocking until one arrives.
    async fn receive(&self) -> Option<Message> {
        self.receive_timeout(None).await
    }

    /// Attempts to receive a message without blocking.
    async fn try_receive(&self) -> Option<Message> {
        self.receive_timeout(Some(Duration::ZERO)).await
    }
}
