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

use std::future::Future;

use async_trait::async_trait;

use crate::message::Message;

/// The explicit outcome of a handler invocation.
///
/// Point-to-point dispatch branches on this value: `Reply` and `Handled`
/// claim the message, `Declined` offers it to the next candidate in
/// registration order.
#[derive(Debug)]
pub enum Disposition {
    /// The handler consumed the message and produced a reply to be routed by
    /// return address.
    Reply(Message),
    /// The handler consumed the message and has nothing to send onward.
    Handled,
    /// The handler chose not to process this message.
    Declined,
}

/// A user-supplied processing unit invoked by the bus's dispatch loops.
///
/// Any `Err` returned from [`handle`](MessageHandler::handle) is converted by
/// the bus into an [`ErrorMessage`](crate::message::ErrorMessage) routed to
/// the error channel; it never crashes a dispatch loop.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Processes one message and reports its disposition.
    async fn handle(&self, message: Message) -> anyhow::Result<Disposition>;
}

/// Adapts an async closure into a [`MessageHandler`].
///
/// ```rust,ignore
/// let echo = handler_fn(|message: Message| async move {
///     Ok(Disposition::Reply(message.with_return_address("output")))
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Message) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Disposition>> + Send,
{
    FnHandler(f)
}

/// A [`MessageHandler`] backed by a closure. Created by [`handler_fn`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> MessageHandler for FnHandler<F>
where
    F: Fn(Message) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Disposition>> + Send,
{
    async fn handle(&self, message: Message) -> anyhow::Result<Disposition> {
        (self.0)(message).await
    }
}
