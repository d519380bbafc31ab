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

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::traits::{MessageChannel, Payload};

/// An external pull-based source of raw items.
///
/// A failed poll is recoverable: the bus captures the error as an
/// [`ErrorMessage`](crate::message::ErrorMessage) and keeps polling on the
/// next scheduled tick.
#[async_trait]
pub trait PollableSource: Send + Sync {
    /// Polls the source for up to `limit` items.
    async fn poll(&self, limit: usize) -> anyhow::Result<Vec<Arc<dyn Payload>>>;
}

/// Bridges an external source into the channel world.
///
/// The bus runs one polling loop per registered adapter: every
/// [`poll_period`](SourceAdapter::poll_period), it invokes
/// [`poll_once`](SourceAdapter::poll_once) and routes any `Err` to the error
/// channel without terminating the loop.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Returns the channel this adapter feeds.
    fn channel(&self) -> Arc<dyn MessageChannel>;

    /// Returns the interval between poll attempts.
    fn poll_period(&self) -> Duration;

    /// Performs one poll cycle: pulls items from the source, wraps each as a
    /// message, and sends it into the adapter's channel. Returns the number
    /// of messages injected.
    async fn poll_once(&self) -> anyhow::Result<usize>;
}
