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
use tracing::trace;

use crate::common::{BusConfig, MessagingError};
use crate::message::{IdGenerator, Message, UuidGenerator};
use crate::traits::{MessageChannel, PollableSource, SourceAdapter};

const DEFAULT_PERIOD: Duration = Duration::from_millis(1_000);
const DEFAULT_LIMIT: usize = 10;
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(1_000);

/// A [`SourceAdapter`] that polls a [`PollableSource`] on a schedule and
/// injects the results into its configured channel as messages.
///
/// The bus drives the schedule; one poll cycle pulls up to the configured
/// limit of items and sends each with a non-zero default timeout. A failing
/// poll does not terminate the adapter: the bus reports the failure on the
/// error channel and the next tick polls again.
pub struct PollingSourceAdapter<S> {
    source: S,
    channel: Arc<dyn MessageChannel>,
    period: Duration,
    limit: usize,
    send_timeout: Duration,
    generator: Arc<dyn IdGenerator>,
}

impl<S: PollableSource> PollingSourceAdapter<S> {
    /// Creates an adapter feeding `channel` from `source` with default
    /// schedule, limit, and send timeout.
    pub fn new(source: S, channel: Arc<dyn MessageChannel>) -> Self {
        PollingSourceAdapter {
            source,
            channel,
            period: DEFAULT_PERIOD,
            limit: DEFAULT_LIMIT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            generator: Arc::new(UuidGenerator),
        }
    }

    /// Creates an adapter whose schedule, limit, and send timeout come from
    /// `config`.
    pub fn from_config(source: S, channel: Arc<dyn MessageChannel>, config: &BusConfig) -> Self {
        Self::new(source, channel)
            .with_period(config.poll_interval())
            .with_limit(config.default_poll_limit)
            .with_send_timeout(Duration::from_millis(config.default_send_timeout_ms))
    }

    /// Sets the interval between poll attempts.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Sets the maximum number of items pulled per poll.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Sets the timeout applied when sending polled items into the channel.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Sets the identifier generator consulted for injected messages.
    pub fn with_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.generator = generator;
        self
    }
}

#[async_trait]
impl<S: PollableSource> SourceAdapter for PollingSourceAdapter<S> {
    fn channel(&self) -> Arc<dyn MessageChannel> {
        self.channel.clone()
    }

    fn poll_period(&self) -> Duration {
        self.period
    }

    async fn poll_once(&self) -> anyhow::Result<usize> {
        let items = self.source.poll(self.limit).await?;
        let mut injected = 0;
        for item in items {
            let message = Message::from_payload(item, self.generator.as_ref());
            if self
                .channel
                .send_timeout(message, Some(self.send_timeout))
                .await
            {
                injected += 1;
            } else {
                return Err(anyhow::Error::new(MessagingError::SendFailed(format!(
                    "channel '{}' did not accept a polled item within {:?}",
                    self.channel.name(),
                    self.send_timeout
                ))));
            }
        }
        trace!(channel = self.channel.name(), injected, "poll cycle");
        Ok(injected)
    }
}
