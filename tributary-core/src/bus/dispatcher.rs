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

use dashmap::DashMap;
use futures::future::join_all;
use tracing::{error, trace, warn};

use crate::bus::Subscription;
use crate::channel::DispatcherPolicy;
use crate::common::MessagingError;
use crate::message::{ErrorMessage, Message};
use crate::traits::{Disposition, MessageChannel, MessageHandler};

/// One handler bound to a channel. Entries are kept in registration order,
/// which is the candidate order for point-to-point dispatch.
#[derive(Clone)]
pub(crate) struct SubscriberEntry {
    pub(crate) name: String,
    pub(crate) handler: Arc<dyn MessageHandler>,
    pub(crate) subscription: Subscription,
}

/// Routes a received message to its channel's subscribers per the dispatch
/// policy and forwards handler replies by return address.
///
/// Every failure path ends on the error channel; nothing escapes to the
/// dispatch loop's caller.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    channels: Arc<DashMap<String, Arc<dyn MessageChannel>>>,
    error_channel: Arc<dyn MessageChannel>,
    send_timeout: Option<Duration>,
}

impl Dispatcher {
    pub(crate) fn new(
        channels: Arc<DashMap<String, Arc<dyn MessageChannel>>>,
        error_channel: Arc<dyn MessageChannel>,
        send_timeout: Option<Duration>,
    ) -> Self {
        Dispatcher {
            channels,
            error_channel,
            send_timeout,
        }
    }

    pub(crate) async fn dispatch(
        &self,
        message: Message,
        subscribers: &[SubscriberEntry],
        policy: DispatcherPolicy,
    ) {
        if subscribers.is_empty() {
            warn!(message_id = %message.id(), "message consumed on a channel with no subscribers");
            return;
        }
        if policy.is_publish_subscribe() {
            let deliveries = subscribers
                .iter()
                .map(|entry| self.deliver_to(entry, message.clone()));
            join_all(deliveries).await;
        } else {
            self.dispatch_point_to_point(message, subscribers, policy)
                .await;
        }
    }

    /// Offers the message to each candidate in registration order until one
    /// claims it. `Declined` always moves on; a failure moves on only while
    /// the policy allows failover.
    async fn dispatch_point_to_point(
        &self,
        message: Message,
        subscribers: &[SubscriberEntry],
        policy: DispatcherPolicy,
    ) {
        let mut last_failure: Option<anyhow::Error> = None;
        for entry in subscribers {
            match entry.handler.handle(message.clone()).await {
                Ok(Disposition::Reply(reply)) => {
                    trace!(handler = %entry.name, "message claimed with reply");
                    if let Err(cause) = self.route_reply(reply, &message).await {
                        self.report_failure(cause, Some(message)).await;
                    }
                    return;
                }
                Ok(Disposition::Handled) => {
                    trace!(handler = %entry.name, "message claimed");
                    return;
                }
                Ok(Disposition::Declined) => {
                    trace!(handler = %entry.name, "handler declined message");
                }
                Err(cause) => {
                    warn!(handler = %entry.name, %cause, "handler failed");
                    last_failure = Some(cause);
                    if !policy.failover() {
                        break;
                    }
                }
            }
        }
        let cause = last_failure.unwrap_or_else(|| {
            anyhow::Error::new(MessagingError::Dispatch(format!(
                "no subscriber accepted message {}",
                message.id()
            )))
        });
        self.report_failure(cause, Some(message)).await;
    }

    /// Publish-subscribe delivery to a single subscriber; its outcome never
    /// affects the other subscribers.
    async fn deliver_to(&self, entry: &SubscriberEntry, message: Message) {
        match entry.handler.handle(message.clone()).await {
            Ok(Disposition::Reply(reply)) => {
                if let Err(cause) = self.route_reply(reply, &message).await {
                    self.report_failure(cause, Some(message)).await;
                }
            }
            Ok(_) => {}
            Err(cause) => {
                warn!(handler = %entry.name, %cause, "handler failed");
                self.report_failure(cause, Some(message)).await;
            }
        }
    }

    /// Sends a reply to the channel named by its return-address header,
    /// falling back to the inbound message's return address.
    async fn route_reply(&self, reply: Message, original: &Message) -> anyhow::Result<()> {
        let address = reply
            .headers()
            .return_address()
            .or(original.headers().return_address())
            .map(str::to_string);
        let Some(address) = address else {
            return Err(anyhow::Error::new(MessagingError::Unroutable(format!(
                "reply {} carries no return address",
                reply.id()
            ))));
        };
        let channel = self.channels.get(&address).map(|entry| entry.value().clone());
        let Some(channel) = channel else {
            return Err(anyhow::Error::new(MessagingError::Unroutable(format!(
                "no channel registered under return address '{}'",
                address
            ))));
        };
        if channel.send_timeout(reply, self.send_timeout).await {
            Ok(())
        } else {
            Err(anyhow::Error::new(MessagingError::SendFailed(format!(
                "reply was not accepted by channel '{}'",
                address
            ))))
        }
    }

    /// Wraps a failure as an [`ErrorMessage`] and routes it to the error
    /// channel.
    pub(crate) async fn report_failure(
        &self,
        cause: anyhow::Error,
        failed_message: Option<Message>,
    ) {
        error!(%cause, "routing failure to the error channel");
        let report = ErrorMessage::new(cause, failed_message).into_message();
        if !self.error_channel.send_timeout(report, self.send_timeout).await {
            error!("the error channel did not accept a failure report");
        }
    }
}
