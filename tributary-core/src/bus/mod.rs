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

//! The message bus: registry of channels, handlers, subscriptions, and source
//! adapters, plus the dispatch and polling loops that move messages between
//! them.

mod adapter;
mod dispatcher;
mod subscription;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, trace, warn};

use crate::channel::SimpleChannel;
use crate::common::{BusConfig, MessagingError};
use crate::traits::{MessageChannel, MessageHandler, SourceAdapter};

pub use adapter::PollingSourceAdapter;
pub use subscription::Subscription;

use dispatcher::{Dispatcher, SubscriberEntry};

/// The reserved name of the bus's error channel. A channel registered under
/// this name becomes the error channel; otherwise one is created lazily.
pub const ERROR_CHANNEL_NAME: &str = "errors";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BusState {
    Created,
    Started,
    Stopped,
}

/// The central orchestrator of the messaging runtime.
///
/// The bus exclusively owns the name registries and the delivery tasks: one
/// dispatch loop per channel with at least one subscriber, one polling loop
/// per source adapter. Handler and adapter failures are converted into
/// [`ErrorMessage`](crate::message::ErrorMessage)s on the error channel,
/// never surfaced to producers.
///
/// Lifecycle: `Created → Started → Stopped`, driven by [`start`](Self::start)
/// and [`stop`](Self::stop). Registration is valid in any state; registering
/// a subscriber or adapter on a started bus wires its loop immediately.
pub struct MessageBus {
    config: BusConfig,
    channels: Arc<DashMap<String, Arc<dyn MessageChannel>>>,
    handlers: DashMap<String, String>,
    subscribers: Arc<DashMap<String, Vec<SubscriberEntry>>>,
    adapters: DashMap<String, Arc<dyn SourceAdapter>>,
    state: Mutex<BusState>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    active_loops: DashMap<String, ()>,
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("state", &*self.state.lock().unwrap_or_else(PoisonError::into_inner))
            .field("channels", &self.channels.len())
            .field("handlers", &self.handlers.len())
            .field("adapters", &self.adapters.len())
            .finish()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    /// Creates a bus with default configuration.
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Creates a bus with the given configuration.
    pub fn with_config(config: BusConfig) -> Self {
        MessageBus {
            config,
            channels: Arc::new(DashMap::new()),
            handlers: DashMap::new(),
            subscribers: Arc::new(DashMap::new()),
            adapters: DashMap::new(),
            state: Mutex::new(BusState::Created),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            active_loops: DashMap::new(),
        }
    }

    /// Registers a channel under `name`, naming the channel in the process.
    ///
    /// # Errors
    ///
    /// Fails fast with [`MessagingError::Configuration`] if the name is
    /// taken, or if the channel already carries a different name.
    pub fn register_channel(
        &self,
        name: &str,
        channel: Arc<dyn MessageChannel>,
    ) -> anyhow::Result<()> {
        match self.channels.entry(name.to_string()) {
            Entry::Occupied(_) => Err(anyhow::Error::new(MessagingError::Configuration(
                format!("a channel named '{}' is already registered", name),
            ))),
            Entry::Vacant(slot) => {
                channel.set_name(name)?;
                slot.insert(channel);
                trace!(channel = name, "channel registered");
                Ok(())
            }
        }
    }

    /// Registers a handler under `name`, subscribed per `subscription`.
    ///
    /// Subscribers are dispatched in registration order on point-to-point
    /// channels. If the bus is already started and this is the source
    /// channel's first subscriber, its dispatch loop starts immediately.
    ///
    /// # Errors
    ///
    /// Fails fast with [`MessagingError::Configuration`] if the handler name
    /// is taken or the subscription names an unregistered channel.
    pub fn register_handler(
        &self,
        name: &str,
        handler: Arc<dyn MessageHandler>,
        subscription: Subscription,
    ) -> anyhow::Result<()> {
        let channel_name = subscription.channel_name().to_string();
        if !self.channels.contains_key(&channel_name) {
            return Err(anyhow::Error::new(MessagingError::Configuration(format!(
                "subscription names unregistered channel '{}'",
                channel_name
            ))));
        }
        match self.handlers.entry(name.to_string()) {
            Entry::Occupied(_) => {
                return Err(anyhow::Error::new(MessagingError::Configuration(
                    format!("a handler named '{}' is already registered", name),
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(channel_name.clone());
            }
        }
        self.subscribers
            .entry(channel_name.clone())
            .or_default()
            .push(SubscriberEntry {
                name: name.to_string(),
                handler,
                subscription,
            });
        trace!(handler = name, channel = %channel_name, "handler registered");
        self.ensure_dispatch_loop(&channel_name);
        Ok(())
    }

    /// Registers a source adapter under `name`. If the bus is already
    /// started, its polling loop starts immediately.
    ///
    /// # Errors
    ///
    /// Fails fast with [`MessagingError::Configuration`] if the name is
    /// taken.
    pub fn register_source_adapter(
        &self,
        name: &str,
        adapter: Arc<dyn SourceAdapter>,
    ) -> anyhow::Result<()> {
        match self.adapters.entry(name.to_string()) {
            Entry::Occupied(_) => Err(anyhow::Error::new(MessagingError::Configuration(
                format!("a source adapter named '{}' is already registered", name),
            ))),
            Entry::Vacant(slot) => {
                slot.insert(adapter.clone());
                trace!(adapter = name, "source adapter registered");
                if self.is_started() {
                    self.spawn_polling_loop(name, adapter);
                }
                Ok(())
            }
        }
    }

    /// Returns the channel registered under `name`.
    pub fn channel(&self, name: &str) -> Option<Arc<dyn MessageChannel>> {
        self.channels.get(name).map(|entry| entry.value().clone())
    }

    /// Returns the bus's error channel, creating it lazily under
    /// [`ERROR_CHANNEL_NAME`] if none was registered explicitly.
    pub fn error_channel(&self) -> Arc<dyn MessageChannel> {
        self.channels
            .entry(ERROR_CHANNEL_NAME.to_string())
            .or_insert_with(|| {
                let channel = SimpleChannel::new();
                // Naming a fresh channel cannot fail.
                let _ = channel.set_name(ERROR_CHANNEL_NAME);
                Arc::new(channel) as Arc<dyn MessageChannel>
            })
            .clone()
    }

    /// Starts the bus: one dispatch loop per channel with at least one
    /// subscriber, one polling loop per source adapter.
    ///
    /// # Errors
    ///
    /// Fails fast with [`MessagingError::Configuration`] if the bus was
    /// already started or stopped.
    pub fn start(&self) -> anyhow::Result<()> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match *state {
                BusState::Created => *state = BusState::Started,
                BusState::Started => {
                    return Err(anyhow::Error::new(MessagingError::Configuration(
                        "the bus is already started".to_string(),
                    )));
                }
                BusState::Stopped => {
                    return Err(anyhow::Error::new(MessagingError::Configuration(
                        "the bus has been stopped and cannot be restarted".to_string(),
                    )));
                }
            }
        }
        let subscribed: Vec<String> = self
            .subscribers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        for channel_name in subscribed {
            self.ensure_dispatch_loop(&channel_name);
        }
        let adapters: Vec<(String, Arc<dyn SourceAdapter>)> = self
            .adapters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        for (name, adapter) in adapters {
            self.spawn_polling_loop(&name, adapter);
        }
        info!("message bus started");
        Ok(())
    }

    /// Stops the bus: signals every dispatch and polling loop to terminate
    /// after its in-flight work and waits up to the configured grace period
    /// for them to settle. Stopping a bus that is not running is a no-op.
    pub async fn stop(&self) -> anyhow::Result<()> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match *state {
                BusState::Started => *state = BusState::Stopped,
                BusState::Created | BusState::Stopped => return Ok(()),
            }
        }
        self.cancel.cancel();
        self.tracker.close();
        if tokio::time::timeout(self.config.shutdown_grace(), self.tracker.wait())
            .await
            .is_err()
        {
            warn!("delivery loops did not settle within the shutdown grace period");
        }
        info!("message bus stopped");
        Ok(())
    }

    fn is_started(&self) -> bool {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) == BusState::Started
    }

    fn make_dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.channels.clone(),
            self.error_channel(),
            self.config.send_timeout(),
        )
    }

    /// Spawns the dispatch loop for `channel_name` if the bus is running and
    /// the channel doesn't have one yet. The concurrent dispatch degree and
    /// polling period are fixed from the subscriptions present at spawn time.
    fn ensure_dispatch_loop(&self, channel_name: &str) {
        if !self.is_started() {
            return;
        }
        match self.active_loops.entry(channel_name.to_string()) {
            Entry::Occupied(_) => return,
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }
        let Some(channel) = self.channel(channel_name) else {
            return;
        };
        let (loops, poll_period) = self
            .subscribers
            .get(channel_name)
            .map(|subs| {
                let loops = subs
                    .iter()
                    .map(|entry| entry.subscription.concurrency())
                    .max()
                    .unwrap_or(1);
                let period = subs
                    .iter()
                    .filter_map(|entry| entry.subscription.period())
                    .min();
                (loops, period)
            })
            .unwrap_or((1, None));
        for _ in 0..loops {
            self.spawn_dispatch_loop(channel_name.to_string(), channel.clone(), poll_period);
        }
    }

    fn spawn_dispatch_loop(
        &self,
        channel_name: String,
        channel: Arc<dyn MessageChannel>,
        poll_period: Option<Duration>,
    ) {
        let dispatcher = self.make_dispatcher();
        let subscribers = self.subscribers.clone();
        let cancel = self.cancel.clone();
        let policy = channel.dispatcher_policy();
        self.tracker.spawn(async move {
            trace!(channel = %channel_name, "dispatch loop started");
            loop {
                match poll_period {
                    None => {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            received = channel.receive() => {
                                let Some(message) = received else {
                                    // An interceptor vetoed the receive; back
                                    // off briefly instead of spinning.
                                    tokio::time::sleep(Duration::from_millis(10)).await;
                                    continue;
                                };
                                let snapshot = subscribers
                                    .get(&channel_name)
                                    .map(|entry| entry.value().clone())
                                    .unwrap_or_default();
                                dispatcher.dispatch(message, &snapshot, policy).await;
                            }
                        }
                    }
                    Some(period) => {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(period) => {
                                while let Some(message) = channel.try_receive().await {
                                    let snapshot = subscribers
                                        .get(&channel_name)
                                        .map(|entry| entry.value().clone())
                                        .unwrap_or_default();
                                    dispatcher.dispatch(message, &snapshot, policy).await;
                                }
                            }
                        }
                    }
                }
            }
            trace!(channel = %channel_name, "dispatch loop stopped");
        });
    }

    fn spawn_polling_loop(&self, name: &str, adapter: Arc<dyn SourceAdapter>) {
        let dispatcher = self.make_dispatcher();
        let cancel = self.cancel.clone();
        let name = name.to_string();
        self.tracker.spawn(async move {
            trace!(adapter = %name, "polling loop started");
            let period = adapter.poll_period();
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(period) => {
                        match adapter.poll_once().await {
                            Ok(0) => {}
                            Ok(injected) => trace!(adapter = %name, injected, "polled items injected"),
                            Err(cause) => dispatcher.report_failure(cause, None).await,
                        }
                    }
                }
            }
            trace!(adapter = %name, "polling loop stopped");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_channel_registration_fails_fast() {
        let bus = MessageBus::new();
        bus.register_channel("input", Arc::new(SimpleChannel::new()))
            .unwrap();
        let err = bus
            .register_channel("input", Arc::new(SimpleChannel::new()))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MessagingError>(),
            Some(MessagingError::Configuration(_))
        ));
    }

    #[test]
    fn handler_subscription_requires_a_registered_channel() {
        let bus = MessageBus::new();
        let handler = Arc::new(crate::traits::handler_fn(|_message| async move {
            Ok(crate::traits::Disposition::Handled)
        }));
        let err = bus
            .register_handler("h", handler, Subscription::new("missing"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MessagingError>(),
            Some(MessagingError::Configuration(_))
        ));
    }

    #[test]
    fn explicitly_registered_error_channel_is_used() {
        let bus = MessageBus::new();
        let custom: Arc<dyn MessageChannel> = Arc::new(SimpleChannel::with_capacity(8));
        bus.register_channel(ERROR_CHANNEL_NAME, custom.clone())
            .unwrap();
        assert_eq!(bus.error_channel().name(), ERROR_CHANNEL_NAME);
        assert!(Arc::ptr_eq(&bus.error_channel(), &custom));
    }

    #[test]
    fn lazily_created_error_channel_blocks_reregistration() {
        let bus = MessageBus::new();
        let _ = bus.error_channel();
        assert!(bus
            .register_channel(ERROR_CHANNEL_NAME, Arc::new(SimpleChannel::new()))
            .is_err());
    }
}
