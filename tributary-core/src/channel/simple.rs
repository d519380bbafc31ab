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

use std::collections::VecDeque;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};
use tracing::trace;

use crate::channel::{DispatcherPolicy, InterceptorList};
use crate::common::MessagingError;
use crate::message::Message;
use crate::traits::MessageChannel;

/// A bounded FIFO [`MessageChannel`] safe for concurrent producers and
/// consumers.
///
/// Capacity defaults to effectively unbounded. The buffer is a queue guarded
/// by a pair of semaphores (free slots and available items), which gives the
/// timeout contract for both directions without holding any lock while
/// waiting. Waiting is cancel-safe: a send or receive abandoned mid-wait
/// neither loses nor duplicates a message.
#[derive(Debug)]
pub struct SimpleChannel {
    name: OnceLock<String>,
    policy: DispatcherPolicy,
    interceptors: InterceptorList,
    queue: Mutex<VecDeque<Message>>,
    slots: Semaphore,
    items: Semaphore,
}

impl Default for SimpleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleChannel {
    /// Creates an effectively unbounded point-to-point channel.
    pub fn new() -> Self {
        Self::with_capacity_and_policy(Semaphore::MAX_PERMITS, DispatcherPolicy::default())
    }

    /// Creates a bounded point-to-point channel.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_policy(capacity, DispatcherPolicy::default())
    }

    /// Creates an effectively unbounded channel with the given policy.
    pub fn with_policy(policy: DispatcherPolicy) -> Self {
        Self::with_capacity_and_policy(Semaphore::MAX_PERMITS, policy)
    }

    /// Creates a bounded channel with the given policy.
    pub fn with_capacity_and_policy(capacity: usize, policy: DispatcherPolicy) -> Self {
        let capacity = capacity.min(Semaphore::MAX_PERMITS);
        SimpleChannel {
            name: OnceLock::new(),
            policy,
            interceptors: InterceptorList::default(),
            queue: Mutex::new(VecDeque::new()),
            slots: Semaphore::new(capacity),
            items: Semaphore::new(0),
        }
    }

    async fn enqueue(&self, message: Message, timeout: Option<Duration>) -> bool {
        let permit = match timeout {
            None => match self.slots.acquire().await {
                Ok(permit) => permit,
                Err(_) => return false,
            },
            Some(wait) if wait.is_zero() => match self.slots.try_acquire() {
                Ok(permit) => permit,
                Err(_) => return false,
            },
            Some(wait) => match tokio::time::timeout(wait, self.slots.acquire()).await {
                Ok(Ok(permit)) => permit,
                _ => return false,
            },
        };
        {
            let mut queue = self.queue.lock().await;
            queue.push_back(message);
        }
        // The slot permit is now held by the enqueued message; it comes back
        // via add_permits when the message is consumed.
        permit.forget();
        self.items.add_permits(1);
        true
    }

    async fn dequeue(&self, timeout: Option<Duration>) -> Option<Message> {
        let permit = match timeout {
            None => self.items.acquire().await.ok()?,
            Some(wait) if wait.is_zero() => self.items.try_acquire().ok()?,
            Some(wait) => tokio::time::timeout(wait, self.items.acquire())
                .await
                .ok()?
                .ok()?,
        };
        let message = {
            let mut queue = self.queue.lock().await;
            queue.pop_front()
        };
        let message = message?;
        permit.forget();
        self.slots.add_permits(1);
        Some(message)
    }
}

#[async_trait]
impl MessageChannel for SimpleChannel {
    fn name(&self) -> &str {
        self.name.get().map(String::as_str).unwrap_or("")
    }

    fn set_name(&self, name: &str) -> Result<(), MessagingError> {
        match self.name.set(name.to_string()) {
            Ok(()) => Ok(()),
            Err(_) if self.name() == name => Ok(()),
            Err(_) => Err(MessagingError::Configuration(format!(
                "channel '{}' cannot be renamed to '{}'",
                self.name(),
                name
            ))),
        }
    }

    fn dispatcher_policy(&self) -> DispatcherPolicy {
        self.policy
    }

    fn interceptors(&self) -> &InterceptorList {
        &self.interceptors
    }

    async fn send_timeout(&self, message: Message, timeout: Option<Duration>) -> bool {
        if !self.interceptors.pre_send(&message, self.name()) {
            return false;
        }
        let sent = self.enqueue(message.clone(), timeout).await;
        trace!(channel = self.name(), message_id = %message.id(), sent, "send");
        self.interceptors.post_send(&message, self.name(), sent);
        sent
    }

    async fn receive_timeout(&self, timeout: Option<Duration>) -> Option<Message> {
        if !self.interceptors.pre_receive(self.name()) {
            return None;
        }
        let message = self.dequeue(timeout).await;
        trace!(
            channel = self.name(),
            received = message.is_some(),
            "receive"
        );
        self.interceptors.post_receive(message.as_ref(), self.name());
        message
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::time::Instant;

    use crate::channel::ChannelInterceptor;

    use super::*;

    #[tokio::test]
    async fn fifo_among_accepted_messages() {
        let channel = SimpleChannel::new();
        for text in ["one", "two", "three"] {
            assert!(channel.send(Message::new(text.to_string())).await);
        }
        for text in ["one", "two", "three"] {
            let received = channel.receive().await.unwrap();
            assert_eq!(received.payload_as::<String>().unwrap(), text);
        }
    }

    #[tokio::test]
    async fn try_send_on_full_channel_fails_without_blocking() {
        let channel = SimpleChannel::with_capacity(1);
        assert!(channel.try_send(Message::new(1_u32)).await);
        assert!(!channel.try_send(Message::new(2_u32)).await);
        // The rejected message was not enqueued.
        let only = channel.receive().await.unwrap();
        assert_eq!(only.payload_as::<u32>(), Some(&1));
        assert!(channel.try_receive().await.is_none());
    }

    #[tokio::test]
    async fn try_receive_on_empty_channel_returns_none() {
        let channel = SimpleChannel::new();
        assert!(channel.try_receive().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_receive_times_out() {
        let channel = SimpleChannel::new();
        let start = Instant::now();
        let received = channel
            .receive_timeout(Some(Duration::from_millis(200)))
            .await;
        assert!(received.is_none());
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn blocked_send_completes_once_space_frees() {
        let channel = Arc::new(SimpleChannel::with_capacity(1));
        assert!(channel.send(Message::new("first".to_string())).await);

        let producer = {
            let channel = channel.clone();
            tokio::spawn(async move { channel.send(Message::new("second".to_string())).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(channel.receive().await.is_some());
        assert!(producer.await.unwrap());
        let second = channel.receive().await.unwrap();
        assert_eq!(second.payload_as::<String>().unwrap(), "second");
    }

    #[tokio::test]
    async fn vetoed_send_does_not_touch_the_buffer() {
        struct VetoAll;
        impl ChannelInterceptor for VetoAll {
            fn pre_send(&self, _message: &Message, _channel: &str) -> bool {
                false
            }
        }

        let channel = SimpleChannel::new();
        channel.interceptors().add(Arc::new(VetoAll));
        assert!(!channel.send(Message::new("x".to_string())).await);
        assert!(channel.try_receive().await.is_none());
    }
}
