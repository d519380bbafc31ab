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

use std::collections::HashMap;
use std::sync::Arc;

use static_assertions::assert_impl_all;
use uuid::Uuid;

use crate::message::id::{IdGenerator, UuidGenerator};
use crate::traits::Payload;

/// The header mapping carried by every [`Message`].
///
/// Reserved entries (return address, correlation id) have typed accessors;
/// arbitrary string-keyed metadata lives in the property map.
#[derive(Clone, Debug, Default)]
pub struct MessageHeaders {
    return_address: Option<String>,
    correlation_id: Option<String>,
    properties: HashMap<String, String>,
}

impl MessageHeaders {
    /// Returns the name of the channel a handler's reply should be routed to.
    pub fn return_address(&self) -> Option<&str> {
        self.return_address.as_deref()
    }

    /// Returns the correlation id, if one was set.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns the metadata property stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// An immutable message envelope: payload plus header mapping.
///
/// Messages are cheap to clone (the envelope is `Arc`-backed) and safe to
/// share across dispatch tasks. Header extension is copy-on-write: methods
/// like [`with_return_address`](Message::with_return_address) produce a new
/// `Message` sharing the payload, so concurrent readers of the original are
/// unaffected. The id is preserved across header extension.
#[derive(Clone, Debug)]
pub struct Message {
    inner: Arc<MessageInner>,
}

#[derive(Debug)]
struct MessageInner {
    id: Uuid,
    payload: Arc<dyn Payload>,
    headers: MessageHeaders,
}

assert_impl_all!(Message: Send, Sync);

impl Message {
    /// Creates a message around `payload` with a default-generated id.
    pub fn new(payload: impl Payload) -> Self {
        Self::with_generator(payload, &UuidGenerator)
    }

    /// Creates a message around `payload`, asking `generator` for the id.
    pub fn with_generator(payload: impl Payload, generator: &dyn IdGenerator) -> Self {
        Self::from_payload(Arc::new(payload), generator)
    }

    /// Creates a message around an already type-erased payload.
    pub fn from_payload(payload: Arc<dyn Payload>, generator: &dyn IdGenerator) -> Self {
        Message {
            inner: Arc::new(MessageInner {
                id: generator.next_id(),
                payload,
                headers: MessageHeaders::default(),
            }),
        }
    }

    /// Returns the message's unique identifier.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Returns the message's headers.
    pub fn headers(&self) -> &MessageHeaders {
        &self.inner.headers
    }

    /// Returns the type-erased payload.
    pub fn payload(&self) -> &dyn Payload {
        self.inner.payload.as_ref()
    }

    /// Downcasts the payload to a concrete type.
    pub fn payload_as<T: Payload>(&self) -> Option<&T> {
        <dyn Payload>::as_any(&*self.inner.payload).downcast_ref::<T>()
    }

    /// Returns a new message with the return-address header set, sharing this
    /// message's payload and id.
    pub fn with_return_address(&self, channel_name: impl Into<String>) -> Message {
        let mut headers = self.inner.headers.clone();
        headers.return_address = Some(channel_name.into());
        self.with_headers(headers)
    }

    /// Returns a new message with the correlation-id header set, sharing this
    /// message's payload and id.
    pub fn with_correlation_id(&self, correlation_id: impl Into<String>) -> Message {
        let mut headers = self.inner.headers.clone();
        headers.correlation_id = Some(correlation_id.into());
        self.with_headers(headers)
    }

    /// Returns a new message with the metadata property `key` set to `value`,
    /// sharing this message's payload and id.
    pub fn with_header(&self, key: impl Into<String>, value: impl Into<String>) -> Message {
        let mut headers = self.inner.headers.clone();
        headers.properties.insert(key.into(), value.into());
        self.with_headers(headers)
    }

    fn with_headers(&self, headers: MessageHeaders) -> Message {
        Message {
            inner: Arc::new(MessageInner {
                id: self.inner.id,
                payload: self.inner.payload.clone(),
                headers,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    #[test]
    fn payload_downcast() {
        let message = Message::new("test".to_string());
        assert_eq!(message.payload_as::<String>().unwrap(), "test");
        assert!(message.payload_as::<u32>().is_none());
    }

    #[test]
    fn header_extension_preserves_id_and_payload() {
        let original = Message::new(42_u32);
        let extended = original
            .with_return_address("replies")
            .with_correlation_id("corr-1")
            .with_header("origin", "unit-test");

        assert_eq!(extended.id(), original.id());
        assert_eq!(extended.payload_as::<u32>(), Some(&42));
        assert_eq!(extended.headers().return_address(), Some("replies"));
        assert_eq!(extended.headers().correlation_id(), Some("corr-1"));
        assert_eq!(extended.headers().get("origin"), Some("unit-test"));

        // The original is untouched by the copy-on-write extension.
        assert_eq!(original.headers().return_address(), None);
        assert_eq!(original.headers().get("origin"), None);
    }

    #[test]
    fn custom_generator_is_consulted() {
        struct SequenceGenerator(AtomicU64);

        impl IdGenerator for SequenceGenerator {
            fn next_id(&self) -> Uuid {
                Uuid::from_u128(u128::from(self.0.fetch_add(1, Ordering::Relaxed)))
            }
        }

        let generator = SequenceGenerator(AtomicU64::new(7));
        let first = Message::with_generator("a", &generator);
        let second = Message::with_generator("b", &generator);
        assert_eq!(first.id(), Uuid::from_u128(7));
        assert_eq!(second.id(), Uuid::from_u128(8));
    }
}
