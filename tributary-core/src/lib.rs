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

#![forbid(unsafe_code)]
//! Tributary Core Library
//!
//! This library provides the core functionality for the Tributary messaging
//! runtime: immutable message envelopes, named hand-off channels with an
//! interceptor chain, point-to-point and publish-subscribe dispatch, polling
//! source adapters, and the message bus that owns the delivery loops.

pub(crate) mod bus;
pub(crate) mod channel;
/// Common utilities and structures used throughout the Tributary runtime.
pub(crate) mod common;
pub(crate) mod message;
/// Trait definitions used in the Tributary runtime.
pub(crate) mod traits;

/// Prelude module for convenient imports.
///
/// This module re-exports commonly used items from the `bus`, `channel`,
/// `common`, `message`, and `traits` modules, as well as the `async_trait`
/// attribute macro.
pub mod prelude {
    pub use async_trait::async_trait;

    pub use crate::bus::{MessageBus, PollingSourceAdapter, Subscription, ERROR_CHANNEL_NAME};
    pub use crate::channel::{ChannelInterceptor, DispatcherPolicy, InterceptorList, SimpleChannel};
    pub use crate::common::{BusConfig, MessagingError};
    pub use crate::message::{ErrorMessage, IdGenerator, Message, MessageHeaders, UuidGenerator};
    pub use crate::traits::{
        handler_fn, Disposition, FnHandler, MessageChannel, MessageHandler, Payload,
        PollableSource, SourceAdapter,
    };
}
