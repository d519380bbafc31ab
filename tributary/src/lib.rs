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

//! # Tributary
//!
//! Tributary is an in-process messaging runtime built on top of Tokio.
//! Producers place messages onto named channels, a dispatch engine routes
//! each message to one or more registered handlers, and handlers may emit
//! reply messages that are routed onward by return address.
//!
//! ## Key Concepts
//!
//! - **Messages (`Message`)**: Immutable envelopes pairing a type-erased
//!   payload with a header mapping (id, return address, correlation id,
//!   arbitrary metadata). Header extension is copy-on-write.
//! - **Channels (`SimpleChannel`)**: Named, thread-safe FIFO hand-off points
//!   with configurable capacity, a dispatch policy, and an interceptor chain
//!   invoked around every send and receive.
//! - **Dispatch policy (`DispatcherPolicy`)**: Point-to-point (exactly one
//!   subscriber claims each message, with failover across candidates) or
//!   publish-subscribe (every subscriber receives every message).
//! - **Handlers (`MessageHandler`)**: User-supplied processing units that
//!   consume a message and report an explicit `Disposition`.
//! - **Source adapters (`PollingSourceAdapter`)**: Bridges that poll an
//!   external pull-based source on a schedule and inject the results as
//!   messages.
//! - **The bus (`MessageBus`)**: Registry of channels, handlers,
//!   subscriptions, and adapters; owner of the dispatch and polling loops and
//!   of the well-known error channel that receives wrapped failures.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tributary::prelude::*;
//!
//! let bus = MessageBus::new();
//! bus.register_channel("input", Arc::new(SimpleChannel::new()))?;
//! bus.register_channel("output", Arc::new(SimpleChannel::new()))?;
//! bus.register_handler(
//!     "echo",
//!     Arc::new(handler_fn(|message: Message| async move {
//!         Ok(Disposition::Reply(message.with_return_address("output")))
//!     })),
//!     Subscription::new("input"),
//! )?;
//! bus.start()?;
//! ```

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tributary_core::prelude::*;
}
