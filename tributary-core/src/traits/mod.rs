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

//! Defines the core traits that establish the fundamental contracts of the Tributary runtime.
//!
//! # Key Traits
//!
//! *   [`Payload`]: A marker trait required for all types carried as message payloads.
//!     Ensures payloads are `Send`, `Sync`, `Debug`, and support downcasting via `Any`.
//! *   [`MessageChannel`]: The named, thread-safe hand-off contract between producers
//!     and the dispatch engine, implemented by
//!     [`SimpleChannel`](crate::channel::SimpleChannel).
//! *   [`MessageHandler`]: The user-supplied processing unit consumed by the bus.
//!     Handlers report an explicit [`Disposition`] so point-to-point failover is a
//!     branch, not exception unwinding.
//! *   [`PollableSource`] / [`SourceAdapter`]: The bridge contracts for injecting
//!     items from an external pull-based source into the channel world.

mod channel;
mod handler;
mod payload;
mod source;

pub use channel::MessageChannel;
pub use handler::{handler_fn, Disposition, FnHandler, MessageHandler};
pub use payload::Payload;
pub use source::{PollableSource, SourceAdapter};
