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

use crate::message::Message;

/// A captured runtime failure, carried as the payload of a message routed to
/// the bus's error channel.
///
/// Dispatch failures, adapter poll failures, and unroutable replies all
/// surface as `ErrorMessage` payloads; they are routed like any other
/// message, so an external observer can simply `receive` from the error
/// channel to monitor them.
#[derive(Debug)]
pub struct ErrorMessage {
    cause: anyhow::Error,
    failed_message: Option<Message>,
}

impl ErrorMessage {
    /// Captures `cause`, optionally recording the message whose handling
    /// failed.
    pub fn new(cause: anyhow::Error, failed_message: Option<Message>) -> Self {
        ErrorMessage {
            cause,
            failed_message,
        }
    }

    /// Returns the failure description, i.e. the display form of the cause.
    pub fn description(&self) -> String {
        self.cause.to_string()
    }

    /// Returns the captured cause.
    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }

    /// Returns the message whose handling failed, when one was in flight.
    pub fn failed_message(&self) -> Option<&Message> {
        self.failed_message.as_ref()
    }

    /// Wraps this failure in a routable [`Message`].
    pub fn into_message(self) -> Message {
        Message::new(self)
    }
}
