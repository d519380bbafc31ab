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

/// Represents errors that can occur while configuring or running the bus.
#[derive(Debug)]
pub enum MessagingError {
    /// A programmer error caught at registration or lifecycle time, such as a
    /// duplicate name or starting an already-started bus. Reported
    /// synchronously, never silently ignored.
    Configuration(String),
    /// A send into a channel could not be completed.
    SendFailed(String),
    /// A reply carried no resolvable return address.
    Unroutable(String),
    /// A dispatch exhausted every candidate handler.
    Dispatch(String),
}

impl std::fmt::Display for MessagingError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MessagingError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            MessagingError::SendFailed(msg) => write!(f, "failed to send message: {}", msg),
            MessagingError::Unroutable(msg) => write!(f, "unroutable reply: {}", msg),
            MessagingError::Dispatch(msg) => write!(f, "dispatch failed: {}", msg),
        }
    }
}

impl std::error::Error for MessagingError {}
