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

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configurable defaults for a [`MessageBus`](crate::bus::MessageBus).
///
/// All fields have sensible defaults; a TOML file may override any subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Default timeout in milliseconds for internal sends: reply routing and
    /// error-channel delivery.
    pub default_send_timeout_ms: u64,
    /// How long `stop()` waits for dispatch and polling loops to finish their
    /// in-flight work before giving up on them.
    pub shutdown_grace_ms: u64,
    /// Default per-poll item limit for polling source adapters.
    pub default_poll_limit: usize,
    /// Default interval in milliseconds between source adapter polls.
    pub default_poll_interval_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            default_send_timeout_ms: 1_000,
            shutdown_grace_ms: 10_000,
            default_poll_limit: 10,
            default_poll_interval_ms: 1_000,
        }
    }
}

impl BusConfig {
    /// Parses a configuration from TOML text. Missing fields fall back to
    /// their defaults.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a configuration from `path`, falling back to the defaults if the
    /// file is missing or unparseable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => match Self::from_toml_str(&text) {
                Ok(config) => config,
                Err(error) => {
                    warn!(path = %path.display(), %error, "invalid bus config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// The default timeout applied to internal sends.
    pub fn send_timeout(&self) -> Option<Duration> {
        Some(Duration::from_millis(self.default_send_timeout_ms))
    }

    /// The grace period `stop()` grants in-flight loops.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// The default interval between adapter polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.default_poll_interval_ms)
    }
}
