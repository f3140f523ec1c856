/*
 * Copyright (c) 2024. Weir Contributors
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

use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Configuration for the Weir framework.
///
/// All configurable values, loaded from a TOML file in an XDG-compliant
/// location (`$XDG_CONFIG_HOME/weir/config.toml`), falling back to the
/// defaults below when the file is absent or malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeirConfig {
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Limits and capacity configuration.
    pub limits: LimitsConfig,
    /// Behavioral switches.
    pub behavior: BehaviorConfig,
}

/// Timeout-related configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long a consumption loop's `get` waits before re-checking for a
    /// stop request, in milliseconds.
    pub get_poll_ms: u64,
    /// Base delay before a rescued event is re-enqueued, in milliseconds.
    pub rescue_backoff_ms: u64,
    /// Minimum interval between relaunches of a restarting supervised
    /// task, in milliseconds. This is the floor that keeps a crashing
    /// task from hot-looping.
    pub restart_floor_ms: u64,
}

/// Limits and capacity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Queue capacity used when an actor does not specify one; 0 means
    /// unbounded.
    pub default_queue_capacity: usize,
}

/// Behavioral switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Add random jitter to the rescue backoff so colliding retries
    /// spread out.
    pub backoff_jitter: bool,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            get_poll_ms: 500,
            rescue_backoff_ms: 250,
            restart_floor_ms: 1_000,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_queue_capacity: 0,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            backoff_jitter: true,
        }
    }
}

impl WeirConfig {
    /// The consumption loop's `get` poll timeout as a [`Duration`].
    #[must_use]
    pub const fn get_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.get_poll_ms)
    }

    /// The base rescue backoff as a [`Duration`].
    #[must_use]
    pub const fn rescue_backoff(&self) -> Duration {
        Duration::from_millis(self.timeouts.rescue_backoff_ms)
    }

    /// The supervised-task restart floor as a [`Duration`].
    #[must_use]
    pub const fn restart_floor(&self) -> Duration {
        Duration::from_millis(self.timeouts.restart_floor_ms)
    }

    /// Loads configuration from XDG-compliant locations.
    ///
    /// Looks for `weir/config.toml` under the XDG config directories. If
    /// no file is found, returns the defaults; if a file exists but is
    /// malformed, logs an error and returns the defaults rather than
    /// failing startup.
    pub fn load() -> Self {
        use tracing::{error, info};

        let xdg_dirs = match xdg::BaseDirectories::with_prefix("weir") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        let Some(path) = xdg_dirs.find_config_file("config.toml") else {
            info!("No configuration file found, using defaults");
            return Self::default();
        };

        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(&path) {
            Ok(config_str) => match toml::from_str::<Self>(&config_str) {
                Ok(config) => config,
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations.
    pub static ref CONFIG: WeirConfig = WeirConfig::load();
}
