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
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Severity of a log-plane record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    /// An unrecoverable failure worth operator attention.
    Error,
    /// A recoverable anomaly.
    Warn,
    /// Routine operational information.
    Info,
    /// Verbose diagnostics.
    Debug,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warn => write!(f, "WARN"),
            Self::Info => write!(f, "INFO"),
            Self::Debug => write!(f, "DEBUG"),
        }
    }
}

/// The record carried by a log-plane event.
///
/// Actors emit these through [`send_log`](crate::common::ActorHandle::send_log);
/// any actor wired to a log queue receives them as ordinary events of kind
/// [`EventKind::Log`](crate::message::EventKind::Log), so the log plane can
/// be routed, filtered, and sunk with the same machinery as the data plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Record severity.
    pub level: LogLevel,
    /// Name of the actor that produced the record.
    pub origin: String,
    /// Milliseconds since the Unix epoch at record creation.
    pub time_ms: u64,
    /// The log message.
    pub message: String,
}

impl LogRecord {
    /// Creates a record timestamped now.
    #[must_use]
    pub fn new(level: LogLevel, origin: impl Into<String>, message: impl Into<String>) -> Self {
        let time_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);
        Self {
            level,
            origin: origin.into(),
            time_ms,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.time_ms, self.level, self.origin, self.message
        )
    }
}
