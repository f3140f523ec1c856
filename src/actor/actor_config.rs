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
use serde::{Deserialize, Serialize};

use crate::common::CONFIG;
use crate::message::EventKind;

/// Construction configuration for an actor.
///
/// Built with [`ActorConfig::new`] plus the `with_*` builder methods, or
/// deserialized from a config file (every field has a default).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Process-unique name; identifies the actor in logs and keys its
    /// rescue counters on events.
    pub name: String,
    /// Default capacity for queues this actor creates; 0 means unbounded.
    pub size: usize,
    /// Process events from one queue strictly in FIFO order, one at a
    /// time, instead of dispatching them concurrently.
    pub blocking_consume: bool,
    /// Retry failing events before routing them to the error plane.
    pub rescue: bool,
    /// Retry ceiling: an event is delivered at most `1 + max_rescue`
    /// times before it is poison-routed.
    pub max_rescue: u32,
    /// Verify outgoing event kinds against `output_kinds` on every send.
    pub check_output: bool,
    /// Kinds this actor accepts; empty means any. An arriving event of an
    /// undeclared kind is converted to the first entry or dropped.
    pub input_kinds: Vec<EventKind>,
    /// Kinds this actor emits; empty means any.
    pub output_kinds: Vec<EventKind>,
    /// Attributes that must be present and truthy on every arriving
    /// event; violations are logged and dropped.
    pub required_attributes: Vec<String>,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            name: "actor".to_string(),
            size: CONFIG.limits.default_queue_capacity,
            blocking_consume: false,
            rescue: false,
            max_rescue: 5,
            check_output: false,
            input_kinds: Vec::new(),
            output_kinds: Vec::new(),
            required_attributes: Vec::new(),
        }
    }
}

impl ActorConfig {
    /// Creates a configuration with the given name and all other fields
    /// at their defaults.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the default queue capacity (0 = unbounded).
    #[must_use]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Enables strictly ordered, one-at-a-time dispatch per queue.
    #[must_use]
    pub fn with_blocking_consume(mut self) -> Self {
        self.blocking_consume = true;
        self
    }

    /// Enables bounded retry before poison routing.
    #[must_use]
    pub fn with_rescue(mut self, max_rescue: u32) -> Self {
        self.rescue = true;
        self.max_rescue = max_rescue;
        self
    }

    /// Enables output-kind verification on every send.
    #[must_use]
    pub fn with_check_output(mut self) -> Self {
        self.check_output = true;
        self
    }

    /// Declares the kinds this actor accepts.
    #[must_use]
    pub fn with_input_kinds(mut self, kinds: impl Into<Vec<EventKind>>) -> Self {
        self.input_kinds = kinds.into();
        self
    }

    /// Declares the kinds this actor emits.
    #[must_use]
    pub fn with_output_kinds(mut self, kinds: impl Into<Vec<EventKind>>) -> Self {
        self.output_kinds = kinds.into();
        self
    }

    /// Declares attributes every arriving event must carry.
    #[must_use]
    pub fn with_required_attributes(mut self, attributes: impl Into<Vec<String>>) -> Self {
        self.required_attributes = attributes.into();
        self
    }
}
