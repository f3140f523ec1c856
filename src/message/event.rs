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

//! The [`Event`] type: the unit of data that flows between actors.
//!
//! An event carries a declared [`EventKind`] (used for input/output kind
//! checks), an [`EventPayload`], a free-form attribute map for user data,
//! and a reserved bookkeeping section the framework uses for rescue
//! counters and the poison-routing error slot. The bookkeeping section is
//! deliberately separate from the attribute map so user keys can never
//! collide with framework keys.
//!
//! `Event` owns all of its data, so [`Clone`] produces a fully independent
//! deep copy. Fan-out relies on this: every queue targeted by a broadcast
//! receives its own copy, and mutating one branch's event is never
//! observable from a sibling branch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::message::{InvalidEventConversion, LogRecord};

/// The declared kind of an event, used for input/output kind checks.
///
/// An actor may declare the kinds it accepts and the kinds it emits. When
/// an event of an undeclared kind arrives, the framework attempts a
/// conversion to the first accepted kind via [`Event::convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Plain text payloads.
    Text,
    /// Structured JSON payloads.
    Json,
    /// Log-plane records produced by [`send_log`](crate::common::ActorHandle::send_log).
    Log,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Log => write!(f, "log"),
        }
    }
}

/// The data carried by an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    /// No payload yet; legal under any kind.
    Empty,
    /// A text payload.
    Text(String),
    /// A JSON payload.
    Json(Value),
    /// A log record.
    Log(LogRecord),
}

/// Diagnostic attached to an event when it is routed to the error plane.
///
/// Retains the original payload's context: which actor gave up on the
/// event, the formatted failure, and how many delivery attempts were made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventError {
    /// Name of the actor that poison-routed the event.
    pub actor: String,
    /// Formatted error chain from the failing `consume` call.
    pub message: String,
    /// Total delivery attempts made before giving up.
    pub attempts: u32,
}

impl EventError {
    /// Captures a failure raised by `actor` after `attempts` deliveries.
    pub fn new(actor: impl Into<String>, error: &anyhow::Error, attempts: u32) -> Self {
        Self {
            actor: actor.into(),
            message: format!("{error:#}"),
            attempts,
        }
    }
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "actor '{}' failed after {} attempt(s): {}",
            self.actor, self.attempts, self.message
        )
    }
}

/// Framework bookkeeping kept apart from user attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EventMeta {
    /// Per-actor rescue counters, keyed by actor name.
    rescues: HashMap<String, u32>,
    /// Set when the event is poison-routed to the error plane.
    error: Option<EventError>,
}

/// A unit of data flowing through the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    id: Uuid,
    kind: EventKind,
    payload: EventPayload,
    attributes: HashMap<String, Value>,
    meta: EventMeta,
}

impl Event {
    /// Creates an event of the given kind with an empty payload.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            payload: EventPayload::Empty,
            attributes: HashMap::new(),
            meta: EventMeta::default(),
        }
    }

    /// Creates a text event.
    #[must_use]
    pub fn text(data: impl Into<String>) -> Self {
        let mut event = Self::new(EventKind::Text);
        event.payload = EventPayload::Text(data.into());
        event
    }

    /// Creates a JSON event.
    #[must_use]
    pub fn json(data: Value) -> Self {
        let mut event = Self::new(EventKind::Json);
        event.payload = EventPayload::Json(data);
        event
    }

    /// Creates a log-plane event.
    #[must_use]
    pub fn log(record: LogRecord) -> Self {
        let mut event = Self::new(EventKind::Log);
        event.payload = EventPayload::Log(record);
        event
    }

    /// The event's unique id, assigned at creation and stable across
    /// conversions and rescue re-deliveries. Copies made for fan-out keep
    /// the id of the original.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The event's declared kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The event's payload.
    #[must_use]
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Replaces the payload, keeping attributes and bookkeeping.
    pub fn set_payload(&mut self, payload: EventPayload) {
        self.payload = payload;
    }

    /// Sets a user attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Looks up a user attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Looks up a user attribute as a string slice.
    #[must_use]
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    /// Looks up a user attribute as an unsigned integer.
    #[must_use]
    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attr(key).and_then(Value::as_u64)
    }

    /// Whether an attribute is present and truthy.
    ///
    /// Missing keys, `null`, `false`, and the empty string all count as
    /// falsy; everything else is truthy. Required-attribute checks use
    /// this predicate.
    #[must_use]
    pub fn attr_truthy(&self, key: &str) -> bool {
        match self.attr(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// How many times the named actor has rescued this event.
    #[must_use]
    pub fn rescue_attempts(&self, actor: &str) -> u32 {
        self.meta.rescues.get(actor).copied().unwrap_or(0)
    }

    /// Increments the named actor's rescue counter, returning the new count.
    pub fn record_rescue(&mut self, actor: &str) -> u32 {
        let count = self.meta.rescues.entry(actor.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// The poison-routing diagnostic, if this event has been error-routed.
    #[must_use]
    pub fn error(&self) -> Option<&EventError> {
        self.meta.error.as_ref()
    }

    /// Attaches a poison-routing diagnostic.
    pub fn set_error(&mut self, error: EventError) {
        self.meta.error = Some(error);
    }

    /// Converts this event to another kind, keeping id, attributes, and
    /// bookkeeping.
    ///
    /// Supported conversions:
    /// - any kind to itself (no-op),
    /// - `Text` to `Json` by parsing the payload,
    /// - `Json` to `Text` by serializing the payload,
    /// - `Log` to `Text` or `Json` by formatting/serializing the record,
    /// - `Empty` payloads convert to the target kind's empty value.
    ///
    /// Converting a non-log event to `Log` is a narrowing conversion and
    /// always fails.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidEventConversion`] when the payload cannot be
    /// represented in the target kind (e.g. unparseable text to JSON).
    pub fn convert(mut self, to: EventKind) -> Result<Self, InvalidEventConversion> {
        if self.kind == to {
            return Ok(self);
        }
        let converted = match (&self.payload, to) {
            (EventPayload::Empty, EventKind::Text) => EventPayload::Text(String::new()),
            (EventPayload::Empty, EventKind::Json) => EventPayload::Json(Value::Null),
            (EventPayload::Text(s), EventKind::Json) => match serde_json::from_str(s) {
                Ok(value) => EventPayload::Json(value),
                Err(err) => {
                    return Err(InvalidEventConversion::new(
                        self.kind,
                        to,
                        format!("payload is not valid JSON: {err}"),
                    ))
                }
            },
            (EventPayload::Json(value), EventKind::Text) => {
                EventPayload::Text(value.to_string())
            }
            (EventPayload::Log(record), EventKind::Text) => {
                EventPayload::Text(record.to_string())
            }
            (EventPayload::Log(record), EventKind::Json) => match serde_json::to_value(record) {
                Ok(value) => EventPayload::Json(value),
                Err(err) => {
                    return Err(InvalidEventConversion::new(
                        self.kind,
                        to,
                        err.to_string(),
                    ))
                }
            },
            (_, EventKind::Log) => {
                return Err(InvalidEventConversion::new(
                    self.kind,
                    to,
                    "narrowing conversion to a log event is not allowed",
                ))
            }
            // Same-kind pairs are handled by the early return above; the
            // remaining arms are Text->Text style impossibilities.
            (EventPayload::Text(_), EventKind::Text)
            | (EventPayload::Json(_), EventKind::Json) => self.payload.clone(),
        };
        self.payload = converted;
        self.kind = to;
        Ok(self)
    }
}
