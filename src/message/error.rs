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

//! Error taxonomy for wiring, sending, and per-event dispatch.
//!
//! Only configuration-time errors ([`WiringError`], an output-kind mismatch
//! in [`SendError`]) are raised to callers. Per-event failures are handled
//! inside the dispatch path: transient [`QueueFull`] becomes backpressure,
//! terminal conversion/input failures are logged and dropped, and anything
//! else goes through the rescue/poison policy.

use crate::message::{Event, EventKind};
use crate::queue::FlowQueue;

/// A bounded queue refused an event because it is at capacity.
///
/// Transient by design: the rejected event is handed back to the caller,
/// and the queue handle lets the caller wait until a slot frees up. No
/// event is ever dropped because of capacity alone.
#[derive(Debug)]
pub struct QueueFull {
    /// The queue that refused the event.
    pub queue: FlowQueue,
    /// The rejected event, returned to the caller unchanged.
    pub event: Box<Event>,
}

impl std::fmt::Display for QueueFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "queue '{}' is full", self.queue.name())
    }
}

impl std::error::Error for QueueFull {}

/// A `get` timed out on an empty queue.
///
/// Benign: the consumption loop treats it as a poll tick, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEmpty;

impl std::fmt::Display for QueueEmpty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "queue is empty")
    }
}

impl std::error::Error for QueueEmpty {}

/// Errors raised by the broadcast send surface.
#[derive(Debug)]
pub enum SendError {
    /// A target queue is at capacity; carries the rejected copy and the
    /// queue to wait on.
    Full(QueueFull),
    /// The event's kind is not in the actor's declared output set.
    ///
    /// Raised before any queue is touched, so a failed broadcast never
    /// results in a partial fan-out.
    InvalidActorOutput {
        /// The sending actor.
        actor: String,
        /// The undeclared kind.
        kind: EventKind,
        /// The kinds the actor declared it emits.
        accepted: Vec<EventKind>,
    },
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(full) => full.fmt(f),
            Self::InvalidActorOutput {
                actor,
                kind,
                accepted,
            } => write!(
                f,
                "actor '{actor}' does not emit '{kind}' events (declared: {accepted:?})"
            ),
        }
    }
}

impl std::error::Error for SendError {}

impl From<QueueFull> for SendError {
    fn from(full: QueueFull) -> Self {
        Self::Full(full)
    }
}

/// Configuration-time wiring failures. Always raised, never ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiringError {
    /// One side of the requested connection is already wired.
    ///
    /// An outbound slot feeds exactly one logical downstream wiring;
    /// silently overwriting an existing connection would orphan queued
    /// events, so re-wiring is a hard error unless explicitly requested.
    AlreadyConnected {
        /// Namespace the connection was attempted in.
        namespace: &'static str,
        /// Source-side queue name.
        source: String,
        /// Destination-side queue name.
        destination: String,
    },
    /// A wiring call referenced an actor name the graph does not know.
    UnknownActor(String),
    /// An actor was registered under a name the graph already holds.
    DuplicateActor(String),
    /// Rescue is enabled but no error queue is wired, so an event that
    /// exhausts its rescue budget would have nowhere to go.
    NoErrorRoute(String),
}

impl std::fmt::Display for WiringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyConnected {
                namespace,
                source,
                destination,
            } => write!(
                f,
                "'{source}' -> '{destination}' in the {namespace} namespace is already connected"
            ),
            Self::UnknownActor(name) => write!(f, "no actor named '{name}' in the graph"),
            Self::DuplicateActor(name) => {
                write!(f, "an actor named '{name}' is already in the graph")
            }
            Self::NoErrorRoute(actor) => write!(
                f,
                "actor '{actor}' has rescue enabled but no connected error queue"
            ),
        }
    }
}

impl std::error::Error for WiringError {}

/// An event's payload could not be converted to an accepted kind.
///
/// Terminal for that event: structurally wrong input is logged and
/// dropped, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEventConversion {
    /// The event's declared kind.
    pub from: EventKind,
    /// The kind conversion was attempted to.
    pub to: EventKind,
    /// Why the conversion failed.
    pub reason: String,
}

impl InvalidEventConversion {
    pub(crate) fn new(from: EventKind, to: EventKind, reason: impl Into<String>) -> Self {
        Self {
            from,
            to,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for InvalidEventConversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cannot convert '{}' event to '{}': {}",
            self.from, self.to, self.reason
        )
    }
}

impl std::error::Error for InvalidEventConversion {}

/// An event is missing a required attribute. Terminal, like a failed
/// conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidActorInput {
    /// The actor whose requirement was not met.
    pub actor: String,
    /// The missing or falsy attribute.
    pub attribute: String,
}

impl std::fmt::Display for InvalidActorInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "actor '{}' requires attribute '{}' to be present and truthy",
            self.actor, self.attribute
        )
    }
}

impl std::error::Error for InvalidActorInput {}
