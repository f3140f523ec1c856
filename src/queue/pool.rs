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

//! Per-actor queue namespaces and the connection protocol that wires
//! actors together.
//!
//! Every actor owns one [`QueuePool`]: four independent name-to-queue maps
//! (`inbound`, `outbound`, `error`, `log`). Wiring one actor's outbound
//! (or error/log) slot to a peer's inbound slot is done by [`connect`],
//! which supports many-producers-to-one-consumer fan-in but rejects
//! one-producer-to-many-consumers: broadcasting is the job of the send
//! surface's copy-on-fanout, not of the wiring primitive, because a single
//! event object cannot be owned by two independent consumers.

use dashmap::DashMap;
use tracing::{instrument, trace};

use crate::message::WiringError;
use crate::queue::FlowQueue;

/// The four queue namespaces of a [`QueuePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Queues this actor consumes from.
    Inbound,
    /// Data-plane queues this actor produces to.
    Outbound,
    /// Poison-routing destinations.
    Error,
    /// Log-plane destinations.
    Log,
}

impl Namespace {
    /// The namespace's name as used in wiring errors and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Error => "error",
            Self::Log => "log",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An actor's four named-queue namespaces.
///
/// Names are unique per namespace. The same [`FlowQueue`] may appear in
/// one actor's outbound slot and a peer's inbound slot: that shared object
/// is the connection, and its lifetime is the longer of the two actors'.
#[derive(Debug)]
pub struct QueuePool {
    /// Default capacity applied to queues created by this pool.
    capacity: usize,
    inbound: DashMap<String, FlowQueue>,
    outbound: DashMap<String, FlowQueue>,
    error: DashMap<String, FlowQueue>,
    log: DashMap<String, FlowQueue>,
}

impl QueuePool {
    /// Creates an empty pool whose fresh queues get `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inbound: DashMap::new(),
            outbound: DashMap::new(),
            error: DashMap::new(),
            log: DashMap::new(),
        }
    }

    /// The default capacity for queues this pool creates.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn map(&self, namespace: Namespace) -> &DashMap<String, FlowQueue> {
        match namespace {
            Namespace::Inbound => &self.inbound,
            Namespace::Outbound => &self.outbound,
            Namespace::Error => &self.error,
            Namespace::Log => &self.log,
        }
    }

    /// Looks up a queue by namespace and name.
    #[must_use]
    pub fn get(&self, namespace: Namespace, name: &str) -> Option<FlowQueue> {
        self.map(namespace).get(name).map(|entry| entry.clone())
    }

    /// Stores (or re-points) a queue under a namespace and name.
    pub fn insert(&self, namespace: Namespace, name: impl Into<String>, queue: FlowQueue) {
        self.map(namespace).insert(name.into(), queue);
    }

    /// Snapshot of `(name, queue)` pairs in a namespace.
    #[must_use]
    pub fn entries(&self, namespace: Namespace) -> Vec<(String, FlowQueue)> {
        self.map(namespace)
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Snapshot of the queues in a namespace.
    #[must_use]
    pub fn queues(&self, namespace: Namespace) -> Vec<FlowQueue> {
        self.map(namespace)
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Whether a namespace has no wired queues.
    #[must_use]
    pub fn is_namespace_empty(&self, namespace: Namespace) -> bool {
        self.map(namespace).is_empty()
    }
}

/// Wires `source`'s slot in `namespace` to `destination`'s inbound slot.
///
/// First-time wiring resolves by what already exists:
/// - neither side: a fresh queue (at the source pool's capacity) is stored
///   on both sides — a true fan-in point;
/// - only the destination: its queue is aliased into the source slot, the
///   many-producers-to-one-consumer merge, and no new consumer is needed;
/// - only the source: a queue is created for the destination, currently
///   queued events are transferred into it in FIFO order, and the source
///   slot is re-pointed;
/// - both, with different queues: source contents are transferred into the
///   destination queue and the source slot aliased to it.
///
/// With `check_existing` (the default elsewhere in the crate), any
/// pre-existing entry on either side is a configuration error instead.
///
/// # Errors
///
/// [`WiringError::AlreadyConnected`] when `check_existing` is set and
/// either slot is already wired.
#[instrument(skip(source, destination), fields(namespace = %namespace))]
pub fn connect(
    source: &QueuePool,
    namespace: Namespace,
    source_name: &str,
    destination: &QueuePool,
    destination_name: &str,
    check_existing: bool,
) -> Result<(), WiringError> {
    let existing_source = source.get(namespace, source_name);
    let existing_destination = destination.get(Namespace::Inbound, destination_name);

    if check_existing && (existing_source.is_some() || existing_destination.is_some()) {
        return Err(WiringError::AlreadyConnected {
            namespace: namespace.as_str(),
            source: source_name.to_string(),
            destination: destination_name.to_string(),
        });
    }

    match (existing_source, existing_destination) {
        (None, None) => {
            let queue = FlowQueue::new(destination_name, source.capacity());
            trace!(queue = destination_name, "created fresh connection queue");
            source.insert(namespace, source_name, queue.clone());
            destination.insert(Namespace::Inbound, destination_name, queue);
        }
        (None, Some(queue)) => {
            // Fan-in: join the destination's existing queue as another producer.
            trace!(queue = destination_name, "joining existing fan-in queue");
            source.insert(namespace, source_name, queue);
        }
        (Some(source_queue), None) => {
            let queue = FlowQueue::new(destination_name, source.capacity());
            source_queue.drain_into(&queue);
            source.insert(namespace, source_name, queue.clone());
            destination.insert(Namespace::Inbound, destination_name, queue);
        }
        (Some(source_queue), Some(destination_queue)) => {
            if source_queue != destination_queue {
                source_queue.drain_into(&destination_queue);
                source.insert(namespace, source_name, destination_queue);
            }
            // Same queue on both sides: this connection already exists.
        }
    }
    Ok(())
}
