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

//! The bounded FIFO queue primitive every guarantee in the crate rests on.
//!
//! [`FlowQueue`] is a named, capacity-bounded FIFO of [`Event`]s with
//! blocking-producer/blocking-consumer semantics. Producers at capacity
//! wait rather than drop (backpressure); consumers wait for content with a
//! timeout that bounds how quickly a shutdown request is noticed.
//!
//! A raw mpsc channel cannot express the connection protocol's
//! drain-and-transfer and aliasing steps, so the queue is built directly
//! on a mutex-guarded ring plus two [`Notify`] signals (not-empty,
//! not-full). The mutex is never held across an await; all waiting happens
//! on the notify pair, making `put`/`get` safe under any mix of concurrent
//! producers and the per-queue consumption loop.

pub use pool::{connect, Namespace, QueuePool};

mod pool;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::trace;

use crate::message::{Event, QueueEmpty, QueueFull};

struct QueueInner {
    name: String,
    /// Maximum length; 0 means unbounded.
    capacity: usize,
    items: Mutex<VecDeque<Event>>,
    not_empty: Notify,
    not_full: Notify,
}

/// A named, bounded FIFO queue of events.
///
/// Cheap to clone; all clones share the same underlying queue. Equality
/// compares identity of the shared state, not contents, which is what the
/// connection protocol needs to detect an already-shared fan-in queue.
#[derive(Clone)]
pub struct FlowQueue {
    inner: Arc<QueueInner>,
}

impl FlowQueue {
    /// Creates a queue with the given name and capacity (0 = unbounded).
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                name: name.into(),
                capacity,
                items: Mutex::new(VecDeque::new()),
                not_empty: Notify::new(),
                not_full: Notify::new(),
            }),
        }
    }

    /// The queue's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The queue's capacity; 0 means unbounded.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Best-effort current length; concurrent mutation may race it.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.lock().expect("queue lock poisoned").len()
    }

    /// Whether the queue is currently empty (best-effort, like [`len`](Self::len)).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends an event, returning it if the queue is at capacity.
    ///
    /// # Errors
    ///
    /// [`QueueFull`] carries the rejected event back to the caller along
    /// with a handle to wait on.
    pub fn try_put(&self, event: Event) -> Result<(), QueueFull> {
        {
            let mut items = self.inner.items.lock().expect("queue lock poisoned");
            if self.inner.capacity > 0 && items.len() >= self.inner.capacity {
                drop(items);
                return Err(QueueFull {
                    queue: self.clone(),
                    event: Box::new(event),
                });
            }
            items.push_back(event);
        }
        self.inner.not_empty.notify_waiters();
        Ok(())
    }

    /// Appends an event, waiting for a free slot while at capacity.
    ///
    /// This is the backpressure point: a producer feeding a full queue
    /// suspends here until a consumer frees a slot. Events are never
    /// dropped because of capacity.
    pub async fn put(&self, event: Event) {
        let mut pending = event;
        loop {
            // Arm the notification before checking so a concurrent `get`
            // between the failed try and the await cannot be missed.
            let notified = self.inner.not_full.notified();
            match self.try_put(pending) {
                Ok(()) => return,
                Err(full) => {
                    trace!(queue = %self.inner.name, "put waiting for free slot");
                    pending = *full.event;
                    notified.await;
                }
            }
        }
    }

    /// Removes and returns the head event, if any.
    #[must_use]
    pub fn try_get(&self) -> Option<Event> {
        let event = {
            let mut items = self.inner.items.lock().expect("queue lock poisoned");
            items.pop_front()
        };
        if event.is_some() {
            self.inner.not_full.notify_waiters();
        }
        event
    }

    /// Removes and returns the head event, waiting up to `timeout`.
    ///
    /// # Errors
    ///
    /// [`QueueEmpty`] when the timeout elapses with nothing to take; this
    /// is the consumption loop's poll tick, not a failure.
    pub async fn get(&self, timeout: Duration) -> Result<Event, QueueEmpty> {
        tokio::time::timeout(timeout, async {
            loop {
                let notified = self.inner.not_empty.notified();
                if let Some(event) = self.try_get() {
                    return event;
                }
                notified.await;
            }
        })
        .await
        .map_err(|_| QueueEmpty)
    }

    /// Waits until the queue holds at least one event.
    pub async fn wait_until_content(&self) {
        loop {
            let notified = self.inner.not_empty.notified();
            if !self.is_empty() {
                return;
            }
            notified.await;
        }
    }

    /// Waits until the queue has a free slot (immediately, if unbounded).
    pub async fn wait_until_free(&self) {
        loop {
            let notified = self.inner.not_full.notified();
            if self.inner.capacity == 0 || self.len() < self.inner.capacity {
                return;
            }
            notified.await;
        }
    }

    /// Moves every queued event into `target`, preserving FIFO order.
    ///
    /// Used by the connection protocol's transfer step. The transfer
    /// ignores the target's capacity so no event can be stranded;
    /// capacity is enforced again for subsequent `put`s.
    pub fn drain_into(&self, target: &FlowQueue) {
        let moved: VecDeque<Event> = {
            let mut items = self.inner.items.lock().expect("queue lock poisoned");
            std::mem::take(&mut *items)
        };
        if moved.is_empty() {
            return;
        }
        trace!(
            from = %self.inner.name,
            to = %target.inner.name,
            count = moved.len(),
            "transferring queued events"
        );
        {
            let mut items = target.inner.items.lock().expect("queue lock poisoned");
            items.extend(moved);
        }
        self.inner.not_full.notify_waiters();
        target.inner.not_empty.notify_waiters();
    }
}

impl PartialEq for FlowQueue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for FlowQueue {}

impl std::fmt::Debug for FlowQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowQueue")
            .field("name", &self.inner.name)
            .field("capacity", &self.inner.capacity)
            .field("len", &self.len())
            .finish()
    }
}
