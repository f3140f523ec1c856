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
use async_trait::async_trait;

use crate::common::ActorHandle;
use crate::message::Event;
use crate::queue::FlowQueue;

/// Where an event was taken from, handed to [`Consume::consume`] alongside
/// the event itself.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Name of the inbound queue the event arrived on.
    pub origin: String,
    /// Handle to that queue; the retry policy re-enqueues here.
    pub origin_queue: FlowQueue,
}

/// The contract every concrete actor implements.
///
/// `consume` is called once per delivered event and side-effects through
/// the handle's send surface ([`send_event`](ActorHandle::send_event),
/// [`send_error`](ActorHandle::send_error),
/// [`send_log`](ActorHandle::send_log)). Returning an error triggers the
/// rescue/poison policy; a [`SendError::Full`](crate::message::SendError)
/// bubbled up with `?` triggers the backpressure retry instead.
///
/// Receivers are `&self`: in the default non-blocking mode, dispatch tasks
/// for successive events from one queue run concurrently, so stateful
/// implementations use interior mutability (atomics, mutexed fields).
///
/// `pre_hook`/`post_hook` run once around the actor's lifetime and default
/// to no-ops.
#[async_trait]
pub trait Consume: Send + Sync + 'static {
    /// Processes one event.
    ///
    /// # Errors
    ///
    /// Any error is recovered by the framework: retried while the rescue
    /// budget lasts, then poison-routed to the error plane. Errors never
    /// halt the actor.
    async fn consume(
        &self,
        event: Event,
        ctx: &ActorHandle,
        delivery: &Delivery,
    ) -> anyhow::Result<()>;

    /// Runs once during `start()`, before any event is delivered.
    async fn pre_hook(&self, _ctx: &ActorHandle) {}

    /// Runs once after the last consumption loop has drained and stopped.
    async fn post_hook(&self, _ctx: &ActorHandle) {}
}
