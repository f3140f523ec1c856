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
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, instrument, trace, warn};

use crate::actor::{ActorConfig, Supervisor};
use crate::common::{ConsumerRef, HaltFlag};
use crate::message::{Event, LogLevel, LogRecord, SendError};
use crate::queue::{FlowQueue, Namespace, QueuePool};

/// A clonable handle for interacting with a running actor.
///
/// `ActorHandle` is both the external control surface (stop, block) and
/// the context handed to [`Consume::consume`](crate::traits::Consume::consume)
/// for side effects: broadcasting to the outbound set, poison-routing to
/// the error set, emitting to the log plane. Handles can be cloned freely;
/// all clones refer to the same actor.
#[derive(Clone)]
pub struct ActorHandle {
    pub(crate) name: String,
    pub(crate) config: Arc<ActorConfig>,
    pub(crate) pool: Arc<QueuePool>,
    pub(crate) handler: ConsumerRef,
    /// True from `start()` until shutdown completes.
    pub(crate) running: HaltFlag,
    /// Cleared by `stop()`; loops drain and exit once it is false.
    pub(crate) looping: HaltFlag,
    pub(crate) cancel: CancellationToken,
    pub(crate) supervisor: Supervisor,
}

impl std::fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorHandle")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}

impl ActorHandle {
    /// The actor's process-unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The actor's construction configuration.
    #[must_use]
    pub fn config(&self) -> &ActorConfig {
        &self.config
    }

    /// The actor's queue pool.
    #[must_use]
    pub fn pool(&self) -> &QueuePool {
        &self.pool
    }

    /// Whether the actor has started and not yet finished shutting down.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether the actor is still accepting fresh work (false once a stop
    /// has been requested and the drain phase has begun).
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        self.looping.load(Ordering::SeqCst)
    }

    /// Broadcasts an event to every connected outbound queue.
    ///
    /// Every target receives an independent deep copy, so one downstream
    /// branch can never observe a sibling branch's mutations.
    ///
    /// # Errors
    ///
    /// [`SendError::InvalidActorOutput`] if output checking is enabled and
    /// the event's kind is not declared — raised before any queue is
    /// touched. [`SendError::Full`] if a target queue is at capacity; the
    /// dispatch path turns this into upstream backpressure.
    pub fn send_event(&self, event: Event) -> Result<(), SendError> {
        let targets = self.pool.queues(Namespace::Outbound);
        self.send_event_to(event, &targets)
    }

    /// Broadcasts an event to an explicit set of queues.
    ///
    /// Same copy and kind-check semantics as [`send_event`](Self::send_event).
    ///
    /// # Errors
    ///
    /// See [`send_event`](Self::send_event).
    pub fn send_event_to(&self, event: Event, queues: &[FlowQueue]) -> Result<(), SendError> {
        if self.config.check_output
            && !self.config.output_kinds.is_empty()
            && !self.config.output_kinds.contains(&event.kind())
        {
            return Err(SendError::InvalidActorOutput {
                actor: self.name.clone(),
                kind: event.kind(),
                accepted: self.config.output_kinds.clone(),
            });
        }
        for queue in queues {
            queue.try_put(event.clone())?;
        }
        trace!(actor = %self.name, targets = queues.len(), "event fanned out");
        Ok(())
    }

    /// Routes an event to every connected error queue.
    ///
    /// No output-kind check: error events may carry arbitrary diagnostic
    /// payloads. Waits for capacity rather than dropping; a poison event
    /// with no error route at all is logged and discarded.
    pub async fn send_error(&self, event: Event) {
        let targets = self.pool.queues(Namespace::Error);
        if targets.is_empty() {
            error!(
                actor = %self.name,
                event = %event.id(),
                "no error queue wired; dropping poison event"
            );
            return;
        }
        for queue in &targets {
            queue.put(event.clone()).await;
        }
    }

    /// Emits a record to every connected log queue.
    ///
    /// A no-op when no log queue is wired. The log plane sheds under
    /// pressure: a full log queue drops the record rather than stalling
    /// the data plane.
    pub fn send_log(&self, level: LogLevel, message: impl Into<String>) {
        let targets = self.pool.queues(Namespace::Log);
        if targets.is_empty() {
            return;
        }
        let event = Event::log(LogRecord::new(level, self.name.clone(), message));
        for queue in &targets {
            if let Err(full) = queue.try_put(event.clone()) {
                warn!(
                    actor = %self.name,
                    queue = %full.queue.name(),
                    "log queue full; dropping log record"
                );
            }
        }
    }

    /// Requests a graceful shutdown and waits for it to complete.
    ///
    /// Stops accepting fresh work, lets every consumption loop drain its
    /// queue (no event present at the moment of the call is lost), waits
    /// for all in-flight dispatch tasks, sweeps the inbound queues for
    /// anything a racing redelivery put back, then runs `post_hook`.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` reserves room for shutdown
    /// deadline handling.
    #[instrument(skip(self), fields(actor = %self.name))]
    pub async fn stop(&self) -> anyhow::Result<()> {
        trace!("stop requested, draining");
        self.looping.store(false, Ordering::SeqCst);
        self.cancel.cancel();
        self.supervisor.wait().await;
        crate::actor::sweep_inbound(self).await;
        if self.running.swap(false, Ordering::SeqCst) {
            self.handler.post_hook(self).await;
        }
        trace!("actor stopped");
        Ok(())
    }

    /// Parks until a `stop()` issued elsewhere has run its course.
    ///
    /// Useful to keep a top-level task alive while the actor runs on
    /// worker tasks.
    pub async fn block(&self) {
        self.cancel.cancelled().await;
        self.supervisor.wait().await;
    }
}
