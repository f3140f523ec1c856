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

//! The running side of an actor: per-queue consumption loops and the
//! per-event dispatch policy.
//!
//! One [`run_consume_loop`] task exists per inbound queue. It takes events
//! with a timed `get` so it can notice the stop signal between arrivals,
//! and on shutdown drains whatever is still queued before exiting; events
//! already accepted are processed, never abandoned.
//!
//! [`dispatch`] recovers from every handler error. A
//! [`SendError::Full`] bubbled out of the handler means a downstream queue
//! pushed back: the event waits for the slot and re-enters its origin
//! queue untouched, with no rescue counter spent. Any other error is a
//! processing failure: retried with backoff while the rescue budget lasts,
//! then stamped with an [`EventError`] and routed to the error plane.

use tracing::{error, instrument, trace, warn};

use crate::common::{ActorHandle, CONFIG};
use crate::message::{Event, EventError, InvalidActorInput, SendError};
use crate::queue::{FlowQueue, Namespace};
use crate::traits::Delivery;

/// Consumes one inbound queue until the actor stops, then drains it.
pub(crate) async fn run_consume_loop(handle: ActorHandle, queue_name: String, queue: FlowQueue) {
    let delivery = Delivery {
        origin: queue_name,
        origin_queue: queue.clone(),
    };

    while handle.is_accepting() {
        tokio::select! {
            _ = handle.cancel.cancelled() => break,
            taken = queue.get(CONFIG.get_poll_timeout()) => {
                if let Ok(event) = taken {
                    deliver(&handle, &delivery, event).await;
                }
            }
        }
    }

    // Accepted events are processed even when the stop raced their
    // arrival.
    while let Some(event) = queue.try_get() {
        deliver(&handle, &delivery, event).await;
    }
    trace!(actor = %handle.name(), queue = %delivery.origin, "consumption loop drained and exited");
}

/// Hands one event to the dispatch policy, inline or as a worker task.
///
/// Blocking actors dispatch inline, so the loop takes the next event only
/// after this one is fully resolved and per-queue FIFO order is
/// observable end to end. Non-blocking actors dispatch on a supervised
/// worker task, letting deliveries from one queue overlap.
async fn deliver(handle: &ActorHandle, delivery: &Delivery, event: Event) {
    if handle.config().blocking_consume {
        dispatch(handle.clone(), delivery.clone(), event).await;
    } else {
        let label = format!("{}/{}/dispatch", handle.name(), delivery.origin);
        let worker_handle = handle.clone();
        let worker_delivery = delivery.clone();
        handle
            .supervisor
            .spawn(label, dispatch(worker_handle, worker_delivery, event));
    }
}

/// Runs one event through admission, the handler, and error recovery.
#[instrument(skip(handle, delivery, event), fields(actor = %handle.name(), event_id = %event.id()))]
async fn dispatch(handle: ActorHandle, delivery: Delivery, event: Event) {
    let config = handle.config();

    // Admission: align the kind with what the handler declared, or drop.
    let event = if config.input_kinds.is_empty() || config.input_kinds.contains(&event.kind()) {
        event
    } else {
        match event.convert(config.input_kinds[0]) {
            Ok(converted) => converted,
            Err(err) => {
                warn!(actor = %handle.name(), error = %err, "dropping unconvertible event");
                return;
            }
        }
    };

    for attribute in &config.required_attributes {
        if !event.attr_truthy(attribute) {
            let rejection = InvalidActorInput {
                actor: handle.name().to_string(),
                attribute: attribute.clone(),
            };
            warn!(error = %rejection, "dropping event");
            return;
        }
    }

    let mut event = event;
    loop {
        // Retained copy for redelivery; the handler gets its own to mutate.
        let mut retained = event.clone();

        let err = match handle.handler.consume(event, &handle, &delivery).await {
            Ok(()) => return,
            Err(err) => err,
        };
        match err.downcast_ref::<SendError>() {
            Some(SendError::Full(full)) => {
                // Downstream backpressure. Wait for the slot, then
                // redeliver the untouched event. No rescue counter is
                // spent: nothing failed, the event was early.
                trace!(
                    actor = %handle.name(),
                    queue = %full.queue.name(),
                    "downstream full; holding event for redelivery"
                );
                full.queue.wait_until_free().await;
            }
            _ if config.rescue && retained.rescue_attempts(handle.name()) < config.max_rescue => {
                let attempt = retained.record_rescue(handle.name());
                warn!(
                    actor = %handle.name(),
                    attempt,
                    max = config.max_rescue,
                    error = %err,
                    "handler failed; rescuing event"
                );
                tokio::time::sleep(rescue_backoff()).await;
            }
            _ => {
                let attempts = retained.rescue_attempts(handle.name()) + 1;
                error!(
                    actor = %handle.name(),
                    attempts,
                    error = %err,
                    "handler failed; routing event to the error plane"
                );
                retained.set_error(EventError::new(handle.name(), &err, attempts));
                handle.send_error(retained).await;
                return;
            }
        }
        // While the actor accepts work, redelivery goes through the loop
        // so per-queue delivery keeps interleaving with fresh arrivals.
        // Once a stop has begun no loop will take it again, so the event
        // is retried in place until it resolves or exhausts its budget.
        if handle.is_accepting() {
            delivery.origin_queue.put(retained).await;
            return;
        }
        event = retained;
    }
}

/// Sweeps every inbound queue after the supervised tasks have settled.
///
/// A stop can race an in-flight redelivery: a worker that checked
/// [`ActorHandle::is_accepting`] just before the flag flipped may still
/// put its event back on an inbound queue after that queue's consumption
/// loop has drained and exited. Those tasks are all tracked, so once the
/// supervisor settles any such event is visible here and gets dispatched
/// to completion instead of stranded.
pub(crate) async fn sweep_inbound(handle: &ActorHandle) {
    for (queue_name, queue) in handle.pool.entries(Namespace::Inbound) {
        let delivery = Delivery {
            origin: queue_name,
            origin_queue: queue.clone(),
        };
        while let Some(event) = queue.try_get() {
            dispatch(handle.clone(), delivery.clone(), event).await;
        }
    }
}

/// The delay before a rescued event is redelivered.
///
/// Jitter spreads redeliveries of events that failed together, so a
/// struggling downstream is not hit by a synchronized wave of retries.
fn rescue_backoff() -> std::time::Duration {
    let base = CONFIG.rescue_backoff();
    if CONFIG.behavior.backoff_jitter {
        base.mul_f64(1.0 + rand::random::<f64>())
    } else {
        base
    }
}
