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

#![forbid(unsafe_code)]
//! Weir
//!
//! A queue-centric actor pipeline library. Actors implement
//! [`Consume`](crate::traits::Consume) and talk to each other only through
//! named, bounded FIFO queues; a [`FlowGraph`](crate::common::FlowGraph)
//! wires them together and runs them. Delivery is at-least-once: full
//! queues push back instead of dropping, failing events are retried under
//! a rescue budget, and events that exhaust it are stamped with their
//! failure and routed to a dedicated error plane.

pub(crate) mod actor;

/// Shared runtime pieces: handles, configuration, the graph builder.
pub(crate) mod common;
pub(crate) mod message;
pub(crate) mod queue;

/// Trait definitions for user-written actors.
pub(crate) mod traits;

/// Prelude module for convenient imports.
///
/// Re-exports everything a typical actor implementation and graph setup
/// needs, as well as the `async_trait` crate.
pub mod prelude {
    pub use ::async_trait;
    pub use async_trait::async_trait;

    pub use crate::actor::{ActorConfig, Idle, ManagedActor, Supervisor};
    pub use crate::common::{
        ActorHandle, BehaviorConfig, FlowGraph, LimitsConfig, TimeoutConfig, WeirConfig, CONFIG,
    };
    pub use crate::message::{
        Event, EventError, EventKind, EventPayload, InvalidActorInput, InvalidEventConversion,
        LogLevel, LogRecord, QueueEmpty, QueueFull, SendError, WiringError,
    };
    pub use crate::queue::{FlowQueue, Namespace, QueuePool};
    pub use crate::traits::{Consume, Delivery};
}
