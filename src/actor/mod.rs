//! Actor construction, supervision, and lifecycle.
//!
//! # Key Components
//!
//! *   [`ManagedActor`]: the framework shell around a user handler. Built
//!     in the [`Idle`] state, where its queues are wired; consumed by
//!     `start`, which hands back an
//!     [`ActorHandle`](crate::common::ActorHandle).
//! *   [`ActorConfig`]: per-actor settings covering queue capacity,
//!     blocking delivery, rescue policy, and kind/attribute contracts.
//! *   [`Supervisor`]: the task spawner backing every consumption loop
//!     and dispatch worker, with panic containment and an optional
//!     relaunching mode.

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

pub use actor_config::ActorConfig;
pub(crate) use managed_actor::started::sweep_inbound;
pub use managed_actor::Idle;
pub use managed_actor::ManagedActor;
pub use supervisor::Supervisor;

mod actor_config;
mod managed_actor;
mod supervisor;
