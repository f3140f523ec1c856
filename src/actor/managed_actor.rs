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

//! The framework shell around a user-written [`Consume`] implementation.
//!
//! A [`ManagedActor`] is built in the [`Idle`] state, where its queue pool
//! is wired to peers, and consumed by [`start`](ManagedActor::start), which
//! spawns one consumption loop per inbound queue and returns an
//! [`ActorHandle`](crate::common::ActorHandle). Wiring methods exist only
//! on `ManagedActor<Idle>`, so a running actor's topology cannot be
//! mutated.
//!
//! [`Consume`]: crate::traits::Consume

use std::fmt;
use std::fmt::Formatter;
use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

pub use idle::Idle;

use crate::actor::{ActorConfig, Supervisor};
use crate::common::{ConsumerRef, HaltFlag};
use crate::queue::QueuePool;
use crate::traits::Consume;

mod idle;
pub(crate) mod started;

/// An actor that has not yet started, parameterized by its lifecycle
/// state.
pub struct ManagedActor<ActorState> {
    pub(crate) config: Arc<ActorConfig>,

    pub(crate) pool: Arc<QueuePool>,

    pub(crate) supervisor: Supervisor,

    pub(crate) handler: ConsumerRef,

    pub(crate) running: HaltFlag,

    pub(crate) looping: HaltFlag,

    pub(crate) cancel: CancellationToken,

    _actor_state: PhantomData<ActorState>,
}

impl<ActorState> fmt::Debug for ManagedActor<ActorState> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedActor")
            .field("name", &self.config.name)
            .finish()
    }
}

impl ManagedActor<Idle> {
    /// Creates an idle actor from its configuration and handler.
    ///
    /// The queue pool starts empty; wire it with
    /// [`connect_queue`](ManagedActor::connect_queue) and friends before
    /// calling [`start`](ManagedActor::start).
    pub fn new(config: ActorConfig, handler: impl Consume) -> Self {
        let pool = Arc::new(QueuePool::new(config.size));
        Self {
            config: Arc::new(config),
            pool,
            supervisor: Supervisor::new(),
            handler: Arc::new(handler),
            running: Arc::new(AtomicBool::new(false)),
            looping: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            _actor_state: PhantomData,
        }
    }

    /// The actor's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The actor's queue pool.
    #[must_use]
    pub fn pool(&self) -> &QueuePool {
        &self.pool
    }
}
