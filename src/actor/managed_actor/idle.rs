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

use tracing::{instrument, trace};

use crate::actor::ManagedActor;
use crate::common::ActorHandle;
use crate::message::WiringError;
use crate::queue::{connect, Namespace};

use super::started;

/// Type-state marker for a [`ManagedActor`] that has been built but not
/// yet started. Queue wiring is only available in this state.
pub struct Idle;

impl ManagedActor<Idle> {
    /// Wires an outbound queue of this actor to an inbound queue of
    /// `peer`.
    ///
    /// # Errors
    ///
    /// [`WiringError::AlreadyConnected`] when either side already holds a
    /// queue under the given name.
    pub fn connect_queue(
        &self,
        source_name: &str,
        peer: &ManagedActor<Idle>,
        destination_name: &str,
    ) -> Result<(), WiringError> {
        connect(
            &self.pool,
            Namespace::Outbound,
            source_name,
            &peer.pool,
            destination_name,
            true,
        )
    }

    /// Like [`connect_queue`](Self::connect_queue), but silently joins or
    /// repoints queues that are already wired.
    pub fn connect_queue_unchecked(
        &self,
        source_name: &str,
        peer: &ManagedActor<Idle>,
        destination_name: &str,
    ) -> Result<(), WiringError> {
        connect(
            &self.pool,
            Namespace::Outbound,
            source_name,
            &peer.pool,
            destination_name,
            false,
        )
    }

    /// Wires an error queue of this actor to `peer`, which will receive
    /// this actor's poison-routed events on an inbound queue named
    /// `error_<destination_name>`.
    ///
    /// # Errors
    ///
    /// [`WiringError::AlreadyConnected`] when either side already holds a
    /// queue under the given name.
    pub fn connect_error_queue(
        &self,
        source_name: &str,
        peer: &ManagedActor<Idle>,
        destination_name: &str,
    ) -> Result<(), WiringError> {
        connect(
            &self.pool,
            Namespace::Error,
            source_name,
            &peer.pool,
            &format!("error_{destination_name}"),
            true,
        )
    }

    /// Like [`connect_error_queue`](Self::connect_error_queue), but
    /// without the already-wired check.
    pub fn connect_error_queue_unchecked(
        &self,
        source_name: &str,
        peer: &ManagedActor<Idle>,
        destination_name: &str,
    ) -> Result<(), WiringError> {
        connect(
            &self.pool,
            Namespace::Error,
            source_name,
            &peer.pool,
            &format!("error_{destination_name}"),
            false,
        )
    }

    /// Wires this actor's log queue to `peer`, which will receive
    /// [`LogRecord`](crate::message::LogRecord) events on an inbound
    /// queue named `log_<destination_name>`.
    ///
    /// # Errors
    ///
    /// [`WiringError::AlreadyConnected`] when either side already holds a
    /// queue under the given name.
    pub fn connect_log_queue(
        &self,
        source_name: &str,
        peer: &ManagedActor<Idle>,
        destination_name: &str,
    ) -> Result<(), WiringError> {
        connect(
            &self.pool,
            Namespace::Log,
            source_name,
            &peer.pool,
            &format!("log_{destination_name}"),
            true,
        )
    }

    /// Like [`connect_log_queue`](Self::connect_log_queue), but without
    /// the already-wired check.
    pub fn connect_log_queue_unchecked(
        &self,
        source_name: &str,
        peer: &ManagedActor<Idle>,
        destination_name: &str,
    ) -> Result<(), WiringError> {
        connect(
            &self.pool,
            Namespace::Log,
            source_name,
            &peer.pool,
            &format!("log_{destination_name}"),
            false,
        )
    }

    /// Starts the actor: runs the handler's `pre_hook`, then spawns one
    /// consumption loop per inbound queue.
    ///
    /// Consumes the idle actor; the returned [`ActorHandle`] is the only
    /// way to interact with it from here on.
    ///
    /// # Errors
    ///
    /// [`WiringError::NoErrorRoute`] when rescue is enabled but no error
    /// queue is wired: a poison-routed event would have nowhere to go, so
    /// the misconfiguration is rejected up front instead of dropping
    /// events at runtime.
    #[instrument(skip(self), fields(actor = %self.config.name))]
    pub async fn start(self) -> anyhow::Result<ActorHandle> {
        if self.config.rescue && self.pool.is_namespace_empty(Namespace::Error) {
            return Err(WiringError::NoErrorRoute(self.config.name.clone()).into());
        }

        let handle = ActorHandle {
            name: self.config.name.clone(),
            config: self.config,
            pool: self.pool,
            handler: self.handler,
            running: self.running,
            looping: self.looping,
            cancel: self.cancel,
            supervisor: self.supervisor,
        };

        handle.handler.pre_hook(&handle).await;
        handle.running.store(true, Ordering::SeqCst);
        handle.looping.store(true, Ordering::SeqCst);

        for (queue_name, queue) in handle.pool.entries(Namespace::Inbound) {
            trace!(queue = %queue_name, "spawning consumption loop");
            let label = format!("{}/{queue_name}", handle.name);
            handle.supervisor.spawn(
                label,
                started::run_consume_loop(handle.clone(), queue_name, queue),
            );
        }
        handle.supervisor.close();

        Ok(handle)
    }
}
