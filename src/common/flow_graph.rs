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

//! The top-level builder for an actor topology.
//!
//! A [`FlowGraph`] holds idle actors by name, wires their queues, and
//! starts them as a unit. Starting consumes the wiring phase: once
//! [`start_all`](FlowGraph::start_all) runs, the graph holds handles
//! instead of idle actors and no further wiring is possible.
//!
//! ```ignore
//! let mut graph = FlowGraph::launch();
//! graph.add_actor(ActorConfig::new("source"), Generator::default())?;
//! graph.add_actor(ActorConfig::new("sink"), Collector::default())?;
//! graph.connect_queue("source", "outbox", "sink", "inbox")?;
//! graph.start_all().await?;
//! ```

use futures::future::join_all;
use tracing::{instrument, trace};

use crate::actor::{ActorConfig, Idle, ManagedActor};
use crate::common::ActorHandle;
use crate::message::WiringError;
use crate::traits::Consume;

/// A named collection of actors and the wiring between them.
#[derive(Debug, Default)]
pub struct FlowGraph {
    nodes: Vec<ManagedActor<Idle>>,
    handles: Vec<ActorHandle>,
}

impl FlowGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn launch() -> Self {
        Self::default()
    }

    /// Registers an actor under its configured name.
    ///
    /// # Errors
    ///
    /// [`WiringError::DuplicateActor`] when the name is already taken;
    /// wiring is by name, so a collision would make later connections
    /// ambiguous.
    pub fn add_actor(
        &mut self,
        config: ActorConfig,
        handler: impl Consume,
    ) -> Result<(), WiringError> {
        if self.nodes.iter().any(|node| node.name() == config.name) {
            return Err(WiringError::DuplicateActor(config.name));
        }
        trace!(actor = %config.name, "registered actor");
        self.nodes.push(ManagedActor::new(config, handler));
        Ok(())
    }

    /// Wires `source`'s outbound queue `source_queue` to `destination`'s
    /// inbound queue `destination_queue`.
    ///
    /// # Errors
    ///
    /// [`WiringError::UnknownActor`] when either name is unregistered;
    /// [`WiringError::AlreadyConnected`] when either slot is wired.
    pub fn connect_queue(
        &self,
        source: &str,
        source_queue: &str,
        destination: &str,
        destination_queue: &str,
    ) -> Result<(), WiringError> {
        let (from, to) = self.pair(source, destination)?;
        from.connect_queue(source_queue, to, destination_queue)
    }

    /// Like [`connect_queue`](Self::connect_queue), but silently joins or
    /// repoints queues that are already wired.
    pub fn connect_queue_unchecked(
        &self,
        source: &str,
        source_queue: &str,
        destination: &str,
        destination_queue: &str,
    ) -> Result<(), WiringError> {
        let (from, to) = self.pair(source, destination)?;
        from.connect_queue_unchecked(source_queue, to, destination_queue)
    }

    /// Routes `source`'s poison-routed events to `destination`.
    ///
    /// # Errors
    ///
    /// [`WiringError::UnknownActor`] when either name is unregistered;
    /// [`WiringError::AlreadyConnected`] when either slot is wired.
    pub fn connect_error_queue(
        &self,
        source: &str,
        source_queue: &str,
        destination: &str,
        destination_queue: &str,
    ) -> Result<(), WiringError> {
        let (from, to) = self.pair(source, destination)?;
        from.connect_error_queue(source_queue, to, destination_queue)
    }

    /// Like [`connect_error_queue`](Self::connect_error_queue), but
    /// without the already-wired check.
    pub fn connect_error_queue_unchecked(
        &self,
        source: &str,
        source_queue: &str,
        destination: &str,
        destination_queue: &str,
    ) -> Result<(), WiringError> {
        let (from, to) = self.pair(source, destination)?;
        from.connect_error_queue_unchecked(source_queue, to, destination_queue)
    }

    /// Routes `source`'s log records to `destination`.
    ///
    /// # Errors
    ///
    /// [`WiringError::UnknownActor`] when either name is unregistered;
    /// [`WiringError::AlreadyConnected`] when either slot is wired.
    pub fn connect_log_queue(
        &self,
        source: &str,
        source_queue: &str,
        destination: &str,
        destination_queue: &str,
    ) -> Result<(), WiringError> {
        let (from, to) = self.pair(source, destination)?;
        from.connect_log_queue(source_queue, to, destination_queue)
    }

    /// Like [`connect_log_queue`](Self::connect_log_queue), but without
    /// the already-wired check.
    pub fn connect_log_queue_unchecked(
        &self,
        source: &str,
        source_queue: &str,
        destination: &str,
        destination_queue: &str,
    ) -> Result<(), WiringError> {
        let (from, to) = self.pair(source, destination)?;
        from.connect_log_queue_unchecked(source_queue, to, destination_queue)
    }

    /// Starts every registered actor in registration order.
    ///
    /// # Errors
    ///
    /// Fails on the first actor whose `start` fails, typically
    /// [`WiringError::NoErrorRoute`]; actors started before the failure
    /// keep running and can be stopped with
    /// [`stop_all`](Self::stop_all).
    #[instrument(skip(self))]
    pub async fn start_all(&mut self) -> anyhow::Result<()> {
        for node in std::mem::take(&mut self.nodes) {
            let handle = node.start().await?;
            self.handles.push(handle);
        }
        Ok(())
    }

    /// The handle of a started actor, if `name` is known and started.
    #[must_use]
    pub fn handle(&self, name: &str) -> Option<&ActorHandle> {
        self.handles.iter().find(|handle| handle.name() == name)
    }

    /// Stops every started actor, in registration order.
    ///
    /// Registration order means upstream actors stop and drain first, so
    /// events they flush during shutdown are still consumed downstream.
    ///
    /// # Errors
    ///
    /// Propagates the first `stop` failure.
    #[instrument(skip(self))]
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        for handle in &self.handles {
            handle.stop().await?;
        }
        Ok(())
    }

    /// Waits until every started actor has been stopped and drained.
    pub async fn block_until_stopped(&self) {
        join_all(self.handles.iter().map(ActorHandle::block)).await;
    }

    fn pair(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<(&ManagedActor<Idle>, &ManagedActor<Idle>), WiringError> {
        Ok((self.node(source)?, self.node(destination)?))
    }

    fn node(&self, name: &str) -> Result<&ManagedActor<Idle>, WiringError> {
        self.nodes
            .iter()
            .find(|node| node.name() == name)
            .ok_or_else(|| WiringError::UnknownActor(name.to_string()))
    }
}
