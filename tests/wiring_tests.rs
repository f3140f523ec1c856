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
#![allow(dead_code)]

use weir::prelude::*;

use crate::setup::actors::collector::Collector;
use crate::setup::initialize_tracing;

mod setup;

fn idle_pair() -> (ManagedActor<Idle>, ManagedActor<Idle>) {
    let (upstream_handler, _) = Collector::new();
    let (downstream_handler, _) = Collector::new();
    (
        ManagedActor::new(ActorConfig::new("upstream"), upstream_handler),
        ManagedActor::new(ActorConfig::new("downstream"), downstream_handler),
    )
}

/// A connection is one queue visible from both sides: the source's
/// outbound slot and the destination's inbound slot.
#[tokio::test]
async fn connecting_registers_one_shared_queue() -> anyhow::Result<()> {
    initialize_tracing();
    let (upstream, downstream) = idle_pair();

    upstream.connect_queue("outbox", &downstream, "inbox")?;

    let outbound = upstream.pool().get(Namespace::Outbound, "outbox").unwrap();
    let inbound = downstream.pool().get(Namespace::Inbound, "inbox").unwrap();
    assert_eq!(outbound, inbound);
    Ok(())
}

/// An already-wired slot cannot be silently rewired.
#[tokio::test]
async fn rewiring_a_connected_slot_is_rejected() -> anyhow::Result<()> {
    initialize_tracing();
    let (upstream, downstream) = idle_pair();
    upstream.connect_queue("outbox", &downstream, "inbox")?;

    let err = upstream
        .connect_queue("outbox", &downstream, "other_inbox")
        .unwrap_err();
    assert!(matches!(err, WiringError::AlreadyConnected { .. }));
    Ok(())
}

/// Several producers may feed one inbound queue; they all end up holding
/// the same queue.
#[tokio::test]
async fn fan_in_producers_share_the_destination_queue() -> anyhow::Result<()> {
    initialize_tracing();
    let (first, _) = Collector::new();
    let (second, _) = Collector::new();
    let (sink_handler, _) = Collector::new();
    let first = ManagedActor::new(ActorConfig::new("first"), first);
    let second = ManagedActor::new(ActorConfig::new("second"), second);
    let sink = ManagedActor::new(ActorConfig::new("sink"), sink_handler);

    first.connect_queue("outbox", &sink, "inbox")?;
    second.connect_queue_unchecked("outbox", &sink, "inbox")?;

    let from_first = first.pool().get(Namespace::Outbound, "outbox").unwrap();
    let from_second = second.pool().get(Namespace::Outbound, "outbox").unwrap();
    assert_eq!(from_first, from_second);
    Ok(())
}

/// Error and log connections land in the destination's inbound namespace
/// under a plane-specific name.
#[tokio::test]
async fn error_and_log_connections_are_plane_prefixed() -> anyhow::Result<()> {
    initialize_tracing();
    let (upstream, downstream) = idle_pair();

    upstream.connect_error_queue("error", &downstream, "inbox")?;
    upstream.connect_log_queue("log", &downstream, "inbox")?;

    assert!(downstream
        .pool()
        .get(Namespace::Inbound, "error_inbox")
        .is_some());
    assert!(downstream
        .pool()
        .get(Namespace::Inbound, "log_inbox")
        .is_some());
    assert!(upstream.pool().get(Namespace::Error, "error").is_some());
    assert!(upstream.pool().get(Namespace::Log, "log").is_some());
    Ok(())
}

/// Two actors cannot share a name; wiring is by name.
#[tokio::test]
async fn graph_rejects_duplicate_actor_names() {
    initialize_tracing();
    let mut graph = FlowGraph::launch();
    let (first, _) = Collector::new();
    let (second, _) = Collector::new();

    graph.add_actor(ActorConfig::new("sink"), first).unwrap();
    let err = graph.add_actor(ActorConfig::new("sink"), second).unwrap_err();
    assert_eq!(err, WiringError::DuplicateActor("sink".to_string()));
}

/// Wiring an unregistered name fails instead of creating an actor.
#[tokio::test]
async fn graph_rejects_unknown_actor_names() {
    initialize_tracing();
    let mut graph = FlowGraph::launch();
    let (handler, _) = Collector::new();
    graph.add_actor(ActorConfig::new("known"), handler).unwrap();

    let err = graph
        .connect_queue("known", "outbox", "missing", "inbox")
        .unwrap_err();
    assert_eq!(err, WiringError::UnknownActor("missing".to_string()));
}

/// Rescue without an error route is a misconfiguration caught at start,
/// not at the moment an event exhausts its budget.
#[tokio::test]
async fn rescue_without_an_error_route_fails_at_start() {
    initialize_tracing();
    let mut graph = FlowGraph::launch();
    let (handler, _) = Collector::new();
    graph
        .add_actor(ActorConfig::new("lonely").with_rescue(3), handler)
        .unwrap();

    let err = graph.start_all().await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<WiringError>(),
        Some(&WiringError::NoErrorRoute("lonely".to_string()))
    );
}
