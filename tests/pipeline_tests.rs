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

use std::collections::BTreeSet;
use std::time::Duration;

use weir::prelude::*;

use crate::setup::actors::collector::{payload_text, Collector};
use crate::setup::actors::relay::Relay;
use crate::setup::{eventually, initialize_tracing};

mod setup;

/// A fan-out hands every branch its own deep copy: a mutation made on one
/// branch is invisible on its sibling.
#[tokio::test]
async fn fan_out_branches_receive_independent_copies() -> anyhow::Result<()> {
    initialize_tracing();
    let mut graph = FlowGraph::launch();
    let (feeder_handler, _) = Collector::new();
    let (plain_sink_handler, plain_seen) = Collector::new();
    let (stamped_sink_handler, stamped_seen) = Collector::new();

    graph.add_actor(ActorConfig::new("feeder"), feeder_handler)?;
    graph.add_actor(ActorConfig::new("source"), Relay::default())?;
    graph.add_actor(
        ActorConfig::new("stamp"),
        Relay::stamping("stamped", true),
    )?;
    graph.add_actor(ActorConfig::new("plain_sink"), plain_sink_handler)?;
    graph.add_actor(ActorConfig::new("stamped_sink"), stamped_sink_handler)?;

    graph.connect_queue("feeder", "outbox", "source", "inbox")?;
    graph.connect_queue("source", "left", "stamp", "inbox")?;
    graph.connect_queue("source", "right", "plain_sink", "inbox")?;
    graph.connect_queue("stamp", "outbox", "stamped_sink", "inbox")?;
    graph.start_all().await?;

    let inbox = graph
        .handle("source")
        .unwrap()
        .pool()
        .get(Namespace::Inbound, "inbox")
        .unwrap();
    inbox.put(Event::text("payload")).await;

    assert!(
        eventually(Duration::from_secs(5), || {
            !plain_seen.lock().unwrap().is_empty() && !stamped_seen.lock().unwrap().is_empty()
        })
        .await,
        "fan-out branches never both delivered"
    );

    let plain = plain_seen.lock().unwrap()[0].clone();
    let stamped = stamped_seen.lock().unwrap()[0].clone();
    assert_eq!(payload_text(&plain), "payload");
    assert_eq!(payload_text(&stamped), "payload");
    assert!(stamped.attr_truthy("stamped"));
    assert!(plain.attr("stamped").is_none());

    graph.stop_all().await?;
    Ok(())
}

/// Two producers share one fan-in queue; each producer's events arrive in
/// the order that producer sent them.
#[tokio::test]
async fn fan_in_preserves_per_producer_order() -> anyhow::Result<()> {
    initialize_tracing();
    let mut graph = FlowGraph::launch();
    let (first_handler, _) = Collector::new();
    let (second_handler, _) = Collector::new();
    let (sink_handler, seen) = Collector::new();

    graph.add_actor(ActorConfig::new("first"), first_handler)?;
    graph.add_actor(ActorConfig::new("second"), second_handler)?;
    graph.add_actor(
        ActorConfig::new("sink").with_blocking_consume(),
        sink_handler,
    )?;
    graph.connect_queue("first", "outbox", "sink", "inbox")?;
    graph.connect_queue_unchecked("second", "outbox", "sink", "inbox")?;
    graph.start_all().await?;

    let per_producer = 20u64;
    let mut producers = Vec::new();
    for name in ["first", "second"] {
        let handle = graph.handle(name).unwrap().clone();
        producers.push(tokio::spawn(async move {
            for seq in 0..per_producer {
                let event = Event::text(format!("{name}-{seq}"))
                    .with_attr("producer", name)
                    .with_attr("seq", seq);
                handle.send_event(event)?;
            }
            anyhow::Ok(())
        }));
    }
    for producer in producers {
        producer.await??;
    }

    assert!(
        eventually(Duration::from_secs(10), || {
            seen.lock().unwrap().len() == 2 * per_producer as usize
        })
        .await,
        "fan-in sink did not receive every event"
    );

    let seen = seen.lock().unwrap();
    for name in ["first", "second"] {
        let sequence: Vec<u64> = seen
            .iter()
            .filter(|event| event.attr_str("producer") == Some(name))
            .map(|event| event.attr_u64("seq").unwrap())
            .collect();
        let expected: Vec<u64> = (0..per_producer).collect();
        assert_eq!(sequence, expected, "producer '{name}' events arrived out of order");
    }
    drop(seen);

    graph.stop_all().await?;
    Ok(())
}

/// A slow bounded stage pushes back instead of losing events: every event
/// fed upstream eventually lands in the sink exactly once.
#[tokio::test]
async fn backpressure_propagates_upstream_without_loss() -> anyhow::Result<()> {
    initialize_tracing();
    let mut graph = FlowGraph::launch();
    let (feeder_handler, _) = Collector::new();
    let (sink_handler, seen) = Collector::new();

    graph.add_actor(ActorConfig::new("feeder"), feeder_handler)?;
    graph.add_actor(
        ActorConfig::new("gen").with_size(2).with_blocking_consume(),
        Relay::default(),
    )?;
    graph.add_actor(
        ActorConfig::new("slow")
            .with_size(2)
            .with_blocking_consume(),
        Relay::slow(Duration::from_millis(10)),
    )?;
    graph.add_actor(ActorConfig::new("sink"), sink_handler)?;
    graph.connect_queue("feeder", "outbox", "gen", "inbox")?;
    graph.connect_queue("gen", "outbox", "slow", "inbox")?;
    graph.connect_queue("slow", "outbox", "sink", "inbox")?;
    graph.start_all().await?;

    let total = 20;
    let inbox = graph
        .handle("gen")
        .unwrap()
        .pool()
        .get(Namespace::Inbound, "inbox")
        .unwrap();
    for n in 0..total {
        inbox.put(Event::text(format!("event-{n}"))).await;
    }

    assert!(
        eventually(Duration::from_secs(30), || {
            seen.lock().unwrap().len() == total
        })
        .await,
        "backpressured pipeline lost or duplicated events"
    );

    let delivered: BTreeSet<String> = seen.lock().unwrap().iter().map(payload_text).collect();
    let expected: BTreeSet<String> = (0..total).map(|n| format!("event-{n}")).collect();
    assert_eq!(delivered, expected);

    graph.stop_all().await?;
    Ok(())
}
