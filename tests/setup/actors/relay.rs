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
use std::time::Duration;

use serde_json::Value;
use weir::prelude::*;

/// Pass-through stage: forwards every event downstream, optionally after
/// a delay (to simulate a slow consumer) and optionally stamping an
/// attribute (to make mutations observable on one fan-out branch).
///
/// Forwarding uses `?`, so a full downstream queue surfaces as
/// [`SendError::Full`] and exercises the backpressure path.
#[derive(Debug, Default)]
pub struct Relay {
    pub delay: Option<Duration>,
    pub stamp: Option<(String, Value)>,
}

impl Relay {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn stamping(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            stamp: Some((key.into(), value.into())),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Consume for Relay {
    async fn consume(
        &self,
        mut event: Event,
        ctx: &ActorHandle,
        _delivery: &Delivery,
    ) -> anyhow::Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((key, value)) = &self.stamp {
            event.set_attr(key.clone(), value.clone());
        }
        ctx.send_event(event)?;
        Ok(())
    }
}
