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
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use weir::prelude::*;

/// Fails the first `fail_first` deliveries, then succeeds.
///
/// The shared delivery counter lets tests assert exactly how many times
/// the retry policy redelivered an event. Use `fail_first = u32::MAX` for
/// an actor that never succeeds.
#[derive(Debug)]
pub struct Flaky {
    fail_first: u32,
    deliveries: Arc<AtomicU32>,
}

impl Flaky {
    pub fn failing(fail_first: u32) -> (Self, Arc<AtomicU32>) {
        let deliveries = Arc::new(AtomicU32::new(0));
        (
            Self {
                fail_first,
                deliveries: deliveries.clone(),
            },
            deliveries,
        )
    }
}

#[async_trait]
impl Consume for Flaky {
    async fn consume(
        &self,
        _event: Event,
        _ctx: &ActorHandle,
        _delivery: &Delivery,
    ) -> anyhow::Result<()> {
        let delivery = self.deliveries.fetch_add(1, Ordering::SeqCst) + 1;
        if delivery <= self.fail_first {
            anyhow::bail!("induced failure on delivery {delivery}");
        }
        Ok(())
    }
}
