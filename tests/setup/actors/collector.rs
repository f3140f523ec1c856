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
use std::sync::{Arc, Mutex};

use weir::prelude::*;

/// Terminal sink for tests: records every delivered event, in order.
///
/// The shared `Vec` lets the test inspect payloads, attributes, and error
/// stamps after (or while) the pipeline runs.
#[derive(Debug, Default)]
pub struct Collector {
    seen: Arc<Mutex<Vec<Event>>>,
}

impl Collector {
    pub fn new() -> (Self, Arc<Mutex<Vec<Event>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (Self { seen: seen.clone() }, seen)
    }
}

#[async_trait]
impl Consume for Collector {
    async fn consume(
        &self,
        event: Event,
        _ctx: &ActorHandle,
        _delivery: &Delivery,
    ) -> anyhow::Result<()> {
        self.seen.lock().unwrap().push(event);
        Ok(())
    }
}

/// Extracts a comparable text form from a recorded event.
pub fn payload_text(event: &Event) -> String {
    match event.payload() {
        EventPayload::Text(text) => text.clone(),
        EventPayload::Json(value) => value.to_string(),
        EventPayload::Log(record) => record.to_string(),
        EventPayload::Empty => String::new(),
    }
}
