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

/// Counts how often each lifecycle hook ran.
#[derive(Debug)]
pub struct Hooked {
    pre: Arc<AtomicU32>,
    post: Arc<AtomicU32>,
}

impl Hooked {
    pub fn new() -> (Self, Arc<AtomicU32>, Arc<AtomicU32>) {
        let pre = Arc::new(AtomicU32::new(0));
        let post = Arc::new(AtomicU32::new(0));
        (
            Self {
                pre: pre.clone(),
                post: post.clone(),
            },
            pre,
            post,
        )
    }
}

#[async_trait]
impl Consume for Hooked {
    async fn consume(
        &self,
        _event: Event,
        _ctx: &ActorHandle,
        _delivery: &Delivery,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn pre_hook(&self, _ctx: &ActorHandle) {
        self.pre.fetch_add(1, Ordering::SeqCst);
    }

    async fn post_hook(&self, _ctx: &ActorHandle) {
        self.post.fetch_add(1, Ordering::SeqCst);
    }
}
