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

//! Task supervision for consumption loops and dispatch workers.
//!
//! The supervisor owns a [`TaskTracker`] covering every task an actor
//! spawns: the long-lived per-queue consumption loops and the ephemeral
//! per-event dispatch workers. Waiting on the tracker is what makes
//! drain-on-stop observable — `stop()` returns only after every loop has
//! drained and every in-flight dispatch has finished.
//!
//! Two spawn modes:
//! - [`spawn`](Supervisor::spawn): run once; a panic is caught and logged,
//!   never propagated. Consumption loops use this — they own their own
//!   shutdown and respawning one would duplicate in-flight state. Dispatch
//!   workers use it too, because their failures belong to the rescue
//!   policy, not to blind respawn (a respawn would not have the event).
//! - [`spawn_restarting`](Supervisor::spawn_restarting): relaunch after
//!   any error or panic, at least `restart_floor` apart so a crashing task
//!   cannot hot-loop. For caller-owned side tasks that must outlive their
//!   failures.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::task::TaskTracker;
use tracing::{error, trace, warn};

use crate::common::CONFIG;

/// Spawns and tracks an actor's tasks.
#[derive(Debug, Clone)]
pub struct Supervisor {
    tracker: TaskTracker,
    restart_floor: Duration,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    /// Creates a supervisor with the configured restart floor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tracker: TaskTracker::new(),
            restart_floor: CONFIG.restart_floor(),
        }
    }

    /// Overrides the minimum interval between relaunches.
    #[must_use]
    pub fn with_restart_floor(mut self, floor: Duration) -> Self {
        self.restart_floor = floor;
        self
    }

    /// A clone of the underlying task tracker.
    #[must_use]
    pub fn tracker(&self) -> TaskTracker {
        self.tracker.clone()
    }

    /// Runs a future as a tracked task, once.
    ///
    /// A panic inside the task is contained and logged; it does not
    /// propagate and the task is not relaunched.
    pub fn spawn<F>(&self, label: impl Into<String>, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let label = label.into();
        self.tracker.spawn(async move {
            if let Err(join_err) = tokio::spawn(fut).await {
                if join_err.is_panic() {
                    error!(task = %label, "supervised task panicked: {join_err}");
                }
            }
        });
    }

    /// Runs a task produced by `factory`, relaunching it after any error
    /// or panic.
    ///
    /// Relaunches are spaced at least the restart floor apart. A clean
    /// `Ok(())` return ends the task for good.
    pub fn spawn_restarting<F, Fut>(&self, label: impl Into<String>, factory: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let label = label.into();
        let floor = self.restart_floor;
        self.tracker.spawn(async move {
            loop {
                let launched = Instant::now();
                match tokio::spawn(factory()).await {
                    Ok(Ok(())) => {
                        trace!(task = %label, "supervised task completed");
                        break;
                    }
                    Ok(Err(err)) => {
                        warn!(task = %label, error = %err, "supervised task failed; relaunching");
                    }
                    Err(join_err) => {
                        error!(task = %label, "supervised task panicked; relaunching: {join_err}");
                    }
                }
                let elapsed = launched.elapsed();
                if elapsed < floor {
                    sleep(floor - elapsed).await;
                }
            }
        });
    }

    /// Closes the tracker; `wait` completes once all tracked tasks do.
    pub fn close(&self) {
        self.tracker.close();
    }

    /// Waits for every tracked task to finish.
    pub async fn wait(&self) {
        self.tracker.wait().await;
    }
}
