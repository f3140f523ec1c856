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
use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Declare the submodules.
pub mod actors;

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests.
///
/// Logs go to a file so test output stays readable; levels are set per
/// target. Guarded by `std::sync::Once` so repeated calls from different
/// tests in one binary are harmless.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        std::fs::create_dir_all("logs").expect("could not create logs dir");

        let file_appender = RollingFileAppender::new(Rotation::NEVER, "logs", "weir_tests.txt");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Leak the guard so the non-blocking writer is not dropped before process exit
        Box::leak(Box::new(guard));

        let filter = EnvFilter::new("info")
            .add_directive("weir::actor=trace".parse().unwrap())
            .add_directive("weir::queue=trace".parse().unwrap())
            .add_directive("weir::common=trace".parse().unwrap())
            .add_directive("tokio=warn".parse().unwrap());

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::NONE)
            .with_max_level(Level::TRACE)
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// Polls `condition` every 10ms until it holds or `deadline` elapses.
///
/// Returns whether the condition was observed; callers assert on the
/// result so a hang becomes a readable failure instead of a test timeout.
pub async fn eventually<F>(deadline: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let poll = Duration::from_millis(10);
    let started = tokio::time::Instant::now();
    while started.elapsed() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(poll).await;
    }
    condition()
}

/// Awaits `fut` under a deadline, panicking with `label` on expiry.
pub async fn within<F: Future>(deadline: Duration, label: &str, fut: F) -> F::Output {
    match tokio::time::timeout(deadline, fut).await {
        Ok(out) => out,
        Err(_) => panic!("timed out after {deadline:?}: {label}"),
    }
}
