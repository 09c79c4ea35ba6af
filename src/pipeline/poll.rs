// src/pipeline/poll.rs

//! Poll loop driving the change detector.

use std::time::Duration;

use crate::pipeline::ChangeDetector;

/// Run cycles separated by `delay`, forever or until `max_cycles` is reached.
///
/// Recoverable source failures are already logged by the cycle and the loop
/// carries on. An unrecoverable one stops the loop. Returns the number of
/// cycles run.
pub async fn run_poll_loop(
    detector: &ChangeDetector,
    delay: Duration,
    max_cycles: Option<usize>,
) -> usize {
    let mut cycles = 0;

    loop {
        let report = detector.run_cycle().await;
        cycles += 1;

        let elapsed = report.finished_at - report.started_at;
        log::debug!(
            "Cycle {} finished in {} ms: {} delivered, {} failed",
            cycles,
            elapsed.num_milliseconds(),
            report.delivered().len(),
            report.failures().len()
        );
        if let Some((source, error)) = report.first_unrecoverable() {
            log::error!("{source}: stopping the poll loop: {error}");
            return cycles;
        }

        if max_cycles.is_some_and(|max| cycles >= max) {
            return cycles;
        }
        tokio::time::sleep(delay).await;
    }
}
