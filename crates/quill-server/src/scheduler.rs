//! Timer that drives the weather refresh task.

use std::time::Duration;

use quill_weather::{RefreshOutcome, RefreshTask};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Run `task` every `period` until `cancel` fires.
///
/// The first run happens one full period after start. A run in progress is
/// allowed to finish when cancellation arrives. A zero `period` disables the
/// loop and the returned task completes immediately.
pub fn spawn_refresh_loop(
    task: RefreshTask,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if period.is_zero() {
            tracing::warn!("Weather refresh period is zero, scheduler not started");
            return;
        }

        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!("Weather refresh scheduled every {:?}", period);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Weather refresh scheduler stopped");
                    break;
                }
                _ = interval.tick() => {
                    run_isolated(&task).await;
                }
            }
        }
    })
}

/// Run the task once on its own tokio task so a panic inside it is logged
/// instead of taking the scheduler down.
pub async fn run_isolated(task: &RefreshTask) -> Option<RefreshOutcome> {
    let task = task.clone();
    match tokio::spawn(async move { task.run_once().await }).await {
        Ok(outcome) => Some(outcome),
        Err(e) if e.is_panic() => {
            tracing::error!("Weather refresh run panicked");
            None
        }
        Err(e) => {
            tracing::error!("Weather refresh run aborted: {}", e);
            None
        }
    }
}
