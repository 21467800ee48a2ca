//! Run driver: takes one user turn from submission to a terminal reply.

pub mod polling;
pub mod streaming;
pub mod turn;

pub use streaming::{NullSink, TextSink};
pub use turn::run_turn;

use crate::api::AssistantApi;
use crate::types::RunOutcome;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How a run is observed until it reaches a terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStrategy {
    /// Query the run status on a fixed interval.
    #[default]
    Poll,
    /// Consume the run's server-sent event feed.
    Stream,
}

/// Knobs for one turn.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub strategy: RunStrategy,
    /// Fixed wait between status queries. No jitter, no growth.
    pub poll_interval: Duration,
    /// Status query attempts before a transient error fails the turn.
    pub max_status_attempts: u32,
    /// Whole-turn deadline. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            strategy: RunStrategy::Poll,
            poll_interval: Duration::from_secs(1),
            max_status_attempts: 3,
            timeout: None,
        }
    }
}

/// Why a suspension point was left early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupt {
    Cancelled,
    TimedOut,
}

/// Resolves at `deadline`, or never.
pub(crate) async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

/// Sleep for `interval` unless the turn is cancelled or runs out of time.
pub(crate) async fn pause(
    interval: Duration,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
) -> Result<(), Interrupt> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Interrupt::Cancelled),
        _ = deadline_reached(deadline) => Err(Interrupt::TimedOut),
        _ = tokio::time::sleep(interval) => Ok(()),
    }
}

/// Abandon a run: ask the service to cancel it, then report why.
pub(crate) async fn abandon(
    api: &dyn AssistantApi,
    thread_id: &str,
    run_id: Option<&str>,
    why: Interrupt,
) -> RunOutcome {
    if let Some(run_id) = run_id {
        info!("Cancelling run {run_id} ({why:?})");
        if let Err(e) = api.cancel_run(thread_id, run_id).await {
            warn!("Best-effort cancel of run {run_id} failed: {e}");
        }
    }
    match why {
        Interrupt::Cancelled => RunOutcome::Failed("turn cancelled".into()),
        Interrupt::TimedOut => RunOutcome::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_pause_completes_after_interval() {
        let cancel = CancellationToken::new();
        let start = Instant::now();
        assert_eq!(pause(Duration::from_secs(1), &cancel, None).await, Ok(()));
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_interrupts() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(
            pause(Duration::from_secs(1), &cancel, None).await,
            Err(Interrupt::Cancelled)
        );

        let fresh = CancellationToken::new();
        let deadline = Some(Instant::now() + Duration::from_millis(300));
        assert_eq!(
            pause(Duration::from_secs(1), &fresh, deadline).await,
            Err(Interrupt::TimedOut)
        );
    }
}
