//! Polling strategy: query run status on a fixed interval.

use crate::agent::{abandon, pause, RunSettings};
use crate::api::AssistantApi;
use crate::types::{RunOutcome, RunStatus};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Observe `run_id` until it completes, fails or needs tool outputs.
///
/// The first status query is issued immediately; every pending status is
/// followed by one `poll_interval` wait.
pub async fn await_run(
    api: &dyn AssistantApi,
    thread_id: &str,
    run_id: &str,
    settings: &RunSettings,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
) -> RunOutcome {
    let max_attempts = settings.max_status_attempts.max(1);
    let mut failed_attempts = 0u32;

    loop {
        let run = match api.retrieve_run(thread_id, run_id).await {
            Ok(run) => {
                failed_attempts = 0;
                run
            }
            Err(e) if e.is_transient() && failed_attempts + 1 < max_attempts => {
                failed_attempts += 1;
                warn!(
                    "Status query for {run_id} failed ({failed_attempts}/{max_attempts}): {e}"
                );
                if let Err(why) = pause(settings.poll_interval, cancel, deadline).await {
                    return abandon(api, thread_id, Some(run_id), why).await;
                }
                continue;
            }
            Err(e) => {
                warn!("Giving up on run {run_id}: {e}");
                return RunOutcome::Failed(format!("status query failed: {e}"));
            }
        };

        debug!("Run {} status: {}", run.id, run.status);
        match run.status {
            RunStatus::Completed => {
                info!("Run {} completed", run.id);
                return final_reply(api, thread_id, &run.id).await;
            }
            RunStatus::RequiresAction => {
                let calls = run.pending_calls();
                if calls.is_empty() {
                    return RunOutcome::Failed(format!(
                        "run {} requires action but listed no tool calls",
                        run.id
                    ));
                }
                info!("Run {} requires {} tool call(s)", run.id, calls.len());
                return RunOutcome::RequiresAction {
                    run_id: run.id,
                    calls,
                };
            }
            status if status.is_failure() => {
                let detail = run.failure_detail();
                warn!("Run {} ended: {detail}", run.id);
                return RunOutcome::Failed(detail);
            }
            _ => {
                if let Err(why) = pause(settings.poll_interval, cancel, deadline).await {
                    return abandon(api, thread_id, Some(run_id), why).await;
                }
            }
        }
    }
}

/// Text of the newest assistant message written by `run_id`.
async fn final_reply(api: &dyn AssistantApi, thread_id: &str, run_id: &str) -> RunOutcome {
    let messages = match api.list_messages(thread_id).await {
        Ok(m) => m,
        Err(e) => return RunOutcome::Failed(format!("failed to fetch reply: {e}")),
    };

    match messages
        .iter()
        .find(|m| m.role == "assistant" && m.run_id.as_deref() == Some(run_id))
    {
        Some(msg) => RunOutcome::Completed(msg.text()),
        None => {
            warn!("Run {run_id} completed without an assistant message");
            RunOutcome::Completed(String::new())
        }
    }
}
