//! One user turn: message in, reply out.

use crate::agent::streaming::{consume, TextSink};
use crate::agent::{polling, RunSettings, RunStrategy};
use crate::api::AssistantApi;
use crate::session::Session;
use crate::tools::{resolve_batch, ToolRegistry};
use crate::types::{RunOutcome, ToolOutput, TurnReply};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Drive one turn on `session` to a terminal reply.
///
/// Tool-call rounds are resolved here and never reach the caller. Any
/// lifecycle failure ends this turn only; the session stays usable.
pub async fn run_turn(
    api: &dyn AssistantApi,
    registry: &ToolRegistry,
    session: &Session,
    user_text: &str,
    settings: &RunSettings,
    sink: &mut dyn TextSink,
    cancel: &CancellationToken,
) -> TurnReply {
    let thread_id = session.thread_id.as_str();
    let deadline = settings.timeout.map(|t| Instant::now() + t);

    if let Err(e) = api.add_user_message(thread_id, user_text).await {
        warn!("Failed to add message to {thread_id}: {e}");
        return TurnReply::Failed(format!("failed to add message: {e}"));
    }

    let mut outcome = match start(api, session, settings, sink, cancel, deadline).await {
        Ok(outcome) => outcome,
        Err(detail) => return TurnReply::Failed(detail),
    };

    let mut rounds = 0u32;
    loop {
        match outcome {
            RunOutcome::RequiresAction { run_id, calls } => {
                rounds += 1;
                info!("Tool round {rounds}: {} call(s) for {run_id}", calls.len());
                let outputs = resolve_batch(registry, &calls).await;

                let resumed = resume(
                    api, thread_id, &run_id, &outputs, settings, sink, cancel, deadline,
                )
                .await;
                outcome = match resumed {
                    Ok(outcome) => outcome,
                    Err(detail) => return TurnReply::Failed(detail),
                };
            }
            RunOutcome::Completed(text) => return TurnReply::Completed(text),
            RunOutcome::Failed(detail) => return TurnReply::Failed(detail),
            RunOutcome::TimedOut => {
                let secs = settings.timeout.map(|t| t.as_secs()).unwrap_or_default();
                return TurnReply::Failed(format!("run timed out after {secs}s"));
            }
        }
    }
}

/// Create the run and observe it until its first stopping point.
async fn start(
    api: &dyn AssistantApi,
    session: &Session,
    settings: &RunSettings,
    sink: &mut dyn TextSink,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
) -> Result<RunOutcome, String> {
    let thread_id = session.thread_id.as_str();
    let assistant_id = session.assistant_id.as_str();

    match settings.strategy {
        RunStrategy::Poll => {
            let run = api
                .create_run(thread_id, assistant_id)
                .await
                .map_err(|e| format!("failed to start run: {e}"))?;
            info!("Started run {} on {thread_id}", run.id);
            Ok(polling::await_run(api, thread_id, &run.id, settings, cancel, deadline).await)
        }
        RunStrategy::Stream => {
            let events = api
                .stream_run(thread_id, assistant_id)
                .await
                .map_err(|e| format!("failed to start run stream: {e}"))?;
            Ok(consume(api, thread_id, None, events, sink, cancel, deadline).await)
        }
    }
}

/// Submit a full batch of outputs and keep observing the run.
#[allow(clippy::too_many_arguments)]
async fn resume(
    api: &dyn AssistantApi,
    thread_id: &str,
    run_id: &str,
    outputs: &[ToolOutput],
    settings: &RunSettings,
    sink: &mut dyn TextSink,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
) -> Result<RunOutcome, String> {
    match settings.strategy {
        RunStrategy::Poll => {
            let run = api
                .submit_tool_outputs(thread_id, run_id, outputs)
                .await
                .map_err(|e| format!("failed to submit tool outputs: {e}"))?;
            Ok(polling::await_run(api, thread_id, &run.id, settings, cancel, deadline).await)
        }
        RunStrategy::Stream => {
            let events = api
                .submit_tool_outputs_stream(thread_id, run_id, outputs)
                .await
                .map_err(|e| format!("failed to submit tool outputs: {e}"))?;
            Ok(consume(
                api,
                thread_id,
                Some(run_id.to_string()),
                events,
                sink,
                cancel,
                deadline,
            )
            .await)
        }
    }
}
