//! Streaming strategy: consume the run's event feed.

use crate::agent::{abandon, deadline_reached, Interrupt};
use crate::api::{AssistantApi, EventStream};
use crate::types::{RunEvent, RunOutcome};
use futures::StreamExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Receives assistant text as it arrives.
pub trait TextSink: Send {
    /// A fragment of the message being written.
    fn on_delta(&mut self, text: &str);

    /// The message being written is finished.
    fn on_message_done(&mut self, _text: &str) {}

    /// Input or output of a hosted tool such as the code interpreter.
    fn on_tool_activity(&mut self, _text: &str) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TextSink for NullSink {
    fn on_delta(&mut self, _text: &str) {}
}

impl TextSink for Vec<String> {
    fn on_delta(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// Drain `events` until the run completes, fails or needs tool outputs.
///
/// Deltas go to `sink` one event at a time, in arrival order. Unrecognized
/// event types are skipped. A transport error, an `error` event or a feed
/// that ends before a terminal event all fail the run.
pub async fn consume(
    api: &dyn AssistantApi,
    thread_id: &str,
    mut run_id: Option<String>,
    mut events: EventStream,
    sink: &mut dyn TextSink,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
) -> RunOutcome {
    let mut streamed = String::new();
    let mut last_message: Option<String> = None;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Interrupt::Cancelled),
            _ = deadline_reached(deadline) => Err(Interrupt::TimedOut),
            item = events.next() => Ok(item),
        };

        let event = match next {
            Err(why) => return abandon(api, thread_id, run_id.as_deref(), why).await,
            Ok(None) => {
                warn!("Event stream closed before the run finished");
                return RunOutcome::Failed("event stream ended before the run finished".into());
            }
            Ok(Some(Err(e))) => {
                warn!("Event stream failed: {e}");
                return RunOutcome::Failed(format!("event stream failed: {e}"));
            }
            Ok(Some(Ok(event))) => event,
        };

        match event {
            RunEvent::RunCreated { run_id: id } => {
                debug!("Streaming run {id}");
                run_id = Some(id);
            }
            RunEvent::TextDelta(text) => {
                sink.on_delta(&text);
                streamed.push_str(&text);
            }
            RunEvent::MessageCompleted(text) => {
                sink.on_message_done(&text);
                last_message = Some(text);
            }
            RunEvent::ToolActivity(text) => sink.on_tool_activity(&text),
            RunEvent::RequiresAction { run_id, calls } => {
                info!("Run {run_id} requires {} tool call(s)", calls.len());
                if calls.is_empty() {
                    return RunOutcome::Failed(format!(
                        "run {run_id} requires action but listed no tool calls"
                    ));
                }
                return RunOutcome::RequiresAction { run_id, calls };
            }
            RunEvent::RunCompleted { run_id } => {
                info!("Run {run_id} completed");
                return RunOutcome::Completed(last_message.unwrap_or(streamed));
            }
            RunEvent::RunFailed { run_id, detail } => {
                warn!("Run {run_id} ended: {detail}");
                return RunOutcome::Failed(detail);
            }
            RunEvent::StreamError(detail) => {
                warn!("Service reported a stream error: {detail}");
                return RunOutcome::Failed(detail);
            }
            RunEvent::Done => {
                return RunOutcome::Failed("event stream ended before the run finished".into());
            }
            RunEvent::Unrecognized(name) => debug!("Ignoring event {name}"),
        }
    }
}
