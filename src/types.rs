//! Shared types used across the run protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Run lifecycle
// ---------------------------------------------------------------------------

/// Status of a remote run as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// A status this client does not know about yet.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// The run is still working and should be polled again.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            Self::Queued | Self::InProgress | Self::Cancelling | Self::Unknown
        )
    }

    /// The run ended without producing a reply.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::Failed | Self::Cancelled | Self::Expired | Self::Incomplete
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::InProgress => write!(f, "in_progress"),
            Self::RequiresAction => write!(f, "requires_action"),
            Self::Cancelling => write!(f, "cancelling"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed => write!(f, "failed"),
            Self::Completed => write!(f, "completed"),
            Self::Incomplete => write!(f, "incomplete"),
            Self::Expired => write!(f, "expired"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tool calls
// ---------------------------------------------------------------------------

/// A function call the remote model wants executed locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCall {
    pub call_id: String,
    pub tool_name: String,
    /// JSON-encoded arguments exactly as the service sent them.
    pub raw_arguments: String,
}

/// Result for one pending call, ready for resubmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    #[serde(rename = "tool_call_id")]
    pub call_id: String,
    /// JSON-encoded payload (a handler result or an error object).
    #[serde(rename = "output")]
    pub payload: String,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Where a run ended up after the driver stopped observing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Terminal success with the assistant's reply text.
    Completed(String),
    /// The run is suspended until every call in the batch is answered.
    RequiresAction {
        run_id: String,
        calls: Vec<PendingCall>,
    },
    /// Remote failure, cancellation or exhausted retries.
    Failed(String),
    /// The optional deadline passed before a terminal status.
    TimedOut,
}

/// What a caller gets back from one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnReply {
    Completed(String),
    Failed(String),
}

impl TurnReply {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

// ---------------------------------------------------------------------------
// Stream events
// ---------------------------------------------------------------------------

/// One event from a run's incremental event feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    RunCreated { run_id: String },
    /// Partial assistant text, forwarded as-is.
    TextDelta(String),
    /// A full assistant message has been written.
    MessageCompleted(String),
    RequiresAction {
        run_id: String,
        calls: Vec<PendingCall>,
    },
    /// Hosted tool progress: interpreter input or log output.
    ToolActivity(String),
    RunCompleted { run_id: String },
    RunFailed { run_id: String, detail: String },
    /// The service reported an error on the stream itself.
    StreamError(String),
    /// End-of-stream sentinel.
    Done,
    /// Event type this client does not interpret.
    Unrecognized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_from_wire() {
        let status: RunStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, RunStatus::InProgress);
        assert!(status.is_pending());

        let future: RunStatus = serde_json::from_str("\"paused_for_review\"").unwrap();
        assert_eq!(future, RunStatus::Unknown);
        assert!(future.is_pending());

        assert!(RunStatus::Cancelled.is_failure());
        assert!(!RunStatus::Completed.is_failure());
    }

    #[test]
    fn test_tool_output_wire_names() {
        let out = ToolOutput {
            call_id: "call_1".into(),
            payload: "57".into(),
        };
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["tool_call_id"], "call_1");
        assert_eq!(v["output"], "57");
    }
}
