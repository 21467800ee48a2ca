//! Error taxonomy for the run protocol.
//!
//! Per-call tool failures never abort a batch: the dispatcher turns them into
//! error payloads. Only registry and lifecycle errors propagate.

use thiserror::Error;

/// Failure of a single pending tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The remote service asked for a tool that was never registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The JSON arguments could not be decoded into the tool's input type.
    #[error("invalid arguments for {tool}: {message}")]
    ArgumentParse { tool: String, message: String },

    /// The handler ran and reported a failure.
    #[error("tool {tool} failed: {message}")]
    Execution { tool: String, message: String },
}

impl ToolError {
    /// Stable machine-readable tag used in error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "unknown_tool",
            Self::ArgumentParse { .. } => "argument_parse",
            Self::Execution { .. } => "tool_execution",
        }
    }
}

/// Registration-time programmer error.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("tool already registered: {0}")]
    DuplicateTool(String),
}

/// Errors talking to the remote assistant service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The event stream broke or reported an error.
    #[error("event stream error: {0}")]
    Stream(String),
}

impl ApiError {
    /// Whether a retry of the same request may succeed.
    ///
    /// Transport failures, rate limiting and server errors are transient;
    /// other client errors and malformed payloads are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::Stream(_) => false,
        }
    }
}

/// Local session record could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no persisted record")]
    Missing,

    #[error("session record I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session record is corrupt: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transience() {
        let server = ApiError::Status {
            status: 503,
            body: "unavailable".into(),
        };
        let throttled = ApiError::Status {
            status: 429,
            body: "slow down".into(),
        };
        let bad_request = ApiError::Status {
            status: 400,
            body: "nope".into(),
        };
        assert!(server.is_transient());
        assert!(throttled.is_transient());
        assert!(!bad_request.is_transient());
        assert!(!ApiError::Stream("closed".into()).is_transient());
    }

    #[test]
    fn test_tool_error_kinds() {
        assert_eq!(ToolError::UnknownTool("x".into()).kind(), "unknown_tool");
        let parse = ToolError::ArgumentParse {
            tool: "get_pricing".into(),
            message: "missing field `service`".into(),
        };
        assert_eq!(parse.kind(), "argument_parse");
        assert_eq!(
            parse.to_string(),
            "invalid arguments for get_pricing: missing field `service`"
        );
    }
}
