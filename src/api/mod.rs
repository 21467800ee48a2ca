//! Remote assistant service boundary.
//!
//! [`AssistantApi`] lists every remote operation the run protocol needs.
//! [`AssistantsClient`] implements it over HTTP; tests substitute scripted
//! implementations.

pub mod client;
pub mod sse;
pub mod wire;

pub use client::AssistantsClient;
pub use wire::{AssistantSpec, Run, ThreadMessage};

use crate::error::ApiError;
use crate::types::{RunEvent, ToolOutput};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Lazy, finite sequence of run events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<RunEvent, ApiError>> + Send>>;

#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Provision a new assistant and return its identifier.
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<String, ApiError>;

    /// Create an empty conversation thread.
    async fn create_thread(&self) -> Result<String, ApiError>;

    /// Append a user message to a thread.
    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<String, ApiError>;

    /// Start a run of `assistant_id` against `thread_id`.
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, ApiError>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ApiError>;

    /// Messages in the thread, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, ApiError>;

    /// Answer a whole requires-action batch at once.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, ApiError>;

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ApiError>;

    /// Start a run and subscribe to its event feed.
    async fn stream_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<EventStream, ApiError>;

    /// Answer a batch and keep consuming the run's event feed.
    async fn submit_tool_outputs_stream(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<EventStream, ApiError>;
}
