//! HTTP client for the Assistants v2 API.

use crate::api::sse::{decode_event, SseDecoder};
use crate::api::wire::*;
use crate::api::{AssistantApi, EventStream};
use crate::error::ApiError;
use crate::types::{RunEvent, ToolOutput};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Assistants API client.
#[derive(Debug, Clone)]
pub struct AssistantsClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl AssistantsClient {
    /// Create a new client.
    pub fn new(base_url: &str, api_key: &str, connect_timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER.0, BETA_HEADER.1)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.send_post(path, body).await?;
        Self::decode(resp).await
    }

    async fn send_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER.0, BETA_HEADER.1)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// POST with `stream: true` and turn the SSE body into run events.
    async fn open_stream<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<EventStream, ApiError> {
        let resp = self.send_post(path, body).await?;
        let events = sse_events(resp.bytes_stream());
        Ok(Box::pin(events))
    }
}

/// Decode a raw SSE body into run events.
fn sse_events<S, B>(byte_stream: S) -> impl Stream<Item = Result<RunEvent, ApiError>> + Send
where
    S: Stream<Item = reqwest::Result<B>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    async_stream::try_stream! {
        let mut decoder = SseDecoder::new();
        futures::pin_mut!(byte_stream);

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk?;
            for frame in decoder.push(chunk.as_ref()) {
                debug!("SSE event: {}", frame.event);
                yield decode_event(&frame)?;
            }
        }

        if decoder.has_partial() {
            Err(ApiError::Stream("event stream ended mid-frame".into()))?;
        }
    }
}

#[async_trait]
impl AssistantApi for AssistantsClient {
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<String, ApiError> {
        debug!("Creating assistant '{}' on {}", spec.name, spec.model);
        let created: Created = self
            .post("assistants", &CreateAssistantRequest::from_spec(spec))
            .await?;
        Ok(created.id)
    }

    async fn create_thread(&self) -> Result<String, ApiError> {
        let created: Created = self.post("threads", &serde_json::json!({})).await?;
        Ok(created.id)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<String, ApiError> {
        let created: Created = self
            .post(
                &format!("threads/{thread_id}/messages"),
                &CreateMessageRequest {
                    role: "user",
                    content,
                },
            )
            .await?;
        Ok(created.id)
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, ApiError> {
        self.post(
            &format!("threads/{thread_id}/runs"),
            &CreateRunRequest {
                assistant_id,
                stream: false,
            },
        )
        .await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ApiError> {
        self.get(&format!("threads/{thread_id}/runs/{run_id}")).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, ApiError> {
        let list: MessageList = self
            .get(&format!("threads/{thread_id}/messages?order=desc"))
            .await?;
        Ok(list.data)
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, ApiError> {
        self.post(
            &format!("threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            &SubmitToolOutputsRequest {
                tool_outputs: outputs,
                stream: false,
            },
        )
        .await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ApiError> {
        self.post(
            &format!("threads/{thread_id}/runs/{run_id}/cancel"),
            &serde_json::json!({}),
        )
        .await
    }

    async fn stream_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<EventStream, ApiError> {
        self.open_stream(
            &format!("threads/{thread_id}/runs"),
            &CreateRunRequest {
                assistant_id,
                stream: true,
            },
        )
        .await
    }

    async fn submit_tool_outputs_stream(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<EventStream, ApiError> {
        self.open_stream(
            &format!("threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            &SubmitToolOutputsRequest {
                tool_outputs: outputs,
                stream: true,
            },
        )
        .await
    }
}
