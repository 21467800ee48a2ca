//! Request/response payloads for the Assistants v2 REST surface.

use crate::tools::ToolDefinition;
use crate::types::{PendingCall, RunStatus, ToolOutput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// -- Requests ---------------------------------------------------------------

/// What to create when provisioning a new remote assistant.
#[derive(Debug, Clone, Default)]
pub struct AssistantSpec {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub functions: Vec<ToolDefinition>,
    pub file_search: bool,
    pub vector_store_ids: Vec<String>,
    pub code_interpreter: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateAssistantRequest<'a> {
    pub name: &'a str,
    pub instructions: &'a str,
    pub model: &'a str,
    pub tools: Vec<ToolPayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ToolPayload<'a> {
    Function { function: FunctionPayload<'a> },
    FileSearch,
    CodeInterpreter,
}

#[derive(Debug, Serialize)]
pub(crate) struct FunctionPayload<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub parameters: Value,
}

impl<'a> CreateAssistantRequest<'a> {
    pub fn from_spec(spec: &'a AssistantSpec) -> Self {
        let mut tools: Vec<ToolPayload<'a>> = spec
            .functions
            .iter()
            .map(|t| ToolPayload::Function {
                function: FunctionPayload {
                    name: &t.name,
                    description: &t.description,
                    parameters: t.parameters.to_json_schema(),
                },
            })
            .collect();
        if spec.file_search {
            tools.push(ToolPayload::FileSearch);
        }
        if spec.code_interpreter {
            tools.push(ToolPayload::CodeInterpreter);
        }

        let tool_resources = (spec.file_search && !spec.vector_store_ids.is_empty()).then(|| {
            serde_json::json!({
                "file_search": { "vector_store_ids": spec.vector_store_ids }
            })
        });

        Self {
            name: &spec.name,
            instructions: &spec.instructions,
            model: &spec.model,
            tools,
            tool_resources,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateMessageRequest<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRunRequest<'a> {
    pub assistant_id: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitToolOutputsRequest<'a> {
    pub tool_outputs: &'a [ToolOutput],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

// -- Responses --------------------------------------------------------------

/// Any object carrying an opaque identifier.
#[derive(Debug, Deserialize)]
pub(crate) struct Created {
    pub id: String,
}

/// A run as returned by create/retrieve/submit endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    #[serde(default)]
    pub last_error: Option<LastError>,
}

impl Run {
    /// Function calls the run is waiting on, if any.
    pub fn pending_calls(&self) -> Vec<PendingCall> {
        self.required_action
            .as_ref()
            .map(|ra| {
                ra.submit_tool_outputs
                    .tool_calls
                    .iter()
                    .map(WireToolCall::to_pending)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Human-readable failure detail.
    pub fn failure_detail(&self) -> String {
        match &self.last_error {
            Some(err) => format!("{}: {}", err.code, err.message),
            None => format!("run {} ended with status {}", self.id, self.status),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequiredAction {
    pub submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitToolOutputs {
    #[serde(default)]
    pub tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl WireToolCall {
    fn to_pending(&self) -> PendingCall {
        PendingCall {
            call_id: self.id.clone(),
            tool_name: self.function.name.clone(),
            raw_arguments: self.function.arguments.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// A message in a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl ThreadMessage {
    /// Concatenated value of every text block.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.value.as_str()),
                ContentBlock::Other => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageList {
    pub data: Vec<ThreadMessage>,
}
