//! Configuration schema for concierge.toml.

use crate::agent::{RunSettings, RunStrategy};
use crate::api::AssistantSpec;
use crate::session::SessionOverrides;
use crate::tools::{ToolDefinition, ToolSet};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INSTRUCTIONS: &str = "You are a customer support agent for a web development agency. \
You only answer questions about the agency. Use the provided functions to look up services, \
pricing, business hours and location. For any other question, say you don't know.";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConciergeConfig {
    /// Assistant name advertised on creation.
    pub name: String,

    /// System instructions for the assistant.
    pub instructions: String,

    /// Model identifier.
    pub model: String,

    /// Assistants API base URL.
    pub api_base_url: String,

    /// API key. `OPENAI_API_KEY` takes precedence.
    pub api_key: String,

    /// `poll` or `stream`.
    pub strategy: RunStrategy,

    pub poll_interval_ms: u64,

    /// Status query attempts before a transient error fails the turn.
    pub max_status_attempts: u32,

    /// Whole-turn deadline in seconds. 0 waits forever.
    pub run_timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Built-in function tools to register.
    pub tool_set: ToolSet,

    /// Advertise the hosted file_search tool.
    pub file_search: bool,

    /// Existing vector stores attached to file_search.
    pub vector_store_ids: Vec<String>,

    /// Advertise the hosted code_interpreter tool.
    pub code_interpreter: bool,

    /// Use this assistant instead of the persisted one.
    pub assistant_id: Option<String>,

    /// Use this thread instead of the persisted one.
    pub thread_id: Option<String>,

    /// Where session identifiers are persisted.
    pub state_dir: String,

    /// Log level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            name: "Customer Assistant".into(),
            instructions: DEFAULT_INSTRUCTIONS.into(),
            model: "gpt-4o".into(),
            api_base_url: "https://api.openai.com".into(),
            api_key: String::new(),
            strategy: RunStrategy::Poll,
            poll_interval_ms: 1000,
            max_status_attempts: 3,
            run_timeout_secs: 0,
            connect_timeout_secs: 30,
            tool_set: ToolSet::Business,
            file_search: false,
            vector_store_ids: Vec::new(),
            code_interpreter: false,
            assistant_id: None,
            thread_id: None,
            state_dir: "~/.concierge".into(),
            log_level: "info".into(),
        }
    }
}

impl ConciergeConfig {
    /// Resolve a path that may contain `~` to an absolute path.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).into_owned())
    }

    /// Resolved session state directory.
    pub fn resolved_state_dir(&self) -> PathBuf {
        self.resolve_path(&self.state_dir)
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            strategy: self.strategy,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_status_attempts: self.max_status_attempts,
            timeout: (self.run_timeout_secs > 0)
                .then(|| Duration::from_secs(self.run_timeout_secs)),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// What to create if no assistant is persisted yet.
    pub fn assistant_spec(&self, functions: Vec<ToolDefinition>) -> AssistantSpec {
        AssistantSpec {
            name: self.name.clone(),
            instructions: self.instructions.clone(),
            model: self.model.clone(),
            functions,
            file_search: self.file_search,
            vector_store_ids: self.vector_store_ids.clone(),
            code_interpreter: self.code_interpreter,
        }
    }

    pub fn session_overrides(&self) -> SessionOverrides {
        SessionOverrides {
            assistant_id: self.assistant_id.clone(),
            thread_id: self.thread_id.clone(),
        }
    }
}
