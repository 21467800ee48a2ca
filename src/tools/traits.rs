//! Tool trait definitions.
//!
//! [`Tool`] is the typed authoring interface: arguments arrive as a decoded
//! struct and results are any serializable value. The registry stores tools
//! behind the object-safe [`ToolHandler`], which owns the JSON boundary.

use crate::error::ToolError;
use crate::tools::schema::ParameterSchema;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;

/// Definition of a tool exposed to the remote model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

impl ToolDefinition {
    pub fn new(name: &str, description: &str, parameters: ParameterSchema) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Arguments for tools that declare no parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NoArgs {}

/// A locally executed function tool with typed input.
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    type Args: DeserializeOwned + Send;
    type Output: Serialize + Send;

    /// Name, description and declared parameters.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with decoded arguments.
    async fn call(&self, args: Self::Args) -> anyhow::Result<Self::Output>;
}

/// Object-safe handler stored by the registry.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Decode `raw_arguments`, run the tool and return its JSON result.
    async fn invoke(&self, tool_name: &str, raw_arguments: &str) -> Result<Value, ToolError>;
}

/// Decode raw JSON arguments into a tool's input type.
///
/// Blank argument strings are read as `{}`, which some services send for
/// parameterless functions.
pub fn parse_args<T: DeserializeOwned>(tool_name: &str, raw: &str) -> Result<T, ToolError> {
    let raw = if raw.trim().is_empty() { "{}" } else { raw };
    serde_json::from_str(raw).map_err(|e| ToolError::ArgumentParse {
        tool: tool_name.to_string(),
        message: e.to_string(),
    })
}

fn encode_output<O: Serialize>(tool_name: &str, output: O) -> Result<Value, ToolError> {
    serde_json::to_value(output).map_err(|e| ToolError::Execution {
        tool: tool_name.to_string(),
        message: format!("result is not serializable: {e}"),
    })
}

/// Adapter from a typed [`Tool`] to a [`ToolHandler`].
pub(crate) struct TypedHandler<T>(pub(crate) T);

#[async_trait]
impl<T: Tool> ToolHandler for TypedHandler<T> {
    async fn invoke(&self, tool_name: &str, raw_arguments: &str) -> Result<Value, ToolError> {
        let args: T::Args = parse_args(tool_name, raw_arguments)?;
        let output = self.0.call(args).await.map_err(|e| ToolError::Execution {
            tool: tool_name.to_string(),
            message: format!("{e:#}"),
        })?;
        encode_output(tool_name, output)
    }
}

/// Adapter for plain closures registered with a separate definition.
pub(crate) struct FnHandler<A, O, F> {
    func: F,
    _marker: PhantomData<fn(A) -> O>,
}

impl<A, O, F> FnHandler<A, O, F> {
    pub(crate) fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<A, O, F, Fut> ToolHandler for FnHandler<A, O, F>
where
    A: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<O>> + Send,
{
    async fn invoke(&self, tool_name: &str, raw_arguments: &str) -> Result<Value, ToolError> {
        let args: A = parse_args(tool_name, raw_arguments)?;
        let output = (self.func)(args).await.map_err(|e| ToolError::Execution {
            tool: tool_name.to_string(),
            message: format!("{e:#}"),
        })?;
        encode_output(tool_name, output)
    }
}
