//! Tool registry: declared tools and their local handlers.
//!
//! Built once at startup and read-only afterwards. Descriptors are kept in
//! registration order because the remote service may cache assistants by
//! their tool signature.

use crate::error::{RegistryError, ToolError};
use crate::tools::traits::{FnHandler, Tool, ToolDefinition, ToolHandler, TypedHandler};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

struct Entry {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
}

/// Mapping from tool name to handler, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `definition.name`.
    pub fn register_handler(
        &mut self,
        definition: ToolDefinition,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(&definition.name) {
            return Err(RegistryError::DuplicateTool(definition.name));
        }
        debug!("Registered tool: {}", definition.name);
        self.index.insert(definition.name.clone(), self.entries.len());
        self.entries.push(Entry {
            definition,
            handler,
        });
        Ok(())
    }

    /// Register a typed [`Tool`].
    pub fn register<T: Tool>(&mut self, tool: T) -> Result<(), RegistryError> {
        let definition = tool.definition();
        self.register_handler(definition, Arc::new(TypedHandler(tool)))
    }

    /// Register an async closure with an explicit definition.
    pub fn register_fn<A, O, F, Fut>(
        &mut self,
        definition: ToolDefinition,
        func: F,
    ) -> Result<(), RegistryError>
    where
        A: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        self.register_handler(definition, Arc::new(FnHandler::new(func)))
    }

    /// Look up the handler for `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ToolHandler>, ToolError> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].handler.clone())
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// All descriptors, in registration order.
    pub fn describe_all(&self) -> Vec<ToolDefinition> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| &e.definition.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema::ParameterSchema;
    use crate::tools::traits::NoArgs;

    fn def(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, "test tool", ParameterSchema::empty())
    }

    fn registry_with(names: &[&str]) -> ToolRegistry {
        let mut reg = ToolRegistry::new();
        for name in names {
            reg.register_fn(def(name), |_: NoArgs| async { anyhow::Ok("ok") })
                .unwrap();
        }
        reg
    }

    #[test]
    fn test_resolve_only_registered_names() {
        let reg = registry_with(&["get_services", "get_location"]);
        assert!(reg.resolve("get_services").is_ok());
        assert!(reg.resolve("get_location").is_ok());

        match reg.resolve("get_weather") {
            Err(ToolError::UnknownTool(name)) => assert_eq!(name, "get_weather"),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("unregistered tool resolved"),
        }
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut reg = registry_with(&["get_pricing"]);
        let err = reg
            .register_fn(def("get_pricing"), |_: NoArgs| async { anyhow::Ok(1) })
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(ref n) if n == "get_pricing"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_describe_all_keeps_registration_order() {
        let names = ["zeta", "alpha", "mid", "beta"];
        let reg = registry_with(&names);
        let described: Vec<String> = reg.describe_all().into_iter().map(|d| d.name).collect();
        assert_eq!(described, names);
    }

    #[tokio::test]
    async fn test_resolved_handler_runs() {
        let reg = registry_with(&["ping"]);
        let handler = reg.resolve("ping").unwrap();
        let value = handler.invoke("ping", "{}").await.unwrap();
        assert_eq!(value, serde_json::json!("ok"));
    }
}
