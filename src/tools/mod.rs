pub mod business;
pub mod dispatch;
pub mod registry;
pub mod schema;
pub mod traits;
pub mod weather;

pub use dispatch::resolve_batch;
pub use registry::ToolRegistry;
pub use schema::{ParamType, ParameterSchema};
pub use traits::{NoArgs, Tool, ToolDefinition, ToolHandler};

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};

/// Built-in tool sets selectable from config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolSet {
    #[default]
    Business,
    Weather,
    None,
}

/// Build the registry for a configured tool set.
pub fn build_registry(set: ToolSet) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    match set {
        ToolSet::Business => business::register_all(&mut registry)?,
        ToolSet::Weather => weather::register_all(&mut registry)?,
        ToolSet::None => {}
    }
    Ok(registry)
}
