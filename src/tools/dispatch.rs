//! Dispatch resolver: answers a batch of pending calls.
//!
//! Every pending call yields exactly one [`ToolOutput`]. Failures local to a
//! call (unknown tool, bad arguments, handler error) are encoded as an error
//! payload so the batch can always be submitted in full.

use crate::error::ToolError;
use crate::tools::ToolRegistry;
use crate::types::{PendingCall, ToolOutput};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Resolve and execute one call, returning its JSON result.
pub async fn execute_call(registry: &ToolRegistry, call: &PendingCall) -> Result<Value, ToolError> {
    let handler = registry.resolve(&call.tool_name)?;
    handler.invoke(&call.tool_name, &call.raw_arguments).await
}

/// Encode a per-call failure as the payload sent back to the model.
pub fn error_payload(err: &ToolError) -> String {
    json!({
        "error": {
            "kind": err.kind(),
            "message": err.to_string(),
        }
    })
    .to_string()
}

/// Answer every call in the batch, in batch order.
///
/// Calls run one after another; the returned batch is only handed back once
/// all of them are resolved.
pub async fn resolve_batch(registry: &ToolRegistry, calls: &[PendingCall]) -> Vec<ToolOutput> {
    let mut outputs = Vec::with_capacity(calls.len());

    for call in calls {
        info!("Tool: {}({})", call.tool_name, call.raw_arguments);

        let payload = match execute_call(registry, call).await {
            Ok(value) => {
                let payload = value.to_string();
                info!("Tool result: {} chars", payload.len());
                payload
            }
            Err(e) => {
                warn!("Tool error [{}]: {}", call.call_id, e);
                error_payload(&e)
            }
        };

        outputs.push(ToolOutput {
            call_id: call.call_id.clone(),
            payload,
        });
    }

    outputs
}
