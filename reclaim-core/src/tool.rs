use crate::{ReadonlyContext, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A capability an agent may invoke. The model decides whether and with
/// what arguments to call it; the declaration travels as a JSON schema and
/// the result comes back as a structured function response.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// JSON schema of the tool's parameters, surfaced to the model as a
    /// function declaration.
    fn parameters_schema(&self) -> Option<Value> {
        None
    }

    async fn execute(&self, ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value>;
}

pub trait ToolContext: ReadonlyContext {
    fn function_call_id(&self) -> &str;
}
