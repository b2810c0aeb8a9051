//! Tool trait definition.

use crate::catalog::ToolSchema;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A locally executable function the model can call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used in function calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool. Implementations validate `args` themselves.
    async fn execute(&self, args: &Map<String, Value>) -> Result<Value>;

    /// Catalog entry describing this tool.
    fn definition(&self) -> ToolSchema {
        ToolSchema::function(self.name(), self.description(), self.parameters_schema())
    }
}
