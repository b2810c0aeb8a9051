pub mod traits;
pub mod weather;

pub use traits::Tool;
pub use weather::{CurrentTemperature, RainProbability};

use crate::catalog::ToolSchema;
use crate::error::{Result, ToolCallError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Random source shared by the simulated tools; injectable for tests.
pub type SharedRng = Arc<Mutex<StdRng>>;

/// Random source seeded from the OS.
pub fn entropy_rng() -> SharedRng {
    Arc::new(Mutex::new(StdRng::from_entropy()))
}

/// Deterministic random source.
pub fn seeded_rng(seed: u64) -> SharedRng {
    Arc::new(Mutex::new(StdRng::seed_from_u64(seed)))
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Maps function names to local implementations.
#[derive(Clone, Default)]
pub struct ToolResolver {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with the built-in simulated weather tools.
    pub fn with_defaults(rng: SharedRng) -> Self {
        let mut resolver = Self::new();
        resolver.register(Arc::new(CurrentTemperature::new(rng.clone())));
        resolver.register(Arc::new(RainProbability::new(rng)));
        resolver
    }

    /// Add a tool, shadowing any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolCallError::UnknownFunction(name.to_string()))
    }

    /// Catalog entries for every registered tool, sorted by name.
    pub fn definitions(&self) -> Vec<ToolSchema> {
        let mut defs: Vec<ToolSchema> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name().cmp(b.name()));
        defs
    }
}

/// String form of a tool's return value as sent back to the model.
pub fn render_result(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fetch a required string argument or fail with `InvalidArguments`.
pub(crate) fn required_str<'a>(
    tool: &str,
    args: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ToolCallError::invalid_arguments(
            tool,
            format!("'{}' must be a string", key),
        )),
        None => Err(ToolCallError::invalid_arguments(
            tool,
            format!("Missing '{}' argument", key),
        )),
    }
}
