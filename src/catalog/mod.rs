//! Runtime-editable tool catalog.
//!
//! A [`ToolCatalog`] is owned by whoever serves requests: one shared
//! instance for the whole process, or one per browser session through
//! [`SessionCatalogs`]. Readers take cheap snapshots; `replace` validates
//! the new list first and then swaps the pointer, so a reader sees either
//! the old catalog or the new one, never a mix.

pub mod schema;
pub mod session;

pub use schema::{default_catalog, parse_catalog, ToolSchema};
pub use session::SessionCatalogs;

use crate::error::Result;
use arc_swap::ArcSwap;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub struct ToolCatalog {
    tools: ArcSwap<Vec<ToolSchema>>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolSchema>) -> Self {
        Self {
            tools: ArcSwap::from_pointee(tools),
        }
    }

    /// Snapshot of the current ordered catalog.
    pub fn get(&self) -> Arc<Vec<ToolSchema>> {
        self.tools.load_full()
    }

    /// Validate `elements` and swap them in. On error nothing changes.
    pub fn replace(&self, elements: &[Value]) -> Result<Arc<Vec<ToolSchema>>> {
        let tools = Arc::new(parse_catalog(elements)?);
        self.tools.store(tools.clone());
        info!("Tool catalog replaced ({} tools)", tools.len());
        Ok(tools)
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}
