//! Configuration schema for config.toml.

use crate::types::TemperatureUnit;
use serde::{Deserialize, Serialize};

/// Who owns the tool catalog the web UI edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogScope {
    /// One catalog shared by every client of the process.
    Global,
    /// One catalog per browser session (cookie).
    Session,
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterConfig {
    /// Chat-completion API base URL (up to, not including, `/chat/completions`).
    pub api_base_url: String,

    /// Bearer token for the completion API.
    pub api_key: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Maximum tokens per completion.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f64,

    /// Address the web UI binds to.
    pub bind_addr: String,

    /// Public URL of the web UI, used in startup output. Defaults to the bind address.
    pub public_base_url: String,

    pub catalog_scope: CatalogScope,

    /// Idle seconds before a session catalog is dropped.
    pub session_ttl_secs: u64,

    /// Unit the model should assume when the user names none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_unit: Option<TemperatureUnit>,

    /// Log level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openai.com/v1".into(),
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
            max_tokens: 1024,
            temperature: 0.7,
            bind_addr: "0.0.0.0:5001".into(),
            public_base_url: String::new(),
            catalog_scope: CatalogScope::Global,
            session_ttl_secs: 1800,
            default_unit: None,
            log_level: "info".into(),
        }
    }
}

impl TesterConfig {
    /// URL printed for operators to open the UI.
    pub fn public_url(&self) -> String {
        if !self.public_base_url.is_empty() {
            return self.public_base_url.trim_end_matches('/').to_string();
        }
        let addr = self.bind_addr.replace("0.0.0.0", "127.0.0.1");
        format!("http://{}", addr)
    }
}
