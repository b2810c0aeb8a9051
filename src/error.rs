//! Error taxonomy for the tool-call round trip.
//!
//! Each variant is a distinct failure kind so that callers (HTTP handlers,
//! the CLI) can branch on the kind instead of matching message text.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolCallError>;

#[derive(Debug, Error)]
pub enum ToolCallError {
    /// Bad input shape at the transport boundary.
    #[error("{0}")]
    InvalidRequest(String),

    /// Catalog replacement rejected; the previous catalog is untouched.
    #[error("Invalid tool definition at index {index}: {reason}")]
    InvalidSchema { index: usize, reason: String },

    /// The model returned tool arguments that are not a JSON object.
    #[error("Malformed arguments for '{name}': {source}")]
    MalformedArguments {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Arguments decoded fine but failed the tool's own validation.
    #[error("Invalid arguments for '{name}': {reason}")]
    InvalidArguments { name: String, reason: String },

    /// No resolver entry for the requested function.
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// The completion call failed (transport, status, or undecodable body).
    #[error("Completion gateway error: {0:#}")]
    Gateway(anyhow::Error),
}

impl ToolCallError {
    pub fn invalid_arguments(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the failure was caused by the caller's input rather than by
    /// the model, a tool, or the upstream service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::InvalidSchema { .. })
    }
}
