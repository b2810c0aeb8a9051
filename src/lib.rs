//! Tool tester: function-calling round-trip harness.
//!
//! Sends a query plus a tool catalog to a chat-completion model, reports
//! which functions it chose, and optionally runs simulated implementations
//! and feeds the results back for a final answer.

pub mod agent;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod gateway;
pub mod server;
pub mod tools;
pub mod types;

pub use error::{Result, ToolCallError};
