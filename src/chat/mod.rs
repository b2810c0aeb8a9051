//! Interactive chat loop: every line is a full autonomous round trip.

use crate::agent::Orchestrator;
use crate::catalog::ToolCatalog;
use crate::error::ToolCallError;
use crate::types::Mode;
use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::warn;

/// Lines that end the session.
const EXIT_COMMANDS: &[&str] = &["exit", "quit"];

/// Read queries from `input` until EOF or an exit command, writing each
/// synthesized answer to `output`. A failed round trip is reported and the
/// loop continues with the next line.
pub async fn run_chat<R, W>(
    orchestrator: &Orchestrator,
    catalog: &ToolCatalog,
    mut input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output
        .write_all(format!("Type '{}' to leave.\n", EXIT_COMMANDS[0]).as_bytes())
        .await?;

    let mut line = String::new();
    loop {
        output
            .write_all(format!("{} ", "You:".cyan().bold()).as_bytes())
            .await?;
        output.flush().await?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.iter().any(|c| query.eq_ignore_ascii_case(c)) {
            break;
        }

        let tools = catalog.get();
        let reply = match orchestrator.round_trip(query, &tools, Mode::Autonomous).await {
            Ok(result) => format!(
                "{} {}\n",
                "Assistant:".green().bold(),
                result
                    .final_message
                    .unwrap_or_else(|| "(no response)".to_string())
            ),
            Err(e) => {
                warn!("Round trip failed: {}", e);
                format!("{} {}\n", "Error:".red().bold(), describe_error(&e))
            }
        };
        output.write_all(reply.as_bytes()).await?;
    }

    output.write_all(b"Bye.\n").await?;
    output.flush().await?;
    Ok(())
}

/// User-facing message for a failed round trip.
pub fn describe_error(err: &ToolCallError) -> String {
    match err {
        ToolCallError::UnknownFunction(name) => {
            format!("the model asked for '{}', which is not available here", name)
        }
        ToolCallError::MalformedArguments { name, .. } => {
            format!("the model sent unreadable arguments for '{}'", name)
        }
        ToolCallError::InvalidArguments { name, reason } => {
            format!("bad arguments for '{}': {}", name, reason)
        }
        ToolCallError::Gateway(_) => "the model service could not be reached".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::{proposal, ScriptedGateway};
    use crate::tools::{seeded_rng, ToolResolver};
    use serde_json::json;
    use std::sync::Arc;

    async fn run(gateway: Arc<ScriptedGateway>, script: &str) -> String {
        let orchestrator =
            Orchestrator::new(gateway, ToolResolver::with_defaults(seeded_rng(1)), "test-model");
        let catalog = ToolCatalog::default();
        let mut out = Vec::new();
        run_chat(&orchestrator, &catalog, script.as_bytes(), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_answers_until_exit() {
        let gw = Arc::new(
            ScriptedGateway::new()
                .reply_calls(vec![proposal(
                    "call_1",
                    "get_rain_probability",
                    json!({"location": "London"}),
                )])
                .reply_text("There is a fair chance of rain in London."),
        );
        let out = run(gw.clone(), "Will it rain in London?\nexit\nignored\n").await;

        assert!(out.contains("There is a fair chance of rain in London."));
        assert!(out.ends_with("Bye.\n"));
        assert_eq!(gw.call_count(), 2);
    }

    #[tokio::test]
    async fn test_blank_lines_skipped_and_eof_ends() {
        let gw = Arc::new(ScriptedGateway::new());
        let out = run(gw.clone(), "\n   \n").await;
        assert_eq!(gw.call_count(), 0);
        assert!(out.ends_with("Bye.\n"));
    }

    #[tokio::test]
    async fn test_error_reported_and_loop_continues() {
        let gw = Arc::new(
            ScriptedGateway::new()
                .reply_calls(vec![proposal("call_1", "delete_database", json!({}))])
                .reply_text("Hi!"),
        );
        let out = run(gw, "drop everything\nhello\nQUIT\n").await;

        assert!(out.contains("'delete_database', which is not available here"));
        assert!(out.contains("Hi!"));
    }
}
