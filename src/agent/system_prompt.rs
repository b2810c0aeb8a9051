//! System prompt for the proposing completion.

use crate::types::TemperatureUnit;

/// Fixed instructions establishing the assistant as a tool-invocation agent.
pub const TOOL_AGENT_INSTRUCTIONS: &str =
    "You are a tool bot. Analyze the query and decide which functions to call.";

/// Build the system prompt, optionally hinting the locale's default unit.
pub fn build_system_prompt(unit_hint: Option<TemperatureUnit>) -> String {
    let mut prompt = String::from(TOOL_AGENT_INSTRUCTIONS);
    if let Some(unit) = unit_hint {
        prompt.push_str(&format!(
            " When the user does not name a temperature unit, use {}.",
            unit
        ));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_prompt() {
        assert_eq!(build_system_prompt(None), TOOL_AGENT_INSTRUCTIONS);
    }

    #[test]
    fn test_unit_hint_appended() {
        let prompt = build_system_prompt(Some(TemperatureUnit::Fahrenheit));
        assert!(prompt.starts_with(TOOL_AGENT_INSTRUCTIONS));
        assert!(prompt.ends_with("use Fahrenheit."));
    }
}
