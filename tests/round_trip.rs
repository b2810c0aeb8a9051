//! End-to-end round trips against a scripted completion gateway.

use serde_json::json;
use std::sync::Arc;
use tool_tester::agent::Orchestrator;
use tool_tester::catalog::default_catalog;
use tool_tester::gateway::mock::{proposal, ScriptedGateway};
use tool_tester::tools::{seeded_rng, ToolResolver};
use tool_tester::types::{ConversationMessage, Mode};
use tool_tester::ToolCallError;

fn orchestrator(gateway: Arc<ScriptedGateway>, seed: u64) -> Orchestrator {
    Orchestrator::new(gateway, ToolResolver::with_defaults(seeded_rng(seed)), "gpt-4o-mini")
}

#[tokio::test]
async fn test_no_tool_calls_returns_direct_content() {
    let gw = Arc::new(ScriptedGateway::new().reply_text("I can only help with weather."));
    let result = orchestrator(gw.clone(), 1)
        .round_trip("Tell me a joke", &default_catalog(), Mode::Autonomous)
        .await
        .unwrap();

    assert_eq!(
        result.final_message.as_deref(),
        Some("I can only help with weather.")
    );
    assert!(result.proposed_calls.is_empty());
    assert_eq!(gw.call_count(), 1);
}

#[tokio::test]
async fn test_single_temperature_call_autonomous() {
    let gw = Arc::new(
        ScriptedGateway::new()
            .reply_calls(vec![proposal(
                "call_abc",
                "get_current_temperature",
                json!({"location": "Beijing", "unit": "Celsius"}),
            )])
            .reply_text("It is currently mild in Beijing."),
    );

    // Same seed, same draw: compute the value the stub will produce.
    let expected = {
        let resolver = ToolResolver::with_defaults(seeded_rng(77));
        let tool = resolver.resolve("get_current_temperature").unwrap_or_else(|e| panic!("{e}"));
        let args = json!({"location": "Beijing", "unit": "Celsius"});
        tool.execute(args.as_object().unwrap()).await.unwrap().to_string()
    };

    let result = orchestrator(gw.clone(), 77)
        .round_trip("How warm is Beijing?", &default_catalog(), Mode::Autonomous)
        .await
        .unwrap();

    assert_eq!(
        result.final_message.as_deref(),
        Some("It is currently mild in Beijing.")
    );
    assert_eq!(result.proposed_calls.len(), 1);
    assert_eq!(result.proposed_calls[0].name, "get_current_temperature");
    assert_eq!(result.proposed_calls[0].arguments["unit"], "Celsius");

    let requests = gw.requests();
    assert_eq!(requests.len(), 2);

    let second = &requests[1];
    assert!(second.tools.is_none());
    assert_eq!(second.messages.len(), 4);
    assert_eq!(second.messages[2].role(), "assistant");

    let tool_messages: Vec<_> = second
        .messages
        .iter()
        .filter(|m| m.role() == "tool")
        .collect();
    assert_eq!(tool_messages.len(), 1);
    match tool_messages[0] {
        ConversationMessage::Tool {
            call_id,
            name,
            content,
        } => {
            assert_eq!(call_id, "call_abc");
            assert_eq!(name, "get_current_temperature");
            assert_eq!(content, &expected);
            let c: i64 = content.parse().unwrap();
            assert!((15..=30).contains(&c));
        }
        other => panic!("expected tool message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_multiple_calls_keep_model_order() {
    let gw = Arc::new(
        ScriptedGateway::new()
            .reply_calls(vec![
                proposal("call_1", "get_rain_probability", json!({"location": "Paris"})),
                proposal(
                    "call_2",
                    "get_current_temperature",
                    json!({"location": "Paris", "unit": "Fahrenheit"}),
                ),
            ])
            .reply_text("Bring an umbrella."),
    );

    orchestrator(gw.clone(), 3)
        .round_trip("Weather in Paris?", &default_catalog(), Mode::Autonomous)
        .await
        .unwrap();

    let requests = gw.requests();
    let second = &requests[1];
    assert_eq!(second.messages.len(), 5);
    let ids: Vec<&str> = second
        .messages
        .iter()
        .filter_map(|m| match m {
            ConversationMessage::Tool { call_id, .. } => Some(call_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["call_1", "call_2"]);

    // Every tool message answers a call of the preceding assistant turn.
    match &second.messages[2] {
        ConversationMessage::Assistant { tool_calls, .. } => {
            let proposed: Vec<&str> = tool_calls.iter().map(|c| c.call_id.as_str()).collect();
            assert_eq!(proposed, ids);
        }
        other => panic!("expected assistant message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_function_aborts_without_second_call() {
    let gw = Arc::new(
        ScriptedGateway::new()
            .reply_calls(vec![proposal("call_x", "delete_database", json!({"confirm": true}))])
            .reply_text("should never be requested"),
    );

    let err = orchestrator(gw.clone(), 1)
        .round_trip("Clean up", &default_catalog(), Mode::Autonomous)
        .await
        .unwrap_err();

    match err {
        ToolCallError::UnknownFunction(name) => assert_eq!(name, "delete_database"),
        other => panic!("expected UnknownFunction, got {:?}", other),
    }
    assert_eq!(gw.call_count(), 1);
}

#[tokio::test]
async fn test_unknown_function_after_known_one_still_aborts() {
    let gw = Arc::new(
        ScriptedGateway::new()
            .reply_calls(vec![
                proposal("call_1", "get_rain_probability", json!({"location": "Oslo"})),
                proposal("call_2", "book_flight", json!({"to": "Oslo"})),
            ])
            .reply_text("unused"),
    );

    let err = orchestrator(gw.clone(), 1)
        .round_trip("Rain in Oslo, then book me a flight", &default_catalog(), Mode::Autonomous)
        .await
        .unwrap_err();

    assert!(matches!(err, ToolCallError::UnknownFunction(_)));
    assert_eq!(gw.call_count(), 1);
}

#[tokio::test]
async fn test_test_mode_never_executes_or_synthesizes() {
    let gw = Arc::new(
        ScriptedGateway::new()
            .reply_calls(vec![
                // Would fail if it were executed: not resolvable.
                proposal("call_1", "delete_database", json!({})),
                proposal("call_2", "get_rain_probability", json!({"location": "Rome"})),
            ])
            .reply_text("unused"),
    );

    let result = orchestrator(gw.clone(), 1)
        .round_trip("Wipe the db and check rain in Rome", &default_catalog(), Mode::Test)
        .await
        .unwrap();

    assert_eq!(gw.call_count(), 1);
    assert!(result.final_message.is_none());
    let names: Vec<&str> = result.proposed_calls.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["delete_database", "get_rain_probability"]);
    assert_eq!(result.proposed_calls[1].arguments["location"], "Rome");
}

#[tokio::test]
async fn test_both_modes_send_identical_first_request() {
    let test_gw = Arc::new(ScriptedGateway::new().reply_text("a"));
    let auto_gw = Arc::new(ScriptedGateway::new().reply_text("a"));

    orchestrator(test_gw.clone(), 1)
        .round_trip("Rain in Lima?", &default_catalog(), Mode::Test)
        .await
        .unwrap();
    orchestrator(auto_gw.clone(), 1)
        .round_trip("Rain in Lima?", &default_catalog(), Mode::Autonomous)
        .await
        .unwrap();

    assert_eq!(test_gw.requests()[0], auto_gw.requests()[0]);
}

#[tokio::test]
async fn test_second_call_failure_is_gateway_error() {
    let gw = Arc::new(
        ScriptedGateway::new()
            .reply_calls(vec![proposal(
                "call_1",
                "get_rain_probability",
                json!({"location": "Cairo"}),
            )])
            .fail("upstream timed out"),
    );

    let err = orchestrator(gw.clone(), 1)
        .round_trip("Rain in Cairo?", &default_catalog(), Mode::Autonomous)
        .await
        .unwrap_err();

    assert!(matches!(err, ToolCallError::Gateway(_)));
    assert_eq!(gw.call_count(), 2);
}
