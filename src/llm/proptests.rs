//! Property-based tests for the `OpenAI` translation layer
//!
//! - Message translation preserves role, function name and raw arguments
//! - Only call turns with no text are sent with `content: null`
//! - Normalization keeps every choice and drops nameless function calls

use super::openai::{
    normalize_response, translate_message, OpenAIChoice, OpenAIFunctionCall, OpenAIMessage,
    OpenAIResponse,
};
use super::types::{FunctionCall, Message, MessageRole};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_function_call() -> impl Strategy<Value = FunctionCall> {
    ("[a-z_]{1,20}", "\\{(\"[0-9]\":\"[a-zA-Z0-9 .]{0,10}\")?\\}")
        .prop_map(|(name, arguments)| FunctionCall { name, arguments })
}

fn arb_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        "[a-zA-Z0-9 ?.]{0,60}".prop_map(Message::system),
        "[a-zA-Z0-9 ?.]{0,60}".prop_map(Message::user),
        "[a-zA-Z0-9 ?.]{0,60}".prop_map(Message::assistant),
        arb_function_call().prop_map(Message::function_call),
        ("[a-z_]{1,20}", "[a-zA-Z0-9 .]{0,40}")
            .prop_map(|(name, content)| Message::function_result(name, content)),
    ]
}

fn arb_wire_choice() -> impl Strategy<Value = OpenAIChoice> {
    (
        proptest::option::of("[a-zA-Z0-9 .]{0,40}"),
        proptest::option::of(("[a-z_]{0,10}", "\\{\\}")),
        proptest::option::of(prop_oneof![
            Just("stop".to_string()),
            Just("function_call".to_string()),
            Just("length".to_string()),
        ]),
    )
        .prop_map(|(content, call, finish_reason)| OpenAIChoice {
            message: OpenAIMessage {
                role: "assistant".to_string(),
                content,
                name: None,
                function_call: call.map(|(name, arguments)| OpenAIFunctionCall { name, arguments }),
            },
            finish_reason,
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_translate_preserves_identity(msg in arb_message()) {
        let wire = translate_message(&msg);
        prop_assert_eq!(wire.role.as_str(), msg.role.as_str());
        prop_assert_eq!(&wire.name, &msg.name);

        match (&wire.function_call, &msg.function_call) {
            (Some(w), Some(m)) => {
                prop_assert_eq!(&w.name, &m.name);
                prop_assert_eq!(&w.arguments, &m.arguments);
            }
            (None, None) => {}
            _ => prop_assert!(false, "function_call presence changed"),
        }
    }

    #[test]
    fn prop_null_content_only_for_call_turns(msg in arb_message()) {
        let wire = translate_message(&msg);
        if wire.content.is_none() {
            prop_assert!(msg.is_function_call());
            prop_assert_eq!(msg.role, MessageRole::Assistant);
        } else {
            prop_assert_eq!(wire.content.as_deref(), Some(msg.content.as_str()));
        }
    }

    #[test]
    fn prop_normalize_keeps_choice_count(choices in proptest::collection::vec(arb_wire_choice(), 0..4)) {
        let count = choices.len();
        let response = normalize_response(OpenAIResponse { choices, usage: None });
        prop_assert_eq!(response.choices.len(), count);
        for choice in &response.choices {
            if let Some(call) = choice.requested_call() {
                prop_assert!(!call.name.is_empty());
            }
        }
    }
}
