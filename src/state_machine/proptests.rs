//! Property-based tests for the state machine
//!
//! Drives the pure transition function with arbitrary model replies and
//! checks that the conversation it builds stays well formed.

use super::*;
use crate::conversation::Conversation;
use crate::llm::{Choice, LlmResponse};
use proptest::prelude::*;
use std::collections::VecDeque;

// ============================================================================
// Strategies
// ============================================================================

fn arb_arguments() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("{}".to_string()),
        "[a-zA-Z]{1,8}".prop_map(|v| format!(r#"{{"0":"{v}"}}"#)),
        ("[a-zA-Z]{1,8}", "[a-zA-Z]{1,8}")
            .prop_map(|(a, b)| format!(r#"{{"1":"{b}","0":"{a}"}}"#)),
        // Malformed payloads
        Just("not json".to_string()),
        Just(r#"{"city":"Berlin"}"#.to_string()),
    ]
}

fn arb_choice() -> impl Strategy<Value = Choice> {
    prop_oneof![
        3 => ("[a-z_]{1,12}", arb_arguments()).prop_map(|(name, args)| Choice::call(name, args)),
        1 => "[a-zA-Z .]{1,30}".prop_map(Choice::text),
        1 => Just(Choice::text("")),
    ]
}

fn arb_reply() -> impl Strategy<Value = Vec<Choice>> {
    prop_oneof![
        1 => Just(vec![]),
        8 => proptest::collection::vec(arb_choice(), 1..3),
    ]
}

// ============================================================================
// Driver
// ============================================================================

struct Run {
    conversation: Conversation,
    final_state: LoopState,
    requests: usize,
}

/// Run the loop to completion, answering each model request with the next
/// scripted reply and completing every dispatch successfully.
fn drive(context: LoopContext, replies: Vec<Vec<Choice>>) -> Run {
    let mut conversation = Conversation::seeded("system", "question");
    let mut replies = replies.into_iter();
    let mut state = LoopState::initial();
    let mut effects = VecDeque::from([Effect::RequestModel]);
    let mut requests = 0;

    while let Some(effect) = effects.pop_front() {
        let event = match effect {
            Effect::Append { message } => {
                conversation.push(message);
                continue;
            }
            Effect::RequestModel => {
                requests += 1;
                match replies.next() {
                    Some(choices) => Event::ModelReplied {
                        response: LlmResponse::new(choices),
                    },
                    None => Event::Cancelled,
                }
            }
            Effect::Dispatch { call } => Event::CallCompleted {
                name: call.name,
                output: "ok".to_string(),
            },
        };

        let result = transition(&state, &context, event).expect("driver only sends valid events");
        if result.new_state.is_terminal() {
            assert!(
                result.effects.iter().all(|e| matches!(e, Effect::Append { .. })),
                "terminal transitions may only record messages"
            );
        }
        effects.extend(result.effects);
        state = result.new_state;
    }

    Run {
        conversation,
        final_state: state,
        requests,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_results_follow_their_calls(replies in proptest::collection::vec(arb_reply(), 0..12)) {
        let run = drive(LoopContext::default(), replies);
        prop_assert!(run.conversation.results_follow_calls());

        let messages = run.conversation.messages();
        for pair in messages.windows(2) {
            prop_assert!(!(pair[0].is_function_result() && pair[1].is_function_result()));
        }
    }

    #[test]
    fn prop_loop_always_terminates(replies in proptest::collection::vec(arb_reply(), 0..12)) {
        let run = drive(LoopContext::default(), replies);
        prop_assert!(run.final_state.is_terminal());
    }

    #[test]
    fn prop_iteration_cap_bounds_requests(
        limit in 1u32..6,
        replies in proptest::collection::vec(arb_reply(), 0..12),
    ) {
        let run = drive(LoopContext { max_iterations: Some(limit) }, replies);
        prop_assert!(run.requests <= limit as usize);
    }

    #[test]
    fn prop_done_answer_is_last_message(replies in proptest::collection::vec(arb_reply(), 0..12)) {
        let run = drive(LoopContext::default(), replies);
        if let LoopState::Done { answer } = &run.final_state {
            let last = run.conversation.last().expect("seeded conversation");
            prop_assert_eq!(&last.content, answer);
            prop_assert!(!answer.is_empty());
        }
    }

    #[test]
    fn prop_terminal_states_accept_nothing(answer in "[a-z]{1,10}") {
        let done = LoopState::Done { answer };
        let event = Event::ModelReplied { response: LlmResponse::new(vec![Choice::text("again")]) };
        prop_assert!(transition(&done, &LoopContext::default(), event).is_err());
    }
}
