//! Per-question conversation state

use crate::llm::{Message, MessageRole};

/// Ordered, append-only message log for one question
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Fresh conversation seeded with the system directive and the question
    pub fn seeded(system: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(question)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn roles(&self) -> Vec<MessageRole> {
        self.messages.iter().map(|m| m.role).collect()
    }

    /// Every function result directly follows an assistant turn that called
    /// the same function.
    pub fn results_follow_calls(&self) -> bool {
        self.messages.iter().enumerate().all(|(i, msg)| {
            if !msg.is_function_result() {
                return true;
            }
            let Some(previous) = i.checked_sub(1).and_then(|p| self.messages.get(p)) else {
                return false;
            };
            match (&previous.function_call, &msg.name) {
                (Some(call), Some(name)) => &call.name == name,
                _ => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FunctionCall;

    fn call(name: &str) -> Message {
        Message::function_call(FunctionCall {
            name: name.to_string(),
            arguments: "{}".to_string(),
        })
    }

    #[test]
    fn test_seeded() {
        let conv = Conversation::seeded("be brief", "weather?");
        assert_eq!(conv.roles(), vec![MessageRole::System, MessageRole::User]);
        assert_eq!(conv.messages()[1].content, "weather?");
    }

    #[test]
    fn test_results_follow_calls() {
        let mut conv = Conversation::seeded("s", "q");
        assert!(conv.results_follow_calls());

        conv.push(call("lookup"));
        conv.push(Message::function_result("lookup", "1"));
        assert!(conv.results_follow_calls());

        // A second result without its own call turn
        conv.push(Message::function_result("lookup", "2"));
        assert!(!conv.results_follow_calls());
    }

    #[test]
    fn test_result_name_must_match_call() {
        let mut conv = Conversation::seeded("s", "q");
        conv.push(call("lookup"));
        conv.push(Message::function_result("other", "1"));
        assert!(!conv.results_follow_calls());
    }
}
