// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agent Graph (C3) state. Two nodes — `agent` and `tools` — alternate over
// this shared state until the agent emits a plain-text (non-tool-call)
// message or the iteration cap is hit. Design note: the graph is a loop
// over explicit node objects rather than a chain of closures, so each
// node's pre/post conditions are independently testable.

use crate::domain::message::Message;

/// Why the graph loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The agent answered without requesting further tools.
    FinalAnswer,
    /// `max_iterations` was reached without a final answer.
    IterationLimitReached,
    /// The investigation's deadline elapsed mid-loop.
    TimedOut,
    /// The investigation was cancelled cooperatively.
    Cancelled,
}

/// Mutable state threaded through the agent/tools node loop.
#[derive(Debug, Clone)]
pub struct GraphState {
    pub messages: Vec<Message>,
    pub iteration: u32,
    pub max_iterations: u32,
}

impl GraphState {
    pub fn new(system_prompt: String, user_message: String, max_iterations: u32) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::human(user_message)],
            iteration: 0,
            max_iterations,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn last_ai_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| matches!(m, Message::Ai { .. }))
    }

    pub fn has_reached_iteration_limit(&self) -> bool {
        self.iteration >= self.max_iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::ToolCall;

    #[test]
    fn new_state_seeds_system_and_human_messages() {
        let state = GraphState::new("you are an SRE agent".into(), "pod is crashing".into(), 10);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.iteration, 0);
    }

    #[test]
    fn iteration_limit_detection() {
        let mut state = GraphState::new("sys".into(), "hi".into(), 2);
        assert!(!state.has_reached_iteration_limit());
        state.iteration = 2;
        assert!(state.has_reached_iteration_limit());
    }

    #[test]
    fn last_ai_message_finds_most_recent() {
        let mut state = GraphState::new("sys".into(), "hi".into(), 5);
        state.push(Message::ai_with_tool_calls(
            "",
            vec![ToolCall {
                id: "1".into(),
                name: "get_pod_logs".into(),
                arguments: serde_json::json!({}),
            }],
        ));
        state.push(Message::tool_result("1", "get_pod_logs", "OOMKilled"));
        state.push(Message::ai_text("root cause found"));

        let last = state.last_ai_message().unwrap();
        assert_eq!(last.text(), "root cause found");
    }
}
