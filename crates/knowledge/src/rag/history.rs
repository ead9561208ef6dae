//! Chat history.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

/// Append-only conversation log, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    turns: Vec<ConversationTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: TurnRole, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// The last `window` turns.
    pub fn recent(&self, window: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(window);
        &self.turns[start..]
    }

    /// The last `window` turns as `Human:`/`Assistant:` lines.
    pub fn render_recent(&self, window: usize) -> String {
        self.recent(window)
            .iter()
            .map(|turn| match turn.role {
                TurnRole::User => format!("Human: {}", turn.content),
                TurnRole::Assistant => format!("Assistant: {}", turn.content),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_recent_window() {
        let mut history = ChatHistory::new();
        for i in 0..4 {
            history.push(TurnRole::User, format!("q{}", i));
            history.push(TurnRole::Assistant, format!("a{}", i));
        }

        assert_eq!(history.len(), 8);
        assert_eq!(
            history.render_recent(6),
            "Human: q1\nAssistant: a1\nHuman: q2\nAssistant: a2\nHuman: q3\nAssistant: a3"
        );
    }

    #[test]
    fn test_window_larger_than_history() {
        let mut history = ChatHistory::new();
        history.push(TurnRole::User, "hi");
        assert_eq!(history.recent(6).len(), 1);
        assert_eq!(ChatHistory::new().render_recent(6), "");
    }
}
