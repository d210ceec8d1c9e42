//! Conversation turns exchanged with the frontend

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    #[serde(alias = "bot", alias = "model")]
    Assistant,
}

/// A single prior message, always in English
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Keep only the most recent `max_turns` non-empty turns, preserving order
pub fn recent_turns(history: &[Turn], max_turns: usize) -> Vec<Turn> {
    let usable: Vec<&Turn> = history
        .iter()
        .filter(|t| !t.content.trim().is_empty())
        .collect();
    let skip = usable.len().saturating_sub(max_turns);
    usable.into_iter().skip(skip).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_deserialize_roles() {
        let turns: Vec<Turn> = serde_json::from_str(
            r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"},{"role":"bot","content":"x"}]"#,
        )
        .unwrap();
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[1].role, TurnRole::Assistant);
        assert_eq!(turns[2].role, TurnRole::Assistant);
    }

    #[test]
    fn test_recent_turns_keeps_tail() {
        let history = vec![
            Turn::user("one"),
            Turn::assistant("two"),
            Turn::user("  "),
            Turn::user("three"),
        ];
        let recent = recent_turns(&history, 2);
        assert_eq!(recent, vec![Turn::assistant("two"), Turn::user("three")]);
        assert!(recent_turns(&history, 0).is_empty());
    }
}
