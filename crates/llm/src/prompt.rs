//! Prompt building
//!
//! Every request is sent as: the AgroSaathi system prompt, the recent
//! conversation turns, then one user message carrying the retrieved
//! knowledge, the image analysis and the English query.

use agrosaathi_core::{Turn, TurnRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// System prompt sent with every generation request
pub const AGROSAATHI_SYSTEM_PROMPT: &str = "You are AgroSaathi, an expert agricultural AI assistant. You help Indian farmers with:
- Crop disease identification and treatment
- Farming best practices and techniques
- Soil health and fertilizer recommendations
- Weather-related farming advice
- Market information and crop selection
- Pest management solutions

Be concise, practical, and give actionable advice. If an image is provided, analyze it for crop/plant health issues.";

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl From<TurnRole> for Role {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => Role::User,
            TurnRole::Assistant => Role::Assistant,
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

/// Builds the message list for one generation request
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    messages: Vec<Message>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the AgroSaathi system prompt
    pub fn agrosaathi() -> Self {
        Self::new().system_prompt(AGROSAATHI_SYSTEM_PROMPT)
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.messages.push(Message::system(prompt));
        self
    }

    /// Append prior turns, oldest first
    pub fn with_history(mut self, history: &[Turn]) -> Self {
        self.messages.extend(
            history
                .iter()
                .filter(|t| !t.content.trim().is_empty())
                .map(Message::from),
        );
        self
    }

    /// Append the final user message
    pub fn user_query(mut self, context: &str, auxiliary_info: &str, query: &str) -> Self {
        self.messages
            .push(Message::user(render_user_query(context, auxiliary_info, query)));
        self
    }

    pub fn build(self) -> Vec<Message> {
        self.messages
    }
}

/// Render the final user message
pub fn render_user_query(context: &str, auxiliary_info: &str, query: &str) -> String {
    let mut out = String::new();
    if !context.trim().is_empty() {
        out.push_str("Knowledge base context:\n");
        out.push_str(context.trim());
        out.push_str("\n\n");
    }
    if !auxiliary_info.trim().is_empty() {
        out.push_str("Image analysis:\n");
        out.push_str(auxiliary_info.trim());
        out.push_str("\n\n");
    }
    out.push_str("User query: ");
    out.push_str(query.trim());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_order() {
        let history = vec![
            Turn::user("What is urea?"),
            Turn::assistant("A nitrogen fertilizer."),
        ];
        let messages = PromptBuilder::agrosaathi()
            .with_history(&history)
            .user_query("Urea contains 46% nitrogen.", "No image provided.", "How much per acre?")
            .build();

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with("You are AgroSaathi"));
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3].role, Role::User);
        assert!(messages[3].content.ends_with("User query: How much per acre?"));
    }

    #[test]
    fn test_user_query_sections() {
        let text = render_user_query(
            "Neem oil controls aphids.",
            "Detected Class: Tomato___Late_blight (Confidence: 0.91)",
            "what should I spray",
        );
        assert_eq!(
            text,
            "Knowledge base context:\nNeem oil controls aphids.\n\n\
             Image analysis:\nDetected Class: Tomato___Late_blight (Confidence: 0.91)\n\n\
             User query: what should I spray"
        );
    }

    #[test]
    fn test_blank_sections_omitted() {
        assert_eq!(render_user_query("", " ", "hello"), "User query: hello");
    }

    #[test]
    fn test_blank_history_turns_skipped() {
        let history = vec![Turn::user(""), Turn::assistant("ok")];
        let messages = PromptBuilder::new().with_history(&history).build();
        assert_eq!(messages, vec![Message::assistant("ok")]);
    }
}
