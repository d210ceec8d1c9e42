//! Retrieved knowledge-base context

use serde::{Deserialize, Serialize};

/// Separator placed between passages when rendering context
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Rendered context when nothing was retrieved
pub const EMPTY_CONTEXT_SENTINEL: &str = "No knowledge base available.";

/// Ordered passages returned by the retrieval stage
///
/// An empty context is valid and renders as [`EMPTY_CONTEXT_SENTINEL`],
/// never as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    passages: Vec<String>,
}

impl RetrievedContext {
    /// Build from passages in rank order, dropping blank ones
    pub fn from_passages(passages: Vec<String>) -> Self {
        Self {
            passages: passages
                .into_iter()
                .filter(|p| !p.trim().is_empty())
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Text handed to the generation stage
    pub fn render(&self) -> String {
        if self.passages.is_empty() {
            EMPTY_CONTEXT_SENTINEL.to_string()
        } else {
            self.passages.join(CONTEXT_SEPARATOR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_renders_sentinel() {
        let ctx = RetrievedContext::empty();
        assert!(ctx.is_empty());
        assert_eq!(ctx.render(), "No knowledge base available.");
    }

    #[test]
    fn test_passages_joined_in_order() {
        let ctx = RetrievedContext::from_passages(vec![
            "Early blight causes rings.".to_string(),
            "   ".to_string(),
            "Use copper fungicide.".to_string(),
        ]);
        assert_eq!(ctx.passages().len(), 2);
        assert_eq!(
            ctx.render(),
            "Early blight causes rings.\n\nUse copper fungicide."
        );
    }
}
