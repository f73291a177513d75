//! Cleanup of generated diagram text.
//!
//! Models tend to wrap diagrams in markdown fences or prefix them with prose;
//! the cleaner strips the fences and, when needed, keeps only the span that
//! starts at `<keyword> <mode>` (by default `flowchart TD`).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainError;

static MERMAID_FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^```mermaid\s*\n?").unwrap());
static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^```\s*\n?").unwrap());
static FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)\n?```\s*$").unwrap());
static FENCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*```\s*$").unwrap());

#[derive(Debug, Clone)]
pub struct DiagramCleaner {
    keyword: String,
    span: Regex,
}

impl DiagramCleaner {
    pub fn new(keyword: &str, mode_token: &str) -> Result<Self, DomainError> {
        let pattern = format!(
            r"(?s)({}\s+{}.*?)(?:\n\s*\z|\z)",
            regex::escape(keyword),
            regex::escape(mode_token)
        );
        let span = Regex::new(&pattern)
            .map_err(|e| DomainError::configuration(format!("Invalid diagram keyword: {}", e)))?;

        Ok(Self {
            keyword: keyword.to_string(),
            span,
        })
    }

    pub fn clean(&self, raw: &str) -> String {
        let text = raw.trim();
        let text = MERMAID_FENCE_OPEN.replace_all(text, "");
        let text = FENCE_OPEN.replace_all(&text, "");
        let text = FENCE_CLOSE.replace_all(&text, "");
        let text = FENCE_LINE.replace_all(&text, "");
        let text = text.trim();

        if text.starts_with(&self.keyword) {
            return text.to_string();
        }

        match self.span.captures(text).and_then(|c| c.get(1)) {
            Some(m) => m.as_str().trim().to_string(),
            None => text.to_string(),
        }
    }
}

impl Default for DiagramCleaner {
    fn default() -> Self {
        Self {
            keyword: "flowchart".to_string(),
            span: Regex::new(r"(?s)(flowchart\s+TD.*?)(?:\n\s*\z|\z)").unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_mermaid_fence() {
        let cleaner = DiagramCleaner::default();

        let cleaned = cleaner.clean("```mermaid\nflowchart TD\n  A --> B\n```");

        assert_eq!(cleaned, "flowchart TD\n  A --> B");
    }

    #[test]
    fn test_strips_generic_fence_and_whitespace() {
        let cleaner = DiagramCleaner::default();

        let cleaned = cleaner.clean("  ```\nflowchart TD\nA-->B\n```  \n");

        assert_eq!(cleaned, "flowchart TD\nA-->B");
    }

    #[test]
    fn test_extracts_span_after_prose() {
        let cleaner = DiagramCleaner::default();

        let cleaned = cleaner.clean("Here is the diagram:\nflowchart TD\n  A --> B\n\n");

        assert_eq!(cleaned, "flowchart TD\n  A --> B");
    }

    #[test]
    fn test_leaves_text_without_diagram() {
        let cleaner = DiagramCleaner::default();

        assert_eq!(cleaner.clean("no diagram here"), "no diagram here");
    }

    #[test]
    fn test_custom_keyword_and_mode() {
        let cleaner = DiagramCleaner::new("graph", "LR").unwrap();

        let cleaned = cleaner.clean("Sure!\ngraph LR\n  X --> Y");

        assert_eq!(cleaned, "graph LR\n  X --> Y");
    }
}
