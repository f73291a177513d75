//! Prompt template parsing and rendering
//!
//! Supports placeholder syntax: `{name}`
//! - `{name}` - Required variable, error if not provided
//! - `{{` / `}}` - Literal braces
//!
//! Braces that do not form a placeholder (for example a JSON sample inside
//! the template) are kept verbatim.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Matches escaped braces or a `{identifier}` placeholder
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap()
});

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing required variable: {name}")]
    MissingVariable { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Variable(String),
}

/// A parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Original template content
    content: String,
    segments: Vec<Segment>,
    /// Distinct variable names, in order of first appearance
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Parse a template string and extract variables
    pub fn parse(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut segments = Vec::new();
        let mut variables: Vec<String> = Vec::new();
        let mut text = String::new();
        let mut last = 0;

        for cap in TOKEN_PATTERN.captures_iter(&content) {
            let Some(whole) = cap.get(0) else { continue };
            text.push_str(&content[last..whole.start()]);
            last = whole.end();

            match cap.get(1) {
                Some(name) => {
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    let name = name.as_str().to_string();
                    if !variables.contains(&name) {
                        variables.push(name.clone());
                    }
                    segments.push(Segment::Variable(name));
                }
                None => text.push_str(&whole.as_str()[..1]),
            }
        }

        text.push_str(&content[last..]);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Self {
            content,
            segments,
            variables,
        }
    }

    /// Get the original template content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get all variable names
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Render the template with provided values; extra values are ignored
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<String, TemplateError> {
        let mut result = String::with_capacity(self.content.len());

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => result.push_str(text),
                Segment::Variable(name) => match values.get(name.as_str()) {
                    Some(value) => result.push_str(value),
                    None => {
                        return Err(TemplateError::MissingVariable { name: name.clone() });
                    }
                },
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_parse_no_variables() {
        let template = PromptTemplate::parse("Hello, world!");
        assert!(template.variables().is_empty());
        assert_eq!(template.render(&HashMap::new()).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_parse_duplicate_variables() {
        let template = PromptTemplate::parse("{question} and {question} again");
        assert_eq!(template.variables(), &["question".to_string()]);
    }

    #[test]
    fn test_render_context_and_question() {
        let template = PromptTemplate::parse("Context:\n{context}\n\nQuestion: {question}\nAnswer:");

        let result = template
            .render(&values(&[("context", "fn main() {}"), ("question", "What runs first?")]))
            .unwrap();

        assert_eq!(result, "Context:\nfn main() {}\n\nQuestion: What runs first?\nAnswer:");
    }

    #[test]
    fn test_render_does_not_expand_values() {
        let template = PromptTemplate::parse("{context}");

        let result = template.render(&values(&[("context", "{question}")])).unwrap();

        assert_eq!(result, "{question}");
    }

    #[test]
    fn test_render_missing_variable() {
        let template = PromptTemplate::parse("Feature: {feature_code}\nBase: {base_code}");

        let result = template.render(&values(&[("feature_code", "class A {}")]));

        assert_eq!(
            result,
            Err(TemplateError::MissingVariable {
                name: "base_code".to_string()
            })
        );
    }

    #[test]
    fn test_escaped_braces() {
        let template = PromptTemplate::parse("Return JSON like {{\"test\": \"...\"}} for {question}");

        let result = template.render(&values(&[("question", "x")])).unwrap();

        assert_eq!(result, "Return JSON like {\"test\": \"...\"} for x");
    }

    #[test]
    fn test_unmatched_braces_are_literal() {
        let template = PromptTemplate::parse("if (a) { return {question}; }");

        let result = template.render(&values(&[("question", "b")])).unwrap();

        assert_eq!(result, "if (a) { return b; }");
    }
}
