use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// How the answer for a prompt variant is produced and delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// Streamed fragment by fragment as the engine produces them
    Text,
    /// Generated in full, cleaned up, delivered as one fragment
    Diagram,
}

/// Name of a prompt template (the file stem under the prompt directory)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PromptVariant(String);

impl PromptVariant {
    /// Variant names map to file names, so only `[A-Za-z0-9_-]` is accepted.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();

        if name.is_empty() || name.len() > 64 {
            return Err(DomainError::validation(format!(
                "Prompt variant must be 1-64 characters, got {}",
                name.len()
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(DomainError::validation(format!(
                "Invalid prompt variant '{}'",
                name
            )));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_variants() {
        assert_eq!(PromptVariant::new("code_prompt").unwrap().as_str(), "code_prompt");
        assert!(PromptVariant::new("unit-test-java").is_ok());
    }

    #[test]
    fn test_rejects_path_like_names() {
        assert!(PromptVariant::new("../secrets").is_err());
        assert!(PromptVariant::new("a/b").is_err());
        assert!(PromptVariant::new("").is_err());
    }
}
