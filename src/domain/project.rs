//! Project identifiers

use crate::domain::DomainError;

/// Separator between the base project and a feature branch in an identifier
pub const FEATURE_SEPARATOR: &str = "__";

const MAX_PROJECT_ID_LEN: usize = 128;

/// Project identifiers name directories and files, so they are limited to
/// `[A-Za-z0-9._-]`, may not start with a dot and may not be empty.
pub fn validate_project_id(project_id: &str) -> Result<(), DomainError> {
    if project_id.is_empty() || project_id.len() > MAX_PROJECT_ID_LEN {
        return Err(DomainError::validation(format!(
            "Project id must be 1-{} characters",
            MAX_PROJECT_ID_LEN
        )));
    }

    let allowed = project_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if !allowed || project_id.starts_with('.') {
        return Err(DomainError::validation(format!(
            "Invalid project id '{}'",
            project_id
        )));
    }

    Ok(())
}

/// `shop__feature-x` -> `shop`; identifiers without a feature part are returned as is
pub fn base_project_id(project_id: &str) -> &str {
    project_id
        .split_once(FEATURE_SEPARATOR)
        .map(|(base, _)| base)
        .unwrap_or(project_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_project_ids() {
        assert!(validate_project_id("shop").is_ok());
        assert!(validate_project_id("shop__feature-x").is_ok());
        assert!(validate_project_id("repo.v2_main").is_ok());
    }

    #[test]
    fn test_invalid_project_ids() {
        assert!(validate_project_id("").is_err());
        assert!(validate_project_id("../etc").is_err());
        assert!(validate_project_id(".hidden").is_err());
        assert!(validate_project_id("a/b").is_err());
        assert!(validate_project_id(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_base_project_id() {
        assert_eq!(base_project_id("shop__feature-x"), "shop");
        assert_eq!(base_project_id("shop__a__b"), "shop");
        assert_eq!(base_project_id("shop"), "shop");
    }
}
