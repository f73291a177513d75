//! Prompt domain - templates, variants and diagram output cleanup

mod diagram;
mod repository;
mod template;
mod variant;

pub use diagram::DiagramCleaner;
pub use repository::PromptRepository;
pub use template::{PromptTemplate, TemplateError};
pub use variant::{OutputShape, PromptVariant};

#[cfg(test)]
pub use repository::mock::MockPromptRepository;
