//! Prompt template storage

mod file_repository;

pub use file_repository::FilePromptRepository;
