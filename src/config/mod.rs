//! Application configuration loaded from files and `APP__` environment variables

mod app_config;

pub use app_config::{
    AnsweringConfig, AppConfig, LogFormat, LoggingConfig, OllamaConfig, RetrievalConfig,
    ServerConfig, WarmupConfig,
};
