use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::SemanticCacheConfig;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub cache: SemanticCacheConfig,
    #[serde(default)]
    pub answering: AnsweringConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub warmup: WarmupConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    /// Single-line output on stderr, used by the one-shot CLI commands
    Compact,
}

/// Answer generation settings
#[derive(Debug, Clone, Deserialize)]
pub struct AnsweringConfig {
    /// Directory holding `<variant>.txt` prompt templates and sample question lists
    #[serde(default = "default_prompt_dir")]
    pub prompt_dir: PathBuf,
    #[serde(default = "default_variant")]
    pub default_variant: String,
    /// Retrieval budget when a request does not name one
    #[serde(default = "default_max_docs")]
    pub default_max_docs: usize,
    /// Variants answered in one piece and cleaned as diagrams
    #[serde(default = "default_diagram_variants")]
    pub diagram_variants: Vec<String>,
    #[serde(default = "default_diagram_keyword")]
    pub diagram_keyword: String,
    #[serde(default = "default_diagram_mode_token")]
    pub diagram_mode_token: String,
    /// Characters per fragment when replaying a cached answer
    #[serde(default = "default_replay_fragment_chars")]
    pub replay_fragment_chars: usize,
    #[serde(default = "default_replay_delay_ms")]
    pub replay_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Directory with one `<project>/index.json` per indexed project
    #[serde(default = "default_index_root")]
    pub index_root: PathBuf,
    #[serde(default = "default_max_open_stores")]
    pub max_open_stores: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Longest wait for any single read, so long streams are never cut
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

/// Background cache warming
#[derive(Debug, Clone, Deserialize)]
pub struct WarmupConfig {
    #[serde(default = "default_warmup_workers")]
    pub workers: usize,
    #[serde(default = "default_warmup_delay")]
    pub start_delay_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_prompt_dir() -> PathBuf {
    PathBuf::from("./prompts")
}

fn default_variant() -> String {
    "code_prompt".to_string()
}

fn default_max_docs() -> usize {
    5
}

fn default_diagram_variants() -> Vec<String> {
    vec!["flowchart_prompt".to_string()]
}

fn default_diagram_keyword() -> String {
    "flowchart".to_string()
}

fn default_diagram_mode_token() -> String {
    "TD".to_string()
}

fn default_replay_fragment_chars() -> usize {
    20
}

fn default_replay_delay_ms() -> u64 {
    300
}

fn default_index_root() -> PathBuf {
    PathBuf::from("./indexed_projects")
}

fn default_max_open_stores() -> u64 {
    20
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_read_timeout_secs() -> u64 {
    300
}

fn default_warmup_workers() -> usize {
    2
}

fn default_warmup_delay() -> u64 {
    3
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AnsweringConfig {
    fn default() -> Self {
        Self {
            prompt_dir: default_prompt_dir(),
            default_variant: default_variant(),
            default_max_docs: default_max_docs(),
            diagram_variants: default_diagram_variants(),
            diagram_keyword: default_diagram_keyword(),
            diagram_mode_token: default_diagram_mode_token(),
            replay_fragment_chars: default_replay_fragment_chars(),
            replay_delay_ms: default_replay_delay_ms(),
        }
    }
}

impl AnsweringConfig {
    pub fn is_diagram_variant(&self, variant: &str) -> bool {
        self.diagram_variants.iter().any(|v| v == variant)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_root: default_index_root(),
            max_open_stores: default_max_open_stores(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            workers: default_warmup_workers(),
            start_delay_secs: default_warmup_delay(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_uses_defaults() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.cache.max_per_project, 300);
        assert_eq!(config.answering.default_variant, "code_prompt");
        assert_eq!(config.answering.replay_fragment_chars, 20);
        assert_eq!(config.retrieval.max_open_stores, 20);
        assert_eq!(config.warmup.workers, 2);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let source = r#"
            [cache]
            max_per_project = 50

            [logging]
            format = "json"

            [answering]
            diagram_variants = ["flowchart_prompt", "sequence_prompt"]
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.cache.max_per_project, 50);
        assert_eq!(config.cache.max_total_embeddings, 3000);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert!(config.answering.is_diagram_variant("sequence_prompt"));
        assert!(!config.answering.is_diagram_variant("code_prompt"));
    }
}
