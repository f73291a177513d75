//! Generation engine implementations

pub mod http_client;
mod ndjson;
mod ollama;

pub use http_client::{ByteStream, HttpClient, HttpClientTrait};
pub use ndjson::NdjsonDecoder;
pub use ollama::{OllamaLlmProvider, OllamaOptions};
