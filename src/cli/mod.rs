//! Command-line entry points
//!
//! - `serve`: HTTP API (default deployment mode)
//! - `ask`: answer one question and print it as it streams
//! - `unit-test`: synthesize a unit test for a feature-branch file
//! - `cache`: inspect or clear the answer cache

pub mod ask;
pub mod cache;
pub mod serve;
pub mod unit_test;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, LogFormat};
use crate::infrastructure::logging;

/// Question answering over indexed code repositories
#[derive(Parser)]
#[command(name = "repo-qa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer a question about an indexed project
    Ask(ask::AskArgs),

    /// Generate a unit test for a file changed on a feature branch
    UnitTest(unit_test::UnitTestArgs),

    /// Inspect or clear the answer cache
    Cache {
        #[command(subcommand)]
        command: cache::CacheCommand,
    },
}

/// Load configuration and install logging. One-shot commands log compactly
/// to stderr so stdout carries only the answer.
pub(crate) fn load_config(one_shot: bool) -> AppConfig {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().unwrap_or_default();
    if one_shot {
        config.logging.format = LogFormat::Compact;
    }
    logging::init_logging(&config.logging);

    config
}
