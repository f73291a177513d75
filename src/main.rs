use clap::Parser;
use repo_qa::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Ask(args) => cli::ask::run(args).await,
        Command::UnitTest(args) => cli::unit_test::run(args).await,
        Command::Cache { command } => cli::cache::run(command).await,
    }
}
