//! Cache command - inspect or clear the persisted answer cache

use clap::{ArgGroup, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::domain::validate_project_id;

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Print cache statistics as JSON
    Stats {
        /// Limit to one project
        #[arg(long)]
        project: Option<String>,
    },

    /// Remove cached entries
    #[command(group(ArgGroup::new("target").required(true).args(["project", "embeddings", "all"])))]
    Clear {
        #[arg(long)]
        project: Option<String>,

        /// Only the question embedding memo
        #[arg(long)]
        embeddings: bool,

        /// Every project, the embedding memo and the counters
        #[arg(long)]
        all: bool,
    },
}

pub async fn run(command: CacheCommand) -> anyhow::Result<()> {
    let config = super::load_config(true);
    let state = crate::build_app_state(&config, CancellationToken::new()).await?;
    let cache = &state.cache;

    match command {
        CacheCommand::Stats { project } => {
            if let Some(ref id) = project {
                validate_project_id(id)?;
            }
            let stats = cache.stats(project.as_deref()).await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        CacheCommand::Clear {
            project,
            embeddings,
            all,
        } => {
            if all {
                cache.clear_all().await?;
                println!("All caches cleared");
            } else if embeddings {
                cache.clear_embeddings().await?;
                println!("Embedding cache cleared");
            } else if let Some(id) = project {
                validate_project_id(&id)?;
                if cache.clear_project(&id).await? {
                    println!("Cache cleared for project {}", id);
                } else {
                    println!("No cache to clear for project {}", id);
                }
            }
        }
    }

    Ok(())
}
