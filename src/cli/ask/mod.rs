//! Ask command - answers one question on stdout

use clap::Args;
use futures::StreamExt;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::infrastructure::services::AnswerRequest;

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Indexed project (or `<project>__<feature>`)
    pub project_id: String,

    /// Question to answer
    pub question: String,

    /// Retrieval budget
    #[arg(long)]
    pub max_docs: Option<usize>,

    /// Prompt template variant, e.g. `flowchart_prompt`
    #[arg(long)]
    pub variant: Option<String>,
}

impl AskArgs {
    fn into_request(self) -> AnswerRequest {
        let mut request = AnswerRequest::new(self.project_id, self.question);
        if let Some(max_docs) = self.max_docs {
            request = request.with_max_docs(max_docs);
        }
        if let Some(variant) = self.variant {
            request = request.with_variant(variant);
        }
        request
    }
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::load_config(true);

    let shutdown = CancellationToken::new();
    let state = crate::build_app_state(&config, shutdown.clone()).await?;

    let cancel = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping answer");
            cancel.cancel();
        }
    });

    let mut fragments = state
        .answering
        .answer(args.into_request(), shutdown.child_token())
        .await?;

    let mut out = BufWriter::new(tokio::io::stdout());
    while let Some(fragment) = fragments.next().await {
        out.write_all(fragment?.as_bytes()).await?;
        out.flush().await?;
    }
    out.write_all(b"\n").await?;
    out.flush().await?;

    state.cache.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cli::{Cli, Command};

    #[test]
    fn test_parses_ask_options() {
        let cli = Cli::parse_from([
            "repo-qa",
            "ask",
            "shop",
            "Where is the cart total computed?",
            "--max-docs",
            "12",
            "--variant",
            "flowchart_prompt",
        ]);

        let Command::Ask(args) = cli.command else {
            panic!("expected ask command");
        };
        let request = args.into_request();

        assert_eq!(request.project_id, "shop");
        assert_eq!(request.max_docs, Some(12));
        assert_eq!(request.variant.as_deref(), Some("flowchart_prompt"));
    }
}
