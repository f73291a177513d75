//! Unit-test command - prints a synthesized test for one file

use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, Args)]
pub struct UnitTestArgs {
    /// Feature-branch index, `<project>__<feature>`
    pub feature_id: String,

    /// File changed on the branch, e.g. `OrderService.java`
    pub file_name: String,
}

pub async fn run(args: UnitTestArgs) -> anyhow::Result<()> {
    let config = super::load_config(true);
    let state = crate::build_app_state(&config, CancellationToken::new()).await?;

    match state
        .test_synthesis
        .synthesize_test(&args.feature_id, &args.file_name)
        .await?
    {
        Some(test) => println!("{}", test.content),
        None => warn!(file = %args.file_name, "Base project has no code for this file"),
    }

    state.cache.shutdown().await;
    Ok(())
}
