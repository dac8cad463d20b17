use anyhow::Result;
use clap::Parser;

use adewin::{cli::Cli, runtime::Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let orchestrator = Orchestrator::new(cli)?;
    let succeeded = orchestrator.run().await?;

    // Exit with appropriate code
    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}
