use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

use crate::{
    app::{get_config_dir, load_config, load_config_file, Config},
    cli::{handle_command, Cli},
    gateway::{Gateway, HttpGateway, OfflineGateway},
    runtime::NonInteractiveRunner,
    session::SessionManager,
    tui::{run_ui, App},
    utils::{init_file_logger, init_logger},
};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = if let Some(config_path) = &cli.config {
            load_config_file(config_path)?
        } else {
            match load_config() {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("⚠️  Failed to load config: {}. Using defaults.", e);
                    Config::default()
                }
            }
        };

        if let Some(base_url) = &cli.base_url {
            config.gateway.base_url = base_url.clone();
        }

        Ok(Self { cli, config })
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<bool> {
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(true);
            }
        }

        if self.cli.prompt.is_empty() {
            self.run_interactive().await?;
            Ok(true)
        } else {
            self.run_non_interactive().await
        }
    }

    /// Build the backend gateway selected by the CLI
    fn build_gateway(&self) -> Result<(Arc<dyn Gateway>, String)> {
        if self.cli.offline {
            return Ok((Arc::new(OfflineGateway::new()), "offline".to_string()));
        }

        let gateway = HttpGateway::new(&self.config.gateway)
            .context("Failed to create the backend client")?;
        let backend = gateway.base_url().to_string();
        Ok((Arc::new(gateway), backend))
    }

    /// Run the prompts and print the transcript. Returns false if any turn failed.
    async fn run_non_interactive(&self) -> Result<bool> {
        if self.cli.verbose {
            init_logger();
        }

        let (gateway, backend) = self.build_gateway()?;
        let mut runner = NonInteractiveRunner::new(gateway, backend, self.config.session.clone());

        let result = runner.execute(&self.cli.prompt).await;
        println!("{}", runner.format_result(&result, self.cli.output_format));

        Ok(result.errors.is_empty())
    }

    async fn run_interactive(&self) -> Result<()> {
        if self.cli.verbose {
            let log_path = get_config_dir()?.join("adewin.log");
            init_file_logger(&log_path)
                .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
            println!("📝 Logging to {}", log_path.display());
        }

        let (gateway, backend) = self.build_gateway()?;
        println!("💬 Starting Adewin with backend: {}", backend.green());
        info!(%backend, "interactive session starting");

        let manager = SessionManager::new(self.config.session.clone());
        let app = App::new(manager, backend, self.config.ui.show_sidebar);

        run_ui(app, gateway).await
    }
}
