use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{get_config_dir, init_config, Config},
    gateway::HttpGateway,
};

use super::Commands;

/// Handle CLI subcommands. Returns true when the process should exit.
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing Adewin configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

/// Show version information
pub fn show_version() {
    println!("Adewin v{}", env!("CARGO_PKG_VERSION"));
    println!("   Terminal client for the Adewin campaign assistant");
}

/// Show backend and configuration status
async fn show_status(config: &Config) -> Result<()> {
    println!("Adewin Status:");
    println!();

    let gateway = HttpGateway::new(&config.gateway)?;
    match gateway.health_check().await {
        Some(status) if (200..400).contains(&status) => println!(
            "  {} Backend: reachable at {} (HTTP {})",
            "[OK]".green(),
            gateway.base_url(),
            status
        ),
        Some(status) => println!(
            "  {} Backend: {} answered with HTTP {}",
            "[WARN]".yellow(),
            gateway.base_url(),
            status
        ),
        None => println!(
            "  {} Backend: not reachable at {}",
            "[ERROR]".red(),
            gateway.base_url()
        ),
    }

    let config_path = get_config_dir()?.join("config.toml");
    if config_path.exists() {
        println!("  {} Configuration: {}", "[OK]".green(), config_path.display());
    } else {
        println!(
            "  {} Configuration: not found (using defaults)",
            "[WARNING]".yellow()
        );
    }

    println!("\n  Session:");
    println!("    • first turn: {:?}", config.session.first_turn);
    println!("    • in-flight guard: {:?}", config.session.in_flight);
    println!(
        "    • history sent with continuations: {}",
        config.gateway.send_history
    );

    println!();
    Ok(())
}
