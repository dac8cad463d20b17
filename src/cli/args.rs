use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "adewin")]
#[command(version)]
#[command(about = "Chat with the Adewin campaign assistant", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output (logs to stderr, or to a file while the UI runs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Backend base URL, overrides the configuration
    #[arg(long)]
    pub base_url: Option<String>,

    /// Answer from canned data instead of the backend
    #[arg(long)]
    pub offline: bool,

    /// Non-interactive prompt; repeat to send several turns in one chat
    #[arg(short, long)]
    pub prompt: Vec<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Start a chat session (default)
    Chat,
    /// Show version information
    Version,
    /// Check whether the backend is reachable
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text transcript
    Text,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_prompts() {
        let cli = Cli::parse_from(["adewin", "-p", "Hello", "--prompt", "More", "--offline"]);
        assert_eq!(cli.prompt, vec!["Hello", "More"]);
        assert!(cli.offline);
        assert_eq!(cli.output_format, OutputFormat::Text);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_subcommand_and_format() {
        let cli = Cli::parse_from(["adewin", "--output-format", "json", "status"]);
        assert_eq!(cli.output_format, OutputFormat::Json);
        assert!(matches!(cli.command, Some(Commands::Status)));
    }
}
