use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    CONTINUE_CONVERSATION_PATH, DEFAULT_GATEWAY_URL, HTTP_REQUEST_TIMEOUT_SECS,
    START_CONVERSATION_PATH,
};
use crate::session::{FirstTurnPolicy, InFlightPolicy};
use crate::utils::AdewinError;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Session manager policies
    #[serde(default)]
    pub session: SessionConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UIConfig,
}

/// Backend gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Backend base URL
    pub base_url: String,
    /// Path of the "start conversation" endpoint
    pub start_path: String,
    /// Path of the "continue conversation" endpoint
    pub chat_path: String,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Transmit the full textual history with continuation calls
    pub send_history: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            start_path: START_CONVERSATION_PATH.to_string(),
            chat_path: CONTINUE_CONVERSATION_PATH.to_string(),
            request_timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
            send_history: false,
        }
    }
}

/// Session manager policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How a turn is classified as first-turn
    pub first_turn: FirstTurnPolicy,
    /// Scope of the in-flight send guard
    pub in_flight: InFlightPolicy,
    /// Hand the temporary chat's session to the chat it is promoted into
    pub carry_session_on_promote: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            first_turn: FirstTurnPolicy::EmptyHistory,
            in_flight: InFlightPolicy::Global,
            carry_session_on_promote: true,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UIConfig {
    /// Show the chat list sidebar when chats exist
    pub show_sidebar: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self { show_sidebar: true }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    let global_config = get_config_dir()?.join("config.toml");
    let local_config = PathBuf::from(".adewin/config.toml");

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if global_config.exists() {
        figment = figment.merge(Toml::file(&global_config));
    }

    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    // ADEWIN_GATEWAY__BASE_URL -> gateway.base_url
    figment = figment.merge(Env::prefixed("ADEWIN_").split("__"));

    figment.extract().context("Failed to load configuration")
}

/// Load configuration from a single TOML file, on top of the defaults
pub fn load_config_file(path: &Path) -> Result<Config, AdewinError> {
    if !path.exists() {
        return Err(AdewinError::ConfigError(format!(
            "{} does not exist",
            path.display()
        )));
    }

    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()
        .map_err(|e| AdewinError::ConfigError(e.to_string()))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "adewin") {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("adewin"))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<()> {
    let config_file = get_config_dir()?.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
        println!("Created default configuration at: {}", config_file.display());
    }

    let local_example = PathBuf::from(".adewin/config.toml.example");
    if !local_example.exists() {
        if let Some(parent) = local_example.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let example_config = r#"# Adewin Project Configuration
# This file overrides global settings for this directory

[gateway]
base_url = "http://localhost:8000"
request_timeout_secs = 60
send_history = false

[session]
first_turn = "empty_history"
in_flight = "global"
carry_session_on_promote = true
"#;
        std::fs::write(&local_example, example_config)?;
        println!("Created example configuration at: {}", local_example.display());
    }

    Ok(())
}
