//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.config/gpterm/gpterm.toml`. If missing on first run, a
//! file holding every default is generated and the user is asked to fill in
//! the API key before chatting.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// File Config (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub http_proxy: Option<String>,
    /// Request timeout in seconds.
    pub time_out: Option<u64>,
    pub endpoint: Option<String>,
    pub system_prompt: Option<String>,
}

impl FileConfig {
    /// Every key filled with its default, written out on first run.
    pub fn with_defaults() -> Self {
        Self {
            api_key: Some(String::new()),
            model: Some(DEFAULT_MODEL.to_string()),
            http_proxy: Some(String::new()),
            time_out: Some(DEFAULT_TIMEOUT_SECS),
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SYSTEM_PROMPT: &str = "Make sure all your responses are in Markdown format.";

const CONFIG_DIR: &str = ".config/gpterm";
const CONFIG_FILE: &str = "gpterm.toml";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    /// `None` when no proxy is configured (empty string in the file).
    pub http_proxy: Option<String>,
    pub timeout: Duration,
    pub system_prompt: String,
}

/// Values coming from command-line flags. `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub model: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    NoHomeDir,
    #[error("config I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Not a failure: the default file was just written and needs an API key.
    #[error(
        "No config file found.\nA default config file is created at [{}].\nPlease set the apiKey (and optionally the httpProxy) before chatting with bot.",
        .0.display()
    )]
    DefaultCreated(PathBuf),
    #[error(
        "Please set the apiKey in {} (or GPTERM_API_KEY) before chatting with bot.",
        .0.display()
    )]
    MissingApiKey(PathBuf),
    #[error("invalid HTTP client settings: {0}")]
    Client(String),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.config/gpterm/gpterm.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load the config file at `path`.
///
/// If the file doesn't exist, writes every default to it and returns
/// `ConfigError::DefaultCreated` so the caller can tell the user where it is.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path)?;
        return Err(ConfigError::DefaultCreated(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: FileConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Writes a config file holding every default value at the given path.
fn generate_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let body = toml::to_string_pretty(&FileConfig::with_defaults())?;
    let content = format!("# gpterm configuration\n\n{body}");
    fs::write(path, content).map_err(io_err)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `path` is only used to point the user at the right file in error messages.
pub fn resolve(
    config: &FileConfig,
    cli: &CliOverrides,
    path: &Path,
) -> Result<ChatConfig, ConfigError> {
    resolve_with_env(config, cli, path, |name| std::env::var(name).ok())
}

/// [`resolve`] with the environment read through `lookup`.
pub fn resolve_with_env(
    config: &FileConfig,
    cli: &CliOverrides,
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ChatConfig, ConfigError> {
    let env_var = |name: &str| non_empty(lookup(name));

    // API key: env → config
    let api_key = env_var("GPTERM_API_KEY")
        .or_else(|| env_var("OPENAI_API_KEY"))
        .or_else(|| non_empty(config.api_key.clone()))
        .ok_or_else(|| ConfigError::MissingApiKey(path.to_path_buf()))?;

    // Model: CLI → env → config → default
    let model = cli
        .model
        .clone()
        .or_else(|| env_var("GPTERM_MODEL"))
        .or_else(|| non_empty(config.model.clone()))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    // Proxy: env → config; empty means direct connection
    let http_proxy =
        env_var("GPTERM_HTTP_PROXY").or_else(|| non_empty(config.http_proxy.clone()));

    let timeout = Duration::from_secs(
        config
            .time_out
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    );

    let resolved = ChatConfig {
        endpoint: non_empty(config.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        model,
        api_key,
        http_proxy,
        timeout,
        system_prompt: config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
    };
    debug!(
        "Resolved config: endpoint={}, model={}, proxy={:?}, timeout={:?}",
        resolved.endpoint, resolved.model, resolved.http_proxy, resolved.timeout
    );
    Ok(resolved)
}

/// Converts an empty string to None, non-empty to Some.
fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}
