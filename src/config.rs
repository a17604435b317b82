use crate::error::{GitspaceError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// The base config directory name under ~/.config/
const CONFIG_DIR_NAME: &str = "gitspaces";

/// Environment variable that overrides `base_url` from the config file.
pub const BASE_URL_ENV: &str = "GITSPACES_BASE_URL";

// ============================================================================
// Client Configuration
// ============================================================================

/// Connection and behaviour settings for the gitspaces client.
///
/// Missing fields in a config file fall back to their defaults, so a file
/// containing only the account/org/project scope is enough to get started.
///
/// # Example
///
/// ```toml
/// base_url = "https://app.harness.io/gateway"
/// console_url = "https://app.harness.io/ng"
/// account = "my-account"
/// org = "default"
/// project = "my-project"
/// token_env = "GITSPACES_TOKEN"
/// request_timeout_secs = 30
/// poll_interval_ms = 250
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the API gateway. The CDE API lives under `/cde/api/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Root of the web console, used to print detail and edit links.
    #[serde(default = "default_console_url")]
    pub console_url: String,

    #[serde(default)]
    pub account: String,

    #[serde(default = "default_org")]
    pub org: String,

    #[serde(default)]
    pub project: String,

    /// Name of the environment variable holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Upper bound on a single start/stop or delete call.
    ///
    /// A call that has not settled within this window is reported as failed
    /// and its row becomes interactive again.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How often the terminal view checks for finished calls and input.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_base_url() -> String {
    "https://app.harness.io/gateway".to_string()
}

fn default_console_url() -> String {
    "https://app.harness.io/ng".to_string()
}

fn default_org() -> String {
    "default".to_string()
}

fn default_token_env() -> String {
    "GITSPACES_TOKEN".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    250
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            console_url: default_console_url(),
            account: String::new(),
            org: default_org(),
            project: String::new(),
            token_env: default_token_env(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Config {
    /// Apply environment overrides on top of file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                self.base_url = base_url.trim().to_string();
            }
        }
        self
    }

    /// Set a single key from its string form, as used by `config set`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "base_url" => self.base_url = value.to_string(),
            "console_url" => self.console_url = value.to_string(),
            "account" => self.account = value.to_string(),
            "org" => self.org = value.to_string(),
            "project" => self.project = value.to_string(),
            "token_env" => self.token_env = value.to_string(),
            "request_timeout_secs" => self.request_timeout_secs = parse_u64(key, value)?,
            "poll_interval_ms" => self.poll_interval_ms = parse_u64(key, value)?,
            _ => {
                return Err(GitspaceError::Config(format!(
                    "Unknown config key '{}'. Valid keys: {}",
                    key,
                    VALID_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

/// Keys accepted by [`Config::set_value`].
pub const VALID_KEYS: &[&str] = &[
    "base_url",
    "console_url",
    "account",
    "org",
    "project",
    "token_env",
    "request_timeout_secs",
    "poll_interval_ms",
];

fn parse_u64(key: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        GitspaceError::Config(format!(
            "Invalid value for '{}': expected a non-negative integer, got '{}'",
            key, value
        ))
    })
}

// ============================================================================
// Config Validation
// ============================================================================

use std::error::Error;
use std::fmt;

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One of the scope identifiers is empty.
    MissingIdentifier(&'static str),
    /// `base_url` is not an http(s) URL.
    InvalidBaseUrl(String),
    /// `request_timeout_secs` is zero, which would fail every call.
    ZeroTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingIdentifier(field) => write!(
                f,
                "`{field}` is not set. Run `gitspaces config set {field} <value>`"
            ),
            ConfigError::InvalidBaseUrl(url) => write!(
                f,
                "`base_url` must start with http:// or https:// (got `{url}`)"
            ),
            ConfigError::ZeroTimeout => {
                write!(f, "`request_timeout_secs` must be greater than zero")
            }
        }
    }
}

impl Error for ConfigError {}

/// Validate a configuration before any remote call is made.
///
/// # Validation Rules
///
/// - `account`, `org` and `project` must be non-empty
/// - `base_url` must be an http(s) URL
/// - `request_timeout_secs` must be non-zero
pub fn validate_config(config: &Config) -> std::result::Result<(), ConfigError> {
    for (field, value) in [
        ("account", &config.account),
        ("org", &config.org),
        ("project", &config.project),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingIdentifier(field));
        }
    }

    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(config.base_url.clone()));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::ZeroTimeout);
    }

    Ok(())
}

// ============================================================================
// Config File Management
// ============================================================================

/// The filename for the configuration file.
const CONFIG_FILENAME: &str = "config.toml";

/// The filename for the terminal view's log output.
const LOG_FILENAME: &str = "browse.log";

/// Get the gitspaces config directory path (~/.config/gitspaces/).
///
/// Returns the path to the config directory. Does not create the directory.
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GitspaceError::Config("Could not determine home directory".to_string()))?;
    Ok(home.join(".config").join(CONFIG_DIR_NAME))
}

/// Ensure the config directory exists, reporting whether it was just created.
pub fn ensure_config_dir() -> Result<(PathBuf, bool)> {
    let dir = config_dir()?;
    let created = !dir.exists();
    fs::create_dir_all(&dir)?;
    Ok((dir, created))
}

/// Get the path to the config file (~/.config/gitspaces/config.toml).
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILENAME))
}

/// Get the path the terminal view logs to.
pub fn log_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(LOG_FILENAME))
}

/// Load the configuration, creating a commented default file on first use.
///
/// Environment overrides are applied after the file is read.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        ensure_config_dir()?;
        fs::write(&path, generate_config_with_comments(&Config::default()))?;
        return Ok(Config::default().with_env_overrides());
    }
    Ok(load_config_from_path(&path)?.with_env_overrides())
}

/// Save the configuration, overwriting any user comments in the file.
pub fn save_config(config: &Config) -> Result<()> {
    ensure_config_dir()?;
    save_config_to_path(config, &config_path()?)
}

/// Load a config from a specific path without any fallback logic.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(GitspaceError::ConfigNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        GitspaceError::Config(format!(
            "Failed to parse config file at {:?}: {}",
            path, e
        ))
    })
}

pub fn save_config_to_path(config: &Config, path: &Path) -> Result<()> {
    fs::write(path, generate_config_with_comments(config))?;
    Ok(())
}

/// Generate config file content with explanatory comments.
fn generate_config_with_comments(config: &Config) -> String {
    format!(
        r#"# Gitspaces Configuration

# API gateway root. The CDE API is served under <base_url>/cde/api/v1.
# Can be overridden with the {env} environment variable.
base_url = {base_url}

# Web console root, used to print links to gitspace detail and edit pages.
console_url = {console_url}

# Scope of the gitspaces to list and manage.
account = {account}
org = {org}
project = {project}

# Environment variable that holds the API token.
token_env = {token_env}

# Maximum time a start/stop or delete request may take before it is
# reported as failed.
request_timeout_secs = {timeout}

# Terminal view refresh tick in milliseconds.
poll_interval_ms = {poll}
"#,
        env = BASE_URL_ENV,
        base_url = toml_string(&config.base_url),
        console_url = toml_string(&config.console_url),
        account = toml_string(&config.account),
        org = toml_string(&config.org),
        project = toml_string(&config.project),
        token_env = toml_string(&config.token_env),
        timeout = config.request_timeout_secs,
        poll = config.poll_interval_ms,
    )
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
