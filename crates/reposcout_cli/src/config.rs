//! Configuration file support for reposcout.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `REPOSCOUT_`, e.g., `REPOSCOUT_GITHUB_TOKEN`)
//! 3. Config file (./reposcout.toml, then ~/.config/reposcout/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use REPOSCOUT_GITHUB_TOKEN env var
//! endpoint = "https://api.github.com/graphql"
//! timeout_secs = 30
//!
//! [browse]
//! page_size = 10   # 10, 25 or 100 in the interactive browser
//! retries = 0      # retry attempts for network failures
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use reposcout::github::{DEFAULT_TIMEOUT, GITHUB_GRAPHQL_ENDPOINT};
use reposcout::{ClientConfig, DEFAULT_PAGE_SIZE, RetryConfig};
use serde::Deserialize;

const ENV_PREFIX: &str = "REPOSCOUT";

/// Keys whose names contain the `_` separator, so the generic environment
/// source would split them into nested tables.
const FLAT_ENV_KEYS: [(&str, &str); 2] = [
    ("REPOSCOUT_GITHUB_TIMEOUT_SECS", "github.timeout_secs"),
    ("REPOSCOUT_BROWSE_PAGE_SIZE", "browse.page_size"),
];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub browse: BrowseConfig,
}

/// GitHub API access.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    /// Can also be set via REPOSCOUT_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
    /// GraphQL endpoint, for GitHub Enterprise or a local proxy.
    pub endpoint: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Defaults for the results table.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Rows per page.
    pub page_size: u32,
    /// Retry attempts for network failures. 0 disables retries.
    pub retries: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            retries: 0,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/reposcout/config.toml)
    /// 3. Local config file (./reposcout.toml)
    /// 4. Environment variables with REPOSCOUT_ prefix
    ///
    /// A broken config never stops the program; it is reported and the
    /// defaults are used instead.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("reposcout.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./reposcout.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., REPOSCOUT_GITHUB_TOKEN -> github.token
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("_")
                .try_parsing(true),
        );

        let built = with_flat_env_overrides(builder, |name| std::env::var(name).ok())
            .and_then(|builder| builder.build());
        match built {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone().filter(|t| !t.is_empty())
    }

    pub fn endpoint(&self) -> String {
        self.github
            .endpoint
            .clone()
            .unwrap_or_else(|| GITHUB_GRAPHQL_ENDPOINT.to_string())
    }

    pub fn timeout(&self) -> Duration {
        self.github
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Retry policy for the search client, `None` when retries are off.
    pub fn retry_config(&self) -> Option<RetryConfig> {
        (self.browse.retries > 0).then(|| RetryConfig::with_max_retries(self.browse.retries))
    }

    /// Search client settings derived from this configuration.
    ///
    /// A missing token is passed through as empty; the API answers with 401.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.github_token().unwrap_or_default())
            .with_endpoint(self.endpoint())
            .with_timeout(self.timeout())
            .with_retry(self.retry_config())
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "reposcout").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Map the multi-word environment variables onto their config keys.
fn with_flat_env_overrides(
    mut builder: config::ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<config::ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in FLAT_ENV_KEYS {
        if let Some(value) = lookup(var) {
            builder = builder.set_override(key, value)?;
        }
    }
    Ok(builder)
}
