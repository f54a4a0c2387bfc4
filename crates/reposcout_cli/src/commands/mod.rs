pub(crate) mod browse;
pub(crate) mod meta;
pub(crate) mod search;

use std::sync::Arc;

use clap::ValueEnum;
use reposcout::{BrowseController, SearchClient};

use crate::config::Config;
use crate::progress::ProgressReporter;

/// Output format for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Connection settings that override the config file.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct ConnectionArgs {
    /// GitHub token (overrides config and REPOSCOUT_GITHUB_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// GraphQL endpoint (default: https://api.github.com/graphql)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Retry attempts for network failures (default from config or 0)
    #[arg(long, global = true)]
    pub retries: Option<usize>,
}

impl ConnectionArgs {
    /// Layer the CLI flags over the loaded configuration.
    pub(crate) fn apply(&self, config: &mut Config) {
        if let Some(token) = &self.token {
            config.github.token = Some(token.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.github.endpoint = Some(endpoint.clone());
        }
        if let Some(retries) = self.retries {
            config.browse.retries = retries;
        }
    }
}

/// Build a controller wired to GitHub and to the progress reporter.
pub(crate) fn build_controller(
    config: &Config,
    reporter: &Arc<ProgressReporter>,
) -> Result<BrowseController, Box<dyn std::error::Error>> {
    if config.github_token().is_none() {
        tracing::warn!(
            "No GitHub token configured; set REPOSCOUT_GITHUB_TOKEN or [github] token in the config file"
        );
    }

    let client = SearchClient::new(config.client_config())?;
    Ok(BrowseController::new(Arc::new(client)).with_event_callback(reporter.as_callback()))
}
