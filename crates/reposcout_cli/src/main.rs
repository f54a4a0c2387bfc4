//! reposcout CLI - browse GitHub repository search results from the terminal.

mod commands;
mod config;
mod progress;
mod render;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::ConnectionArgs;
use crate::commands::browse::BrowseArgs;
use crate::commands::search::SearchArgs;

#[derive(Parser)]
#[command(name = "reposcout")]
#[command(version)]
#[command(about = "Search and browse GitHub repositories")]
#[command(
    long_about = "reposcout searches GitHub repositories by name through the GraphQL API. \
Results are paginated with server cursors and can be sorted locally by name, \
language, forks, stars or last update without another request."
)]
#[command(after_long_help = r#"EXAMPLES
    Print the first page of matches:
        $ reposcout search react

    Fetch three pages of 25, most starred first on each page:
        $ reposcout search "web framework" --per-page 25 --pages 3 --sort stars --desc

    Machine-readable output:
        $ reposcout search tokio --output json

    Browse interactively:
        $ reposcout browse react

    Generate shell completions:
        $ reposcout completions bash > ~/.local/share/bash-completion/completions/reposcout

CONFIGURATION
    reposcout reads configuration from:
      1. ~/.config/reposcout/config.toml (or $XDG_CONFIG_HOME/reposcout/config.toml)
      2. ./reposcout.toml
      3. Environment variables (REPOSCOUT_* prefix, e.g., REPOSCOUT_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    REPOSCOUT_GITHUB_TOKEN          GitHub personal access token
    REPOSCOUT_GITHUB_ENDPOINT       GraphQL endpoint (default: https://api.github.com/graphql)
    REPOSCOUT_GITHUB_TIMEOUT_SECS   Request timeout in seconds (default: 30)
    REPOSCOUT_BROWSE_PAGE_SIZE      Rows per page (default: 10)
    REPOSCOUT_BROWSE_RETRIES        Retry attempts for network failures (default: 0)
"#)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search repositories by name and print the results
    Search(SearchArgs),
    /// Browse search results interactively
    Browse(BrowseArgs),
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Set up graceful shutdown handler (Ctrl+C)
    shutdown::setup_shutdown_handler();

    // Structured logging only when not connected to a TTY
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("reposcout=info,reposcout_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    // Load configuration (config file -> env vars -> defaults), then CLI flags
    let mut config = config::Config::load();
    cli.connection.apply(&mut config);

    match cli.command {
        Commands::Search(args) => commands::search::handle_search(args, &config).await?,
        Commands::Browse(args) => commands::browse::handle_browse(args, &config).await?,
        Commands::Completions { shell } => commands::meta::handle_completions(shell)?,
        Commands::Man { output } => commands::meta::handle_man(output)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_connection_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "reposcout",
            "search",
            "react",
            "--token",
            "ghp_x",
            "--retries",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.connection.token.as_deref(), Some("ghp_x"));
        assert_eq!(cli.connection.retries, Some(2));
        assert!(matches!(cli.command, Commands::Search(_)));
    }

    #[test]
    fn browse_query_is_optional() {
        let cli = Cli::try_parse_from(["reposcout", "browse"]).unwrap();
        match cli.command {
            Commands::Browse(args) => assert!(args.query.is_empty()),
            _ => panic!("expected browse"),
        }
    }
}
