use std::sync::Arc;

use reposcout::{BrowseController, SortColumn, SortDirection, SortState};

use crate::commands::{OutputFormat, build_controller};
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::render::{PageReport, render_view};
use crate::shutdown::is_shutdown_requested;

/// Search repositories by name and print one or more pages.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SearchArgs {
    /// Search text, matched against repository names
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Rows per page (default from config or 10)
    #[arg(short = 'n', long)]
    pub per_page: Option<u32>,

    /// Number of pages to fetch, following cursors forward
    #[arg(short, long, default_value_t = 1)]
    pub pages: usize,

    /// Sort each page by this column (name, primaryLanguage, forks, stargazers, updatedAt)
    #[arg(short, long)]
    pub sort: Option<SortColumn>,

    /// Sort descending instead of ascending
    #[arg(short, long, requires = "sort")]
    pub desc: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

impl SearchArgs {
    pub(crate) fn text(&self) -> String {
        self.query.join(" ")
    }

    pub(crate) fn sort_state(&self) -> SortState {
        match self.sort {
            Some(column) if self.desc => SortState::new(column, SortDirection::Descending),
            Some(column) => SortState::new(column, SortDirection::Ascending),
            None => SortState::default(),
        }
    }
}

pub(crate) async fn handle_search(
    args: SearchArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let reporter = Arc::new(ProgressReporter::new());
    let mut browser = build_controller(config, &reporter)?;
    browser.set_page_size(args.per_page.unwrap_or(config.browse.page_size))?;
    browser.set_sort(args.sort_state());

    let result = fetch_pages(&mut browser, &args, &reporter).await;
    reporter.finish();
    result
}

async fn fetch_pages(
    browser: &mut BrowseController,
    args: &SearchArgs,
    reporter: &ProgressReporter,
) -> Result<(), Box<dyn std::error::Error>> {
    browser.submit_search(args.text()).await?;
    let mut reports = Vec::new();

    for fetched in 1..=args.pages.max(1) {
        reporter.finish();
        let view = browser.view();
        match args.output {
            OutputFormat::Table => print!("{}", render_view(&view)),
            OutputFormat::Json => reports.push(serde_json::to_value(PageReport::from_view(&view))?),
        }

        if fetched == args.pages || !view.can_go_forward {
            break;
        }
        if is_shutdown_requested() {
            tracing::warn!(fetched, "Stopping early on shutdown request");
            break;
        }
        browser.next_page().await?;
    }

    if args.output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}
