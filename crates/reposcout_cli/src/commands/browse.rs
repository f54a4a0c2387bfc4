//! Interactive browser: a line-oriented loop over the results table.

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use console::{Term, style};
use reposcout::{BrowseController, BrowseError, PAGE_SIZE_OPTIONS, SortColumn};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::build_controller;
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::render::{render_details, render_view};
use crate::shutdown::shutdown_requested;

const HELP: &str = "\
Commands:
  /<text>        search repositories by name
  n, next        next page
  p, prev        previous page
  page <N>       jump to an already visited page
  size <N>       rows per page (10, 25 or 100)
  sort <column>  sort by name, language, forks, stars or updated;
                 repeat to reverse, a third time to clear
  show <N>, <N>  details for row N
  r, reload      fetch the current page again
  h, help        this help
  q, quit        exit
";

/// Browse search results interactively.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BrowseArgs {
    /// Initial search text
    pub query: Vec<String>,

    /// Rows per page (default from config or 10)
    #[arg(short = 'n', long)]
    pub per_page: Option<u32>,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BrowseCommand {
    Search(String),
    Next,
    Previous,
    /// Zero-based page.
    Page(usize),
    Size(u32),
    Sort(SortColumn),
    /// Zero-based row in display order.
    Show(usize),
    Reload,
    Help,
    Redraw,
    Quit,
}

fn parse_ordinal(arg: Option<&str>, what: &str) -> Result<usize, String> {
    let raw = arg.ok_or_else(|| format!("Missing {what} number"))?;
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Invalid {what} number '{raw}'")),
    }
}

impl FromStr for BrowseCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Redraw);
        }
        if let Some(text) = line.strip_prefix('/') {
            let text = text.trim();
            if text.is_empty() {
                return Err("Type some text after '/' to search".to_string());
            }
            return Ok(Self::Search(text.to_string()));
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        match command.as_str() {
            "n" | "next" => Ok(Self::Next),
            "p" | "prev" | "previous" => Ok(Self::Previous),
            "g" | "page" => parse_ordinal(arg, "page").map(Self::Page),
            "size" => {
                let raw = arg.ok_or("Missing page size")?;
                match raw.parse::<u32>() {
                    Ok(size) if PAGE_SIZE_OPTIONS.contains(&size) => Ok(Self::Size(size)),
                    _ => Err(format!("Page size must be one of 10, 25, 100 (got '{raw}')")),
                }
            }
            "s" | "sort" => {
                let raw = arg.ok_or("Missing sort column")?;
                raw.parse::<SortColumn>().map(Self::Sort).map_err(|e| e.to_string())
            }
            "show" | "d" | "details" => parse_ordinal(arg, "row").map(Self::Show),
            "r" | "reload" => Ok(Self::Reload),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            "search" => {
                let rest = line[command.len()..].trim();
                if rest.is_empty() {
                    Err("Missing search text".to_string())
                } else {
                    Ok(Self::Search(rest.to_string()))
                }
            }
            _ if command.chars().all(|c| c.is_ascii_digit()) => {
                parse_ordinal(Some(command.as_str()), "row").map(Self::Show)
            }
            _ => Err(format!("Unknown command '{command}' (type 'help')")),
        }
    }
}

/// What to put on screen after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Redraw,
    Text(String),
    Notice(String),
    Quit,
}

/// Failures from the backend are already part of the view; anything else is
/// a refused intent worth a one-line notice.
fn fetch_outcome(result: Result<(), BrowseError>) -> Outcome {
    match result {
        Ok(()) => Outcome::Redraw,
        Err(e) if e.is_query() => Outcome::Redraw,
        Err(e) => Outcome::Notice(e.to_string()),
    }
}

pub(crate) async fn apply(browser: &mut BrowseController, command: BrowseCommand) -> Outcome {
    match command {
        BrowseCommand::Search(text) => fetch_outcome(browser.submit_search(text).await),
        BrowseCommand::Next => fetch_outcome(browser.next_page().await),
        BrowseCommand::Previous => fetch_outcome(browser.previous_page().await),
        BrowseCommand::Page(page) => fetch_outcome(browser.change_page(page).await),
        BrowseCommand::Reload => fetch_outcome(browser.reload().await),
        BrowseCommand::Size(size) => match browser.change_page_size(size).await {
            Err(BrowseError::NoActiveSearch) => match browser.set_page_size(size) {
                Ok(()) => Outcome::Notice(format!("Page size set to {size}")),
                Err(e) => Outcome::Notice(e.to_string()),
            },
            other => fetch_outcome(other),
        },
        BrowseCommand::Sort(column) => {
            browser.request_sort(column);
            Outcome::Redraw
        }
        BrowseCommand::Show(index) => match browser.select_index(index) {
            Some(repo) => Outcome::Text(render_details(repo)),
            None => Outcome::Notice(format!("No row {} on this page", index + 1)),
        },
        BrowseCommand::Help => Outcome::Text(HELP.to_string()),
        BrowseCommand::Redraw => Outcome::Redraw,
        BrowseCommand::Quit => Outcome::Quit,
    }
}

fn draw(term: &Term, browser: &BrowseController, reporter: &ProgressReporter) {
    reporter.finish();
    if term.is_term()
        && let Err(e) = term.clear_screen()
    {
        tracing::debug!("Failed to clear screen: {}", e);
    }
    print!("{}", render_view(&browser.view()));
}

pub(crate) async fn handle_browse(
    args: BrowseArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let reporter = Arc::new(ProgressReporter::new());
    let mut browser = build_controller(config, &reporter)?;
    browser.set_page_size(args.per_page.unwrap_or(config.browse.page_size))?;

    let term = Term::stdout();
    let initial = args.query.join(" ");
    if !initial.trim().is_empty() {
        apply(&mut browser, BrowseCommand::Search(initial)).await;
    }
    draw(&term, &browser, &reporter);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", style(">").cyan().bold());
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown_requested() => break,
        };
        let Some(line) = line else {
            break;
        };

        let command = match line.parse::<BrowseCommand>() {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}", style(message).yellow());
                continue;
            }
        };

        match apply(&mut browser, command).await {
            Outcome::Redraw => draw(&term, &browser, &reporter),
            Outcome::Text(text) => {
                reporter.finish();
                print!("{text}");
            }
            Outcome::Notice(message) => {
                reporter.finish();
                eprintln!("{}", style(message).yellow());
            }
            Outcome::Quit => break,
        }
    }

    reporter.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use reposcout::http::{HttpMethod, MockTransport};
    use reposcout::{ClientConfig, SearchClient, SortDirection};
    use serde_json::json;

    use super::*;

    const ENDPOINT: &str = "https://graphql.test/graphql";

    fn parse(line: &str) -> Result<BrowseCommand, String> {
        line.parse()
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse("n"), Ok(BrowseCommand::Next));
        assert_eq!(parse(" NEXT "), Ok(BrowseCommand::Next));
        assert_eq!(parse("p"), Ok(BrowseCommand::Previous));
        assert_eq!(parse("page 3"), Ok(BrowseCommand::Page(2)));
        assert_eq!(parse("r"), Ok(BrowseCommand::Reload));
        assert_eq!(parse(""), Ok(BrowseCommand::Redraw));
        assert_eq!(parse("q"), Ok(BrowseCommand::Quit));
        assert_eq!(parse("?"), Ok(BrowseCommand::Help));
    }

    #[test]
    fn test_parse_search() {
        assert_eq!(parse("/react hooks"), Ok(BrowseCommand::Search("react hooks".to_string())));
        assert_eq!(parse("search  tokio "), Ok(BrowseCommand::Search("tokio".to_string())));
        assert!(parse("/   ").is_err());
        assert!(parse("search").is_err());
    }

    #[test]
    fn test_parse_size_only_accepts_table_options() {
        assert_eq!(parse("size 25"), Ok(BrowseCommand::Size(25)));
        assert_eq!(parse("size 100"), Ok(BrowseCommand::Size(100)));
        assert!(parse("size 7").is_err());
        assert!(parse("size").is_err());
    }

    #[test]
    fn test_parse_sort_and_show() {
        assert_eq!(parse("sort stars"), Ok(BrowseCommand::Sort(SortColumn::Stargazers)));
        assert_eq!(parse("s updatedAt"), Ok(BrowseCommand::Sort(SortColumn::UpdatedAt)));
        assert!(parse("sort size").is_err());
        assert_eq!(parse("show 1"), Ok(BrowseCommand::Show(0)));
        assert_eq!(parse("4"), Ok(BrowseCommand::Show(3)));
        assert!(parse("show 0").is_err());
        assert!(parse("page x").is_err());
        assert!(parse("launch").is_err());
    }

    fn page_body(end_cursor: Option<&str>, has_next: bool, names: &[(&str, u64)]) -> serde_json::Value {
        let edges: Vec<_> = names
            .iter()
            .map(|(name, stars)| {
                json!({ "node": {
                    "id": name, "name": name, "url": format!("https://github.com/o/{name}"),
                    "stargazers": { "totalCount": stars }, "forks": { "totalCount": 0 },
                    "updatedAt": "2024-01-01T00:00:00Z"
                }, "cursor": "e" })
            })
            .collect();
        json!({ "data": { "search": {
            "repositoryCount": 50,
            "pageInfo": { "hasNextPage": has_next, "endCursor": end_cursor },
            "edges": edges
        }}})
    }

    fn browser(transport: &MockTransport) -> BrowseController {
        let client = SearchClient::with_transport(
            ClientConfig::new("ghp_test").with_endpoint(ENDPOINT),
            Arc::new(transport.clone()),
        );
        BrowseController::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_search_sort_and_show() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            ENDPOINT,
            200,
            page_body(None, false, &[("low", 1), ("high", 9)]),
        );
        let mut browser = browser(&transport);

        let outcome = apply(&mut browser, BrowseCommand::Search("x".to_string())).await;
        assert_eq!(outcome, Outcome::Redraw);

        apply(&mut browser, BrowseCommand::Sort(SortColumn::Stargazers)).await;
        apply(&mut browser, BrowseCommand::Sort(SortColumn::Stargazers)).await;
        assert_eq!(browser.sort().direction, SortDirection::Descending);

        match apply(&mut browser, BrowseCommand::Show(0)).await {
            Outcome::Text(details) => assert!(details.contains("high")),
            other => panic!("expected details, got {other:?}"),
        }
        assert!(matches!(
            apply(&mut browser, BrowseCommand::Show(5)).await,
            Outcome::Notice(_)
        ));
    }

    #[tokio::test]
    async fn test_refused_navigation_is_a_notice() {
        let transport = MockTransport::new();
        let mut browser = browser(&transport);

        match apply(&mut browser, BrowseCommand::Next).await {
            Outcome::Notice(message) => assert!(message.contains("No search")),
            other => panic!("expected notice, got {other:?}"),
        }

        transport.push_json(HttpMethod::Post, ENDPOINT, 200, page_body(None, false, &[("a", 1)]));
        apply(&mut browser, BrowseCommand::Search("a".to_string())).await;
        assert!(matches!(apply(&mut browser, BrowseCommand::Next).await, Outcome::Notice(_)));
        assert!(matches!(apply(&mut browser, BrowseCommand::Previous).await, Outcome::Notice(_)));
    }

    #[tokio::test]
    async fn test_backend_failure_redraws_with_error() {
        let transport = MockTransport::new();
        transport.push_transport_error(HttpMethod::Post, ENDPOINT, "connection refused");
        let mut browser = browser(&transport);

        let outcome = apply(&mut browser, BrowseCommand::Search("a".to_string())).await;
        assert_eq!(outcome, Outcome::Redraw);
        assert!(browser.view().error);
    }

    #[tokio::test]
    async fn test_size_before_search_only_configures() {
        let transport = MockTransport::new();
        let mut browser = browser(&transport);

        let outcome = apply(&mut browser, BrowseCommand::Size(25)).await;
        assert_eq!(outcome, Outcome::Notice("Page size set to 25".to_string()));
        assert_eq!(browser.page_size(), 25);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_size_after_search_refetches_first_page() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Post, ENDPOINT, 200, page_body(Some("c1"), true, &[("a", 1)]));
        transport.push_json(HttpMethod::Post, ENDPOINT, 200, page_body(Some("c2"), true, &[("b", 1)]));
        transport.push_json(HttpMethod::Post, ENDPOINT, 200, page_body(Some("d1"), true, &[("c", 1)]));
        let mut browser = browser(&transport);

        apply(&mut browser, BrowseCommand::Search("a".to_string())).await;
        apply(&mut browser, BrowseCommand::Next).await;
        assert_eq!(browser.page(), 1);

        assert_eq!(apply(&mut browser, BrowseCommand::Size(100)).await, Outcome::Redraw);
        assert_eq!(browser.page(), 0);
        assert_eq!(browser.cursors().len(), 1);

        let requests = transport.requests();
        let body: serde_json::Value = serde_json::from_slice(&requests[2].body).unwrap();
        assert_eq!(body["variables"]["perPage"], 100);
        assert!(body["variables"]["cursor"].is_null());
    }
}
