//! Terminal rendering of browse views: results table, footer, details, JSON.

use chrono::DateTime;
use console::style;
use reposcout::{BrowseView, PageInfo, RepoItem, SortDirection, SortState};
use serde::Serialize;
use tabled::Tabled;

/// One row of the results table.
#[derive(Debug, Clone, Tabled)]
pub(crate) struct RepoRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Forks")]
    pub forks: u64,
    #[tabled(rename = "Stars")]
    pub stars: u64,
    #[tabled(rename = "Updated")]
    pub updated: String,
}

impl RepoRow {
    /// `index` is the 1-based row number shown to the user.
    pub(crate) fn new(index: usize, repo: &RepoItem) -> Self {
        Self {
            index,
            name: repo.name.clone(),
            language: format_language(repo.primary_language.as_deref()).to_string(),
            forks: repo.forks,
            stars: repo.stargazers,
            updated: format_updated(&repo.updated_at),
        }
    }
}

pub(crate) fn format_language(language: Option<&str>) -> &str {
    language.filter(|l| !l.is_empty()).unwrap_or("N/A")
}

/// Date part of an ISO-8601 timestamp. Unparseable values are shown as is.
pub(crate) fn format_updated(updated_at: &str) -> String {
    match DateTime::parse_from_rfc3339(updated_at) {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) if updated_at.is_empty() => "-".to_string(),
        Err(_) => updated_at.to_string(),
    }
}

pub(crate) fn sort_label(sort: SortState) -> String {
    match sort.column {
        Some(column) => {
            let arrow = match sort.direction {
                SortDirection::Ascending => "▲",
                SortDirection::Descending => "▼",
            };
            format!("{} {}", column.label(), arrow)
        }
        None => "none".to_string(),
    }
}

/// The results table for the current page, rows numbered from 1.
pub(crate) fn render_table(repos: &[&RepoItem]) -> String {
    let rows: Vec<RepoRow> = repos
        .iter()
        .enumerate()
        .map(|(i, repo)| RepoRow::new(i + 1, repo))
        .collect();
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

/// Status line below the table: position, total, sort and navigation hints.
pub(crate) fn render_footer(view: &BrowseView<'_>) -> String {
    let first = view.page * view.page_size as usize + 1;
    let last = view.page * view.page_size as usize + view.repos.len();
    let mut parts = vec![
        format!("Page {}", view.page + 1),
        format!("rows {}-{} of {}", first, last, view.total_count),
        format!("{} per page", view.page_size),
        format!("sort: {}", sort_label(view.sort)),
    ];
    let mut nav = Vec::new();
    if view.can_go_back {
        nav.push("p: previous");
    }
    if view.can_go_forward {
        nav.push("n: next");
    }
    if !nav.is_empty() {
        parts.push(nav.join(", "));
    }
    parts.join(" | ")
}

/// Full screen for one view: table or empty/welcome message, footer, error.
pub(crate) fn render_view(view: &BrowseView<'_>) -> String {
    let mut out = String::new();

    if !view.has_results {
        out.push_str(&format!(
            "{}\nType /<text> to search repositories by name.\n",
            style("Welcome to reposcout").bold()
        ));
    } else if view.is_empty_result {
        out.push_str(&format!(
            "No repositories found for \"{}\"\n",
            view.term.unwrap_or_default()
        ));
    } else {
        out.push_str(&render_table(&view.repos));
        out.push('\n');
        out.push_str(&style(render_footer(view)).dim().to_string());
        out.push('\n');
    }

    if let Some(message) = view.error_message {
        out.push_str(&format!("{} {}\n", style("Error:").red().bold(), message));
    }
    out
}

/// Details panel for a selected repository.
pub(crate) fn render_details(repo: &RepoItem) -> String {
    let description = if repo.description.trim().is_empty() {
        "No description"
    } else {
        repo.description.as_str()
    };
    let topics = if repo.topics.is_empty() {
        "None".to_string()
    } else {
        repo.topics.join(", ")
    };
    let license = repo
        .license
        .as_ref()
        .map(|l| l.name.as_str())
        .unwrap_or("No license");

    let lines = [
        ("Language", repo.primary_language.clone().unwrap_or_else(|| "No language".to_string())),
        ("Stars", repo.stargazers.to_string()),
        ("Forks", repo.forks.to_string()),
        ("Updated", format_updated(&repo.updated_at)),
        ("Description", description.to_string()),
        ("Topics", topics),
        ("License", license.to_string()),
        ("URL", repo.url.clone()),
    ];

    let mut out = format!("{}\n", style(&repo.name).bold().cyan());
    for (label, value) in lines {
        out.push_str(&format!("  {:<12} {}\n", format!("{label}:"), value));
    }
    out
}

/// JSON shape of one fetched page for `--output json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageReport<'a> {
    pub query: &'a str,
    /// 1-based.
    pub page: usize,
    pub page_size: u32,
    pub total_count: u64,
    pub page_info: &'a PageInfo,
    pub sort: SortState,
    pub repos: &'a [&'a RepoItem],
}

impl<'a> PageReport<'a> {
    pub(crate) fn from_view(view: &'a BrowseView<'a>) -> Self {
        Self {
            query: view.term.unwrap_or_default(),
            page: view.page + 1,
            page_size: view.page_size,
            total_count: view.total_count,
            page_info: &view.page_info,
            sort: view.sort,
            repos: &view.repos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposcout::{BrowseState, Cursor, License, SortColumn};

    fn repo() -> RepoItem {
        RepoItem {
            id: "R_1".to_string(),
            name: "react".to_string(),
            url: "https://github.com/facebook/react".to_string(),
            primary_language: Some("JavaScript".to_string()),
            forks: 45_000,
            stargazers: 220_000,
            updated_at: "2024-05-01T12:30:00Z".to_string(),
            description: "A JavaScript library".to_string(),
            license: Some(License {
                name: "MIT License".to_string(),
                spdx_id: Some("MIT".to_string()),
            }),
            topics: vec!["ui".to_string(), "frontend".to_string()],
        }
    }

    fn bare_repo() -> RepoItem {
        RepoItem {
            id: "R_2".to_string(),
            name: "empty".to_string(),
            url: "https://github.com/o/empty".to_string(),
            primary_language: None,
            forks: 0,
            stargazers: 0,
            updated_at: String::new(),
            description: String::new(),
            license: None,
            topics: Vec::new(),
        }
    }

    fn view<'a>(repos: Vec<&'a RepoItem>, page_info: PageInfo) -> BrowseView<'a> {
        BrowseView {
            term: Some("react"),
            repos,
            total_count: 42,
            page_info,
            page: 1,
            page_size: 10,
            sort: SortState::new(SortColumn::Stargazers, SortDirection::Descending),
            state: BrowseState::Idle,
            loading: false,
            error: false,
            error_message: None,
            selected: None,
            has_results: true,
            is_empty_result: false,
            can_go_back: true,
            can_go_forward: true,
        }
    }

    #[test]
    fn test_language_fallback() {
        assert_eq!(format_language(Some("Rust")), "Rust");
        assert_eq!(format_language(None), "N/A");
        assert_eq!(format_language(Some("")), "N/A");
    }

    #[test]
    fn test_updated_shows_date_only() {
        assert_eq!(format_updated("2024-05-01T12:30:00Z"), "2024-05-01");
        assert_eq!(format_updated(""), "-");
        assert_eq!(format_updated("not a date"), "not a date");
    }

    #[test]
    fn test_table_has_headers_and_numbered_rows() {
        let a = repo();
        let b = bare_repo();
        let table = render_table(&[&a, &b]);
        for header in ["#", "Name", "Language", "Forks", "Stars", "Updated"] {
            assert!(table.contains(header), "missing header {header}");
        }
        assert!(table.contains("react"));
        assert!(table.contains("N/A"));
        assert!(table.contains("2024-05-01"));
        assert!(table.contains("220000"));
    }

    #[test]
    fn test_footer_describes_position_and_navigation() {
        let a = repo();
        let footer = render_footer(&view(vec![&a], PageInfo::default()));
        assert!(footer.contains("Page 2"));
        assert!(footer.contains("rows 11-11 of 42"));
        assert!(footer.contains("sort: Stars ▼"));
        assert!(footer.contains("p: previous"));
        assert!(footer.contains("n: next"));
    }

    #[test]
    fn test_sort_label() {
        assert_eq!(sort_label(SortState::default()), "none");
        assert_eq!(
            sort_label(SortState::new(SortColumn::Name, SortDirection::Ascending)),
            "Name ▲"
        );
    }

    #[test]
    fn test_details_fallbacks() {
        let details = render_details(&bare_repo());
        assert!(details.contains("No language"));
        assert!(details.contains("No description"));
        assert!(details.contains("No license"));
        assert!(details.contains("Topics:"));
        assert!(details.contains("https://github.com/o/empty"));
    }

    #[test]
    fn test_details_full() {
        let details = render_details(&repo());
        assert!(details.contains("JavaScript"));
        assert!(details.contains("A JavaScript library"));
        assert!(details.contains("ui, frontend"));
        assert!(details.contains("MIT License"));
        assert!(details.contains("220000"));
    }

    #[test]
    fn test_empty_and_welcome_views() {
        let mut empty = view(Vec::new(), PageInfo::default());
        empty.is_empty_result = true;
        assert!(render_view(&empty).contains("No repositories found for \"react\""));

        let mut welcome = view(Vec::new(), PageInfo::default());
        welcome.has_results = false;
        welcome.term = None;
        assert!(render_view(&welcome).contains("Welcome"));
    }

    #[test]
    fn test_error_is_shown_with_previous_results() {
        let a = repo();
        let mut v = view(vec![&a], PageInfo::default());
        v.error = true;
        v.error_message = Some("Network error: timeout");
        let out = render_view(&v);
        assert!(out.contains("react"));
        assert!(out.contains("Network error: timeout"));
    }

    #[test]
    fn test_page_report_json_shape() {
        let a = repo();
        let info = PageInfo {
            has_next_page: true,
            end_cursor: Some(Cursor::new("c2")),
        };
        let v = view(vec![&a], info);
        let json = serde_json::to_value(PageReport::from_view(&v)).unwrap();

        assert_eq!(json["query"], "react");
        assert_eq!(json["page"], 2);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["totalCount"], 42);
        assert_eq!(json["pageInfo"]["endCursor"], "c2");
        assert_eq!(json["sort"]["column"], "stargazers");
        assert_eq!(json["sort"]["direction"], "desc");
        assert_eq!(json["repos"][0]["primaryLanguage"], "JavaScript");
        assert_eq!(json["repos"][0]["updatedAt"], "2024-05-01T12:30:00Z");
    }
}
