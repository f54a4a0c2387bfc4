//! GitHub search data types.
//!
//! Two layers live here: the wire shapes of the GraphQL `search` response,
//! and the flattened values handed to the browse controller.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Domain values ──────────────────────────────────────────────────────────

/// Opaque, server-issued pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// License attached to a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub name: String,
    /// SPDX identifier, absent for licenses GitHub could not classify.
    pub spdx_id: Option<String>,
}

/// A repository returned by a search, flattened from its GraphQL node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoItem {
    /// GraphQL node ID, unique per repository.
    pub id: String,
    pub name: String,
    pub url: String,
    pub primary_language: Option<String>,
    pub forks: u64,
    pub stargazers: u64,
    /// ISO-8601 timestamp, kept verbatim so it orders chronologically as text.
    pub updated_at: String,
    /// Empty when the repository has no description.
    pub description: String,
    pub license: Option<License>,
    pub topics: Vec<String>,
}

impl RepoItem {
    /// Parse `updated_at` into a timestamp, if it is well-formed.
    pub fn updated_at_parsed(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Pagination metadata for one fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<Cursor>,
}

/// One page of flattened search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    pub repos: Vec<RepoItem>,
    pub total_count: u64,
    pub page_info: PageInfo,
}

impl ResultPage {
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

/// Parameters that fully determine one remote search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Raw search text as typed by the user, before qualifiers are added.
    pub text: String,
    pub per_page: u32,
    pub cursor: Option<Cursor>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, per_page: u32) -> Self {
        Self {
            text: text.into(),
            per_page,
            cursor: None,
        }
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }
}

/// Rate limit information reported in response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum points allowed per period.
    pub limit: usize,
    /// Remaining points in the current period.
    pub remaining: usize,
    /// When the rate limit resets.
    pub reset_at: DateTime<Utc>,
}

// ─── GraphQL wire shapes ────────────────────────────────────────────────────

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConnection {
    pub repository_count: u64,
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<RepositoryEdge>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryEdge {
    pub node: Option<RepositoryNode>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// A search node. Every field is optional because nodes that are not
/// repositories come back as empty objects from the `... on Repository`
/// fragment.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositoryNode {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub primary_language: Option<NamedNode>,
    pub forks: Option<CountNode>,
    pub stargazers: Option<CountNode>,
    pub updated_at: Option<String>,
    pub description: Option<String>,
    pub license_info: Option<LicenseNode>,
    pub repository_topics: Option<TopicConnection>,
}

#[derive(Debug, Deserialize)]
pub struct NamedNode {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountNode {
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseNode {
    pub name: String,
    #[serde(default)]
    pub spdx_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicConnection {
    #[serde(default)]
    pub edges: Vec<TopicEdge>,
}

#[derive(Debug, Deserialize)]
pub struct TopicEdge {
    pub node: RepositoryTopicNode,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryTopicNode {
    pub topic: NamedNode,
}
