//! GitHub GraphQL search client.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for search requests
//! - [`types`] - Flattened result values and GraphQL wire shapes
//! - [`query`] - The search document and variable construction
//! - [`client`] - The client and the [`RepoSearch`] seam used by the controller
//! - [`convert`] - Response flattening
//!
//! ```ignore
//! use reposcout::github::{ClientConfig, SearchClient, SearchQuery};
//!
//! let client = SearchClient::new(ClientConfig::new(token))?;
//! let page = client.search(&SearchQuery::new("react", 10)).await?;
//! println!("{} of {}", page.repos.len(), page.total_count);
//! ```

mod client;
mod convert;
mod error;
mod query;
mod types;

pub use client::{
    ClientConfig, DEFAULT_TIMEOUT, GITHUB_GRAPHQL_ENDPOINT, RepoSearch, SearchClient,
    parse_rate_limit_headers,
};
pub use convert::{flatten_connection, to_repo_item, to_result_page};
pub use error::{QueryError, short_error_message};
pub use query::{
    NAME_QUALIFIER, SEARCH_REPOS_QUERY, SearchVariables, build_request_body, qualified_search_text,
};
pub use types::{
    Cursor, GraphqlError, GraphqlResponse, License, PageInfo, RateLimitInfo, RepoItem,
    RepositoryNode, ResultPage, SearchConnection, SearchData, SearchQuery,
};
