//! GraphQL request construction for repository search.

use serde::Serialize;

use super::types::SearchQuery;

/// Qualifier appended to every search so only repository names are matched.
pub const NAME_QUALIFIER: &str = "in:name";

/// The repository search document.
pub const SEARCH_REPOS_QUERY: &str = r#"query ($searchQuery: String!, $perPage: Int!, $cursor: String) {
  search(query: $searchQuery, type: REPOSITORY, first: $perPage, after: $cursor) {
    repositoryCount
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        ... on Repository {
          id
          name
          url
          primaryLanguage { name }
          forks { totalCount }
          stargazers { totalCount }
          updatedAt
          description
          licenseInfo {
            name
            spdxId
          }
          repositoryTopics(first: 10) {
            edges {
              node {
                topic {
                  name
                }
              }
            }
          }
        }
      }
      cursor
    }
  }
}"#;

/// Variables bound to [`SEARCH_REPOS_QUERY`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchVariables<'a> {
    pub search_query: String,
    pub per_page: u32,
    pub cursor: Option<&'a str>,
}

impl<'a> SearchVariables<'a> {
    pub fn from_query(query: &'a SearchQuery) -> Self {
        Self {
            search_query: qualified_search_text(&query.text),
            per_page: query.per_page,
            cursor: query.cursor.as_ref().map(|c| c.as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    query: &'static str,
    variables: SearchVariables<'a>,
}

/// Append the name-scope qualifier to raw search text.
pub fn qualified_search_text(text: &str) -> String {
    format!("{} {}", text, NAME_QUALIFIER)
}

/// Build the JSON body for a search request.
///
/// The body depends only on `query`, so identical parameters always produce
/// identical requests.
pub fn build_request_body(query: &SearchQuery) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(RequestBody {
        query: SEARCH_REPOS_QUERY,
        variables: SearchVariables::from_query(query),
    })
}
