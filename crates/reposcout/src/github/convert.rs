//! Conversion from GraphQL search responses to flat result pages.

use super::error::QueryError;
use super::types::{
    GraphqlResponse, License, RepoItem, RepositoryNode, ResultPage, SearchConnection, SearchData,
};

/// Flatten a decoded GraphQL envelope into a [`ResultPage`].
///
/// A non-empty `errors` array fails the whole page, even when partial `data`
/// is present.
pub fn to_result_page(response: GraphqlResponse<SearchData>) -> Result<ResultPage, QueryError> {
    if !response.errors.is_empty() {
        return Err(QueryError::Graphql {
            messages: response.errors.into_iter().map(|e| e.message).collect(),
        });
    }

    let data = response
        .data
        .ok_or_else(|| QueryError::Decode("response has neither data nor errors".to_string()))?;

    Ok(flatten_connection(data.search))
}

/// Flatten a search connection, skipping nodes that are not repositories.
pub fn flatten_connection(connection: SearchConnection) -> ResultPage {
    let repos = connection
        .edges
        .into_iter()
        .filter_map(|edge| edge.node)
        .filter_map(to_repo_item)
        .collect();

    ResultPage {
        repos,
        total_count: connection.repository_count,
        page_info: connection.page_info,
    }
}

/// Convert a repository node to a [`RepoItem`].
///
/// Returns `None` for nodes without an id or name.
pub fn to_repo_item(node: RepositoryNode) -> Option<RepoItem> {
    let id = node.id?;
    let name = node.name?;

    let topics = node
        .repository_topics
        .map(|connection| {
            connection
                .edges
                .into_iter()
                .map(|edge| edge.node.topic.name)
                .collect()
        })
        .unwrap_or_default();

    Some(RepoItem {
        id,
        name,
        url: node.url.unwrap_or_default(),
        primary_language: node.primary_language.map(|lang| lang.name),
        forks: node.forks.map_or(0, |c| c.total_count),
        stargazers: node.stargazers.map_or(0, |c| c.total_count),
        updated_at: node.updated_at.unwrap_or_default(),
        description: node.description.unwrap_or_default(),
        license: node.license_info.map(|l| License {
            name: l.name,
            spdx_id: l.spdx_id,
        }),
        topics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::Cursor;

    fn decode(value: serde_json::Value) -> GraphqlResponse<SearchData> {
        serde_json::from_value(value).expect("fixture should decode")
    }

    fn repo_node(topics: &[&str]) -> serde_json::Value {
        let topic_edges: Vec<_> = topics
            .iter()
            .map(|t| serde_json::json!({ "node": { "topic": { "name": t } } }))
            .collect();
        serde_json::json!({
            "id": "R_kgDOAJy2Ks",
            "name": "react",
            "url": "https://github.com/facebook/react",
            "primaryLanguage": { "name": "JavaScript" },
            "forks": { "totalCount": 46000 },
            "stargazers": { "totalCount": 225000 },
            "updatedAt": "2024-06-01T10:00:00Z",
            "description": "The library for web and native user interfaces.",
            "licenseInfo": { "name": "MIT License", "spdxId": "MIT" },
            "repositoryTopics": { "edges": topic_edges }
        })
    }

    #[test]
    fn flattens_topics_in_order() {
        let node: RepositoryNode = serde_json::from_value(repo_node(&["a", "b"])).unwrap();
        let item = to_repo_item(node).expect("repository node");
        assert_eq!(item.topics, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(item.primary_language.as_deref(), Some("JavaScript"));
        assert_eq!(item.forks, 46000);
        assert_eq!(item.stargazers, 225000);
        assert_eq!(
            item.license,
            Some(License {
                name: "MIT License".to_string(),
                spdx_id: Some("MIT".to_string()),
            })
        );
    }

    #[test]
    fn zero_topic_edges_yield_empty_topics() {
        let node: RepositoryNode = serde_json::from_value(repo_node(&[])).unwrap();
        assert!(to_repo_item(node).unwrap().topics.is_empty());
    }

    #[test]
    fn missing_optional_fields_fall_back() {
        let node: RepositoryNode = serde_json::from_value(serde_json::json!({
            "id": "R_1",
            "name": "bare",
            "url": "https://github.com/o/bare",
            "primaryLanguage": null,
            "forks": { "totalCount": 0 },
            "stargazers": { "totalCount": 3 },
            "updatedAt": "2023-01-01T00:00:00Z",
            "description": null,
            "licenseInfo": null,
            "repositoryTopics": null
        }))
        .unwrap();

        let item = to_repo_item(node).unwrap();
        assert!(item.primary_language.is_none());
        assert!(item.license.is_none());
        assert_eq!(item.description, "");
        assert!(item.topics.is_empty());
    }

    #[test]
    fn empty_search_produces_empty_page() {
        let response = decode(serde_json::json!({
            "data": {
                "search": {
                    "repositoryCount": 0,
                    "pageInfo": { "hasNextPage": false, "endCursor": null },
                    "edges": []
                }
            }
        }));

        let page = to_result_page(response).unwrap();
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({
                "repos": [],
                "totalCount": 0,
                "pageInfo": { "hasNextPage": false, "endCursor": null }
            })
        );
    }

    #[test]
    fn non_repository_nodes_are_skipped() {
        let response = decode(serde_json::json!({
            "data": {
                "search": {
                    "repositoryCount": 2,
                    "pageInfo": { "hasNextPage": true, "endCursor": "c1" },
                    "edges": [
                        { "node": {}, "cursor": "x" },
                        { "node": repo_node(&["ui"]), "cursor": "c1" }
                    ]
                }
            }
        }));

        let page = to_result_page(response).unwrap();
        assert_eq!(page.repos.len(), 1);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.page_info.end_cursor, Some(Cursor::new("c1")));
        assert!(page.page_info.has_next_page);
    }

    #[test]
    fn graphql_errors_fail_the_page() {
        let response = decode(serde_json::json!({
            "data": null,
            "errors": [
                { "message": "Something went wrong" },
                { "message": "Another thing" }
            ]
        }));

        match to_result_page(response) {
            Err(QueryError::Graphql { messages }) => {
                assert_eq!(messages, vec!["Something went wrong", "Another thing"]);
            }
            other => panic!("expected GraphQL error, got {other:?}"),
        }
    }

    #[test]
    fn missing_data_is_a_decode_error() {
        let response = decode(serde_json::json!({}));
        assert!(matches!(
            to_result_page(response),
            Err(QueryError::Decode(_))
        ));
    }
}
