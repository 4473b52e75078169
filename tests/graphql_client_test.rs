//! Integration tests for the GraphQL adapter against a mocked BFF.

use std::sync::Arc;

use fomio_data::auth::{MemoryTokenStore, SessionManager, TokenPair};
use fomio_data::client::{CreatePostInput, DataClient, FeedParams};
use fomio_data::{Config, DataError, FetchPolicy, GraphQlClient};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(graphql_url: &str) -> Config {
    Config {
        forum_url: "http://127.0.0.1:1".to_string(),
        graphql_url: graphql_url.to_string(),
        api_key: None,
        api_username: None,
        auth_base_url: "http://127.0.0.1:1".to_string(),
    }
}

fn client_for(server_url: &str, policy: FetchPolicy) -> GraphQlClient {
    let endpoint = format!("{server_url}/graphql");
    let session = Arc::new(SessionManager::new(
        Arc::new(MemoryTokenStore::new()),
        server_url,
    ));
    GraphQlClient::new(&config(&endpoint), session, policy)
}

fn feed_page(ids: &[u32], end_cursor: &str, has_next_page: bool) -> serde_json::Value {
    let edges: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "cursor": format!("c{id}"),
                "node": {
                    "id": id.to_string(),
                    "title": format!("Topic {id}"),
                    "createdAt": "2024-01-01T00:00:00Z",
                    "postsCount": 1,
                    "author": {"id": "7", "username": "alice"}
                }
            })
        })
        .collect();
    serde_json::json!({
        "data": {
            "feed": {
                "edges": edges,
                "pageInfo": {"endCursor": end_cursor, "hasNextPage": has_next_page},
                "totalCount": 4
            }
        }
    })
}

#[tokio::test]
async fn test_feed_pages_accumulate_across_cursors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("\"cursor\":null"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&[1, 2], "c2", true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("\"cursor\":\"c2\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&[3, 4], "c4", false)))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::NetworkOnly);

    let first = client.get_feed(FeedParams::default()).await.unwrap();
    assert_eq!(first.len(), 2);
    let cursor = client.feed_end_cursor().await;
    assert_eq!(cursor.as_deref(), Some("c2"));

    let second = client
        .get_feed(FeedParams {
            cursor,
            ..FeedParams::default()
        })
        .await
        .unwrap();
    let ids: Vec<&str> = second.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3", "4"]);
    // Last page: nothing left to continue from
    assert_eq!(client.feed_end_cursor().await, None);
}

#[tokio::test]
async fn test_cache_first_serves_primed_cache_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&[1], "c1", false)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::CacheFirst);
    let first = client.get_feed(FeedParams::default()).await.unwrap();
    let second = client.get_feed(FeedParams::default()).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
}

#[tokio::test]
async fn test_cache_only_client_never_touches_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::CacheOnly);

    let err = client.get_feed(FeedParams::default()).await.unwrap_err();
    assert!(err.is_bff_unavailable());
    let err = client.get_categories().await.unwrap_err();
    assert!(err.is_bff_unavailable());
    // Toggles degrade quietly instead
    assert!(!client.like_post("5").await);
    assert!(!client.mark_all_notifications_read().await);
}

#[tokio::test]
async fn test_partial_data_with_field_errors_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "categories": [
                    {"id": "3", "name": "General", "slug": "general", "topicsCount": 12}
                ]
            },
            "errors": [{"message": "Cannot resolve field description"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::NetworkOnly);
    let categories = client.get_categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "General");
    assert!(categories[0].description.is_none());
}

#[tokio::test]
async fn test_errors_without_data_classify_by_extension_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("query Category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [{"message": "no such category", "extensions": {"code": "NOT_FOUND"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("query User"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errors": [{"message": "opaque resolver failure"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::NetworkOnly);

    let err = client.get_category("99").await.unwrap_err();
    assert!(matches!(err, DataError::NotFound(_)));

    let err = client.get_user("1").await.unwrap_err();
    assert!(matches!(err, DataError::Server { status: 502, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_toggles_never_throw_on_server_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::NetworkOnly);
    assert!(!client.like_post("5").await);
    assert!(!client.unlike_post("5").await);
    assert!(!client.bookmark_topic("42").await);
    assert!(!client.unbookmark_topic("42").await);
    assert!(!client.mark_notification_read("9").await);
}

#[tokio::test]
async fn test_get_notifications_maps_wire_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("query Notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"notifications": [{
                "id": "n1",
                "type": "liked",
                "read": false,
                "createdAt": "2024-02-01T00:00:00Z",
                "data": {"topic_title": "Hello", "some_future_field": [1, 2]}
            }]}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::NetworkOnly);
    let notifications = client.get_notifications().await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].id, "n1");
    assert_eq!(notifications[0].kind, "liked");
    assert!(!notifications[0].read);
    // Unknown payload keys survive untouched
    assert_eq!(notifications[0].data["topic_title"], "Hello");
}

#[tokio::test]
async fn test_toggle_reports_failure_when_mutation_returns_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("mutation LikePost"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": {"likePost": false}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("mutation BookmarkTopic"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": {"bookmarkTopic": null}})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::NetworkOnly);
    // A well-formed response still means failure when the field says so
    assert!(!client.like_post("5").await);
    assert!(!client.bookmark_topic("42").await);
}

#[tokio::test]
async fn test_toggles_succeed_on_mutation_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("mutation LikePost"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": {"likePost": true}})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::NetworkOnly);
    assert!(client.like_post("5").await);
}

#[tokio::test]
async fn test_transport_failures_tag_bff_unavailable() {
    // Closed port: connection refused
    let client = client_for("http://127.0.0.1:1", FetchPolicy::NetworkOnly);
    let err = client.get_feed(FeedParams::default()).await.unwrap_err();
    assert!(matches!(err, DataError::Network { .. }));
    assert!(err.is_bff_unavailable());
}

#[tokio::test]
async fn test_create_post_sends_input_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("mutation CreatePost"))
        .and(body_string_contains("\"title\":\"New topic\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"createPost": {"id": "77", "topicId": "77", "postId": "555"}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::NetworkOnly);
    let created = client
        .create_post(CreatePostInput {
            title: "New topic".to_string(),
            content: "body".to_string(),
            category_id: Some("3".to_string()),
            tags: vec!["intro".to_string()],
        })
        .await
        .unwrap();
    assert_eq!(created.topic_id, "77");
    assert_eq!(created.post_id, "555");
}

#[tokio::test]
async fn test_get_current_user_unauthenticated_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::NetworkOnly);
    let user = client.get_current_user().await.unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn test_authenticated_requests_carry_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "Bearer access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"me": {
                "id": "7",
                "username": "alice",
                "trustLevel": 1,
                "createdAt": "2023-06-01T00:00:00Z",
                "stats": {"postsCount": 40, "followersCount": 3}
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/graphql", server.uri());
    let session = Arc::new(SessionManager::new(
        Arc::new(MemoryTokenStore::new()),
        &server.uri(),
    ));
    session
        .login(TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        })
        .await
        .unwrap();
    let client = GraphQlClient::new(&config(&endpoint), session, FetchPolicy::NetworkOnly);

    let user = client.get_current_user().await.unwrap().unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.stats.posts_count, 40);
    assert_eq!(user.stats.followers_count, 3);
}

#[tokio::test]
async fn test_is_healthy_follows_health_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("query Health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {"health": "ok"}})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), FetchPolicy::NetworkOnly);
    assert!(client.is_healthy().await);

    let dead = client_for("http://127.0.0.1:1", FetchPolicy::NetworkOnly);
    assert!(!dead.is_healthy().await);
}

#[tokio::test]
async fn test_is_healthy_never_triggers_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let endpoint = format!("{}/graphql", server.uri());
    let session = Arc::new(SessionManager::new(
        Arc::new(MemoryTokenStore::new()),
        &server.uri(),
    ));
    session
        .login(TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        })
        .await
        .unwrap();
    let client = GraphQlClient::new(&config(&endpoint), session, FetchPolicy::NetworkOnly);

    // The probe goes out unauthenticated and a 401 is just "not healthy"
    assert!(!client.is_healthy().await);
}
