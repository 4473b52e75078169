//! The uniform data client contract and its two adapters.
//!
//! Feature code only ever sees [`DataClient`]; the selector decides whether
//! the REST or the GraphQL adapter sits behind it.

pub mod graphql;
pub mod rest;
pub mod selector;

use async_trait::async_trait;
use serde::Deserialize;

use crate::auth::SessionManager;
use crate::error::DataError;
use crate::model::{
    Category, CreatedPost, FeedItem, Notification, Post, SearchResult, SearchResultType, User,
};

pub use graphql::{FetchPolicy, GraphQlClient};
pub use rest::RestClient;
pub use selector::{Backend, ClientProvider};

/// Parameters for a feed page.
///
/// REST callers use `page`/`limit`; GraphQL callers use `cursor`/`limit`.
/// Both styles return the same [`FeedItem`] shape.
#[derive(Debug, Clone, Default)]
pub struct FeedParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category_id: Option<String>,
    pub cursor: Option<String>,
}

/// Input for creating a new topic-starting post.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub category_id: Option<String>,
    pub tags: Vec<String>,
}

/// Parameters for a search call.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub result_type: Option<SearchResultType>,
    pub limit: Option<u32>,
}

/// The uniform contract both adapters satisfy.
///
/// Read operations (`get_*`, `search`) either return data in the common model
/// or fail with a [`DataError`] — they never silently return empty on
/// failure. Toggle mutations (`like_*`, `bookmark_*`, `mark_*`) never fail:
/// errors are logged and degrade to `false` so callers can implement
/// optimistic UI without error handling. Overlapping calls may complete out
/// of order; last-write-wins is the caller's concern.
#[async_trait]
pub trait DataClient: Send + Sync {
    async fn get_feed(&self, params: FeedParams) -> Result<Vec<FeedItem>, DataError>;
    async fn get_topic(&self, id: &str) -> Result<FeedItem, DataError>;
    async fn get_topic_posts(
        &self,
        topic_id: &str,
        page: Option<u32>,
    ) -> Result<Vec<Post>, DataError>;
    async fn get_post(&self, id: &str) -> Result<Post, DataError>;

    /// Creates a new topic and its first post in one call.
    async fn create_post(&self, input: CreatePostInput) -> Result<CreatedPost, DataError>;

    async fn get_categories(&self) -> Result<Vec<Category>, DataError>;
    async fn get_category(&self, id: &str) -> Result<Category, DataError>;

    /// `Ok(None)`, not an error, when unauthenticated.
    async fn get_current_user(&self) -> Result<Option<User>, DataError>;
    async fn get_user(&self, id: &str) -> Result<User, DataError>;

    async fn search(&self, params: SearchParams) -> Result<Vec<SearchResult>, DataError>;

    async fn like_post(&self, post_id: &str) -> bool;
    async fn unlike_post(&self, post_id: &str) -> bool;
    async fn bookmark_topic(&self, topic_id: &str) -> bool;
    async fn unbookmark_topic(&self, topic_id: &str) -> bool;

    async fn get_notifications(&self) -> Result<Vec<Notification>, DataError>;
    async fn mark_notification_read(&self, id: &str) -> bool;
    async fn mark_all_notifications_read(&self) -> bool;

    /// Fast, side-effect-free liveness probe.
    async fn is_healthy(&self) -> bool;
}

/// Send a request, transparently refreshing credentials on a 401.
///
/// `build` is invoked with the current access token snapshot; on a 401 with a
/// refresh token available, the session manager performs one refresh and the
/// request is rebuilt and retried exactly once with the new token. A second
/// 401 is returned as-is — the caller maps it to `Unauthorized` and no second
/// refresh happens (loop prevention).
pub(crate) async fn send_with_refresh<F>(
    session: &SessionManager,
    bff: bool,
    build: F,
) -> Result<reqwest::Response, DataError>
where
    F: Fn(Option<&str>) -> reqwest::RequestBuilder,
{
    let token = session.access_token().await;
    let response = build(token.as_deref())
        .send()
        .await
        .map_err(|e| DataError::from_transport(&e, bff))?;

    if response.status() != reqwest::StatusCode::UNAUTHORIZED {
        return Ok(response);
    }
    // A 401 without a credential attached means the caller was never
    // authenticated; nothing to refresh.
    let Some(stale) = token else {
        return Ok(response);
    };

    let fresh = session.refresh_after_unauthorized(&stale).await?;
    build(Some(&fresh))
        .send()
        .await
        .map_err(|e| DataError::from_transport(&e, bff))
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

/// Turn a non-2xx response into a [`DataError`], preserving the backend's
/// own error message array when it parses.
pub(crate) async fn error_from_response(response: reqwest::Response) -> DataError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<BackendErrorBody>(&body)
        .ok()
        .filter(|parsed| !parsed.errors.is_empty())
        .map_or(body, |parsed| parsed.errors.join(", "));
    DataError::from_status(status, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_body_parses_error_array() {
        let body: BackendErrorBody =
            serde_json::from_str(r#"{"errors":["first","second"],"error_type":"invalid"}"#)
                .unwrap();
        assert_eq!(body.errors.join(", "), "first, second");
    }

    #[test]
    fn test_backend_error_body_tolerates_missing_errors() {
        let body: BackendErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.errors.is_empty());
    }
}
