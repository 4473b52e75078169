//! GraphQL adapter: maps the data client contract onto the BFF schema with
//! query/mutation documents over plain HTTP, a normalized feed cache with
//! cursor accumulation, and a permissive field-error policy.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::auth::SessionManager;
use crate::client::{
    error_from_response, send_with_refresh, CreatePostInput, DataClient, FeedParams, SearchParams,
};
use crate::config::Config;
use crate::constants::{DEFAULT_FEED_LIMIT, HEALTH_PROBE_TIMEOUT, REQUEST_TIMEOUT};
use crate::error::DataError;
use crate::model::{
    Category, CategorySummary, CreatedPost, FeedAuthor, FeedItem, Notification, Post,
    SearchResult, SearchResultType, User, UserStats, UserSummary,
};

/// How reads interact with the feed cache and the network.
///
/// The selector forces `NetworkOnly` once the BFF is confirmed live, and
/// `CacheOnly` when it is not — a `CacheOnly` client never issues network
/// requests, so it cannot silently succeed against a dead backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Serve the cache when primed; hit the network otherwise.
    CacheFirst,
    /// Always hit the network (cache is still updated).
    NetworkOnly,
    /// Never hit the network; cache misses fail as "BFF unavailable".
    CacheOnly,
}

/// Accumulated feed pages, keyed ignoring arguments: sequential `load more`
/// fetches concatenate rather than replace.
#[derive(Debug, Default)]
struct FeedCache {
    items: Vec<FeedItem>,
    end_cursor: Option<String>,
    has_next_page: bool,
    primed: bool,
}

impl FeedCache {
    /// Concatenate a fetched page, skipping ids already present.
    fn merge(&mut self, items: Vec<FeedItem>, end_cursor: Option<String>, has_next_page: bool) {
        for item in items {
            if !self.items.iter().any(|existing| existing.id == item.id) {
                self.items.push(item);
            }
        }
        self.end_cursor = end_cursor;
        self.has_next_page = has_next_page;
        self.primed = true;
    }
}

/// Data client over the GraphQL BFF.
pub struct GraphQlClient {
    endpoint: String,
    http: reqwest::Client,
    session: Arc<SessionManager>,
    fetch_policy: FetchPolicy,
    feed_cache: RwLock<FeedCache>,
}

impl GraphQlClient {
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn new(config: &Config, session: Arc<SessionManager>, fetch_policy: FetchPolicy) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            endpoint: config.graphql_url.clone(),
            http,
            session,
            fetch_policy,
            feed_cache: RwLock::new(FeedCache::default()),
        }
    }

    /// Continuation cursor for the next feed page, if any.
    pub async fn feed_end_cursor(&self) -> Option<String> {
        let cache = self.feed_cache.read().await;
        if cache.has_next_page {
            cache.end_cursor.clone()
        } else {
            None
        }
    }

    fn detached_error() -> DataError {
        DataError::Network {
            message: "GraphQL transport detached while BFF is unavailable".to_string(),
            bff_unavailable: true,
        }
    }

    /// Execute one GraphQL operation document.
    ///
    /// Field-level errors alongside data are logged and the partial data is
    /// returned; errors with no data become a classified [`DataError`].
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<T, DataError> {
        if self.fetch_policy == FetchPolicy::CacheOnly {
            return Err(Self::detached_error());
        }

        let body = serde_json::json!({ "query": query, "variables": variables });
        let response = send_with_refresh(&self.session, true, |token| {
            let mut req = self.http.post(&self.endpoint).json(&body);
            if let Some(token) = token {
                req = req.bearer_auth(token);
            }
            req
        })
        .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| DataError::Decode(format!("{operation}: {e}")))?;

        match (parsed.data, parsed.errors) {
            (Some(data), Some(errors)) if !errors.is_empty() => {
                // Permissive policy: callers must tolerate a present but
                // incomplete result after this warning.
                warn!(
                    operation,
                    errors = %join_messages(&errors),
                    "GraphQL returned partial data with field errors"
                );
                Ok(data)
            }
            (Some(data), _) => Ok(data),
            (None, Some(errors)) if !errors.is_empty() => Err(classify_errors(&errors)),
            _ => Err(DataError::Decode(format!(
                "{operation}: response carried neither data nor errors"
            ))),
        }
    }

    /// Run a toggle mutation, degrading every failure to `false`.
    ///
    /// The schema reports the outcome through the mutation's Boolean field
    /// (`field`), so a well-formed response carrying `false` is still a
    /// failed toggle.
    async fn toggle(
        &self,
        op: &'static str,
        field: &'static str,
        entity_id: &str,
        query: &'static str,
        variables: serde_json::Value,
    ) -> bool {
        match self
            .execute::<serde_json::Value>(op, query, variables)
            .await
        {
            Ok(data) => {
                let succeeded = data
                    .get(field)
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                if !succeeded {
                    warn!(op, entity_id, "Toggle mutation reported failure");
                }
                succeeded
            }
            Err(e) => {
                warn!(op, entity_id, error = %e, "Toggle operation failed");
                false
            }
        }
    }

    async fn fetch_feed(&self, params: &FeedParams) -> Result<Vec<FeedItem>, DataError> {
        let variables = serde_json::json!({
            "cursor": params.cursor,
            "limit": params.limit.unwrap_or(DEFAULT_FEED_LIMIT),
        });
        let data: FeedData = self.execute("feed", FEED_QUERY, variables).await?;

        let items: Vec<FeedItem> = data
            .feed
            .edges
            .into_iter()
            .map(|edge| feed_item_from_wire(edge.node))
            .collect();
        debug!(
            fetched = items.len(),
            total = data.feed.total_count,
            "Fetched feed page via GraphQL"
        );

        let mut cache = self.feed_cache.write().await;
        cache.merge(
            items,
            data.feed.page_info.end_cursor,
            data.feed.page_info.has_next_page,
        );
        // Callers see the accumulated list, not just the fetched page.
        Ok(cache.items.clone())
    }
}

#[async_trait]
impl DataClient for GraphQlClient {
    async fn get_feed(&self, params: FeedParams) -> Result<Vec<FeedItem>, DataError> {
        match self.fetch_policy {
            FetchPolicy::CacheOnly => {
                let cache = self.feed_cache.read().await;
                if cache.primed {
                    Ok(cache.items.clone())
                } else {
                    Err(Self::detached_error())
                }
            }
            FetchPolicy::CacheFirst => {
                if params.cursor.is_none() {
                    let cache = self.feed_cache.read().await;
                    if cache.primed {
                        return Ok(cache.items.clone());
                    }
                }
                self.fetch_feed(&params).await
            }
            FetchPolicy::NetworkOnly => self.fetch_feed(&params).await,
        }
    }

    async fn get_topic(&self, id: &str) -> Result<FeedItem, DataError> {
        let data: TopicData = self
            .execute("topic", TOPIC_QUERY, serde_json::json!({ "id": id }))
            .await?;
        data.topic
            .map(feed_item_from_wire)
            .ok_or_else(|| DataError::NotFound(format!("topic {id}")))
    }

    async fn get_topic_posts(
        &self,
        topic_id: &str,
        page: Option<u32>,
    ) -> Result<Vec<Post>, DataError> {
        let data: TopicPostsData = self
            .execute(
                "topicPosts",
                TOPIC_POSTS_QUERY,
                serde_json::json!({ "topicId": topic_id, "page": page }),
            )
            .await?;
        Ok(data.topic_posts.into_iter().map(post_from_wire).collect())
    }

    async fn get_post(&self, id: &str) -> Result<Post, DataError> {
        let data: PostData = self
            .execute("post", POST_QUERY, serde_json::json!({ "id": id }))
            .await?;
        data.post
            .map(post_from_wire)
            .ok_or_else(|| DataError::NotFound(format!("post {id}")))
    }

    async fn create_post(&self, input: CreatePostInput) -> Result<CreatedPost, DataError> {
        let variables = serde_json::json!({
            "input": {
                "title": input.title,
                "content": input.content,
                "categoryId": input.category_id,
                "tags": input.tags,
            }
        });
        let data: CreatePostData = self
            .execute("createPost", CREATE_POST_MUTATION, variables)
            .await?;
        Ok(CreatedPost {
            id: data.create_post.id,
            topic_id: data.create_post.topic_id,
            post_id: data.create_post.post_id,
        })
    }

    async fn get_categories(&self) -> Result<Vec<Category>, DataError> {
        let data: CategoriesData = self
            .execute("categories", CATEGORIES_QUERY, serde_json::json!({}))
            .await?;
        Ok(data.categories.into_iter().map(category_from_wire).collect())
    }

    async fn get_category(&self, id: &str) -> Result<Category, DataError> {
        let data: CategoryData = self
            .execute("category", CATEGORY_QUERY, serde_json::json!({ "id": id }))
            .await?;
        data.category
            .map(category_from_wire)
            .ok_or_else(|| DataError::NotFound(format!("category {id}")))
    }

    async fn get_current_user(&self) -> Result<Option<User>, DataError> {
        if !self.session.is_authenticated().await {
            return Ok(None);
        }
        let data: MeData = self.execute("me", ME_QUERY, serde_json::json!({})).await?;
        Ok(data.me.map(user_from_wire))
    }

    async fn get_user(&self, id: &str) -> Result<User, DataError> {
        let data: UserData = self
            .execute("user", USER_QUERY, serde_json::json!({ "id": id }))
            .await?;
        data.user
            .map(user_from_wire)
            .ok_or_else(|| DataError::NotFound(format!("user {id}")))
    }

    async fn search(&self, params: SearchParams) -> Result<Vec<SearchResult>, DataError> {
        let variables = serde_json::json!({
            "query": params.query,
            "type": params.result_type.map(SearchResultType::as_str),
            "limit": params.limit,
        });
        let data: SearchData = self.execute("search", SEARCH_QUERY, variables).await?;
        Ok(data
            .search
            .into_iter()
            .filter_map(search_result_from_wire)
            .collect())
    }

    async fn like_post(&self, post_id: &str) -> bool {
        self.toggle(
            "like_post",
            "likePost",
            post_id,
            LIKE_POST_MUTATION,
            serde_json::json!({ "postId": post_id }),
        )
        .await
    }

    async fn unlike_post(&self, post_id: &str) -> bool {
        self.toggle(
            "unlike_post",
            "unlikePost",
            post_id,
            UNLIKE_POST_MUTATION,
            serde_json::json!({ "postId": post_id }),
        )
        .await
    }

    async fn bookmark_topic(&self, topic_id: &str) -> bool {
        self.toggle(
            "bookmark_topic",
            "bookmarkTopic",
            topic_id,
            BOOKMARK_TOPIC_MUTATION,
            serde_json::json!({ "topicId": topic_id }),
        )
        .await
    }

    async fn unbookmark_topic(&self, topic_id: &str) -> bool {
        self.toggle(
            "unbookmark_topic",
            "unbookmarkTopic",
            topic_id,
            UNBOOKMARK_TOPIC_MUTATION,
            serde_json::json!({ "topicId": topic_id }),
        )
        .await
    }

    async fn get_notifications(&self) -> Result<Vec<Notification>, DataError> {
        let data: NotificationsData = self
            .execute("notifications", NOTIFICATIONS_QUERY, serde_json::json!({}))
            .await?;
        Ok(data
            .notifications
            .into_iter()
            .map(notification_from_wire)
            .collect())
    }

    async fn mark_notification_read(&self, id: &str) -> bool {
        self.toggle(
            "mark_notification_read",
            "markNotificationRead",
            id,
            MARK_NOTIFICATION_READ_MUTATION,
            serde_json::json!({ "id": id }),
        )
        .await
    }

    async fn mark_all_notifications_read(&self) -> bool {
        self.toggle(
            "mark_all_notifications_read",
            "markAllNotificationsRead",
            "*",
            MARK_ALL_NOTIFICATIONS_READ_MUTATION,
            serde_json::json!({}),
        )
        .await
    }

    async fn is_healthy(&self) -> bool {
        if self.fetch_policy == FetchPolicy::CacheOnly {
            return false;
        }
        // Plain unauthenticated probe on a short budget: must never trigger
        // a token refresh or wait out the full request timeout.
        let body = serde_json::json!({ "query": HEALTH_QUERY, "variables": {} });
        let request = self
            .http
            .post(&self.endpoint)
            .timeout(HEALTH_PROBE_TIMEOUT)
            .json(&body);
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "BFF health check failed");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Operation documents
// ---------------------------------------------------------------------------

macro_rules! doc {
    ($($part:expr),+) => { concat!($($part),+) };
}

const FEED_QUERY: &str = doc!(
    "query Feed($cursor: String, $limit: Int) { feed(cursor: $cursor, limit: $limit) {",
    " edges { cursor node { id title excerpt imageUrl createdAt updatedAt",
    " postsCount replyCount views likeCount isLiked isBookmarked isClosed isArchived",
    " author { id username name avatarUrl } category { id name slug color } } }",
    " pageInfo { endCursor hasNextPage } totalCount } }"
);

const TOPIC_QUERY: &str = doc!(
    "query Topic($id: ID!) { topic(id: $id) {",
    " id title excerpt imageUrl createdAt updatedAt",
    " postsCount replyCount views likeCount isLiked isBookmarked isClosed isArchived",
    " author { id username name avatarUrl } category { id name slug color } } }"
);

const TOPIC_POSTS_QUERY: &str = doc!(
    "query TopicPosts($topicId: ID!, $page: Int) { topicPosts(topicId: $topicId, page: $page) {",
    " id topicId raw cooked createdAt updatedAt postNumber likeCount isLiked isBookmarked",
    " author { id username name avatarUrl } } }"
);

const POST_QUERY: &str = doc!(
    "query Post($id: ID!) { post(id: $id) {",
    " id topicId raw cooked createdAt updatedAt postNumber likeCount isLiked isBookmarked",
    " author { id username name avatarUrl } } }"
);

const CATEGORIES_QUERY: &str =
    "query Categories { categories { id name slug color description topicsCount postsCount } }";

const CATEGORY_QUERY: &str = doc!(
    "query Category($id: ID!) { category(id: $id) {",
    " id name slug color description topicsCount postsCount } }"
);

const ME_QUERY: &str = doc!(
    "query Me { me {",
    " id username name email avatarUrl trustLevel isAdmin isModerator title",
    " createdAt lastSeenAt",
    " stats { postsCount topicsCount likesReceived followersCount followingCount } } }"
);

const USER_QUERY: &str = doc!(
    "query User($id: ID!) { user(id: $id) {",
    " id username name email avatarUrl trustLevel isAdmin isModerator title",
    " createdAt lastSeenAt",
    " stats { postsCount topicsCount likesReceived followersCount followingCount } } }"
);

const SEARCH_QUERY: &str = doc!(
    "query Search($query: String!, $type: String, $limit: Int) {",
    " search(query: $query, type: $type, limit: $limit) {",
    " id type title content createdAt",
    " author { id username name avatarUrl } category { id name slug color } } }"
);

const NOTIFICATIONS_QUERY: &str =
    "query Notifications { notifications { id type read createdAt data } }";

const HEALTH_QUERY: &str = "query Health { health }";

const CREATE_POST_MUTATION: &str = doc!(
    "mutation CreatePost($input: CreatePostInput!) {",
    " createPost(input: $input) { id topicId postId } }"
);

const LIKE_POST_MUTATION: &str =
    "mutation LikePost($postId: ID!) { likePost(postId: $postId) }";
const UNLIKE_POST_MUTATION: &str =
    "mutation UnlikePost($postId: ID!) { unlikePost(postId: $postId) }";
const BOOKMARK_TOPIC_MUTATION: &str =
    "mutation BookmarkTopic($topicId: ID!) { bookmarkTopic(topicId: $topicId) }";
const UNBOOKMARK_TOPIC_MUTATION: &str =
    "mutation UnbookmarkTopic($topicId: ID!) { unbookmarkTopic(topicId: $topicId) }";
const MARK_NOTIFICATION_READ_MUTATION: &str =
    "mutation MarkNotificationRead($id: ID!) { markNotificationRead(id: $id) }";
const MARK_ALL_NOTIFICATIONS_READ_MUTATION: &str =
    "mutation MarkAllNotificationsRead { markAllNotificationsRead }";

// ---------------------------------------------------------------------------
// Wire shapes (BFF schema, camelCase)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorExtensions {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    feed: FeedConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedConnection {
    #[serde(default)]
    edges: Vec<FeedEdge>,
    page_info: PageInfo,
    #[serde(default)]
    total_count: u32,
}

#[derive(Debug, Deserialize)]
struct FeedEdge {
    node: FeedItemWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    end_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedItemWire {
    id: String,
    title: String,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    posts_count: u32,
    #[serde(default)]
    reply_count: u32,
    #[serde(default)]
    views: u32,
    #[serde(default)]
    like_count: u32,
    #[serde(default)]
    is_liked: bool,
    #[serde(default)]
    is_bookmarked: bool,
    #[serde(default)]
    is_closed: bool,
    #[serde(default)]
    is_archived: bool,
    #[serde(default)]
    author: Option<UserSummaryWire>,
    #[serde(default)]
    category: Option<CategorySummaryWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserSummaryWire {
    id: String,
    username: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategorySummaryWire {
    id: String,
    name: String,
    slug: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopicData {
    topic: Option<FeedItemWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicPostsData {
    #[serde(default)]
    topic_posts: Vec<PostWire>,
}

#[derive(Debug, Deserialize)]
struct PostData {
    post: Option<PostWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostWire {
    id: String,
    topic_id: String,
    #[serde(default)]
    raw: Option<String>,
    #[serde(default)]
    cooked: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    post_number: u32,
    #[serde(default)]
    like_count: u32,
    #[serde(default)]
    is_liked: bool,
    #[serde(default)]
    is_bookmarked: bool,
    author: UserSummaryWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostData {
    create_post: CreatedPostWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPostWire {
    id: String,
    topic_id: String,
    post_id: String,
}

#[derive(Debug, Deserialize)]
struct CategoriesData {
    #[serde(default)]
    categories: Vec<CategoryWire>,
}

#[derive(Debug, Deserialize)]
struct CategoryData {
    category: Option<CategoryWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryWire {
    id: String,
    name: String,
    slug: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    topics_count: u32,
    #[serde(default)]
    posts_count: u32,
}

#[derive(Debug, Deserialize)]
struct MeData {
    me: Option<UserWire>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: Option<UserWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserWire {
    id: String,
    username: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    trust_level: u8,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    is_moderator: bool,
    #[serde(default)]
    title: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    last_seen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    stats: Option<UserStatsWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserStatsWire {
    #[serde(default)]
    posts_count: u32,
    #[serde(default)]
    topics_count: u32,
    #[serde(default)]
    likes_received: u32,
    #[serde(default)]
    followers_count: u32,
    #[serde(default)]
    following_count: u32,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    search: Vec<SearchResultWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultWire {
    id: String,
    #[serde(rename = "type")]
    result_type: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    author: Option<UserSummaryWire>,
    #[serde(default)]
    category: Option<CategorySummaryWire>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct NotificationsData {
    #[serde(default)]
    notifications: Vec<NotificationWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationWire {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    read: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Classify data-less GraphQL errors by their extension code.
fn classify_errors(errors: &[GraphQlError]) -> DataError {
    let message = join_messages(errors);
    let code = errors
        .iter()
        .find_map(|e| e.extensions.as_ref().and_then(|x| x.code.as_deref()));
    match code {
        Some("UNAUTHENTICATED" | "UNAUTHORIZED") => DataError::Unauthorized(message),
        Some("FORBIDDEN") => DataError::Forbidden(message),
        Some("NOT_FOUND") => DataError::NotFound(message),
        Some("BAD_USER_INPUT" | "VALIDATION_ERROR") => DataError::Validation(message),
        Some("RATE_LIMITED") => DataError::RateLimited(message),
        // Treat anything else as an upstream fault behind the BFF.
        _ => DataError::Server {
            status: 502,
            message,
        },
    }
}

fn user_summary_from_wire(user: UserSummaryWire) -> UserSummary {
    UserSummary {
        id: user.id,
        username: user.username,
        name: user.name,
        avatar_url: user.avatar_url,
    }
}

fn category_summary_from_wire(category: CategorySummaryWire) -> CategorySummary {
    CategorySummary {
        id: category.id,
        name: category.name,
        slug: category.slug,
        color: category.color,
    }
}

fn feed_item_from_wire(item: FeedItemWire) -> FeedItem {
    FeedItem {
        id: item.id,
        title: item.title,
        excerpt: item.excerpt,
        author: item
            .author
            .map_or(FeedAuthor::Unknown, |a| FeedAuthor::Known(user_summary_from_wire(a))),
        category: item.category.map(category_summary_from_wire),
        created_at: item.created_at,
        updated_at: item.updated_at,
        posts_count: item.posts_count,
        reply_count: item.reply_count,
        views: item.views,
        like_count: item.like_count,
        is_liked: item.is_liked,
        is_bookmarked: item.is_bookmarked,
        is_closed: item.is_closed,
        is_archived: item.is_archived,
        image_url: item.image_url,
    }
}

fn post_from_wire(post: PostWire) -> Post {
    Post {
        id: post.id,
        topic_id: post.topic_id,
        raw: post.raw,
        cooked: post.cooked,
        author: user_summary_from_wire(post.author),
        created_at: post.created_at,
        updated_at: post.updated_at,
        post_number: post.post_number,
        like_count: post.like_count,
        is_liked: post.is_liked,
        is_bookmarked: post.is_bookmarked,
    }
}

fn category_from_wire(category: CategoryWire) -> Category {
    Category {
        id: category.id,
        name: category.name,
        slug: category.slug,
        color: category.color,
        description: category.description,
        topics_count: category.topics_count,
        posts_count: category.posts_count,
    }
}

fn user_from_wire(user: UserWire) -> User {
    let stats = user.stats.map_or_else(UserStats::default, |s| UserStats {
        posts_count: s.posts_count,
        topics_count: s.topics_count,
        likes_received: s.likes_received,
        followers_count: s.followers_count,
        following_count: s.following_count,
    });
    User {
        id: user.id,
        username: user.username,
        name: user.name,
        email: user.email,
        avatar_url: user.avatar_url,
        trust_level: user.trust_level,
        is_admin: user.is_admin,
        is_moderator: user.is_moderator,
        title: user.title,
        created_at: user.created_at,
        last_seen_at: user.last_seen_at,
        stats,
    }
}

fn notification_from_wire(notification: NotificationWire) -> Notification {
    Notification {
        id: notification.id,
        kind: notification.kind,
        read: notification.read,
        created_at: notification.created_at,
        data: notification.data,
    }
}

fn search_result_from_wire(result: SearchResultWire) -> Option<SearchResult> {
    let result_type = match result.result_type.as_str() {
        "topic" => SearchResultType::Topic,
        "post" => SearchResultType::Post,
        "user" => SearchResultType::User,
        other => {
            warn!(result_type = other, id = %result.id, "Dropping search hit with unknown type");
            return None;
        }
    };
    Some(SearchResult {
        id: result.id,
        result_type,
        title: result.title,
        content: result.content,
        author: result.author.map(user_summary_from_wire),
        category: result.category.map(category_summary_from_wire),
        created_at: result.created_at,
    })
}
