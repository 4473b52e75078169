//! REST adapter: maps the data client contract onto the forum's native
//! JSON endpoints and normalizes the loosely-typed responses into the
//! common model.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionManager;
use crate::client::{
    error_from_response, send_with_refresh, CreatePostInput, DataClient, FeedParams, SearchParams,
};
use crate::config::Config;
use crate::constants::{HEALTH_PROBE_TIMEOUT, POST_ACTION_TYPE_LIKE, REQUEST_TIMEOUT};
use crate::error::DataError;
use crate::model::{
    Category, CreatedPost, FeedAuthor, FeedItem, Notification, Post, SearchResult,
    SearchResultType, User, UserStats, UserSummary,
};

/// Data client over the forum's REST endpoints.
pub struct RestClient {
    base_url: String,
    api_key: Option<String>,
    api_username: Option<String>,
    http: reqwest::Client,
    session: Arc<SessionManager>,
}

impl RestClient {
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn new(config: &Config, session: Arc<SessionManager>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            base_url: config.forum_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_username: config.api_username.clone(),
            http,
            session,
        }
    }

    fn attach_headers(
        &self,
        mut req: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        req = req.header(ACCEPT, "application/json");
        if let (Some(key), Some(username)) = (&self.api_key, &self.api_username) {
            req = req.header("Api-Key", key).header("Api-Username", username);
        }
        if let Some(token) = token {
            // Bearer credential plus the forum session cookie reconstructed
            // from the same access snapshot; adapters never see the refresh
            // token.
            req = req
                .bearer_auth(token)
                .header("Cookie", format!("_t={token}"));
        }
        req
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T, DataError> {
        let url = format!("{}{}", self.base_url, path);
        let response = send_with_refresh(&self.session, false, |token| {
            let mut req = self.http.request(method.clone(), &url).query(query);
            req = self.attach_headers(req, token);
            if let Some(body) = &body {
                req = req.json(body);
            }
            req
        })
        .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| DataError::Decode(format!("{path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DataError> {
        self.execute(reqwest::Method::GET, path, query, None).await
    }

    /// Run a toggle mutation, degrading every failure to `false`.
    async fn toggle(
        &self,
        op: &'static str,
        entity_id: &str,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> bool {
        match self
            .execute::<serde_json::Value>(method, path, query, body)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(op, entity_id, error = %e, "Toggle operation failed");
                false
            }
        }
    }
}

#[async_trait]
impl DataClient for RestClient {
    async fn get_feed(&self, params: FeedParams) -> Result<Vec<FeedItem>, DataError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(page) = params.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(category_id) = &params.category_id {
            query.push(("category_id", category_id.clone()));
        }
        let response: LatestResponse = self.get_json("/latest.json", &query).await?;

        let items = response
            .topic_list
            .topics
            .iter()
            .map(|topic| feed_item_from_topic(topic, &response.users, &self.base_url))
            .collect::<Vec<_>>();
        debug!(count = items.len(), "Fetched feed page via REST");
        Ok(items)
    }

    async fn get_topic(&self, id: &str) -> Result<FeedItem, DataError> {
        let response: TopicResponse = self.get_json(&format!("/t/{id}.json"), &[]).await?;
        Ok(feed_item_from_topic_detail(&response, &self.base_url))
    }

    async fn get_topic_posts(
        &self,
        topic_id: &str,
        page: Option<u32>,
    ) -> Result<Vec<Post>, DataError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        let response: TopicResponse = self
            .get_json(&format!("/t/{topic_id}.json"), &query)
            .await?;
        Ok(response
            .post_stream
            .posts
            .iter()
            .map(|post| post_from_wire(post, &self.base_url))
            .collect())
    }

    async fn get_post(&self, id: &str) -> Result<Post, DataError> {
        let post: DiscoursePost = self.get_json(&format!("/posts/{id}.json"), &[]).await?;
        Ok(post_from_wire(&post, &self.base_url))
    }

    async fn create_post(&self, input: CreatePostInput) -> Result<CreatedPost, DataError> {
        let mut body = serde_json::json!({
            "title": input.title,
            "raw": input.content,
        });
        if let Some(category_id) = &input.category_id {
            body["category"] = serde_json::Value::String(category_id.clone());
        }
        if !input.tags.is_empty() {
            body["tags"] = serde_json::json!(input.tags);
        }
        let created: CreatedPostResponse = self
            .execute(reqwest::Method::POST, "/posts.json", &[], Some(body))
            .await?;
        Ok(CreatedPost {
            id: created.topic_id.to_string(),
            topic_id: created.topic_id.to_string(),
            post_id: created.id.to_string(),
        })
    }

    async fn get_categories(&self) -> Result<Vec<Category>, DataError> {
        let response: CategoriesResponse = self.get_json("/categories.json", &[]).await?;
        Ok(response
            .category_list
            .categories
            .iter()
            .map(category_from_wire)
            .collect())
    }

    async fn get_category(&self, id: &str) -> Result<Category, DataError> {
        let response: CategoryShowResponse = self.get_json(&format!("/c/{id}.json"), &[]).await?;
        Ok(category_from_wire(&response.category))
    }

    async fn get_current_user(&self) -> Result<Option<User>, DataError> {
        // An unauthenticated session can never resolve to a user; skip the
        // network round-trip entirely.
        if !self.session.is_authenticated().await {
            return Ok(None);
        }
        match self
            .get_json::<CurrentUserResponse>("/session/current.json", &[])
            .await
        {
            Ok(response) => Ok(Some(user_from_wire(&response.current_user, &self.base_url))),
            // 404 here means "no session", not a missing entity.
            Err(DataError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_user(&self, id: &str) -> Result<User, DataError> {
        let response: UserResponse = self.get_json(&format!("/users/{id}.json"), &[]).await?;
        Ok(user_from_wire(&response.user, &self.base_url))
    }

    async fn search(&self, params: SearchParams) -> Result<Vec<SearchResult>, DataError> {
        let mut query: Vec<(&str, String)> = vec![("q", params.query.clone())];
        if let Some(result_type) = params.result_type {
            query.push(("type", result_type.as_str().to_string()));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        let response: SearchResponse = self.get_json("/search.json", &query).await?;

        let mut results = Vec::new();
        for topic in &response.topics {
            results.push(SearchResult {
                id: topic.id.to_string(),
                result_type: SearchResultType::Topic,
                title: topic.title.clone(),
                content: topic.excerpt.clone(),
                author: None,
                category: None,
                created_at: Some(topic.created_at),
            });
        }
        for post in &response.posts {
            results.push(SearchResult {
                id: post.id.to_string(),
                result_type: SearchResultType::Post,
                title: post.topic_title_headline.clone().unwrap_or_default(),
                content: post.blurb.clone(),
                author: Some(UserSummary {
                    id: post.user_id.to_string(),
                    username: post.username.clone(),
                    name: None,
                    avatar_url: avatar_url(post.avatar_template.as_deref(), &self.base_url),
                }),
                category: None,
                created_at: post.created_at,
            });
        }
        for user in &response.users {
            results.push(SearchResult {
                id: user.id.to_string(),
                result_type: SearchResultType::User,
                title: user.username.clone(),
                content: None,
                author: Some(user_summary_from_wire(user, &self.base_url)),
                category: None,
                created_at: None,
            });
        }
        if let Some(limit) = params.limit {
            results.truncate(limit as usize);
        }
        Ok(results)
    }

    async fn like_post(&self, post_id: &str) -> bool {
        let body = serde_json::json!({
            "id": post_id,
            "post_action_type_id": POST_ACTION_TYPE_LIKE,
        });
        self.toggle(
            "like_post",
            post_id,
            reqwest::Method::POST,
            "/post_actions.json",
            &[],
            Some(body),
        )
        .await
    }

    async fn unlike_post(&self, post_id: &str) -> bool {
        self.toggle(
            "unlike_post",
            post_id,
            reqwest::Method::DELETE,
            &format!("/post_actions/{post_id}.json"),
            &[("post_action_type_id", POST_ACTION_TYPE_LIKE.to_string())],
            None,
        )
        .await
    }

    async fn bookmark_topic(&self, topic_id: &str) -> bool {
        self.toggle(
            "bookmark_topic",
            topic_id,
            reqwest::Method::PUT,
            &format!("/t/{topic_id}/bookmark.json"),
            &[],
            None,
        )
        .await
    }

    async fn unbookmark_topic(&self, topic_id: &str) -> bool {
        self.toggle(
            "unbookmark_topic",
            topic_id,
            reqwest::Method::DELETE,
            &format!("/t/{topic_id}/bookmark.json"),
            &[],
            None,
        )
        .await
    }

    async fn get_notifications(&self) -> Result<Vec<Notification>, DataError> {
        let response: NotificationsResponse = self.get_json("/notifications.json", &[]).await?;
        Ok(response
            .notifications
            .into_iter()
            .map(notification_from_wire)
            .collect())
    }

    async fn mark_notification_read(&self, id: &str) -> bool {
        self.toggle(
            "mark_notification_read",
            id,
            reqwest::Method::PUT,
            &format!("/notifications/{id}/read.json"),
            &[],
            None,
        )
        .await
    }

    async fn mark_all_notifications_read(&self) -> bool {
        self.toggle(
            "mark_all_notifications_read",
            "*",
            reqwest::Method::PUT,
            "/notifications/read.json",
            &[],
            None,
        )
        .await
    }

    async fn is_healthy(&self) -> bool {
        // Plain unauthenticated probe on a short budget; no refresh, no
        // full request timeout.
        let url = format!("{}/about.json", self.base_url);
        match self.http.get(&url).timeout(HEALTH_PROBE_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "REST health check failed");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shapes (forum-native JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LatestResponse {
    topic_list: TopicList,
    #[serde(default)]
    users: Vec<DiscourseUserSummary>,
}

#[derive(Debug, Deserialize)]
struct TopicList {
    #[serde(default)]
    topics: Vec<DiscourseTopic>,
}

#[derive(Debug, Deserialize)]
struct DiscourseTopic {
    id: i64,
    title: String,
    #[serde(default)]
    excerpt: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    bumped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    posts_count: u32,
    #[serde(default)]
    reply_count: u32,
    #[serde(default)]
    views: u32,
    #[serde(default)]
    like_count: u32,
    #[serde(default)]
    liked: bool,
    #[serde(default)]
    bookmarked: bool,
    #[serde(default)]
    closed: bool,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    posters: Vec<DiscoursePoster>,
}

#[derive(Debug, Deserialize)]
struct DiscoursePoster {
    user_id: i64,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct DiscourseUserSummary {
    id: i64,
    username: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_template: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopicResponse {
    id: i64,
    title: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    posts_count: u32,
    #[serde(default)]
    reply_count: u32,
    #[serde(default)]
    views: u32,
    #[serde(default)]
    like_count: u32,
    #[serde(default)]
    closed: bool,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    bookmarked: bool,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    post_stream: PostStream,
    #[serde(default)]
    details: Option<TopicDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct PostStream {
    #[serde(default)]
    posts: Vec<DiscoursePost>,
}

#[derive(Debug, Deserialize)]
struct TopicDetails {
    #[serde(default)]
    created_by: Option<DiscourseUserSummary>,
}

#[derive(Debug, Deserialize)]
struct DiscoursePost {
    id: i64,
    #[serde(default)]
    topic_id: i64,
    #[serde(default)]
    raw: Option<String>,
    #[serde(default)]
    cooked: String,
    #[serde(default)]
    user_id: i64,
    username: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_template: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    post_number: u32,
    #[serde(default)]
    actions_summary: Vec<ActionSummary>,
    #[serde(default)]
    bookmarked: bool,
}

#[derive(Debug, Deserialize)]
struct ActionSummary {
    id: i64,
    #[serde(default)]
    count: u32,
    #[serde(default)]
    acted: bool,
}

#[derive(Debug, Deserialize)]
struct CreatedPostResponse {
    id: i64,
    topic_id: i64,
}

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    category_list: CategoryList,
}

#[derive(Debug, Deserialize)]
struct CategoryList {
    #[serde(default)]
    categories: Vec<DiscourseCategory>,
}

#[derive(Debug, Deserialize)]
struct DiscourseCategory {
    id: i64,
    name: String,
    slug: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    topic_count: u32,
    #[serde(default)]
    post_count: u32,
}

#[derive(Debug, Deserialize)]
struct CategoryShowResponse {
    category: DiscourseCategory,
}

#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    current_user: DiscourseUser,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: DiscourseUser,
}

#[derive(Debug, Deserialize)]
struct DiscourseUser {
    id: i64,
    username: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar_template: Option<String>,
    #[serde(default)]
    trust_level: u8,
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    moderator: bool,
    #[serde(default)]
    title: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    last_seen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    post_count: u32,
    #[serde(default)]
    topic_count: u32,
    #[serde(default)]
    likes_received: u32,
    #[serde(default)]
    followers_count: u32,
    #[serde(default)]
    following_count: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    topics: Vec<DiscourseTopic>,
    #[serde(default)]
    posts: Vec<SearchPost>,
    #[serde(default)]
    users: Vec<DiscourseUserSummary>,
}

#[derive(Debug, Deserialize)]
struct SearchPost {
    id: i64,
    #[serde(default)]
    user_id: i64,
    #[serde(default)]
    username: String,
    #[serde(default)]
    avatar_template: Option<String>,
    #[serde(default)]
    blurb: Option<String>,
    #[serde(default)]
    topic_title_headline: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct NotificationsResponse {
    #[serde(default)]
    notifications: Vec<DiscourseNotification>,
}

#[derive(Debug, Deserialize, Serialize)]
struct DiscourseNotification {
    id: i64,
    notification_type: i64,
    #[serde(default)]
    read: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

const ORIGINAL_POSTER: &str = "Original Poster";
const MOST_RECENT_POSTER: &str = "Most Recent Poster";

/// Resolve the feed author from the topic's `posters` array.
///
/// The feed endpoint never carries the author directly; the entry tagged as
/// Original Poster (falling back to Most Recent Poster) is matched against
/// the response's `users` table. Anything unresolvable is `Unknown`.
fn resolve_feed_author(
    posters: &[DiscoursePoster],
    users: &[DiscourseUserSummary],
    base_url: &str,
) -> FeedAuthor {
    let poster = posters
        .iter()
        .find(|p| p.description.contains(ORIGINAL_POSTER))
        .or_else(|| posters.iter().find(|p| p.description.contains(MOST_RECENT_POSTER)));
    let Some(poster) = poster else {
        return FeedAuthor::Unknown;
    };
    users
        .iter()
        .find(|u| u.id == poster.user_id)
        .map_or(FeedAuthor::Unknown, |user| {
            FeedAuthor::Known(user_summary_from_wire(user, base_url))
        })
}

fn feed_item_from_topic(
    topic: &DiscourseTopic,
    users: &[DiscourseUserSummary],
    base_url: &str,
) -> FeedItem {
    FeedItem {
        id: topic.id.to_string(),
        title: topic.title.clone(),
        excerpt: topic.excerpt.clone(),
        author: resolve_feed_author(&topic.posters, users, base_url),
        // The feed endpoint does not embed category details.
        category: None,
        created_at: topic.created_at,
        updated_at: topic.bumped_at,
        posts_count: topic.posts_count,
        reply_count: topic.reply_count,
        views: topic.views,
        like_count: topic.like_count,
        is_liked: topic.liked,
        is_bookmarked: topic.bookmarked,
        is_closed: topic.closed,
        is_archived: topic.archived,
        image_url: topic.image_url.clone(),
    }
}

fn feed_item_from_topic_detail(topic: &TopicResponse, base_url: &str) -> FeedItem {
    let author = topic
        .details
        .as_ref()
        .and_then(|d| d.created_by.as_ref())
        .map_or(FeedAuthor::Unknown, |user| {
            FeedAuthor::Known(user_summary_from_wire(user, base_url))
        });
    let excerpt = topic.excerpt.clone().or_else(|| {
        topic
            .post_stream
            .posts
            .first()
            .map(|first| first.cooked.clone())
    });
    FeedItem {
        id: topic.id.to_string(),
        title: topic.title.clone(),
        excerpt,
        author,
        category: None,
        created_at: topic.created_at,
        updated_at: None,
        posts_count: topic.posts_count,
        reply_count: topic.reply_count,
        views: topic.views,
        like_count: topic.like_count,
        is_liked: topic
            .post_stream
            .posts
            .first()
            .is_some_and(|first| like_action(first).is_some_and(|a| a.acted)),
        is_bookmarked: topic.bookmarked,
        is_closed: topic.closed,
        is_archived: topic.archived,
        image_url: topic.image_url.clone(),
    }
}

fn like_action(post: &DiscoursePost) -> Option<&ActionSummary> {
    post.actions_summary
        .iter()
        .find(|a| a.id == POST_ACTION_TYPE_LIKE)
}

fn post_from_wire(post: &DiscoursePost, base_url: &str) -> Post {
    let like = like_action(post);
    Post {
        id: post.id.to_string(),
        topic_id: post.topic_id.to_string(),
        raw: post.raw.clone(),
        cooked: post.cooked.clone(),
        author: UserSummary {
            id: post.user_id.to_string(),
            username: post.username.clone(),
            name: post.name.clone(),
            avatar_url: avatar_url(post.avatar_template.as_deref(), base_url),
        },
        created_at: post.created_at,
        updated_at: post.updated_at,
        post_number: post.post_number,
        like_count: like.map_or(0, |a| a.count),
        is_liked: like.is_some_and(|a| a.acted),
        is_bookmarked: post.bookmarked,
    }
}

fn category_from_wire(category: &DiscourseCategory) -> Category {
    Category {
        id: category.id.to_string(),
        name: category.name.clone(),
        slug: category.slug.clone(),
        color: category.color.clone(),
        description: category.description.clone(),
        topics_count: category.topic_count,
        posts_count: category.post_count,
    }
}

fn user_from_wire(user: &DiscourseUser, base_url: &str) -> User {
    User {
        id: user.id.to_string(),
        username: user.username.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        avatar_url: avatar_url(user.avatar_template.as_deref(), base_url),
        trust_level: user.trust_level,
        is_admin: user.admin,
        is_moderator: user.moderator,
        title: user.title.clone(),
        created_at: user.created_at,
        last_seen_at: user.last_seen_at,
        stats: UserStats {
            posts_count: user.post_count,
            topics_count: user.topic_count,
            likes_received: user.likes_received,
            followers_count: user.followers_count,
            following_count: user.following_count,
        },
    }
}

fn user_summary_from_wire(user: &DiscourseUserSummary, base_url: &str) -> UserSummary {
    UserSummary {
        id: user.id.to_string(),
        username: user.username.clone(),
        name: user.name.clone(),
        avatar_url: avatar_url(user.avatar_template.as_deref(), base_url),
    }
}

/// Expand a Discourse avatar template (`.../{size}/...`) into an absolute URL.
fn avatar_url(template: Option<&str>, base_url: &str) -> Option<String> {
    let template = template?;
    let sized = template.replace("{size}", "120");
    if sized.starts_with("http") {
        Some(sized)
    } else {
        Some(format!("{base_url}{sized}"))
    }
}

fn notification_from_wire(notification: DiscourseNotification) -> Notification {
    Notification {
        id: notification.id.to_string(),
        kind: notification_kind(notification.notification_type),
        read: notification.read,
        created_at: notification.created_at,
        data: notification.data,
    }
}

/// Map the forum's numeric notification type ids onto the common string
/// tags; unknown ids pass through as their decimal form.
fn notification_kind(notification_type: i64) -> String {
    match notification_type {
        1 => "mentioned".to_string(),
        2 => "replied".to_string(),
        3 => "quoted".to_string(),
        4 => "edited".to_string(),
        5 => "liked".to_string(),
        6 => "private_message".to_string(),
        9 => "posted".to_string(),
        12 => "granted_badge".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poster(user_id: i64, description: &str) -> DiscoursePoster {
        DiscoursePoster {
            user_id,
            description: description.to_string(),
        }
    }

    fn user(id: i64, username: &str) -> DiscourseUserSummary {
        DiscourseUserSummary {
            id,
            username: username.to_string(),
            name: None,
            avatar_template: Some("/user_avatar/forum/{size}/1.png".to_string()),
        }
    }

    #[test]
    fn test_resolve_feed_author_prefers_original_poster() {
        let posters = vec![
            poster(9, "Most Recent Poster"),
            poster(7, "Original Poster, Most Recent Poster"),
        ];
        let users = vec![user(7, "alice"), user(9, "bob")];
        let author = resolve_feed_author(&posters, &users, "https://forum.example.com");
        assert_eq!(author.as_known().map(|u| u.username.as_str()), Some("alice"));
    }

    #[test]
    fn test_resolve_feed_author_falls_back_to_most_recent() {
        let posters = vec![poster(9, "Most Recent Poster")];
        let users = vec![user(9, "bob")];
        let author = resolve_feed_author(&posters, &users, "https://forum.example.com");
        assert_eq!(author.as_known().map(|u| u.username.as_str()), Some("bob"));
    }

    #[test]
    fn test_resolve_feed_author_unknown_when_untagged_or_unmatched() {
        // No recognizable tag
        let posters = vec![poster(7, "Frequent Poster")];
        let users = vec![user(7, "alice")];
        assert_eq!(
            resolve_feed_author(&posters, &users, "https://f.example"),
            FeedAuthor::Unknown
        );

        // Tagged but no matching user record
        let posters = vec![poster(7, "Original Poster")];
        assert_eq!(
            resolve_feed_author(&posters, &[], "https://f.example"),
            FeedAuthor::Unknown
        );
    }

    #[test]
    fn test_avatar_url_expansion() {
        assert_eq!(
            avatar_url(
                Some("/user_avatar/forum/{size}/1.png"),
                "https://forum.example.com"
            ),
            Some("https://forum.example.com/user_avatar/forum/120/1.png".to_string())
        );
        assert_eq!(
            avatar_url(Some("https://cdn.example.com/{size}/1.png"), "https://f"),
            Some("https://cdn.example.com/120/1.png".to_string())
        );
        assert_eq!(avatar_url(None, "https://f"), None);
    }

    #[test]
    fn test_notification_kind_mapping() {
        assert_eq!(notification_kind(1), "mentioned");
        assert_eq!(notification_kind(5), "liked");
        assert_eq!(notification_kind(12), "granted_badge");
        // Unknown ids pass through
        assert_eq!(notification_kind(99), "99");
    }

    #[test]
    fn test_topic_transform_defaults_absent_counts() {
        let topic: DiscourseTopic = serde_json::from_value(serde_json::json!({
            "id": 42,
            "title": "Hello",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let item = feed_item_from_topic(&topic, &[], "https://f.example");
        assert_eq!(item.id, "42");
        assert_eq!(item.posts_count, 0);
        assert_eq!(item.like_count, 0);
        assert!(!item.is_liked);
        assert!(!item.is_closed);
        assert_eq!(item.author, FeedAuthor::Unknown);
    }

    #[test]
    fn test_post_like_count_from_actions_summary() {
        let post: DiscoursePost = serde_json::from_value(serde_json::json!({
            "id": 10,
            "topic_id": 42,
            "cooked": "<p>hi</p>",
            "user_id": 7,
            "username": "alice",
            "created_at": "2024-01-01T00:00:00Z",
            "post_number": 3,
            "actions_summary": [{"id": 2, "count": 4, "acted": true}]
        }))
        .unwrap();
        let post = post_from_wire(&post, "https://f.example");
        assert_eq!(post.like_count, 4);
        assert!(post.is_liked);
        assert_eq!(post.post_number, 3);
        assert_eq!(post.author.username, "alice");
    }
}
