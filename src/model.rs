//! Backend-agnostic data model.
//!
//! Both adapters map their backend's native JSON into these shapes. Counts
//! default to 0 and flags to false during transformation, so downstream code
//! never needs null-guards on those fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compact author identity attached to feed items, posts and search hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Author of a feed item.
///
/// Feed listings reconstruct the author heuristically from the backend's
/// `posters` array; when that fails the author is explicitly `Unknown`
/// rather than a placeholder string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeedAuthor {
    Known(UserSummary),
    Unknown,
}

impl FeedAuthor {
    #[must_use]
    pub const fn as_known(&self) -> Option<&UserSummary> {
        match self {
            Self::Known(summary) => Some(summary),
            Self::Unknown => None,
        }
    }
}

/// Compact category identity attached to feed items and search hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub color: Option<String>,
}

/// A forum topic surfaced in a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Stable opaque id derived from the backend's numeric topic id.
    pub id: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub author: FeedAuthor,
    pub category: Option<CategorySummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub posts_count: u32,
    pub reply_count: u32,
    pub views: u32,
    pub like_count: u32,
    pub is_liked: bool,
    pub is_bookmarked: bool,
    pub is_closed: bool,
    pub is_archived: bool,
    pub image_url: Option<String>,
}

/// A single reply within a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub topic_id: String,
    /// Raw markdown source, when the backend exposes it.
    pub raw: Option<String>,
    /// Rendered ("cooked") HTML content.
    pub cooked: String,
    pub author: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// 1-based ordinal, monotonically increasing within a topic.
    pub post_number: u32,
    pub like_count: u32,
    pub is_liked: bool,
    pub is_bookmarked: bool,
}

/// A forum subdivision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub color: Option<String>,
    pub description: Option<String>,
    pub topics_count: u32,
    pub posts_count: u32,
}

/// Aggregate activity stats on a user profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub posts_count: u32,
    pub topics_count: u32,
    pub likes_received: u32,
    pub followers_count: u32,
    pub following_count: u32,
}

/// The account entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Immutable, unique handle.
    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    /// Forum-native ordinal privilege tier (0 = new user).
    pub trust_level: u8,
    pub is_admin: bool,
    pub is_moderator: bool,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub stats: UserStats,
}

/// An asynchronous event addressed to a user.
///
/// The `data` payload is free-form and must tolerate unknown keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// String tag naming the event kind ("mentioned", "replied", ...).
    pub kind: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub data: serde_json::Value,
}

/// Discriminant for polymorphic search hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchResultType {
    Topic,
    Post,
    User,
}

impl SearchResultType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Post => "post",
            Self::User => "user",
        }
    }
}

/// A polymorphic search hit over topics, posts and users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub result_type: SearchResultType,
    pub title: String,
    pub content: Option<String>,
    pub author: Option<UserSummary>,
    pub category: Option<CategorySummary>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Result of creating a new topic-starting post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPost {
    pub id: String,
    pub topic_id: String,
    pub post_id: String,
}
