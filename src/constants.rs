//! Shared constants used across the data layer.

use std::time::Duration;

/// Discourse post action type id for a "like".
pub const POST_ACTION_TYPE_LIKE: i64 = 2;

/// Logical secret names under which the token pair is persisted.
pub const ACCESS_TOKEN_KEY: &str = "fomio.access_token";
pub const REFRESH_TOKEN_KEY: &str = "fomio.refresh_token";

/// Abort window for the BFF health probe.
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_millis(1200);

/// Request timeout applied to every adapter HTTP client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default feed page size when the caller does not supply one.
pub const DEFAULT_FEED_LIMIT: u32 = 20;
