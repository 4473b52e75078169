use thiserror::Error;

/// Error taxonomy shared by both data client adapters.
///
/// Read operations propagate these; toggle mutations swallow them and
/// degrade to `false` (logged, never surfaced).
#[derive(Debug, Error)]
pub enum DataError {
    /// No, expired, or unrefreshable credential. Callers must re-authenticate.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but insufficient permission.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Requested entity absent; callers show an empty/not-found state.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend throttling; retryable, backoff is the caller's decision.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Backend fault (5xx); retryable.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Transport failure (DNS, timeout, connection reset); retryable.
    /// `bff_unavailable` tags failures originating from the GraphQL
    /// transport, which the selector treats as a failover signal.
    #[error("network error: {message}")]
    Network {
        message: String,
        bff_unavailable: bool,
    },

    /// Malformed request rejected by the backend; not retryable as-is.
    #[error("validation error: {0}")]
    Validation(String),

    /// Backend response did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl DataError {
    /// Whether a caller may reasonably retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Server { .. } | Self::Network { .. }
        )
    }

    /// True when the error marks the GraphQL BFF as unreachable.
    #[must_use]
    pub const fn is_bff_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Network {
                bff_unavailable: true,
                ..
            }
        )
    }

    /// Map a non-2xx HTTP status and backend message into the taxonomy.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            400 | 422 => Self::Validation(message),
            429 => Self::RateLimited(message),
            _ => Self::Server { status, message },
        }
    }

    /// Wrap a reqwest transport error, tagging GraphQL-originated failures.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error, bff: bool) -> Self {
        Self::Network {
            message: err.to_string(),
            bff_unavailable: bff,
        }
    }
}
