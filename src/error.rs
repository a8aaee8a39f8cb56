//! Error handling types and utilities.

use std::time::Duration;

/// A specialized Result type for exile-trade operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Error returned by the trade search endpoint.
///
/// The orchestrator matches on this structurally: [`SearchError::RateLimited`]
/// is transient and retried with backoff, everything else is permanent and
/// counted as a failure without retry.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The endpoint rejected the request due to throughput limits.
    /// `retry_after` carries the wait the endpoint suggested, if any.
    #[error("rate limited")]
    RateLimited { retry_after: Option<Duration> },

    /// Non-success HTTP status that is not a rate limit.
    #[error("search failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The endpoint answered 2xx but the body was not a usable search result.
    #[error("malformed search response: {0}")]
    Malformed(String),

    /// Transport-level failure before any HTTP status was obtained.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
