/// Error types for the update checker
use thiserror::Error;

use super::channel::Channel;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Network error: {0}")]
    Network(String),

    /// GitHub API rate limit exceeded
    #[error("GitHub API rate limit exceeded. Resets at {reset_time}")]
    RateLimitExceeded {
        /// RFC 3339 time the limit resets, or "unknown"
        reset_time: String,
    },

    #[error("No release found for channel: {0}")]
    NoReleaseFound(Channel),

    #[error("Invalid version format: {0}")]
    InvalidVersion(String),

    #[error("GitHub API error: {0}")]
    GitHubApiError(String),
}
