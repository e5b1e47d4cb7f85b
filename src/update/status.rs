use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::version::Version;

/// Result of the last release check, shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub current: Version,
    /// Newest release on the configured channel, if one was found.
    pub latest: Option<Version>,
    /// Release page of `latest`.
    pub release_url: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl UpdateStatus {
    pub fn update_available(&self) -> bool {
        self.latest
            .as_ref()
            .map(|l| l.is_newer_than(&self.current))
            .unwrap_or(false)
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.checked_at < ttl
    }

    pub fn latest_text(&self) -> String {
        self.latest.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn release_url_text(&self) -> &str {
        self.release_url.as_deref().unwrap_or("")
    }
}
