//! Release checking for the dashboard.
//!
//! The panel compares its own version against the newest GitHub release of the
//! configured repository. Results are cached on [`AppState`] for
//! [`UPDATE_STATUS_TTL_HOURS`] so the dashboard does not hit the API on every
//! render.

mod channel;
mod error;
mod github;
mod status;
mod version;

pub use channel::Channel;
pub use error::UpdateError;
pub use github::{GitHubClient, Release};
pub use status::UpdateStatus;
pub use version::Version;

use chrono::{Duration, Utc};

use crate::config::UPDATE_STATUS_TTL_HOURS;
use crate::models::AppState;

/// Fetches the newest release on `channel` and compares it with the running binary.
///
/// A repository without releases on the channel is not an error; the status
/// then has no `latest`.
pub async fn check_for_update(owner: &str, name: &str, channel: Channel) -> Result<UpdateStatus, UpdateError> {
    let current = Version::current();
    tracing::info!(%owner, %name, %channel, %current, "Checking for updates");

    let client = GitHubClient::new(owner.to_string(), name.to_string())?;
    let release = match client.get_latest_release(channel).await {
        Ok(release) => Some(release),
        Err(UpdateError::NoReleaseFound(_)) => {
            tracing::info!(%channel, "No releases found");
            None
        }
        Err(e) => return Err(e),
    };

    let status = UpdateStatus {
        current,
        latest: release.as_ref().map(|r| r.version.clone()),
        release_url: release.map(|r| r.html_url),
        checked_at: Utc::now(),
    };
    if status.update_available() {
        tracing::info!(latest = %status.latest_text(), "Update available");
    }
    Ok(status)
}

/// Cached status for the dashboard, refreshed once it is older than the TTL.
///
/// `None` when checks are disabled or the check failed. Failures are logged
/// and not cached, so the next render retries.
pub async fn current_status(state: &AppState) -> Option<UpdateStatus> {
    if !state.update_check_enabled {
        return None;
    }

    let ttl = Duration::hours(UPDATE_STATUS_TTL_HOURS);
    let cached = state.update_status.lock().unwrap().clone();
    if let Some(status) = cached {
        if status.is_fresh(Utc::now(), ttl) {
            return Some(status);
        }
    }

    let (owner, name) = &state.update_repo;
    match check_for_update(owner, name, Channel::Stable).await {
        Ok(status) => {
            *state.update_status.lock().unwrap() = Some(status.clone());
            Some(status)
        }
        Err(e) => {
            tracing::warn!(%e, "Update check failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Directory;

    fn state() -> AppState {
        AppState::new(Directory::default(), "unused.json".into())
    }

    #[tokio::test]
    async fn disabled_checks_report_nothing() {
        let mut state = state();
        state.update_check_enabled = false;
        assert_eq!(current_status(&state).await, None);
    }

    #[tokio::test]
    async fn fresh_cache_is_served_without_fetching() {
        let state = state();
        let cached = UpdateStatus {
            current: Version::current(),
            latest: Some(Version::parse("99.0.0").unwrap()),
            release_url: Some("https://example.test/release".into()),
            checked_at: Utc::now(),
        };
        *state.update_status.lock().unwrap() = Some(cached.clone());
        assert_eq!(current_status(&state).await, Some(cached));
    }
}
