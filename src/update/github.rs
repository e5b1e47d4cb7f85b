/// GitHub Releases API client
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;

use super::{channel::Channel, error::UpdateError, version::Version};

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    html_url: String,
}

/// A published release whose tag parsed as a version.
#[derive(Debug, Clone)]
pub struct Release {
    pub tag_name: String,
    pub version: Version,
    pub channel: Channel,
    /// Release page on github.com
    pub html_url: String,
}

pub struct GitHubClient {
    repo_owner: String,
    repo_name: String,
    client: reqwest::Client,
}

impl GitHubClient {
    pub fn new(repo_owner: String, repo_name: String) -> Result<Self, UpdateError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("panel-update-check/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| UpdateError::Network(e.to_string()))?;

        Ok(Self {
            repo_owner,
            repo_name,
            client,
        })
    }

    fn releases_url(&self) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/releases",
            self.repo_owner, self.repo_name
        )
    }

    /// Every non-draft release with a parseable tag. Others are logged and skipped.
    pub async fn get_all_releases(&self) -> Result<Vec<Release>, UpdateError> {
        let url = self.releases_url();
        tracing::debug!(%url, "Fetching releases");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpdateError::Network(e.to_string()))?;

        check_rate_limit(&response)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpdateError::GitHubApiError(format!("HTTP {}: {}", status, body)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| UpdateError::Network(e.to_string()))?;
        parse_releases(&text)
    }

    /// Newest release on `channel`.
    pub async fn get_latest_release(&self, channel: Channel) -> Result<Release, UpdateError> {
        let releases = self.get_all_releases().await?;
        tracing::debug!(count = releases.len(), %channel, "Fetched releases");
        latest_on_channel(releases, channel).ok_or(UpdateError::NoReleaseFound(channel))
    }
}

fn parse_releases(text: &str) -> Result<Vec<Release>, UpdateError> {
    let raw: Vec<GitHubRelease> = serde_json::from_str(text)
        .map_err(|e| UpdateError::GitHubApiError(format!("Failed to parse JSON: {}", e)))?;

    let releases = raw
        .into_iter()
        .filter(|r| !r.draft)
        .filter_map(|r| match Version::parse(&r.tag_name) {
            Ok(version) => Some(Release {
                channel: Channel::from_version(&r.tag_name),
                tag_name: r.tag_name,
                version,
                html_url: r.html_url,
            }),
            Err(e) => {
                tracing::warn!(tag = %r.tag_name, %e, "Skipping release with invalid version");
                None
            }
        })
        .collect();
    Ok(releases)
}

fn latest_on_channel(releases: Vec<Release>, channel: Channel) -> Option<Release> {
    let matching: Vec<Release> = releases.into_iter().filter(|r| r.channel == channel).collect();
    let newest = Version::newest(matching.iter().map(|r| &r.version))?.clone();
    matching.into_iter().find(|r| r.version == newest)
}

fn check_rate_limit(response: &reqwest::Response) -> Result<(), UpdateError> {
    let headers = response.headers();
    let remaining = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok());
    if remaining != Some(0) {
        return Ok(());
    }
    let reset_time = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string());
    Err(UpdateError::RateLimitExceeded { reset_time })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"[
        {"tag_name": "v5.2.0-beta.1", "draft": false, "html_url": "https://example.test/b"},
        {"tag_name": "v5.1.0", "draft": false, "html_url": "https://example.test/510"},
        {"tag_name": "v5.3.0", "draft": true, "html_url": "https://example.test/draft"},
        {"tag_name": "nightly", "draft": false, "html_url": "https://example.test/n"},
        {"tag_name": "v5.0.3", "html_url": "https://example.test/503"}
    ]"#;

    #[test]
    fn drafts_and_unparseable_tags_are_skipped() {
        let releases = parse_releases(BODY).unwrap();
        let tags: Vec<&str> = releases.iter().map(|r| r.tag_name.as_str()).collect();
        assert_eq!(tags, vec!["v5.2.0-beta.1", "v5.1.0", "v5.0.3"]);
    }

    #[test]
    fn latest_respects_channel() {
        let stable = latest_on_channel(parse_releases(BODY).unwrap(), Channel::Stable).unwrap();
        assert_eq!(stable.tag_name, "v5.1.0");
        assert_eq!(stable.html_url, "https://example.test/510");

        let beta = latest_on_channel(parse_releases(BODY).unwrap(), Channel::Beta).unwrap();
        assert_eq!(beta.version.to_string(), "5.2.0-beta.1");

        assert!(latest_on_channel(parse_releases(BODY).unwrap(), Channel::Alpha).is_none());
    }

    #[test]
    fn malformed_body_is_an_api_error() {
        assert!(matches!(
            parse_releases("{\"message\": \"Not Found\"}"),
            Err(UpdateError::GitHubApiError(_))
        ));
    }
}
