//! Release check against the GitHub API. Network or parse failures are
//! reported to the caller, which logs them and treats them as "no update".

use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

const GITHUB_REPO: &str = "samba-rgb/kickoff";
const USER_AGENT: &str = "kickoff-update-checker";
const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    #[serde(default)]
    tag_name: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    published_at: String,
}

#[derive(Debug)]
pub struct UpdateInfo {
    pub current: String,
    pub latest: String,
    pub release_name: String,
    pub notes: String,
    pub download_url: String,
    pub published_at: String,
}

pub fn download_page() -> String {
    format!("https://github.com/{GITHUB_REPO}/releases/latest")
}

/// Fetch the latest release and compare it against the running version.
/// `Ok(None)` means up to date.
pub async fn check() -> Result<Option<UpdateInfo>> {
    let client = Client::builder()
        .timeout(CHECK_TIMEOUT)
        .build()
        .context("failed to build the update check client")?;

    let url = format!("https://api.github.com/repos/{GITHUB_REPO}/releases/latest");
    let body = client
        .get(&url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/vnd.github.v3+json")
        .send()
        .await
        .context("failed to reach the release endpoint")?
        .error_for_status()
        .context("release endpoint returned an error")?
        .text()
        .await
        .context("failed to read the release response")?;

    let release: ReleaseResponse =
        serde_json::from_str(&body).context("failed to parse the release response")?;

    let current = env!("CARGO_PKG_VERSION");
    let latest = release.tag_name.trim_start_matches('v').to_string();
    debug!("current version {current}, latest release {latest}");

    if !is_newer(current, &latest) {
        return Ok(None);
    }

    Ok(Some(UpdateInfo {
        current: current.to_string(),
        latest,
        release_name: release.name,
        notes: release.body,
        download_url: if release.html_url.is_empty() {
            download_page()
        } else {
            release.html_url
        },
        published_at: release.published_at,
    }))
}

/// Dotted numeric components; an unparseable version compares as 0.0.0.
fn parse_version(version: &str) -> Vec<u64> {
    let trimmed = version.trim().trim_start_matches('v');
    let parts: Option<Vec<u64>> = trimmed.split('.').map(|p| p.parse().ok()).collect();
    parts.unwrap_or_else(|| vec![0, 0, 0])
}

fn is_newer(current: &str, latest: &str) -> bool {
    parse_version(latest) > parse_version(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn versions_parse_with_and_without_the_v_prefix() {
        assert_eq!(parse_version("v0.0.2"), vec![0, 0, 2]);
        assert_eq!(parse_version("1.2.3"), vec![1, 2, 3]);
        assert_eq!(parse_version("not-a-version"), vec![0, 0, 0]);
    }

    #[test]
    fn newer_comparison_table() {
        assert!(is_newer("0.1.0", "0.2.0"));
        assert!(is_newer("0.1.0", "1.0.0"));
        assert!(is_newer("1.0", "1.0.1"));
        assert!(!is_newer("1.0.0", "1.0.0"));
        assert!(!is_newer("1.1.0", "1.0.9"));
        // A garbage tag never looks like an update.
        assert!(!is_newer("0.1.0", "nightly"));
    }

    #[test]
    fn release_payload_parses_with_missing_fields() {
        let release: ReleaseResponse = serde_json::from_str(r#"{"tag_name": "v9.9.9"}"#).unwrap();
        assert_eq!(release.tag_name, "v9.9.9");
        assert_eq!(release.html_url, "");
    }
}
