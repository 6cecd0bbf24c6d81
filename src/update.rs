//! App update check
//!
//! Polls a static JSON config (cache-busted) and offers an update only
//! when the remote version is strictly newer. Being offline is the
//! normal case, so failures only log at debug.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

const UPDATE_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/berean-app/berean/main/update.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    pub latest_version: String,
    pub update_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub struct UpdateChecker {
    client: reqwest::Client,
    config_url: String,
    current_version: String,
}

impl UpdateChecker {
    pub fn new() -> Self {
        Self::with_config(UPDATE_CONFIG_URL, env!("CARGO_PKG_VERSION"))
    }

    pub fn with_config(config_url: &str, current_version: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            config_url: config_url.to_string(),
            current_version: current_version.to_string(),
        }
    }

    /// `Some(info)` only when the advertised version is newer than the
    /// running one.
    pub async fn check(&self) -> Option<UpdateInfo> {
        let url = format!("{}?t={}", self.config_url, Utc::now().timestamp());
        match self.fetch(&url).await {
            Ok(info) => {
                if is_version_higher(&info.latest_version, &self.current_version) {
                    Some(info)
                } else {
                    None
                }
            }
            Err(e) => {
                tracing::debug!("Update check skipped (likely offline or host down): {:#}", e);
                None
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<UpdateInfo> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch update config")?
            .error_for_status()
            .context("Update config request rejected")?;
        response.json().await.context("Failed to parse update config")
    }
}

impl Default for UpdateChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Dotted-numeric comparison, left to right. Missing trailing parts count
/// as 0; non-numeric parts also count as 0.
pub fn is_version_higher(latest: &str, current: &str) -> bool {
    let latest_parts: Vec<u64> = version_parts(latest);
    let current_parts: Vec<u64> = version_parts(current);

    for i in 0..latest_parts.len().max(current_parts.len()) {
        let l = latest_parts.get(i).copied().unwrap_or(0);
        let c = current_parts.get(i).copied().unwrap_or(0);
        if l > c {
            return true;
        }
        if l < c {
            return false;
        }
    }
    false
}

fn version_parts(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}
