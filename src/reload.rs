use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

/// Reload lamedb and the bouquet files.
const RELOAD_ALL: u8 = 0;

#[derive(Debug, Clone, Deserialize)]
pub struct ReloadConfig {
    #[serde(default = "default_reload_enabled")]
    pub enabled: bool,
    #[serde(default = "default_webif_url")]
    pub webif_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_reload_enabled() -> bool {
    true
}

fn default_webif_url() -> String {
    "http://127.0.0.1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enabled: default_reload_enabled(),
            webif_url: default_webif_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Talks to the receiver's web interface to make the running channel
/// database pick up rewritten files.
pub struct WebifClient {
    base_url: String,
    client: reqwest::Client,
}

impl WebifClient {
    pub fn new(config: &ReloadConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.webif_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn reload_url(&self) -> String {
        format!("{}/web/servicelistreload?mode={}", self.base_url, RELOAD_ALL)
    }

    /// Asks the receiver to reload its service list and bouquets.
    pub async fn reload_services(&self) -> Result<()> {
        let url = self.reload_url();
        info!("Requesting service list reload via {}", url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("requesting {}", url))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("reload request to {} failed with HTTP {}", url, status);
        }
        let body = resp.text().await?;
        // The web interface answers with an e2simplexmlresult.
        if body.contains("<e2state>False</e2state>") || body.contains("<e2state>false</e2state>") {
            bail!("receiver rejected the reload: {}", body.trim());
        }
        Ok(())
    }
}
