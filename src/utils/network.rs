//! Network reachability pre-check

use crate::utils::config::NetworkSettings;
use crate::utils::error::DyloaderError;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Answers whether the platform can be reached at all
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_reachable(&self, probe_url: &str, timeout: Duration) -> bool;
}

/// Probe backed by a plain HTTP GET
pub struct HttpConnectivity {
    client: Client,
}

impl HttpConnectivity {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpConnectivity {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

#[async_trait]
impl Connectivity for HttpConnectivity {
    async fn is_reachable(&self, probe_url: &str, timeout: Duration) -> bool {
        match self.client.get(probe_url).timeout(timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || status.is_redirection() {
                    debug!("Probe {} answered {}", probe_url, status);
                    true
                } else {
                    warn!("Network connectivity check got HTTP {} from {}", status, probe_url);
                    false
                }
            }
            Err(e) => {
                warn!("Network connectivity check failed: {}", e);
                false
            }
        }
    }
}

/// Reject anything that is not an absolute http(s) URL
pub fn ensure_http_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(DyloaderError::InvalidUrl(url.to_string()).into())
    }
}

/// Fail fast with `Unreachable` when the probe does not answer.
pub async fn ensure_reachable(probe: &dyn Connectivity, settings: &NetworkSettings) -> Result<()> {
    info!("Checking network connectivity...");
    if probe
        .is_reachable(&settings.probe_url, settings.probe_timeout())
        .await
    {
        info!("Network connectivity OK");
        Ok(())
    } else {
        Err(DyloaderError::Unreachable(settings.probe_url.clone()).into())
    }
}
