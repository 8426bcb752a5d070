use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use tracing::{debug, warn};

use crate::config::Settings;

/// Blocking-style GET access to the outside world. A failed request of any
/// kind (connect error, timeout, non-2xx, unreadable body) yields `None`.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn text(&self, url: &str, timeout: Duration) -> Option<String>;
    async fn bytes(&self, url: &str, timeout: Duration) -> Option<Vec<u8>>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&settings.accept_language)
                .context("Invalid accept_language header value")?,
        );
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpFetcher { client })
    }

    async fn get(&self, url: &str, timeout: Duration) -> Option<reqwest::Response> {
        let response = match self.client.get(url).timeout(timeout).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("GET {} failed: {}", url, e);
                return None;
            }
        };
        let status = response.status();
        if !status.is_success() {
            warn!("GET {} returned {}", url, status);
            return None;
        }
        debug!("GET {} -> {}", url, status);
        Some(response)
    }
}

impl Fetch for HttpFetcher {
    async fn text(&self, url: &str, timeout: Duration) -> Option<String> {
        let response = self.get(url, timeout).await?;
        match response.text().await {
            Ok(body) if !body.is_empty() => Some(body),
            Ok(_) => None,
            Err(e) => {
                warn!("Reading body of {} failed: {}", url, e);
                None
            }
        }
    }

    async fn bytes(&self, url: &str, timeout: Duration) -> Option<Vec<u8>> {
        let response = self.get(url, timeout).await?;
        match response.bytes().await {
            Ok(body) if !body.is_empty() => Some(body.to_vec()),
            Ok(_) => None,
            Err(e) => {
                warn!("Reading body of {} failed: {}", url, e);
                None
            }
        }
    }
}
