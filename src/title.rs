use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::fetch::Fetch;

static OG_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta property="og:title" content="[^:]*::[^:]*:: Review for ([^"]+)""#)
        .unwrap()
});

#[derive(Debug, Deserialize)]
struct AppDetails {
    #[serde(default)]
    success: bool,
    data: Option<AppData>,
}

#[derive(Debug, Deserialize)]
struct AppData {
    name: Option<String>,
}

/// Resolves display titles for item ids. Successful lookups are cached for
/// the life of the resolver; placeholders are not, so a later call retries.
#[derive(Default)]
pub struct TitleResolver {
    cache: HashMap<String, String>,
}

impl TitleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve<F: Fetch>(
        &mut self,
        fetcher: &F,
        settings: &Settings,
        item_id: &str,
    ) -> String {
        if let Some(title) = self.cache.get(item_id) {
            return title.clone();
        }

        let found = match from_app_details(fetcher, settings, item_id).await {
            Some(title) => Some(title),
            None => from_review_page(fetcher, settings, item_id).await,
        };

        match found {
            Some(title) => {
                self.cache.insert(item_id.to_string(), title.clone());
                title
            }
            None => {
                warn!("No title found for {}, using placeholder", item_id);
                placeholder(item_id)
            }
        }
    }

    #[cfg(test)]
    fn cached(&self, item_id: &str) -> Option<&str> {
        self.cache.get(item_id).map(String::as_str)
    }
}

pub fn placeholder(item_id: &str) -> String {
    format!("Game {}", item_id)
}

async fn from_app_details<F: Fetch>(
    fetcher: &F,
    settings: &Settings,
    item_id: &str,
) -> Option<String> {
    let body = fetcher
        .text(&settings.app_details(item_id), settings.title_timeout())
        .await?;
    match parse_app_details(&body, item_id) {
        Ok(name) => name,
        Err(e) => {
            warn!("appdetails for {}: {:#}", item_id, e);
            None
        }
    }
}

/// `{"<id>": {"success": true, "data": {"name": "…"}}}` → name.
fn parse_app_details(body: &str, item_id: &str) -> Result<Option<String>> {
    let mut parsed: HashMap<String, AppDetails> =
        serde_json::from_str(body).context("Unexpected appdetails payload")?;
    let Some(details) = parsed.remove(item_id) else {
        return Ok(None);
    };
    if !details.success {
        debug!("appdetails for {} reported failure", item_id);
        return Ok(None);
    }
    Ok(details.data.and_then(|d| d.name))
}

async fn from_review_page<F: Fetch>(
    fetcher: &F,
    settings: &Settings,
    item_id: &str,
) -> Option<String> {
    let html = fetcher
        .text(&settings.review_url(item_id), settings.title_timeout())
        .await?;
    parse_og_title(&html)
}

fn parse_og_title(html: &str) -> Option<String> {
    let caps = OG_TITLE_RE.captures(html)?;
    Some(html_escape::decode_html_entities(&caps[1]).into_owned())
}

// ── Tests ──
