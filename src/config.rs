use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Runtime settings. Every field can be overridden with a `REVIEWS_` prefixed
/// environment variable, e.g. `REVIEWS_PAGE_DELAY_MS=0`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Profile listing URL, ends with `/recommended/`.
    pub profile_url: String,
    pub app_details_url: String,
    pub api_language: String,
    /// `{id}` is replaced with the item id.
    pub image_url: String,
    pub image_url_fallback: String,
    pub output_dir: String,
    pub image_dir: String,
    /// Image path written into the review header, relative to the site root.
    pub image_link_prefix: String,
    pub user_agent: String,
    pub accept_language: String,
    pub listing_timeout_secs: u64,
    pub title_timeout_secs: u64,
    pub image_timeout_secs: u64,
    pub page_delay_ms: u64,
    pub item_delay_ms: u64,
    pub max_pages: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            profile_url: "https://steamcommunity.com/id/LeVioc/recommended/".into(),
            app_details_url: "https://store.steampowered.com/api/appdetails".into(),
            api_language: "french".into(),
            image_url:
                "https://shared.akamai.steamstatic.com/store_item_assets/steam/apps/{id}/capsule_616x353.jpg"
                    .into(),
            image_url_fallback: "https://cdn.akamai.steamstatic.com/steam/apps/{id}/header.jpg"
                .into(),
            output_dir: "pages/reviews".into(),
            image_dir: "assets/images/apps".into(),
            image_link_prefix: "images/apps".into(),
            user_agent: "Mozilla/5.0".into(),
            accept_language: "fr-FR".into(),
            listing_timeout_secs: 15,
            title_timeout_secs: 5,
            image_timeout_secs: 30,
            page_delay_ms: 2000,
            item_delay_ms: 200,
            max_pages: 14,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        ::config::Config::builder()
            .add_source(::config::Environment::with_prefix("REVIEWS").try_parsing(true))
            .build()
            .context("Failed to read REVIEWS_* environment")?
            .try_deserialize()
            .context("Invalid REVIEWS_* setting")
    }

    /// Settings with every delay set to zero, for tests.
    #[cfg(test)]
    pub fn without_delays() -> Self {
        Settings {
            page_delay_ms: 0,
            item_delay_ms: 0,
            ..Default::default()
        }
    }

    pub fn listing_url(&self, page: usize) -> String {
        format!("{}?p={}", self.profile_url, page)
    }

    pub fn review_url(&self, item_id: &str) -> String {
        format!("{}{}", self.profile_url, item_id)
    }

    pub fn app_details(&self, item_id: &str) -> String {
        format!(
            "{}?appids={}&l={}",
            self.app_details_url, item_id, self.api_language
        )
    }

    pub fn image_urls(&self, item_id: &str) -> [String; 2] {
        [
            self.image_url.replace("{id}", item_id),
            self.image_url_fallback.replace("{id}", item_id),
        ]
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn title_timeout(&self) -> Duration {
        Duration::from_secs(self.title_timeout_secs)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }
}

/// Turn the CLI mode into a page count: `test` = 1, `all` = max, otherwise
/// the leading digits (`"3.5"` → 3) clamped to `[1, max]`; no digits gives 1.
pub fn page_count(mode: &str, max_pages: usize) -> usize {
    match mode.trim().to_lowercase().as_str() {
        "test" => 1,
        "all" => max_pages,
        other => {
            let digits = other
                .find(|c: char| !c.is_ascii_digit())
                .map_or(other, |end| &other[..end]);
            digits
                .parse::<usize>()
                .unwrap_or(if digits.is_empty() { 0 } else { usize::MAX })
                .clamp(1, max_pages.max(1))
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_presets_and_clamping() {
        assert_eq!(page_count("test", 14), 1);
        assert_eq!(page_count("ALL", 14), 14);
        assert_eq!(page_count("5", 14), 5);
        assert_eq!(page_count("40", 14), 14);
        assert_eq!(page_count("0", 14), 1);
        assert_eq!(page_count("abc", 14), 1);
        assert_eq!(page_count("3.5", 14), 3);
        assert_eq!(page_count("5abc", 14), 5);
        assert_eq!(page_count("99999999999999999999999", 14), 14);
    }

    #[test]
    fn urls_from_defaults() {
        let s = Settings::default();
        assert_eq!(
            s.listing_url(3),
            "https://steamcommunity.com/id/LeVioc/recommended/?p=3"
        );
        assert_eq!(
            s.review_url("620"),
            "https://steamcommunity.com/id/LeVioc/recommended/620"
        );
        assert_eq!(
            s.app_details("620"),
            "https://store.steampowered.com/api/appdetails?appids=620&l=french"
        );
        let [primary, fallback] = s.image_urls("620");
        assert!(primary.contains("/apps/620/capsule_616x353.jpg"));
        assert!(fallback.ends_with("/apps/620/header.jpg"));
    }
}
