use std::collections::HashSet;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::Settings;
use crate::fetch::Fetch;
use crate::parser::{self, ParsedReview};
use crate::title::TitleResolver;
use crate::writer::{self, Review};

/// Write stats returned after completion.
#[derive(Debug, Default, PartialEq)]
pub struct WriteStats {
    pub total: usize,
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

/// Runs the listing → review files pipeline, one request at a time.
pub struct Scraper<F> {
    fetcher: F,
    settings: Settings,
    titles: TitleResolver,
}

impl<F: Fetch> Scraper<F> {
    pub fn new(fetcher: F, settings: Settings) -> Self {
        Scraper {
            fetcher,
            settings,
            titles: TitleResolver::new(),
        }
    }

    /// Reviews from pages `1..=pages`, deduplicated by item id.
    pub async fn collect(&mut self, pages: usize) -> Vec<Review> {
        let mut all = Vec::new();
        for page in 1..=pages {
            all.extend(self.scrape_page(page).await);
            if page < pages {
                info!("Pause {:?}...", self.settings.page_delay());
                tokio::time::sleep(self.settings.page_delay()).await;
            }
        }
        let unique = dedup_by_id(all);
        info!("{} unique review(s)", unique.len());
        unique
    }

    /// One listing page: fetch, parse, attach titles. A failed fetch is an
    /// empty page.
    pub async fn scrape_page(&mut self, page: usize) -> Vec<Review> {
        info!("Page {}...", page);
        let url = self.settings.listing_url(page);
        let Some(html) = self
            .fetcher
            .text(&url, self.settings.listing_timeout())
            .await
        else {
            warn!("Page {} could not be fetched", page);
            return Vec::new();
        };

        let parsed = parser::parse_page(&html);
        let mut reviews = Vec::with_capacity(parsed.len());
        for p in parsed {
            let review = self.enrich(p).await;
            info!(
                "{} - {}h - {} {}",
                review.title,
                review.playtime,
                review.date,
                if review.recommended { "+" } else { "-" }
            );
            reviews.push(review);
            tokio::time::sleep(self.settings.item_delay()).await;
        }
        info!("Page {}: {} review(s)", page, reviews.len());
        reviews
    }

    async fn enrich(&mut self, parsed: ParsedReview) -> Review {
        let title = self
            .titles
            .resolve(&self.fetcher, &self.settings, &parsed.item_id)
            .await;
        Review {
            item_id: parsed.item_id,
            title,
            date: parsed.date,
            recommended: parsed.recommended,
            playtime: parsed.playtime,
            content: parsed.content,
        }
    }

    /// Write every review that has no file yet. Errors are counted, never
    /// raised.
    pub async fn write_all(&self, reviews: &[Review]) -> WriteStats {
        let pb = ProgressBar::new(reviews.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len}")
        {
            pb.set_style(style.progress_chars("=> "));
        }

        let mut stats = WriteStats {
            total: reviews.len(),
            ..Default::default()
        };
        for review in reviews {
            match writer::write_review(&self.fetcher, &self.settings, review).await {
                Ok(true) => stats.created += 1,
                Ok(false) => stats.existing += 1,
                Err(e) => {
                    warn!("{}: {:#}", review.item_id, e);
                    stats.failed += 1;
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
        stats
    }
}

/// Keep the first review seen for each item id, order preserved.
pub fn dedup_by_id(reviews: Vec<Review>) -> Vec<Review> {
    let mut seen = HashSet::new();
    reviews
        .into_iter()
        .filter(|r| seen.insert(r.item_id.clone()))
        .collect()
}

// ── Tests ──
