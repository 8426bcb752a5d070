mod config;
mod fetch;
mod parser;
mod scraper;
mod title;
mod writer;

use std::time::Instant;

use clap::Parser;
use tracing::info;

use crate::config::Settings;
use crate::fetch::HttpFetcher;
use crate::scraper::Scraper;

#[derive(Parser)]
#[command(
    name = "review_scraper",
    about = "Export a Steam profile's reviews as front-matter files"
)]
struct Cli {
    /// `test` (1 page), `all` (every page) or a page count
    mode: Option<String>,
    /// Directory for review files (overrides REVIEWS_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<String>,
    /// Directory for images (overrides REVIEWS_IMAGE_DIR)
    #[arg(long)]
    image_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(dir) = cli.output_dir {
        settings.output_dir = dir;
    }
    if let Some(dir) = cli.image_dir {
        settings.image_dir = dir;
    }

    let mode = match cli.mode {
        Some(m) => m,
        None => {
            println!("Usage: review_scraper [test|all|1-{}]", settings.max_pages);
            println!("  test  = 1 page");
            println!("  all   = {} pages", settings.max_pages);
            println!("  1-{0:<3} = number of pages\n", settings.max_pages);
            "test".to_string()
        }
    };
    let pages = crate::config::page_count(&mode, settings.max_pages);
    info!("Extracting {} page(s) from {}", pages, settings.profile_url);

    let fetcher = HttpFetcher::new(&settings)?;
    let mut scraper = Scraper::new(fetcher, settings.clone());

    // Phase 1: Extract
    let reviews = scraper.collect(pages).await;

    // Phase 2: Write files
    info!("Writing {} review file(s)...", reviews.len());
    let stats = scraper.write_all(&reviews).await;

    println!("New:      {}", stats.created);
    println!("Existing: {}", stats.existing);
    if stats.failed > 0 {
        println!("Failed:   {}", stats.failed);
    }
    println!("Total:    {}", stats.total);
    println!("Duration: {}", format_duration(t0.elapsed()));

    if stats.created > 0 {
        println!("\nFiles:  {}/", settings.output_dir);
        println!("Images: {}/", settings.image_dir);
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
