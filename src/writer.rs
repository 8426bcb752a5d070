use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::config::Settings;
use crate::fetch::Fetch;

/// A fully resolved review, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub item_id: String,
    pub title: String,
    pub date: String,
    pub recommended: bool,
    pub playtime: f64,
    pub content: String,
}

pub fn review_path(settings: &Settings, item_id: &str) -> PathBuf {
    Path::new(&settings.output_dir).join(format!("{}.md", item_id))
}

pub fn image_path(settings: &Settings, item_id: &str) -> PathBuf {
    Path::new(&settings.image_dir).join(format!("{}.jpg", item_id))
}

/// Front-matter header followed by the review body.
pub fn render(review: &Review, image_link_prefix: &str) -> String {
    let title = review.title.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "---\n\
         title: \"{title}\"\n\
         date: {date}\n\
         recommended: {rec}\n\
         playtime: {playtime}\n\
         image: {prefix}/{id}.jpg\n\
         ---\n\
         {content}\n",
        date = review.date,
        rec = review.recommended,
        playtime = review.playtime,
        prefix = image_link_prefix.trim_end_matches('/'),
        id = review.item_id,
        content = review.content,
    )
}

/// Write the review file unless one already exists. Returns `true` when a new
/// file was created; the item's image is fetched only in that case.
pub async fn write_review<F: Fetch>(
    fetcher: &F,
    settings: &Settings,
    review: &Review,
) -> Result<bool> {
    let path = review_path(settings, &review.item_id);
    fs::create_dir_all(&settings.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", settings.output_dir))?;

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Already exists: {}", path.display());
            return Ok(false);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create {}", path.display()));
        }
    };

    let contents = render(review, &settings.image_link_prefix);
    let written = async {
        file.write_all(contents.as_bytes()).await?;
        file.flush().await
    }
    .await;
    drop(file);
    keep_or_remove(&path, written).await?;
    info!("Created: {}", path.display());

    match download_image(fetcher, settings, &review.item_id).await {
        Ok(true) => {}
        Ok(false) => warn!("Image missing: {}", review.item_id),
        Err(e) => warn!("Image for {} not saved: {:#}", review.item_id, e),
    }
    Ok(true)
}

/// A review file that could not be fully written is deleted, so the next run
/// creates it again instead of skipping it as existing.
async fn keep_or_remove(path: &Path, written: std::io::Result<()>) -> Result<()> {
    let Err(e) = written else {
        return Ok(());
    };
    if let Err(rm) = fs::remove_file(path).await {
        warn!("Partial file {} left behind: {}", path.display(), rm);
    }
    Err(e).with_context(|| format!("Failed to write {}", path.display()))
}

/// Make sure `<image_dir>/<id>.jpg` exists: keep an existing file, otherwise
/// try the primary then the fallback URL. `Ok(false)` when neither has data.
pub async fn download_image<F: Fetch>(
    fetcher: &F,
    settings: &Settings,
    item_id: &str,
) -> Result<bool> {
    let path = image_path(settings, item_id);
    if fs::try_exists(&path).await.unwrap_or(false) {
        info!("Image OK: {}", path.display());
        return Ok(true);
    }

    for url in settings.image_urls(item_id) {
        let Some(bytes) = fetcher.bytes(&url, settings.image_timeout()).await else {
            continue;
        };
        fs::create_dir_all(&settings.image_dir)
            .await
            .with_context(|| format!("Failed to create {}", settings.image_dir))?;
        fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Image: {} ({} bytes)", path.display(), bytes.len());
        return Ok(true);
    }
    Ok(false)
}

// ── Tests ──
