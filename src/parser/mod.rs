pub mod blocks;
pub mod fields;

use tracing::{debug, info};

use fields::MIN_CONTENT_CHARS;

/// Review fields recovered from a listing page, before title lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReview {
    pub item_id: String,
    pub date: String,
    pub recommended: bool,
    pub playtime: f64,
    pub content: String,
}

/// Two-step pass over a listing page: item ids → per-item blocks → fields.
/// Items without a block or with too little text are dropped.
pub fn parse_page(html: &str) -> Vec<ParsedReview> {
    blocks::item_ids(html)
        .into_iter()
        .filter_map(|item_id| {
            let Some(block) = blocks::isolate_block(html, &item_id) else {
                debug!("No review block for {}", item_id);
                return None;
            };
            parse_block(item_id, block)
        })
        .collect()
}

pub fn parse_block(item_id: String, block: &str) -> Option<ParsedReview> {
    let content = fields::extract_content(block);
    if content.chars().count() < MIN_CONTENT_CHARS {
        info!("{} - no review text, skipped", item_id);
        return None;
    }
    Some(ParsedReview {
        recommended: fields::is_recommended(block),
        playtime: fields::parse_playtime(block),
        date: fields::parse_date(block),
        content,
        item_id,
    })
}

// ── Tests ──
