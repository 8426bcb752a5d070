use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static ITEM_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/recommended/([0-9]+)/").unwrap());
static BLOCK_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div class="review_box"|<div class="review_paging""#).unwrap()
});

/// Item ids linked from the page, first-seen order, no repeats.
pub fn item_ids(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ITEM_LINK_RE
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Markup for one item: from its first `/app/<id>` link up to the next review
/// box, the pagination footer, or the end of the page.
pub fn isolate_block<'a>(html: &'a str, item_id: &str) -> Option<&'a str> {
    // Ids are digits only, nothing to escape.
    let start_re = Regex::new(&format!(r"/app/{}[^0-9A-Za-z_]", item_id)).ok()?;
    let start = start_re.find(html)?;
    let end = BLOCK_END_RE
        .find_at(html, start.end())
        .map(|m| m.start())
        .unwrap_or(html.len());
    Some(&html[start.start()..end])
}

// ── Tests ──
