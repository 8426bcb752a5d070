use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_DATE: &str = "2016-01-01";
pub const MIN_CONTENT_CHARS: usize = 20;

static PLAYTIME_EN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+[,.]?[0-9]*)\s*hrs?\s+on\s+record").unwrap());
static PLAYTIME_FR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+[,.]?[0-9]*)\s*h[a-z]*\s+en\s+tout").unwrap());

static POSTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?si)<div\s+class="posted"[^>]*>(.*?)</div>"#).unwrap());
static POSTED_EN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Posted\s+([0-9]{1,2})\s+([a-z]+),?\s+([0-9]{4})").unwrap());
static POSTED_FR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]{1,2})\s+([a-zûàéè]+)\s+([0-9]{4})").unwrap());

static CONTENT_STRICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?si)<div\s+class="content\s*"[^>]*>(.*?)</div>"#).unwrap());
static CONTENT_LOOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?si)class="content[^"]*">(.+?)</div>"#).unwrap());

static RECOMMENDED_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s*(?:Recommended|Recommandé)</a>").unwrap());

static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());
static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

const MONTHS_EN: &[(&str, &str)] = &[
    ("january", "01"),
    ("february", "02"),
    ("march", "03"),
    ("april", "04"),
    ("may", "05"),
    ("june", "06"),
    ("july", "07"),
    ("august", "08"),
    ("september", "09"),
    ("october", "10"),
    ("november", "11"),
    ("december", "12"),
];

const MONTHS_FR: &[(&str, &str)] = &[
    ("janvier", "01"),
    ("février", "02"),
    ("fevrier", "02"),
    ("mars", "03"),
    ("avril", "04"),
    ("mai", "05"),
    ("juin", "06"),
    ("juillet", "07"),
    ("août", "08"),
    ("aout", "08"),
    ("septembre", "09"),
    ("octobre", "10"),
    ("novembre", "11"),
    ("décembre", "12"),
    ("decembre", "12"),
];

/// Thumbs-up icon, or a vote label whose whole text is "Recommended" /
/// "Recommandé" (so "Not Recommended" does not count).
pub fn is_recommended(block: &str) -> bool {
    block.contains("icon_thumbsUp") || RECOMMENDED_LABEL_RE.is_match(block)
}

/// Hours on record, English layout first, then French. Comma decimals are
/// accepted.
pub fn parse_playtime(block: &str) -> f64 {
    PLAYTIME_EN_RE
        .captures(block)
        .or_else(|| PLAYTIME_FR_RE.captures(block))
        .map(|caps| parse_hours(&caps[1]))
        .unwrap_or(0.0)
}

fn parse_hours(raw: &str) -> f64 {
    raw.replace(',', ".")
        .trim_end_matches('.')
        .parse()
        .unwrap_or(0.0)
}

/// Date from the block's `posted` div as `YYYY-MM-DD`, or `DEFAULT_DATE`.
pub fn parse_date(block: &str) -> String {
    POSTED_RE
        .captures(block)
        .and_then(|caps| parse_posted(&caps[1]))
        .unwrap_or_else(|| DEFAULT_DATE.to_string())
}

/// Parses the text inside a `posted` div. When the English layout matches it
/// decides alone, even if its month is unknown.
pub fn parse_posted(text: &str) -> Option<String> {
    if let Some(caps) = POSTED_EN_RE.captures(text) {
        return build_date(&caps[1], &caps[2], &caps[3], MONTHS_EN);
    }
    let caps = POSTED_FR_RE.captures(text)?;
    build_date(&caps[1], &caps[2], &caps[3], MONTHS_FR)
}

fn build_date(day: &str, month: &str, year: &str, table: &[(&str, &str)]) -> Option<String> {
    let day: u32 = day.parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }
    let month = month.to_lowercase();
    let (_, mm) = table.iter().find(|(name, _)| *name == month)?;
    Some(format!("{}-{}-{:02}", year, mm, day))
}

/// Review text from the block: the strict `class="content"` div first, the
/// looser `class="content…"` match if that yields too little.
pub fn extract_content(block: &str) -> String {
    let strict = CONTENT_STRICT_RE
        .captures(block)
        .map(|caps| clean_text(&caps[1]))
        .unwrap_or_default();
    if strict.chars().count() >= MIN_CONTENT_CHARS {
        return strict;
    }
    CONTENT_LOOSE_RE
        .captures(block)
        .map(|caps| clean_text(&caps[1]))
        .unwrap_or(strict)
}

/// Markup fragment to plain text: entities decoded, `<br>` to newline, tags
/// dropped, at most one blank line between paragraphs.
pub fn clean_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let text = html_escape::decode_html_entities(html);
    let text = BR_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    let text = SPACE_RUN_RE.replace_all(&text, " ");
    text.trim().to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_posted_date() {
        assert_eq!(
            parse_posted("Posted 5 January, 2021").as_deref(),
            Some("2021-01-05")
        );
        assert_eq!(
            parse_posted("Posted 23 March 2019.").as_deref(),
            Some("2019-03-23")
        );
    }

    #[test]
    fn french_posted_date() {
        assert_eq!(parse_posted("5 février 2021").as_deref(), Some("2021-02-05"));
        assert_eq!(
            parse_posted("Publiée le 14 aout 2020.").as_deref(),
            Some("2020-08-14")
        );
        assert_eq!(
            parse_posted("Publiée le 1 Décembre 2018").as_deref(),
            Some("2018-12-01")
        );
    }

    #[test]
    fn unknown_month_or_day_is_rejected() {
        assert_eq!(parse_posted("Posted 5 Brumaire, 2021"), None);
        assert_eq!(parse_posted("12 floréal 2020"), None);
        assert_eq!(parse_posted("Posted 32 May, 2020"), None);
        assert_eq!(parse_posted("0 mai 2020"), None);
        assert_eq!(parse_posted("Posted ٥ May, ٢٠٢٠"), None);
        // No calendar check beyond the day range.
        assert_eq!(parse_posted("31 février 2021").as_deref(), Some("2021-02-31"));
    }

    #[test]
    fn english_match_shadows_french() {
        // English layout matched with a bad month: French is not consulted.
        assert_eq!(parse_posted("Posted 5 Janvier, 2021 / 5 mars 2021"), None);
    }

    #[test]
    fn date_defaults_without_posted_div() {
        assert_eq!(parse_date("<div>Posted 5 January, 2021</div>"), DEFAULT_DATE);
        assert_eq!(
            parse_date(r#"<div class="posted">Posted 9 Brumaire, 2021</div>"#),
            DEFAULT_DATE
        );
        assert_eq!(
            parse_date(r#"<div class="posted" style="x">Posted 9 July, 2022.</div>"#),
            "2022-07-09"
        );
    }

    #[test]
    fn playtime_variants() {
        assert_eq!(parse_playtime("12.5 hrs on record"), 12.5);
        assert_eq!(parse_playtime("1 hr on record"), 1.0);
        assert_eq!(parse_playtime("3,2 h en tout"), 3.2);
        assert_eq!(parse_playtime("41 heures en tout"), 41.0);
        assert_eq!(parse_playtime("nothing here"), 0.0);
        // Only ASCII digits count; the French layout still gets its turn.
        assert_eq!(parse_playtime("١٢ hrs on record"), 0.0);
        assert_eq!(parse_playtime("١٢ hrs on record, 4,5 h en tout"), 4.5);
    }

    #[test]
    fn recommended_markers() {
        assert!(is_recommended(r#"<img src="/icon_thumbsUp.png">"#));
        assert!(is_recommended(r#"<a href="x">Recommandé</a>"#));
        assert!(is_recommended(r#"<a href="x">Recommended</a>"#));
        assert!(is_recommended("<a href=\"x\">\n\t\tRecommended</a>"));
        assert!(is_recommended("<a href=\"x\"> Recommandé</a>"));
        assert!(!is_recommended(
            r#"<img src="/icon_thumbsDown.png"><a href="x">Not Recommended</a>"#
        ));
        assert!(!is_recommended(r#"<a href="x">Non recommandé</a>"#));
    }

    #[test]
    fn clean_text_normalises_markup() {
        let raw = "First&nbsp;line &amp; more<br>second\tline<br><br><br><br>third <b>bold</b>   end&#33;";
        assert_eq!(
            clean_text(raw),
            "First\u{a0}line & more\nsecond line\n\nthird bold end!"
        );
    }

    #[test]
    fn clean_text_keeps_single_blank_line() {
        let raw = "  para one<br />\n<br/>\n\n\npara two  ";
        let cleaned = clean_text(raw);
        assert_eq!(cleaned, "para one\n\npara two");
        assert!(!cleaned.contains("\n\n\n"));
    }

    #[test]
    fn content_falls_back_to_loose_pattern() {
        let block = r#"<div class="content review">A much longer body of review text.</div>"#;
        assert_eq!(extract_content(block), "A much longer body of review text.");

        let strict = r#"<div class="content ">This review is long enough to keep.</div>"#;
        assert_eq!(extract_content(strict), "This review is long enough to keep.");

        assert_eq!(extract_content(r#"<div class="content">tiny</div>"#), "tiny");
        assert_eq!(extract_content("<div>no content div</div>"), "");
    }
}
