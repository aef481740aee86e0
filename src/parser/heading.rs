use super::HeadingMarker;
use regex::Regex;
use std::sync::OnceLock;

/// Title of the synthetic marker covering content before the first heading
pub const DOCUMENT_START: &str = "Document Start";

/// Title of the synthetic marker at the end of the document
pub const DOCUMENT_END: &str = "END";

/// Breadcrumb used when no real heading encloses a section
pub const ROOT_PATH: &str = "Root";

static HEADING_RE: OnceLock<Regex> = OnceLock::new();

fn heading_regex() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(.*\S)").expect("valid heading regex"))
}

/// Scan the document once for ATX headings
///
/// The result is ordered by position, starts with a synthetic level-0
/// `Document Start` marker unless the first heading sits at offset 0, and
/// always ends with a synthetic level-0 `END` marker at `text.len()`.
pub fn index_headings(text: &str) -> Vec<HeadingMarker> {
    let mut markers: Vec<HeadingMarker> = heading_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let hashes = caps.get(1)?;
            let title = caps.get(2)?;
            Some(HeadingMarker::new(
                hashes.as_str().len() as u8,
                title.as_str().trim(),
                whole.start(),
            ))
        })
        .collect();

    if markers.first().map(|m| m.position) != Some(0) {
        markers.insert(0, HeadingMarker::new(0, DOCUMENT_START, 0));
    }

    markers.push(HeadingMarker::new(0, DOCUMENT_END, text.len()));
    markers
}
