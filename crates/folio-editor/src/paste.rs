//! Block kind detection for pasted text.

use std::sync::LazyLock;

use regex::Regex;

use folio_types::BlockKind;

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png|gif|svg|webp)$").expect("constant pattern")
});

/// Guess which block kind pasted text belongs in.
///
/// Rules are checked in order; the first match wins. A URL that is not an
/// image stays text.
pub fn suggest_kind(text: &str) -> BlockKind {
    if text.starts_with("http") && text.contains("://") {
        if IMAGE_URL.is_match(text) {
            return BlockKind::Image;
        }
        return BlockKind::Text;
    }
    if text.starts_with('#') {
        return BlockKind::Heading;
    }
    if text.starts_with("```") || (text.contains('\n') && text.contains("  ")) {
        return BlockKind::Code;
    }
    if text.starts_with('>') || text.starts_with('"') {
        return BlockKind::Quote;
    }
    if text.contains("\n-") || text.contains("\n*") || text.contains("\n•") {
        return BlockKind::List;
    }
    BlockKind::Text
}
