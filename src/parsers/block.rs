//! Locates a brace-delimited data block embedded in free text.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Keys that mark the metadata block
const MARKER: &str = r#""(?:title|links_count)""#;

/// Anchors for the opening brace, strictest first
static ANCHORS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("exact", format!(r"\{{{MARKER}")),
        ("newline", format!(r"\{{[ \t]*\r?\n[ \t]*{MARKER}")),
        ("whitespace", format!(r"\{{\s*{MARKER}")),
        ("nearby", format!(r#"\{{[^{{}}]{{0,200}}?{MARKER}\s*:"#)),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        (
            name,
            Regex::new(&pattern).expect("anchor patterns are valid regexes"),
        )
    })
    .collect()
});

/// Find the byte span of the first embedded data block carrying a marker key.
///
/// Returns `None` if no anchor matches or the block never closes.
pub fn locate(text: &str) -> Option<Range<usize>> {
    let (name, start) = ANCHORS
        .iter()
        .find_map(|(name, regex)| regex.find(text).map(|m| (*name, m.start())))?;

    ::log::trace!("Data block anchor '{}' matched at byte {}", name, start);

    let end = closing_brace(&text[start..]).map(|offset| start + offset + 1);
    if end.is_none() {
        ::log::debug!("Data block opened at byte {} never closes", start);
    }
    end.map(|end| start..end)
}

/// Offset of the brace that closes the block opening at `block[0]`
fn closing_brace(block: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut bytes = block.bytes().enumerate();

    while let Some((idx, byte)) = bytes.next() {
        if in_string {
            match byte {
                b'\\' => {
                    bytes.next();
                }
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(text: &str) -> Option<&str> {
        locate(text).map(|span| &text[span])
    }

    #[test]
    fn test_locates_inline_block() {
        let text = r#"Result: {"title": "Home", "links_count": 3} done"#;
        assert_eq!(located(text), Some(r#"{"title": "Home", "links_count": 3}"#));
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"x {"title": "a {b} c", "links_count": 1, "page_type": "}"} tail }"#;
        assert_eq!(
            located(text),
            Some(r#"{"title": "a {b} c", "links_count": 1, "page_type": "}"}"#)
        );
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        let text = r#"{"title": "say \"}\" now", "links_count": 2} after"#;
        assert_eq!(
            located(text),
            Some(r#"{"title": "say \"}\" now", "links_count": 2}"#)
        );
    }

    #[test]
    fn test_nested_objects_close_outer_block() {
        let text = "{\"title\": \"T\", \"extra\": {\"a\": {\"b\": 1}}, \"links_count\": 4}\nmore";
        assert_eq!(
            located(text),
            Some("{\"title\": \"T\", \"extra\": {\"a\": {\"b\": 1}}, \"links_count\": 4}")
        );
    }

    #[test]
    fn test_newline_tolerant_anchor() {
        let text = "Here:\n{\n  \"title\": \"Docs\",\n  \"links_count\": 9\n}\n";
        assert_eq!(
            located(text),
            Some("{\n  \"title\": \"Docs\",\n  \"links_count\": 9\n}")
        );
    }

    #[test]
    fn test_marker_anywhere_nearby() {
        let text = r#"See {"page_type": "article", "title": "News"} here"#;
        assert_eq!(
            located(text),
            Some(r#"{"page_type": "article", "title": "News"}"#)
        );
    }

    #[test]
    fn test_stricter_anchor_wins_over_earlier_loose_block() {
        let text = r#"{"page_type": "x", "title": "A"} then {"title": "B"}"#;
        assert_eq!(located(text), Some(r#"{"title": "B"}"#));
    }

    #[test]
    fn test_unrelated_braces_are_not_anchors() {
        assert_eq!(located("function() { return 1; }"), None);
    }

    #[test]
    fn test_truncated_block_returns_none() {
        assert_eq!(located(r#"{"title": "Home", "links_count": 3"#), None);
        assert_eq!(located(r#"{"title": "unterminated }"#), None);
    }

    #[test]
    fn test_no_block() {
        assert_eq!(located("no data here"), None);
        assert_eq!(located(""), None);
    }
}
