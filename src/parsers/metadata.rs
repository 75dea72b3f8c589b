//! Page metadata recovery: strict decode of the located block, then
//! independent per-field pattern search over the whole answer.

use crate::results::PageMetadata;
use crate::utils::{strip_quotes, unescape};
use regex::Regex;
use serde_json::{Map, Value};
use std::ops::Range;
use std::sync::LazyLock;

/// Keys a decoded block must carry to count as a successful decode
pub const REQUIRED_KEYS: [&str; 2] = ["title", "links_count"];

/// Maximum number of entries kept in `sample_links` / `sample_buttons`
pub const MAX_SAMPLES: usize = 5;

/// Values the agent writes when it could not fill a field
const PLACEHOLDERS: [&str; 8] = [
    "",
    "not extracted",
    "n/a",
    "na",
    "unknown",
    "none",
    "null",
    "not available",
];

const DOUBLE_QUOTED: &str = r#""((?:[^"\\]|\\.)*)""#;
const SINGLE_QUOTED: &str = r"'((?:[^'\\]|\\.)*)'";
const BRACKETED: &str = r"\[([^\]]*)\]";
const LINE_REST: &str = r"(.+?)[ \t]*$";
/// Digits with optional thousands grouping; a decimal tail is captured so it can be refused
const COUNT: &str = r"((?:\d{1,3}(?:[,_]\d{3})+|\d+)(?:\.\d+)?)";

static TITLE: LazyLock<Vec<Regex>> =
    LazyLock::new(|| text_candidates("title", r"(?:page[ \t]+)?title"));
static LINKS_COUNT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r#""links_count"\s*:\s*{COUNT}"#),
        format!(r"'links_count'\s*:\s*{COUNT}"),
        format!(
            "{}{COUNT}",
            label(r"(?:links?[ _]count|total[ \t]+links|number[ \t]+of[ \t]+links)")
        ),
    ])
});
static SAMPLE_LINKS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| list_candidates("sample_links", r"sample[ _]links"));
static SAMPLE_BUTTONS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| list_candidates("sample_buttons", r"sample[ _]buttons"));
static HAS_NAVIGATION: LazyLock<Vec<Regex>> =
    LazyLock::new(|| bool_candidates("has_navigation", r"has[ _]navigation"));
static HAS_MAIN_CONTENT: LazyLock<Vec<Regex>> =
    LazyLock::new(|| bool_candidates("has_main_content", r"has[ _]main[ _]content"));
static PAGE_TYPE: LazyLock<Vec<Regex>> =
    LazyLock::new(|| text_candidates("page_type", r"page[ _]type"));

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{DOUBLE_QUOTED}|{SINGLE_QUOTED}")).expect("list item regex is valid")
});

fn compile(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("field patterns are valid regexes"))
        .collect()
}

/// A `Label: value` line, tolerating bullets and bold markers around the label
fn label(name: &str) -> String {
    format!(r"(?im)^[ \t]*(?:[-*][ \t]+)?(?:\*\*)?{name}(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]*")
}

fn text_candidates(key: &str, name: &str) -> Vec<Regex> {
    compile(&[
        format!(r#""{key}"\s*:\s*{DOUBLE_QUOTED}"#),
        format!(r"'{key}'\s*:\s*{SINGLE_QUOTED}"),
        format!("{}{LINE_REST}", label(name)),
    ])
}

fn list_candidates(key: &str, name: &str) -> Vec<Regex> {
    compile(&[
        format!(r#""{key}"\s*:\s*{BRACKETED}"#),
        format!(r"'{key}'\s*:\s*{BRACKETED}"),
        format!("{}{LINE_REST}", label(name)),
    ])
}

fn bool_candidates(key: &str, name: &str) -> Vec<Regex> {
    let value = r"(true|false|yes|no)\b";
    compile(&[
        format!(r#"(?i)"{key}"\s*:\s*{value}"#),
        format!(r"(?i)'{key}'\s*:\s*{value}"),
        format!("{}{value}", label(name)),
    ])
}

/// Build the page metadata for an answer.
///
/// `span` is the data block found by [`super::block::locate`], if any.
pub fn extract(text: &str, span: Option<Range<usize>>) -> PageMetadata {
    let mut metadata = span
        .and_then(|span| text.get(span))
        .and_then(decode_block)
        .unwrap_or_default();

    fill_from_text(&mut metadata, text);
    drop_placeholders(&mut metadata);
    metadata
}

/// Strictly decode a data block.
///
/// Only well-typed keys are kept; a block missing a required key does not count.
pub fn decode_block(block: &str) -> Option<PageMetadata> {
    let value: Value = match serde_json::from_str(block) {
        Ok(value) => value,
        Err(e) => {
            ::log::debug!("Data block is not valid JSON: {}", e);
            return None;
        }
    };

    let object = value.as_object()?;
    if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !object.contains_key(**key)) {
        ::log::debug!("Data block lacks required key '{}'", missing);
        return None;
    }

    Some(PageMetadata {
        title: string_field(object, "title"),
        links_count: object.get("links_count").and_then(Value::as_u64),
        sample_links: list_field(object, "sample_links"),
        sample_buttons: list_field(object, "sample_buttons"),
        has_navigation: object.get("has_navigation").and_then(Value::as_bool),
        has_main_content: object.get("has_main_content").and_then(Value::as_bool),
        page_type: string_field(object, "page_type"),
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn list_field(object: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    object.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .take(MAX_SAMPLES)
            .map(str::to_string)
            .collect()
    })
}

/// Fill every key that is still absent or holds a placeholder.
///
/// Each key is searched for independently over the whole text.
pub fn fill_from_text(metadata: &mut PageMetadata, text: &str) {
    if metadata.title.as_deref().is_none_or(is_placeholder) {
        if let Some(title) = recover(&TITLE, text, accept_text) {
            metadata.title = Some(title);
        }
    }
    if metadata.links_count.is_none_or(|count| count == 0) {
        if let Some(count) = recover(&LINKS_COUNT, text, accept_count) {
            metadata.links_count = Some(count);
        }
    }
    if metadata.sample_links.as_ref().is_none_or(Vec::is_empty) {
        if let Some(links) = recover(&SAMPLE_LINKS, text, accept_list) {
            metadata.sample_links = Some(links);
        }
    }
    if metadata.sample_buttons.as_ref().is_none_or(Vec::is_empty) {
        if let Some(buttons) = recover(&SAMPLE_BUTTONS, text, accept_list) {
            metadata.sample_buttons = Some(buttons);
        }
    }
    if metadata.has_navigation.is_none() {
        metadata.has_navigation = recover(&HAS_NAVIGATION, text, accept_bool);
    }
    if metadata.has_main_content.is_none() {
        metadata.has_main_content = recover(&HAS_MAIN_CONTENT, text, accept_bool);
    }
    if metadata.page_type.as_deref().is_none_or(is_placeholder) {
        if let Some(page_type) = recover(&PAGE_TYPE, text, accept_text) {
            metadata.page_type = Some(page_type);
        }
    }
}

/// First capture, across candidates in priority order, that `accept` takes
fn recover<T>(candidates: &[Regex], text: &str, accept: fn(&str) -> Option<T>) -> Option<T> {
    candidates.iter().enumerate().find_map(|(idx, regex)| {
        let value = regex
            .captures_iter(text)
            .find_map(|caps| caps.get(1).and_then(|m| accept(m.as_str())));
        if value.is_some() {
            ::log::trace!("Field recovered by candidate {}: {}", idx, regex.as_str());
        }
        value
    })
}

fn drop_placeholders(metadata: &mut PageMetadata) {
    if metadata.title.as_deref().is_some_and(is_placeholder) {
        metadata.title = None;
    }
    if metadata.page_type.as_deref().is_some_and(is_placeholder) {
        metadata.page_type = None;
    }
}

/// True for empty strings and the usual "no value" markers
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    PLACEHOLDERS.contains(&value.as_str())
}

fn clean_text(raw: &str) -> String {
    let value = raw.trim().trim_matches('*').trim().trim_end_matches(',');
    unescape(strip_quotes(value))
}

fn accept_text(raw: &str) -> Option<String> {
    let value = clean_text(raw);
    (!is_placeholder(&value)).then_some(value)
}

/// Zero is what the agent writes when it could not count, so it never wins a search
fn accept_count(raw: &str) -> Option<u64> {
    if raw.contains('.') {
        return None;
    }
    raw.trim()
        .replace([',', '_'], "")
        .parse()
        .ok()
        .filter(|count| *count > 0)
}

fn accept_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

fn accept_list(raw: &str) -> Option<Vec<String>> {
    let items: Vec<String> = if raw.contains(['"', '\'']) {
        LIST_ITEM
            .captures_iter(raw)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .filter_map(|m| accept_text(m.as_str()))
            .take(MAX_SAMPLES)
            .collect()
    } else {
        raw.split(',')
            .filter_map(accept_text)
            .take(MAX_SAMPLES)
            .collect()
    };
    (!items.is_empty()).then_some(items)
}
