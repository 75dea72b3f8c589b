//! Behavior pattern segmentation.
//!
//! Each strategy is a pure function over the answer text; [`segment`] runs them
//! strictest first and keeps the first non-empty result.

use crate::results::BehaviorPattern;
use crate::utils::truncate_chars;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Maximum length of a pattern description, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Upper bound on segments taken from a plain numbered list
pub const MAX_NUMBERED_LIST_MATCHES: usize = 7;

const OUTCOME_MARKER: &str = "expected outcome";

/// A segmentation strategy and its name for logging
pub type Strategy = (&'static str, fn(&str) -> Vec<BehaviorPattern>);

/// Strategies in the order they are tried
pub const STRATEGIES: [Strategy; 5] = [
    ("titled-block", titled_block),
    ("loose-titled", loose_titled),
    ("generic-numbered", generic_numbered),
    ("numbered-list", numbered_list),
    ("final-answer-section", final_answer_section),
];

static TITLED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?i)\*\*Pattern[ \t]+(\d+)[ \t]*:[ \t]*([^*\n]+?)[ \t]*\*\*")
});
static LOOSE_TITLED: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?i)\*\*Pattern[ \t]+(\d+)[ \t]*:?[ \t]*(?:\*\*)?[ \t]*([^*\n]+)")
});
static GENERIC_NUMBERED: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"(?im)^[ \t]*(?:(?:#{1,6}[ \t]*)?(?:\*\*)?Pattern[ \t]+(\d+)|(?:#{1,6}[ \t]*(?:\*\*)?|\*\*)(\d+)\.)[ \t]*[:.)\-]?[ \t]*([^\n]*)",
    )
});
static NUMBERED_LIST: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?m)^[ \t]*(\d+)\.[ \t]+([^\n]+)"));
static TERMINAL: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?im)^[ \t]*(?:\*\*)?(?:final answer|thought)(?:\*\*)?[ \t]*:")
});
static FINAL_ANSWER: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)final answer[ \t]*:"));

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("segmentation patterns are valid regexes")
}

/// A matched segment header
struct Header {
    start: usize,
    end: usize,
    /// `None` when the digits do not fit a pattern number
    number: Option<u32>,
    title: Option<String>,
}

/// Split the answer into behavior patterns
pub fn segment(text: &str) -> Vec<BehaviorPattern> {
    for (name, strategy) in STRATEGIES {
        let patterns = strategy(text);
        if !patterns.is_empty() {
            ::log::debug!(
                "Segmented {} behavior patterns with the {} strategy",
                patterns.len(),
                name
            );
            return patterns;
        }
    }

    ::log::debug!("No behavior patterns recognised in answer");
    Vec::new()
}

/// `**Pattern N: Title**`
pub fn titled_block(text: &str) -> Vec<BehaviorPattern> {
    let headers = headers(&TITLED_BLOCK, text, usize::MAX, |caps| {
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    });
    build_patterns(text, headers)
}

/// `**Pattern N: Title` with the closing emphasis missing or misplaced
pub fn loose_titled(text: &str) -> Vec<BehaviorPattern> {
    let headers = headers(&LOOSE_TITLED, text, usize::MAX, |caps| {
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    });
    build_patterns(text, headers)
}

/// `Pattern N` anywhere at line start, or an emphasised / heading `N.` prefix
pub fn generic_numbered(text: &str) -> Vec<BehaviorPattern> {
    let headers = headers(&GENERIC_NUMBERED, text, usize::MAX, |caps| {
        let number = caps.get(1).or_else(|| caps.get(2))?;
        Some((number.as_str(), caps.get(3).map_or("", |m| m.as_str())))
    });
    build_patterns(text, headers)
}

/// Plain `N. Title` list items, at most [`MAX_NUMBERED_LIST_MATCHES`]
pub fn numbered_list(text: &str) -> Vec<BehaviorPattern> {
    let headers = headers(&NUMBERED_LIST, text, MAX_NUMBERED_LIST_MATCHES, |caps| {
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    });
    build_patterns(text, headers)
}

/// Titled blocks found only in the text after `Final Answer:`
pub fn final_answer_section(text: &str) -> Vec<BehaviorPattern> {
    match FINAL_ANSWER.find(text) {
        Some(marker) => titled_block(&text[marker.end()..]),
        None => Vec::new(),
    }
}

fn headers<'t>(
    regex: &Regex,
    text: &'t str,
    limit: usize,
    fields: impl Fn(&Captures<'t>) -> Option<(&'t str, &'t str)>,
) -> Vec<Header> {
    regex
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (number, title) = fields(&caps)?;
            // an unreadable number still bounds the previous segment
            let number = number.parse().ok();
            Some(Header {
                start: whole.start(),
                end: whole.end(),
                title: number.map(|number| clean_title(title, number)),
                number,
            })
        })
        .take(limit)
        .collect()
}

fn clean_title(raw: &str, number: u32) -> String {
    let title = raw
        .trim()
        .trim_matches('*')
        .trim()
        .trim_start_matches([':', '-', '.'])
        .trim_end_matches(':')
        .trim();
    if title.is_empty() {
        format!("Pattern {}", number)
    } else {
        title.to_string()
    }
}

/// Each header owns the text up to the next header, cut at a terminal marker
fn build_patterns(text: &str, headers: Vec<Header>) -> Vec<BehaviorPattern> {
    let mut patterns = Vec::with_capacity(headers.len());

    for (idx, header) in headers.iter().enumerate() {
        let next_start = headers.get(idx + 1).map_or(text.len(), |next| next.start);
        let (Some(number), Some(title)) = (header.number, &header.title) else {
            ::log::debug!("Skipping pattern header with unreadable number");
            continue;
        };
        let mut body = &text[header.end..next_start];
        if let Some(terminal) = TERMINAL.find(body) {
            body = &body[..terminal.start()];
        }

        patterns.push(BehaviorPattern {
            number,
            title: title.clone(),
            steps: steps(body),
            expected_outcome: expected_outcome(body),
            description: truncate_chars(body.trim(), MAX_DESCRIPTION_CHARS),
        });
    }

    patterns
}

fn is_outcome_line(line: &str) -> bool {
    line.to_lowercase().contains(OUTCOME_MARKER)
}

/// Hyphen-bulleted lines, bullet removed
fn steps(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-') && !line.chars().all(|c| c == '-'))
        .filter(|line| !is_outcome_line(line))
        .map(|line| line.trim_start_matches('-').trim().to_string())
        .filter(|step| !step.is_empty())
        .collect()
}

/// Text after the first colon of the first outcome line, or the whole line
fn expected_outcome(body: &str) -> Option<String> {
    let line = body.lines().map(str::trim).find(|line| is_outcome_line(line))?;
    let value = match line.split_once(':') {
        Some((_, rest)) => rest,
        None => line.trim_start_matches('-'),
    };
    let value = value.trim().trim_matches('*').trim();
    (!value.is_empty()).then(|| value.to_string())
}
