pub mod block;
pub mod html;
pub mod metadata;
pub mod patterns;

#[cfg(test)]
mod tests;

use crate::results::{BehaviorPattern, PageMetadata};

/// Structured data recovered from one agent answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub metadata: PageMetadata,
    pub patterns: Vec<BehaviorPattern>,
}

/// Recovers metadata and behavior patterns from the agent's free-text answer.
///
/// Never fails: anything that cannot be recovered is left absent or empty.
/// Metadata and pattern extraction run independently over the same text.
pub fn extract(answer: &str) -> Extraction {
    let span = block::locate(answer);
    if span.is_none() {
        ::log::debug!("No data block located; relying on field search");
    }

    let metadata = metadata::extract(answer, span);
    let patterns = patterns::segment(answer);

    Extraction { metadata, patterns }
}
