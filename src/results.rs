use serde::{Deserialize, Serialize};

/// Structural metadata recovered from the agent's answer
///
/// Every field is either present with a value of its declared type or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links_count: Option<u64>,

    /// At most five entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_links: Option<Vec<String>>,

    /// At most five entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_buttons: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_navigation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_main_content: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_type: Option<String>,
}

impl PageMetadata {
    /// True when no field has been recovered
    pub fn is_empty(&self) -> bool {
        *self == PageMetadata::default()
    }
}

/// One simulated user journey proposed by the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorPattern {
    /// Number as written in the source text, not a list position
    pub number: u32,

    pub title: String,

    /// Bulleted lines of the pattern body, bullet removed
    pub steps: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outcome: Option<String>,

    /// Pattern body, truncated
    pub description: String,
}

/// Inbound request: a single URL, scheme optional
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

/// Outcome of one analysis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,

    #[serde(rename = "analysis", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<BehaviorPattern>>,

    #[serde(
        rename = "full_response",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_answer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Successful analysis; the raw answer is always kept alongside the extracted data
    pub fn success(
        metadata: PageMetadata,
        patterns: Vec<BehaviorPattern>,
        raw_answer: String,
    ) -> Self {
        Self {
            success: true,
            metadata: Some(metadata),
            patterns: Some(patterns),
            raw_answer: Some(raw_answer),
            error: None,
        }
    }

    /// Failed analysis carrying only the error description
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            metadata: None,
            patterns: None,
            raw_answer: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serializes_only_success_and_error() {
        let result = AnalysisResult::failure("boom");
        let json = serde_json::to_value(&result).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn test_success_uses_response_field_names() {
        let metadata = PageMetadata {
            title: Some("Home".to_string()),
            ..PageMetadata::default()
        };
        let result = AnalysisResult::success(metadata, Vec::new(), "raw".to_string());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["analysis"]["title"], "Home");
        assert!(json["analysis"].get("links_count").is_none());
        assert_eq!(json["patterns"], serde_json::json!([]));
        assert_eq!(json["full_response"], "raw");
        assert!(json.get("error").is_none());
    }
}
