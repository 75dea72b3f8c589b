pub mod browser;
pub mod gateway;
pub mod pool;

pub use gateway::ToolGateway;
pub use pool::WorkerPool;

use crate::errors::ToolError;
use crate::utils::strip_quotes;
use std::fmt;
use std::str::FromStr;

/// Separator between logical arguments in a tool's single input string
pub const FIELD_SEPARATOR: char = '|';

/// The automation primitives exposed to the reasoning loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    LoadPage,
    ClickElement,
    ScrollPage,
    AnalyzePage,
}

impl ToolId {
    pub const ALL: [ToolId; 4] = [
        ToolId::LoadPage,
        ToolId::ClickElement,
        ToolId::ScrollPage,
        ToolId::AnalyzePage,
    ];

    /// Name the reasoning loop uses to call the tool
    pub fn name(&self) -> &'static str {
        match self {
            ToolId::LoadPage => "load_page",
            ToolId::ClickElement => "click_element",
            ToolId::ScrollPage => "scroll_page",
            ToolId::AnalyzePage => "analyze_page",
        }
    }

    /// Description shown to the reasoning loop
    pub fn description(&self) -> &'static str {
        match self {
            ToolId::LoadPage => {
                "Load a webpage and get basic information. Input: URL as string \
                 (e.g., 'https://example.com'). Returns: confirmation with page title and HTML length."
            }
            ToolId::ClickElement => {
                "Click an element on a page. Input: 'selector|url' \
                 (e.g., 'a.article-link|https://example.com'). Use CSS selectors. \
                 Returns: confirmation message."
            }
            ToolId::ScrollPage => {
                "Scroll the page down. Input: 'url|pixels' (e.g., 'https://example.com|500'). \
                 Returns: confirmation."
            }
            ToolId::AnalyzePage => {
                "Analyze page structure and extract key information like links, buttons, \
                 navigation, content areas. Input: URL as string. Returns: JSON with structure \
                 data including title, links count, sample links/buttons, navigation presence, \
                 main content presence."
            }
        }
    }

    /// Prefix of the observation text reported when the tool fails
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            ToolId::LoadPage => "Error loading page",
            ToolId::ClickElement => "Error in click_element",
            ToolId::ScrollPage => "Error scrolling",
            ToolId::AnalyzePage => "Error analyzing page",
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolId {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = strip_quotes(name).trim_matches('`');
        ToolId::ALL
            .into_iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| name.to_string())
    }
}

/// A blocking, stateful automation primitive.
///
/// Implementations open and close their own session on every call and must
/// not be called from inside an async task; [`ToolGateway`] runs them on the
/// worker pool.
pub trait Automation: Send + Sync + 'static {
    fn execute(&self, tool: ToolId, input: &str) -> Result<String, ToolError>;
}

/// Split a `first|second` tool input into its two trimmed, unquoted fields
pub fn split_pair(input: &str) -> Result<(&str, &str), ToolError> {
    let input = strip_quotes(input);
    match input.split_once(FIELD_SEPARATOR) {
        Some((first, second)) => Ok((strip_quotes(first), strip_quotes(second))),
        None => Err(ToolError::InvalidInput(format!(
            "expected two fields separated by '{}', got '{}'",
            FIELD_SEPARATOR, input
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_round_trip() {
        for tool in ToolId::ALL {
            assert_eq!(tool.name().parse::<ToolId>(), Ok(tool));
        }
        assert_eq!(" `scroll_page` ".parse::<ToolId>(), Ok(ToolId::ScrollPage));
        assert_eq!("fly".parse::<ToolId>(), Err("fly".to_string()));
    }

    #[test]
    fn test_split_pair() {
        let (selector, url) = split_pair("'a.nav | \"https://example.com\"'").unwrap();
        assert_eq!(selector, "a.nav");
        assert_eq!(url, "https://example.com");
        assert!(matches!(
            split_pair("https://example.com"),
            Err(ToolError::InvalidInput(_))
        ));
    }
}
