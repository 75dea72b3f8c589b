use crate::tools::browser::BrowserConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for one analyzer process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Number of automation sessions allowed at once
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// Upper bound on a single tool call
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// How long click_element waits for its selector to appear
    #[serde(default = "default_click_timeout_secs")]
    pub click_timeout_secs: u64,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Reasoning steps allowed before the agent gives up
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    #[serde(default)]
    pub llm: LlmConfig,
}

/// Configuration for the OpenAI-compatible chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub temperature: f32,

    /// Environment variable holding the API key; the key itself is never stored
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_worker_pool_size() -> usize {
    2
}

fn default_tool_timeout_secs() -> u64 {
    60
}

fn default_page_load_timeout_secs() -> u64 {
    30
}

fn default_click_timeout_secs() -> u64 {
    5
}

fn default_headless() -> bool {
    true
}

fn default_max_steps() -> usize {
    10
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            temperature: 0.0,
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            worker_pool_size: default_worker_pool_size(),
            tool_timeout_secs: default_tool_timeout_secs(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            click_timeout_secs: default_click_timeout_secs(),
            headless: default_headless(),
            max_steps: default_max_steps(),
            llm: LlmConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(contents: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(contents)?;
        Ok(config)
    }

    /// Override settings from `WEBDRIVER_URL`, `OPENAI_API_BASE` and `OPENAI_MODEL`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(webdriver_url) = var("WEBDRIVER_URL") {
            ::log::debug!("Using WebDriver URL from environment: {}", webdriver_url);
            self.webdriver_url = webdriver_url;
        }
        if let Some(api_base) = var("OPENAI_API_BASE") {
            self.llm.api_base = api_base;
        }
        if let Some(model) = var("OPENAI_MODEL") {
            self.llm.model = model;
        }
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn browser(&self) -> BrowserConfig {
        BrowserConfig {
            webdriver_url: self.webdriver_url.clone(),
            headless: self.headless,
            page_load_timeout: Duration::from_secs(self.page_load_timeout_secs),
            click_timeout: Duration::from_secs(self.click_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.worker_pool_size, 2);
        assert_eq!(config.tool_timeout(), Duration::from_secs(60));
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalyzerConfig::from_json(
            r#"{"worker_pool_size": 4, "headless": false, "llm": {"model": "gpt-4o"}}"#,
        )
        .unwrap();
        assert_eq!(config.worker_pool_size, 4);
        assert!(!config.headless);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_base, "https://api.openai.com/v1");
        assert_eq!(config.click_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(AnalyzerConfig::from_json("{\"max_steps\": \"many\"}").is_err());
        assert!(AnalyzerConfig::from_file("/nonexistent/analyzer.json").is_err());
    }

    #[test]
    fn test_overrides_skip_empty_values() {
        let env: HashMap<&str, &str> = [
            ("WEBDRIVER_URL", "http://grid:4444"),
            ("OPENAI_MODEL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AnalyzerConfig::default();
        config.apply_overrides(|name| env.get(name).map(|value| value.to_string()));
        assert_eq!(config.webdriver_url, "http://grid:4444");
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_browser_settings() {
        let browser = AnalyzerConfig::default().browser();
        assert_eq!(browser.page_load_timeout, Duration::from_secs(30));
        assert_eq!(browser.click_timeout, Duration::from_secs(5));
        assert!(browser.headless);
    }
}
