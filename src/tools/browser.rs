use crate::errors::ToolError;
use crate::parsers::html;
use crate::tools::{Automation, ToolId, split_pair};
use crate::utils::strip_quotes;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::timeout;

/// Pause after scrolling, mimicking a human reader
const SCROLL_SETTLE: Duration = Duration::from_millis(500);

/// Settings for the WebDriver-backed tools
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub page_load_timeout: Duration,
    pub click_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            page_load_timeout: Duration::from_secs(30),
            click_timeout: Duration::from_secs(5),
        }
    }
}

/// Browser automation primitives over WebDriver.
///
/// Every call opens a fresh session, does its work, and closes the session
/// before returning. Calls block the current thread.
pub struct BrowserTools {
    config: BrowserConfig,
    runtime: Handle,
}

impl BrowserTools {
    /// Must be called from within a tokio runtime, whose handle drives the sessions
    pub fn new(config: BrowserConfig) -> Result<Self, ToolError> {
        let runtime = Handle::try_current().map_err(|e| {
            ToolError::ExecutionFailure(format!("browser tools need a tokio runtime: {}", e))
        })?;
        Ok(Self { config, runtime })
    }

    fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        if self.config.headless {
            caps.insert(
                "goog:chromeOptions".to_string(),
                json!({ "args": ["--headless=new", "--no-sandbox", "--disable-dev-shm-usage"] }),
            );
            caps.insert(
                "moz:firefoxOptions".to_string(),
                json!({ "args": ["-headless"] }),
            );
        }
        caps
    }

    /// Connects to the WebDriver instance, falling back to common local ports
    async fn connect(&self) -> Result<Client, ToolError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());

        let first_error = match builder.connect(&self.config.webdriver_url).await {
            Ok(client) => return Ok(client),
            Err(e) => e,
        };
        ::log::warn!(
            "Failed to connect to WebDriver at {}: {}",
            self.config.webdriver_url,
            first_error
        );

        let fallback_urls = [
            "http://localhost:9515", // ChromeDriver default
            "http://127.0.0.1:4444",
        ];
        for url in fallback_urls {
            if url == self.config.webdriver_url {
                continue;
            }
            ::log::debug!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = builder.connect(url).await {
                ::log::info!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        Err(first_error.into())
    }

    /// Opens a session, navigates to `url`, runs `op`, and always closes the session
    async fn with_page<F, Fut>(&self, url: &str, op: F) -> Result<String, ToolError>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = Result<String, ToolError>>,
    {
        let client = self.connect().await?;

        // Navigate, bounded by the page load timeout, then hand the page to `op`
        let result = match timeout(self.config.page_load_timeout, client.goto(url)).await {
            Ok(Ok(())) => op(client.clone()).await,
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ToolError::WebDriver(format!(
                "page load timed out after {:?}",
                self.config.page_load_timeout
            ))),
        };

        // Close the session whether or not the work succeeded
        if let Err(e) = client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }
        result
    }

    async fn load_page(&self, input: &str) -> Result<String, ToolError> {
        let url = strip_quotes(input);
        self.with_page(url, |client| async move {
            let title = client.title().await?;
            let html = client.source().await?;
            Ok(format!(
                "Page loaded successfully. Title: '{}'. HTML content length: {} characters.",
                title,
                html.chars().count()
            ))
        })
        .await
    }

    async fn click_element(&self, input: &str) -> Result<String, ToolError> {
        let (selector, url) = split_pair(input)?;
        let click_timeout = self.config.click_timeout;

        self.with_page(url, |client| async move {
            let clicked = async {
                let element = client
                    .wait()
                    .at_most(click_timeout)
                    .for_element(Locator::Css(selector))
                    .await?;
                element.click().await
            }
            .await;

            // a failed click is an observation, not a tool failure
            if let Err(e) = clicked {
                return Ok(format!("Could not click '{}': {}", selector, e));
            }

            let title = client.title().await?;
            let html = client.source().await?;
            Ok(format!(
                "Successfully clicked '{}'. New page title: '{}'. HTML length: {} characters.",
                selector,
                title,
                html.chars().count()
            ))
        })
        .await
    }

    async fn scroll_page(&self, input: &str) -> Result<String, ToolError> {
        let (url, pixels) = split_pair(input)?;
        let pixels: i64 = pixels
            .parse()
            .map_err(|_| ToolError::InvalidInput(format!("'{}' is not a pixel count", pixels)))?;

        self.with_page(url, |client| async move {
            client
                .execute("window.scrollBy(0, arguments[0]);", vec![json!(pixels)])
                .await?;
            tokio::time::sleep(SCROLL_SETTLE).await;
            let html = client.source().await?;
            Ok(format!(
                "Scrolled {} pixels. Page content length: {} characters.",
                pixels,
                html.chars().count()
            ))
        })
        .await
    }

    async fn analyze_page(&self, input: &str) -> Result<String, ToolError> {
        let url = strip_quotes(input);
        let html = self
            .with_page(url, |client| async move { Ok(client.source().await?) })
            .await?;

        let structure = html::analyze_structure(&html);
        serde_json::to_string_pretty(&structure)
            .map_err(|e| ToolError::ExecutionFailure(format!("failed to encode structure: {}", e)))
    }
}

impl Automation for BrowserTools {
    fn execute(&self, tool: ToolId, input: &str) -> Result<String, ToolError> {
        ::log::debug!("Browser tool {} starting", tool);
        self.runtime.block_on(async {
            match tool {
                ToolId::LoadPage => self.load_page(input).await,
                ToolId::ClickElement => self.click_element(input).await,
                ToolId::ScrollPage => self.scroll_page(input).await,
                ToolId::AnalyzePage => self.analyze_page(input).await,
            }
        })
    }
}
