pub mod agent;
pub mod config;
pub mod errors;
pub mod llm;
pub mod parsers;
pub mod results;
pub mod tools;
pub mod utils;

// Re-export commonly used types for convenience
pub use agent::{Agent, AnalysisTask, ReasoningLoop};
pub use config::AnalyzerConfig;
pub use results::{AnalysisResult, AnalyzeRequest, BehaviorPattern, PageMetadata};

use agent::ReactLoop;
use llm::OpenAiClient;
use serde_json::{Value, json};
use std::sync::Arc;
use tools::browser::BrowserTools;
use tools::{ToolGateway, WorkerPool};

/// Error text reported when the agent returns nothing usable
pub const EMPTY_ANSWER_ERROR: &str = "Failed to analyze website";

/// Static liveness payload for an outer HTTP layer
pub fn health() -> Value {
    json!({ "status": "ok" })
}

/// Runs one analysis per request: agent answer in, structured result out
pub struct Analyzer {
    agent: Agent,
    pool: Option<WorkerPool>,
}

impl Analyzer {
    /// Wrap an existing agent; the caller owns any worker pool behind it
    pub fn new(agent: Agent) -> Self {
        Self { agent, pool: None }
    }

    /// Build the full stack from configuration.
    ///
    /// Must be called inside a tokio runtime. The worker pool created here is
    /// closed by [`Analyzer::shutdown`].
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // One pool shared by every browser session this analyzer opens
        let pool = WorkerPool::new(config.worker_pool_size);
        let browser = BrowserTools::new(config.browser())?;
        let gateway = ToolGateway::new(Arc::new(browser), pool.clone(), config.tool_timeout());
        let tool_timeout = gateway.timeout();

        // Fails early when the API key is missing
        let llm = OpenAiClient::new(&config.llm)?;

        let reasoning = ReactLoop::new(Arc::new(llm), Arc::new(gateway));
        let agent = Agent::new(Arc::new(reasoning)).with_max_steps(config.max_steps);

        ::log::info!(
            "Analyzer ready: {} workers, {:?} tool timeout, {} max steps, model {}",
            pool.capacity(),
            tool_timeout,
            agent.max_steps(),
            config.llm.model
        );
        Ok(Self {
            agent,
            pool: Some(pool),
        })
    }

    /// Analyze one URL. Always returns a well-formed result.
    pub async fn analyze(&self, url: &str) -> AnalysisResult {
        // Reject empty or unparseable URLs before any browser work
        let task = match AnalysisTask::parse(url) {
            Ok(task) => task,
            Err(e) => {
                ::log::warn!("Rejected request for '{}': {}", url, e);
                return AnalysisResult::failure(e.to_string());
            }
        };

        // run the agent on its own task so a panic in the loop is contained
        let agent = self.agent.clone();
        let handle = tokio::spawn(async move { agent.run(&task).await });
        let answer = match handle.await {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => return AnalysisResult::failure(e.to_string()),
            Err(e) => {
                ::log::error!("Agent task failed: {}", e);
                return AnalysisResult::failure(format!("agent task failed: {}", e));
            }
        };

        // An empty answer counts as a failed analysis
        if answer.trim().is_empty() {
            ::log::warn!("Agent returned an empty answer for {}", url);
            return AnalysisResult::failure(EMPTY_ANSWER_ERROR);
        }

        // Metadata and patterns are recovered independently from the same text
        let extraction = parsers::extract(&answer);
        ::log::info!(
            "Extracted {} patterns and {} metadata for {}",
            extraction.patterns.len(),
            if extraction.metadata.is_empty() {
                "no"
            } else {
                "some"
            },
            url
        );
        AnalysisResult::success(extraction.metadata, extraction.patterns, answer)
    }

    pub async fn handle(&self, request: &AnalyzeRequest) -> AnalysisResult {
        self.analyze(&request.url).await
    }

    /// Close the worker pool; tool calls after this fail with a pool-closed observation
    pub fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            pool.shutdown();
        }
    }
}
