use std::time::Duration;
use thiserror::Error;

/// Failures raised while running an automation primitive through the gateway
#[derive(Debug, Error)]
pub enum ToolError {
    /// The primitive did not return within the gateway timeout
    #[error("tool execution timed out after {0:?}")]
    ExecutionTimeout(Duration),

    /// The primitive raised or panicked
    #[error("{0}")]
    ExecutionFailure(String),

    /// The worker pool has been shut down
    #[error("worker pool is shut down")]
    PoolClosed,

    /// The pipe-delimited input could not be split into the expected fields
    #[error("invalid tool input: {0}")]
    InvalidInput(String),

    /// WebDriver session or command failure
    #[error("{0}")]
    WebDriver(String),
}

impl From<fantoccini::error::CmdError> for ToolError {
    fn from(error: fantoccini::error::CmdError) -> Self {
        ToolError::WebDriver(error.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for ToolError {
    fn from(error: fantoccini::error::NewSessionError) -> Self {
        ToolError::WebDriver(format!("failed to open WebDriver session: {}", error))
    }
}

/// Failures talking to the language model
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("missing API key (set {0})")]
    MissingApiKey(String),

    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response missing content")]
    EmptyResponse,
}

/// Failures surfaced by the agent invocation boundary
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("URL is required")]
    MissingUrl,

    #[error("invalid URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),

    /// The reasoning loop failed; carries the cause description
    #[error("{0}")]
    Execution(String),

    /// The reasoning loop used its whole step budget without a final answer
    #[error("agent stopped after reaching the limit of {0} reasoning steps")]
    StepLimit(usize),

    #[error(transparent)]
    Llm(#[from] LlmError),
}
