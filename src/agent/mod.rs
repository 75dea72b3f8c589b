pub mod prompt;
pub mod react;

pub use react::ReactLoop;

use crate::errors::AgentError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// An opaque reasoning loop: one task in, one free-text answer out
#[async_trait]
pub trait ReasoningLoop: Send + Sync {
    async fn run(&self, task: &str, max_steps: usize) -> Result<String, AgentError>;
}

/// The page one request analyzes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTask {
    url: Url,
}

impl AnalysisTask {
    /// Parse a request URL, assuming `https://` when no scheme is given
    pub fn parse(input: &str) -> Result<Self, AgentError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AgentError::MissingUrl);
        }

        let candidate = if input.starts_with("http://") || input.starts_with("https://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };

        let url = Url::parse(&candidate).map_err(|e| AgentError::InvalidUrl(candidate.clone(), e))?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Hands analysis tasks to the reasoning loop with a bounded step budget
#[derive(Clone)]
pub struct Agent {
    reasoning: Arc<dyn ReasoningLoop>,
    max_steps: usize,
}

impl Agent {
    pub const DEFAULT_MAX_STEPS: usize = 10;

    pub fn new(reasoning: Arc<dyn ReasoningLoop>) -> Self {
        Self {
            reasoning,
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Run the loop for one task and return its raw answer.
    ///
    /// Every loop failure is reported as [`AgentError`]; the answer is not inspected.
    pub async fn run(&self, task: &AnalysisTask) -> Result<String, AgentError> {
        let start = Instant::now();
        ::log::info!("Starting agent for {}", task.url());

        let description = prompt::task_description(task.url());
        let result = self.reasoning.run(&description, self.max_steps).await;

        match &result {
            Ok(answer) => ::log::info!(
                "Agent answered for {} in {:.2} seconds ({} characters)",
                task.url(),
                start.elapsed().as_secs_f64(),
                answer.len()
            ),
            Err(e) => ::log::error!("Agent failed for {}: {}", task.url(), e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingLoop {
        seen: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl ReasoningLoop for RecordingLoop {
        async fn run(&self, task: &str, max_steps: usize) -> Result<String, AgentError> {
            self.seen.lock().unwrap().push((task.to_string(), max_steps));
            Ok("done".to_string())
        }
    }

    #[test]
    fn test_parse_adds_scheme() {
        let task = AnalysisTask::parse(" example.com/about ").unwrap();
        assert_eq!(task.url().as_str(), "https://example.com/about");

        let task = AnalysisTask::parse("http://example.com").unwrap();
        assert_eq!(task.url().scheme(), "http");
    }

    #[test]
    fn test_parse_rejects_empty_and_invalid() {
        assert!(matches!(AnalysisTask::parse("  "), Err(AgentError::MissingUrl)));
        assert!(matches!(
            AnalysisTask::parse("http://exa mple.com"),
            Err(AgentError::InvalidUrl(_, _))
        ));
    }

    #[tokio::test]
    async fn test_run_passes_task_and_budget() {
        let reasoning = Arc::new(RecordingLoop {
            seen: Mutex::new(Vec::new()),
        });
        let agent = Agent::new(reasoning.clone()).with_max_steps(4);
        assert_eq!(agent.max_steps(), 4);
        let task = AnalysisTask::parse("example.com").unwrap();

        assert_eq!(agent.run(&task).await.unwrap(), "done");
        let seen = reasoning.seen.lock().unwrap();
        assert!(seen[0].0.contains("https://example.com/"));
        assert_eq!(seen[0].1, 4);
    }
}
