use crate::errors::ToolError;
use crate::tools::{Automation, ToolId, WorkerPool};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Runs blocking automation primitives from async callers.
///
/// Every call is dispatched to the worker pool and bounded by `timeout`.
/// On timeout the in-flight call is abandoned rather than killed: it keeps
/// its worker until the primitive returns and closes its own session.
pub struct ToolGateway {
    automation: Arc<dyn Automation>,
    pool: WorkerPool,
    timeout: Duration,
}

impl ToolGateway {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(automation: Arc<dyn Automation>, pool: WorkerPool, timeout: Duration) -> Self {
        Self {
            automation,
            pool,
            timeout,
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke a tool, reporting any failure as observation text.
    ///
    /// `input` is passed through untouched; the primitive splits its own fields.
    pub async fn invoke(&self, tool: ToolId, input: &str) -> String {
        match self.try_invoke(tool, input).await {
            Ok(output) => output,
            Err(e) => {
                ::log::warn!("Tool {} failed: {}", tool, e);
                format!("{}: {}", tool.failure_prefix(), e)
            }
        }
    }

    /// Invoke a tool, returning failures and timeouts as errors
    pub async fn try_invoke(&self, tool: ToolId, input: &str) -> Result<String, ToolError> {
        let start = Instant::now();
        ::log::debug!("Invoking tool {} with input: {}", tool, input);

        let automation = Arc::clone(&self.automation);
        let input = input.to_string();
        let job = self.pool.run(move || automation.execute(tool, &input));

        let result = match timeout(self.timeout, job).await {
            Ok(result) => result.and_then(|output| output),
            Err(_) => Err(ToolError::ExecutionTimeout(self.timeout)),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(ToolError::ExecutionTimeout(_)) => "timeout",
            Err(_) => "error",
        };
        ::log::info!(
            "Tool {} finished in {:.2} seconds ({})",
            tool,
            start.elapsed().as_secs_f64(),
            outcome
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Automation backed by a closure, recording every call it receives
    struct FakeAutomation<F> {
        behavior: F,
        calls: Mutex<Vec<(ToolId, String)>>,
    }

    impl<F> FakeAutomation<F>
    where
        F: Fn(ToolId, &str) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        fn new(behavior: F) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    impl<F> Automation for FakeAutomation<F>
    where
        F: Fn(ToolId, &str) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        fn execute(&self, tool: ToolId, input: &str) -> Result<String, ToolError> {
            self.calls.lock().unwrap().push((tool, input.to_string()));
            (self.behavior)(tool, input)
        }
    }

    fn gateway(automation: Arc<dyn Automation>, capacity: usize, timeout_ms: u64) -> ToolGateway {
        ToolGateway::new(
            automation,
            WorkerPool::new(capacity),
            Duration::from_millis(timeout_ms),
        )
    }

    #[tokio::test]
    async fn test_input_is_passed_through() {
        let automation = FakeAutomation::new(|tool, input| Ok(format!("{}:{}", tool, input)));
        let gateway = gateway(automation.clone(), 2, 1000);

        let output = gateway
            .invoke(ToolId::ClickElement, "a.nav|https://example.com")
            .await;
        assert_eq!(output, "click_element:a.nav|https://example.com");
        assert_eq!(
            automation.calls.lock().unwrap().as_slice(),
            &[(
                ToolId::ClickElement,
                "a.nav|https://example.com".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_failure_becomes_observation_text() {
        let automation = FakeAutomation::new(|_, _| {
            Err(ToolError::WebDriver("no such element".to_string()))
        });
        let gateway = gateway(automation, 2, 1000);

        let output = gateway.invoke(ToolId::ClickElement, "x|y").await;
        assert_eq!(output, "Error in click_element: no such element");
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let automation = FakeAutomation::new(|_, _| panic!("browser vanished"));
        let gateway = gateway(automation, 1, 1000);

        let output = gateway.invoke(ToolId::LoadPage, "https://example.com").await;
        assert!(output.starts_with("Error loading page: tool panicked"));
        assert!(output.contains("browser vanished"));
    }

    #[tokio::test]
    async fn test_timeout_abandons_call() {
        let automation = FakeAutomation::new(|_, _| {
            std::thread::sleep(Duration::from_millis(300));
            Ok("late".to_string())
        });
        let gateway = gateway(automation, 1, 50);
        assert_eq!(gateway.timeout(), Duration::from_millis(50));

        let result = gateway.try_invoke(ToolId::ScrollPage, "u|500").await;
        assert!(matches!(result, Err(ToolError::ExecutionTimeout(_))));

        // the abandoned call still occupies its worker until it returns
        assert_eq!(gateway.pool().available(), 0);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(gateway.pool().available(), 1);
    }

    #[tokio::test]
    async fn test_timeout_observation_text() {
        let automation = FakeAutomation::new(|_, _| {
            std::thread::sleep(Duration::from_millis(200));
            Ok("late".to_string())
        });
        let gateway = gateway(automation, 1, 20);

        let output = gateway.invoke(ToolId::AnalyzePage, "https://example.com").await;
        assert!(output.starts_with("Error analyzing page: tool execution timed out"));
    }

    #[tokio::test]
    async fn test_shut_down_pool_is_reported() {
        let automation = FakeAutomation::new(|_, _| Ok("ok".to_string()));
        let gateway = gateway(automation, 1, 1000);
        gateway.pool().shutdown();

        let output = gateway.invoke(ToolId::LoadPage, "https://example.com").await;
        assert_eq!(output, "Error loading page: worker pool is shut down");
    }
}
