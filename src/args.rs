use clap::Parser;
use page_patterns::AnalyzerConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "page-patterns")]
#[command(about = "Analyze a web page with a browsing agent and extract user behavior patterns")]
#[command(version)]
pub struct Args {
    /// URL to analyze (https:// is assumed when no scheme is given)
    pub url: String,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver URL (overrides the config file and WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Number of concurrent browser sessions
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Timeout for a single tool call, in seconds
    #[arg(long)]
    pub tool_timeout: Option<u64>,

    /// Maximum number of reasoning steps
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Chat model name
    #[arg(long)]
    pub model: Option<String>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

impl Args {
    /// Load the config file (or defaults), then apply environment and command-line overrides
    pub fn load_config(&self) -> Result<AnalyzerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_file(path)?,
            None => AnalyzerConfig::default(),
        };
        config.apply_env_overrides();
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut AnalyzerConfig) {
        if let Some(webdriver_url) = &self.webdriver_url {
            config.webdriver_url = webdriver_url.clone();
        }
        if let Some(workers) = self.workers {
            config.worker_pool_size = workers;
        }
        if let Some(tool_timeout) = self.tool_timeout {
            config.tool_timeout_secs = tool_timeout;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
    }
}
