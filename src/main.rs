use clap::Parser;
use page_patterns::{AnalysisResult, Analyzer};
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();
    ::log::info!("Starting analysis for URL: {}", args.url);

    let result = match args.load_config() {
        Ok(config) => {
            ::log::info!(
                "Browser tools require a WebDriver server at {} (set WEBDRIVER_URL to change it)",
                config.webdriver_url
            );
            match Analyzer::from_config(&config) {
                Ok(analyzer) => {
                    let start_time = std::time::Instant::now();
                    let result = analyzer.analyze(&args.url).await;
                    analyzer.shutdown();
                    ::log::info!(
                        "Analysis complete in {:.2} seconds",
                        start_time.elapsed().as_secs_f64()
                    );
                    result
                }
                Err(e) => {
                    ::log::error!("Failed to start analyzer: {}", e);
                    AnalysisResult::failure(e.to_string())
                }
            }
        }
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            AnalysisResult::failure(e.to_string())
        }
    };

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };
    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            ::log::error!("Failed to encode result: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
