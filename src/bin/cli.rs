use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use business_insights::telemetry::init_cli_logging;
use business_insights::{Config, QueryPipeline};

#[derive(Parser, Debug)]
#[command(name = "insights")]
#[command(about = "AI Business Insights Assistant (CLI)", long_about = None)]
struct Cli {
    /// Your business query
    query: String,
    /// Optional file path to save the report (e.g. report.md)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Business profile JSON; the built-in profile is used when absent
    #[arg(long, env = "BUSINESS_PROFILE_PATH")]
    profile: Option<String>,
    #[arg(long, env = "LLM_PROVIDER")]
    llm_provider: Option<String>,
    #[arg(long, env = "SEARCH_PROVIDER")]
    search_provider: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_cli_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "An unexpected error occurred");
            eprintln!("An error occurred. Please check logs or try again. Details: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(profile) = cli.profile {
        config.business_profile_path = Some(profile);
    }
    if let Some(provider) = cli.llm_provider {
        config.llm_provider = provider;
    }
    if let Some(provider) = cli.search_provider {
        config.search_provider = provider;
    }

    println!("Initializing AI Assistant...");
    let pipeline = QueryPipeline::from_config(&config)?;

    println!("Processing your query: \"{}\"", cli.query);
    println!("{}", "-".repeat(30));

    let report = pipeline.process_query(&cli.query).await;

    println!("\n--- Generated Insights ---");
    println!("{report}");
    println!("------------------------\n");

    if let Some(path) = cli.output {
        std::fs::write(&path, &report)
            .with_context(|| format!("saving report to {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }

    Ok(())
}
