use chrono::Local;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::Path;
use std::process;
use team_issue_stats::github::{CacheGuard, GitHubSource, SourceContext, StreamCache};
use team_issue_stats::model::{Credentials, Result};
use team_issue_stats::report::chart::BitmapChartRenderer;
use team_issue_stats::report::{generate_markdown, timestamped_dir, ReportOutcome};

#[derive(Parser, Debug, Clone)]
struct Args {
    #[arg(long = "repository", env = "GITHUB_REPOSITORY")]
    repository: Option<String>,
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[arg(long = "reports_dir", default_value = "Reports")]
    reports_dir: String,
    #[arg(long = "cache_path", default_value = ".cache")]
    cache_path: String,
    #[arg(long = "output", default_value = "team_issue_stats.md")]
    output: String,
    #[arg(long = "api_url", default_value = "https://api.github.com")]
    api_url: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args).await {
        error!("❌ {err}");
        process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    let credentials =
        Credentials::from_env_values(args.repository.as_deref(), args.token.as_deref())?;
    let report_dir = timestamped_dir(Path::new(&args.reports_dir), &Local::now().naive_local());
    info!(
        "📊 Generating report for {} in: {}",
        credentials.repository(),
        report_dir.display()
    );

    let _cache_guard = CacheGuard::new(&args.cache_path);
    let source = GitHubSource::new(&args.api_url, credentials)?;
    let context = SourceContext::new(source, StreamCache::new(&args.cache_path));
    let tables = context.fetch().await;

    let outcome = generate_markdown(
        tables.into_analysis(),
        &BitmapChartRenderer,
        &report_dir,
        &args.output,
    )?;
    if outcome == ReportOutcome::InsufficientData {
        info!("No report written for {}", args.repository.as_deref().unwrap_or_default());
    }
    Ok(())
}
