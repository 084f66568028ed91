//! `risk-radar` — submit text or a URL to a financial risk analysis service and render
//! the assessment.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]); `--api-url` / `--fail-on` override it.
//! 3. Send exactly one request to the service ([`client`]).
//! 4. Normalize the raw response into an [`models::AnalysisResult`] ([`normalize::builder::build`]).
//! 5. Render the requested report ([`report`]).
//! 6. Exit `0`, `1` (overall level at or above `--fail-on`), or `2` (transport failure).

mod cli;
mod client;
mod config;
mod models;
mod normalize;
mod report;

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use cli::{Cli, Command, ReportFormat};
use client::{AnalysisClient, AnalysisRequest, TransportError};
use config::{load_config, ServiceConfig};
use models::RiskLevel;
use normalize::builder::build;
use normalize::payload::RawPayload;

/// Exit code when no payload could be obtained from the service.
const EXIT_TRANSPORT_FAILURE: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // Load config relative to the working directory
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let mut config = load_config(&cwd, cli.config.as_deref())?;

    if let Some(api_url) = &cli.api_url {
        config.service.base_url = api_url.clone();
    }
    let fail_on: Option<RiskLevel> = cli
        .fail_on
        .as_ref()
        .map(Into::into)
        .or(config.policy.fail_on);

    let request = match &cli.command {
        Command::Text { text, file } => {
            AnalysisRequest::Text(read_text(text.as_deref(), file.as_deref())?)
        }
        Command::Url { url } => {
            let parsed = reqwest::Url::parse(url)
                .with_context(|| format!("Invalid URL: {}", url))?;
            AnalysisRequest::Url(parsed.to_string())
        }
    };

    debug!(base_url = %config.service.base_url, "analysis service configured");

    // Single outstanding request; the spinner doubles as the loading indicator.
    let spinner = if !cli.quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(match &request {
            AnalysisRequest::Text(_) => "Analyzing text...",
            AnalysisRequest::Url(_) => "Fetching and analyzing URL...",
        });
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let outcome = fetch(&config.service, &request).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let payload = match outcome {
        Ok(payload) => payload,
        Err(err) => {
            eprintln!("{} {}", "✗".red(), err);
            std::process::exit(EXIT_TRANSPORT_FAILURE);
        }
    };

    let result = build(&payload);

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&result, &config.display, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            report::json::render(&result)?;
        }
    }

    if let Some(threshold) = fail_on {
        if result.overall_risk_level() >= threshold {
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build the client and send one request. Every failure here is a transport failure.
async fn fetch(service: &ServiceConfig, request: &AnalysisRequest) -> Result<RawPayload, TransportError> {
    let client = AnalysisClient::new(service)?;
    client.analyze(request).await
}

/// Resolve the text to analyze from `--file`, the positional argument, or stdin.
fn read_text(text: Option<&str>, file: Option<&Path>) -> Result<String> {
    let content = match (text, file) {
        (_, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (Some(text), None) if text != "-" => text.to_string(),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            buf
        }
    };

    if content.trim().is_empty() {
        bail!("Nothing to analyze: input text is empty");
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text_inline() {
        assert_eq!(
            read_text(Some("Liquidity is tight."), None).unwrap(),
            "Liquidity is tight."
        );
    }

    #[test]
    fn test_read_text_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filing.txt");
        std::fs::write(&path, "The SEC opened an investigation.").unwrap();

        assert_eq!(
            read_text(None, Some(&path)).unwrap(),
            "The SEC opened an investigation."
        );
    }

    #[test]
    fn test_read_text_rejects_blank() {
        assert!(read_text(Some("   \n"), None).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_failure() {
        let service = ServiceConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
            ..Default::default()
        };
        let request = AnalysisRequest::Text("Liquidity is tight.".to_string());

        let err = fetch(&service, &request).await.unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
    }
}
