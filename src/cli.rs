use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::RiskLevel;

#[derive(Parser, Debug)]
#[command(
    name = "risk-radar",
    about = "Submit text or URLs to a financial risk analysis service and render the assessment",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file [default: ./.risk-radar/config.toml, fallback ~/.config/risk-radar/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the analysis service (overrides config)
    #[arg(long, global = true, env = "RISK_RADAR_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Report format
    #[arg(long, global = true, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Exit with code 1 when the overall risk level is at or above this
    #[arg(long, global = true, value_name = "LEVEL")]
    pub fail_on: Option<LevelArg>,

    /// Show every instance, entity and link (no truncation)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print a one-line summary
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a piece of text (argument, file, or stdin)
    Text {
        /// Text to analyze; omit or pass "-" to read stdin
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Fetch and analyze the content behind a URL
    Url {
        /// Page to analyze
        url: String,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum LevelArg {
    Low,
    Medium,
    High,
}

impl From<&LevelArg> for RiskLevel {
    fn from(arg: &LevelArg) -> Self {
        match arg {
            LevelArg::Low => RiskLevel::Low,
            LevelArg::Medium => RiskLevel::Medium,
            LevelArg::High => RiskLevel::High,
        }
    }
}
