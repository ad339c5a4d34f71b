//! Command-line interface definitions.

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;
use log::LevelFilter;
use sentiment_core::AnalysisKind;

/// Analyze the sentiment of text, web pages and hashtags.
///
/// The service base URL defaults to the hosted SentimentScope API and can be
/// overridden with the `SENTIMENT_API_URL` environment variable or `--api-url`.
#[derive(Debug, Parser)]
#[command(name = "sentiment", version)]
pub struct Cli {
    /// What kind of input to analyze.
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Input to analyze. When omitted, every line read from stdin is submitted
    /// and the newest submission wins.
    pub input: Option<String>,

    /// Base URL of the analysis service.
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Total attempts per request when the service is unavailable.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: Option<u32>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogArg::File)]
    pub log: LogArg,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn analysis_kind(&self) -> AnalysisKind {
        self.kind.into()
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Text,
    Url,
    Hashtag,
}

impl From<KindArg> for AnalysisKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Text => AnalysisKind::Text,
            KindArg::Url => AnalysisKind::Url,
            KindArg::Hashtag => AnalysisKind::Hashtag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    File,
    Terminal,
    Both,
    Off,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
            LogArg::Off => LogDestination::Off,
        }
    }
}
