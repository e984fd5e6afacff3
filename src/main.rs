use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use env_logger::Builder;
use log::{LevelFilter, info};
use std::path::{Path, PathBuf};

use crate::analyzer::{LineClassifier, LogLoader, TIMESTAMP_FORMAT, analyze, parse_datetime};
use crate::config::AnalyzerConfig;
use crate::report::ReportRenderer;

mod analyzer;
mod config;
mod report;

/// Analyzes a Minecraft server log and generates player statistics.
#[derive(Debug, Parser)]
#[command(name = "mclog-analyzer", version)]
struct Cli {
    /// The template to generate the output file (Tera syntax)
    #[arg(short, long, value_name = "TEMPLATE")]
    template: Option<PathBuf>,

    /// Ignore the log before this date, format: year-month-day hour:minute:second
    #[arg(long, value_name = "DATETIME")]
    since: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// More diagnostics (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// The server log file
    #[arg(value_name = "LOGFILE")]
    log: PathBuf,

    /// The output file
    #[arg(value_name = "OUTPUTFILE")]
    output: PathBuf,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Error,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging setup; RUST_LOG overrides these defaults.
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter(Some("mclog_analyzer"), cli.log_level())
        .parse_default_env()
        .init();

    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };

    let since = match cli.since.as_deref().or(config.since.as_deref()) {
        Some(value) => match parse_datetime(value) {
            Some(since) => Some(since),
            None => bail!("Invalid datetime format! The format must be year-month-day hour:minute:second ."),
        },
        None => None,
    };

    let classifier = match &config.chat_pattern {
        Some(pattern) => LineClassifier::with_chat_pattern(pattern)?,
        None => LineClassifier::default(),
    };

    // Load the template before the log so a bad template fails fast.
    let renderer = match cli.template.as_ref().or(config.template.as_ref()) {
        Some(path) => ReportRenderer::from_file(path)?,
        None => ReportRenderer::new()?,
    };

    info!("Analyzing {}", cli.log.display());
    let mut loader = LogLoader::open(&cli.log).with_context(|| format!("Unable to open log file {}", cli.log.display()))?;
    let (users, server) =
        analyze(&mut loader, classifier, since).with_context(|| format!("Failed to read log file {}", cli.log.display()))?;

    let last_update = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    let html = renderer.render(&users, &server, &last_update)?;
    write_output(&cli.output, &html)?;

    info!("Wrote statistics for {} players to {}", users.len(), cli.output.display());
    Ok(())
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content).with_context(|| format!("Unable to write output file {}", path.display()))
}
