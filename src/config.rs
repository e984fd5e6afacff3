//! Optional TOML configuration.
//!
//! ```toml
//! template = "templates/stats.html"
//! since = "2013-01-01 00:00:00"
//! chat-pattern = '\[INFO\] <(?P<username>[^>]+)>'
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings that may also be given on the command line; the command line wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Report template (Tera syntax).
    pub template: Option<PathBuf>,
    /// Ignore events before this `YYYY-MM-DD HH:MM:SS` timestamp.
    pub since: Option<String>,
    /// Chat line regex with a `username` capture group.
    pub chat_pattern: Option<String>,
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file.
    ///
    /// A relative `template` path is resolved against the config file's directory.
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config = Self::parse(&content).with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        if let (Some(template), Some(parent)) = (config.template.as_mut(), config_path.parent()) {
            if template.is_relative() {
                *template = parent.join(&*template);
            }
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
