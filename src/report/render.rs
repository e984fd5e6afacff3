//! Report rendering through Tera templates.

use anyhow::Context as _;
use std::path::Path;
use tera::{Context, Tera};

use super::view::{ServerSummary, user_rows};
use crate::analyzer::{ServerStat, UserStat};

/// Built-in HTML report.
pub const DEFAULT_HTML_TEMPLATE: &str = include_str!("template.html");

/// Registered name; the `.html` suffix turns on Tera's autoescaping.
const TEMPLATE_NAME: &str = "report.html";

pub struct ReportRenderer {
    template_engine: Tera,
}

impl ReportRenderer {
    /// Renderer using the built-in template.
    pub fn new() -> anyhow::Result<Self> {
        Self::from_source(DEFAULT_HTML_TEMPLATE)
    }

    /// Renderer using a template file from disk.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path).with_context(|| format!("Unable to find template file {}", path.display()))?;
        Self::from_source(&source).with_context(|| format!("Invalid template {}", path.display()))
    }

    pub fn from_source(source: &str) -> anyhow::Result<Self> {
        let mut template_engine = Tera::default();
        template_engine.add_raw_template(TEMPLATE_NAME, source)?;
        Ok(Self { template_engine })
    }

    /// Render the report.
    ///
    /// # Parameters
    ///
    /// * `users` - Finalized users, already in display order
    /// * `server` - Finalized server summary
    /// * `last_update` - Generation time shown in the report
    pub fn render(&self, users: &[UserStat], server: &ServerStat, last_update: &str) -> anyhow::Result<String> {
        let mut context = Context::new();
        context.insert("users", &user_rows(users));
        context.insert("server", &ServerSummary::from(server));
        context.insert("last_update", last_update);

        self.template_engine.render(TEMPLATE_NAME, &context).context("Failed to render report")
    }
}
