//! Output reporters for agent-ready scan reports
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors and emoji
//! - `json` - Machine-readable JSON (the report contract)
//! - `markdown` - GitHub-flavored Markdown

mod json;
mod markdown;
mod text;

use crate::i18n::{BuiltinLocalizer, Localizer};
use crate::models::Level;
use crate::report::Report;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Rendering switches shared by the human-readable formats
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Include every check, not only the pillar summaries
    pub verbose: bool,
}

/// Render a report with the built-in string tables
pub fn render(report: &Report, format: OutputFormat, options: RenderOptions) -> Result<String> {
    render_with(&BuiltinLocalizer, report, format, options)
}

/// Render a report using the given localizer for labels and level names
pub fn render_with(
    localizer: &dyn Localizer,
    report: &Report,
    format: OutputFormat,
    options: RenderOptions,
) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(localizer, report, options),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => markdown::render(localizer, report, options),
    }
}

/// `L2` style label, or `-` when no level was reached
fn level_label(level: Option<Level>) -> &'static str {
    level.map_or("-", Level::as_str)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::i18n::Language;
    use crate::models::test_support::fact;
    use crate::models::{Level, Pillar};
    use crate::report::{ReportAssembler, RunMeta};
    use crate::scoring::{evaluate_all, outcome_from_facts};
    use crate::snapshot::SnapshotMeta;
    use chrono::TimeZone;
    use std::path::PathBuf;

    /// Two pillars: docs at L1 with one failed L2 check, test with nothing passing
    pub(crate) fn test_report(language: Language) -> Report {
        let mut missing = fact("docs_contributing", Pillar::Docs, Level::L2, false, false);
        missing.suggestions = Some(vec!["Add a CONTRIBUTING.md".to_string()]);
        let mut readme = fact("readme", Pillar::Docs, Level::L1, true, true);
        readme.matched_files = Some(vec!["README.md".to_string()]);

        let outcomes = vec![
            outcome_from_facts(Pillar::Docs, vec![readme, missing], 3),
            outcome_from_facts(
                Pillar::Test,
                vec![fact("test_dir", Pillar::Test, Level::L1, true, false)],
                2,
            ),
        ];
        let snapshot = SnapshotMeta {
            repo_name: "widgets".to_string(),
            commit_sha: "0123456789abcdef".to_string(),
            root_path: PathBuf::from("/tmp/widgets"),
            is_monorepo: false,
            monorepo_apps: Vec::new(),
        };
        let run = RunMeta {
            profile: "factory_compat".to_string(),
            profile_version: "1.0.0".to_string(),
            language,
            timestamp: chrono::Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap(),
            scan_duration_ms: 17,
        };
        ReportAssembler::new(&BuiltinLocalizer)
            .assemble(&snapshot, &evaluate_all(&outcomes), &outcomes, &run)
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("md").unwrap(),
            OutputFormat::Markdown
        );
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_every_format_renders() {
        let report = test_report(Language::En);
        for format in [
            OutputFormat::Text,
            OutputFormat::Json,
            OutputFormat::Markdown,
        ] {
            let out = render(&report, format, RenderOptions::default()).unwrap();
            assert!(out.contains("widgets"), "{} output lacks repo name", format);
        }
    }
}
