//! JSON reporter
//!
//! Outputs the full Report as pretty-printed JSON.
//! This is the stable contract for machine consumers.

use crate::report::Report;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render report as compact JSON (single line)
#[cfg(test)]
pub fn render_compact(report: &Report) -> Result<String> {
    Ok(serde_json::to_string(report)?)
}
