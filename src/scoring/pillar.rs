//! Per-pillar evaluation

use super::{highest_satisfied, meets_pass_rate};
use crate::checks;
use crate::models::{percent, CheckResult, Level, Pillar};
use crate::rubric::CheckDefinition;
use crate::snapshot::RepoSnapshot;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Maximum recommendations attached to one pillar
const MAX_RECOMMENDATIONS: usize = 3;

/// Result of evaluating one pillar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarOutcome {
    pub pillar: Pillar,
    pub name: String,
    pub name_zh: String,
    pub icon: String,
    /// `null` when the pillar does not reach L1
    pub level_achieved: Option<Level>,
    pub score: u8,
    pub checks_passed: usize,
    pub checks_total: usize,
    pub checks: Vec<CheckResult>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub execution_time_ms: u64,
}

/// Evaluate every check of one pillar against the snapshot.
///
/// Checks run on the current rayon pool; facts keep rubric order.
pub fn evaluate_pillar(
    pillar: Pillar,
    definitions: &[&CheckDefinition],
    snapshot: &RepoSnapshot,
) -> PillarOutcome {
    let start = Instant::now();
    let facts: Vec<CheckResult> = definitions
        .par_iter()
        .map(|check| checks::evaluate(check, snapshot))
        .collect();

    let outcome = outcome_from_facts(pillar, facts, start.elapsed().as_millis() as u64);
    debug!(
        "Pillar {}: {}/{} passed, score {}, level {:?}",
        pillar, outcome.checks_passed, outcome.checks_total, outcome.score, outcome.level_achieved
    );
    outcome
}

/// Score, gate and annotate an already evaluated set of facts
pub fn outcome_from_facts(
    pillar: Pillar,
    facts: Vec<CheckResult>,
    execution_time_ms: u64,
) -> PillarOutcome {
    let info = pillar.info();
    let total = facts.len();
    let passed = facts.iter().filter(|f| f.passed).count();

    PillarOutcome {
        pillar,
        name: info.name.to_string(),
        name_zh: info.name_zh.to_string(),
        icon: info.icon.to_string(),
        level_achieved: gate_pillar_level(&facts),
        score: percent(passed, total),
        checks_passed: passed,
        checks_total: total,
        insights: insights(info.icon, info.name, &facts),
        recommendations: recommendations(&facts),
        checks: facts,
        execution_time_ms,
    }
}

/// Highest level whose facts, and every lower level's facts, pass the gate
pub fn gate_pillar_level(facts: &[CheckResult]) -> Option<Level> {
    if facts.is_empty() {
        return None;
    }
    highest_satisfied(|level| level_satisfied(facts, level))
}

fn level_satisfied(facts: &[CheckResult], level: Level) -> bool {
    let at_level: Vec<&CheckResult> = facts.iter().filter(|f| f.level == level).collect();
    if at_level.is_empty() {
        return true;
    }
    let passed = at_level.iter().filter(|f| f.passed).count();
    let required_failed = at_level.iter().any(|f| f.required && !f.passed);
    meets_pass_rate(passed, at_level.len()) && !required_failed
}

fn insights(icon: &str, name: &str, facts: &[CheckResult]) -> Vec<String> {
    let total = facts.len();
    let passed = facts.iter().filter(|f| f.passed).count();

    let summary = if passed == total {
        format!("{} {}: All {} checks passed", icon, name, total)
    } else {
        format!("{} {}: {}/{} checks passed", icon, name, passed, total)
    };
    let mut insights = vec![summary];

    let required_failed = facts.iter().filter(|f| f.required && !f.passed).count();
    if required_failed > 0 {
        insights.push(format!("⚠️ {} required checks failed", required_failed));
    }
    insights
}

fn recommendations(facts: &[CheckResult]) -> Vec<String> {
    let mut failed: Vec<&CheckResult> = facts.iter().filter(|f| !f.passed).collect();
    // Stable: ties keep rubric order
    failed.sort_by_key(|f| (!f.required, f.level));

    failed
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|f| match f.first_suggestion() {
            Some(suggestion) => suggestion.to_string(),
            None => format!("Fix: {}", f.check_name),
        })
        .collect()
}
