//! Cross-pillar evaluation

use super::{cross_pillar_insights, highest_satisfied, CrossPillarInsight, PillarOutcome};
use crate::models::{percent, Level, Pillar};
use serde::{Deserialize, Serialize};

/// Pillars listed as strengths or weaknesses
const RANKED_PILLARS: usize = 3;
/// Scores at or above this are strengths, below it weaknesses
const STRENGTH_THRESHOLD: u8 = 70;

/// Ranked pillar reference; display text is produced by the report layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarSummary {
    pub pillar: Pillar,
    pub icon: String,
    pub score: u8,
}

/// One verdict over all pillars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub level: Option<Level>,
    pub overall_score: u8,
    /// Share of facts passing at the next level, 0.0 to 1.0
    pub progress_to_next: f64,
    pub cross_pillar_insights: Vec<CrossPillarInsight>,
    /// Best pillars, highest score first
    pub strengths: Vec<PillarSummary>,
    /// Worst pillars, lowest score first
    pub weaknesses: Vec<PillarSummary>,
    pub tech_debt_score: u8,
}

/// Combine per-pillar outcomes into an [`Evaluation`]
pub fn evaluate_all(outcomes: &[PillarOutcome]) -> Evaluation {
    let passed: usize = outcomes.iter().map(|o| o.checks_passed).sum();
    let total: usize = outcomes.iter().map(|o| o.checks_total).sum();
    let level = overall_level(outcomes);
    let (strengths, weaknesses) = rank_pillars(outcomes);

    Evaluation {
        level,
        overall_score: percent(passed, total),
        progress_to_next: progress_to_next(outcomes, level),
        cross_pillar_insights: cross_pillar_insights(outcomes),
        strengths,
        weaknesses,
        tech_debt_score: tech_debt_score(outcomes),
    }
}

/// Highest level every pillar has reached
fn overall_level(outcomes: &[PillarOutcome]) -> Option<Level> {
    if outcomes.is_empty() {
        return None;
    }
    highest_satisfied(|level| {
        outcomes
            .iter()
            .all(|o| o.level_achieved.is_some_and(|achieved| achieved >= level))
    })
}

fn progress_to_next(outcomes: &[PillarOutcome], current: Option<Level>) -> f64 {
    let next = match current {
        None => Level::L1,
        Some(level) => match level.next() {
            Some(next) => next,
            None => return 1.0,
        },
    };

    let (passed, total) = outcomes
        .iter()
        .flat_map(|o| o.checks.iter())
        .filter(|f| f.level == next)
        .fold((0usize, 0usize), |(p, t), f| {
            (p + usize::from(f.passed), t + 1)
        });

    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64
    }
}

fn rank_pillars(outcomes: &[PillarOutcome]) -> (Vec<PillarSummary>, Vec<PillarSummary>) {
    let mut sorted: Vec<&PillarOutcome> = outcomes.iter().collect();
    // Stable sort, so equal scores keep evaluation order
    sorted.sort_by(|a, b| b.score.cmp(&a.score));

    let summary = |o: &&PillarOutcome| PillarSummary {
        pillar: o.pillar,
        icon: o.icon.clone(),
        score: o.score,
    };

    let strengths = sorted
        .iter()
        .take(RANKED_PILLARS)
        .filter(|o| o.score >= STRENGTH_THRESHOLD)
        .map(summary)
        .collect();

    let weaknesses = sorted
        .iter()
        .rev()
        .take(RANKED_PILLARS)
        .filter(|o| o.score < STRENGTH_THRESHOLD)
        .map(summary)
        .collect();

    (strengths, weaknesses)
}

/// `100 − round(mean score)`, 0 with no pillars
fn tech_debt_score(outcomes: &[PillarOutcome]) -> u8 {
    if outcomes.is_empty() {
        return 0;
    }
    let n = outcomes.len();
    let sum: usize = outcomes.iter().map(|o| o.score as usize).sum();
    let rounded_mean = (2 * sum + n) / (2 * n);
    100u8.saturating_sub(rounded_mean.min(100) as u8)
}
