//! Level-gated maturity scoring
//!
//! Facts are scored per pillar, then combined into one verdict.
//!
//! # Scoring Formula
//!
//! ```text
//! score(pillar)   = round(passed / total × 100)        0 when total = 0
//! overall_score   = round(Σ passed / Σ total × 100)
//! tech_debt       = 100 − round(mean pillar score)     0 with no pillars
//! ```
//!
//! # Level Gating
//!
//! Levels are walked from L1 upwards. A pillar satisfies a level when at
//! least 60% of that level's facts pass and every required fact at that
//! level passes; a level with no facts is satisfied. The first unsatisfied
//! level caps the result at the level below it, so a pillar failing L2 is
//! L1 even if it would pass L3.
//!
//! The overall level uses the same walk, where a level is satisfied only
//! when every pillar reached it.
//!
//! # Example
//!
//! Five L1 facts with four passing, including the single required one:
//! 4/5 = 80% ≥ 60% and 1/1 required, so L1 holds.

mod evaluator;
mod insights;
mod pillar;

pub use evaluator::{evaluate_all, Evaluation, PillarSummary};
pub use insights::{
    cross_pillar_insights, CrossPillarInsight, InsightKind, InsightRule, INSIGHT_RULES,
};
pub use pillar::{evaluate_pillar, gate_pillar_level, outcome_from_facts, PillarOutcome};

use crate::models::Level;

/// Pass-rate threshold a level must reach, as a fraction (3/5 = 60%)
pub const PASS_RATE_NUMERATOR: usize = 3;
pub const PASS_RATE_DENOMINATOR: usize = 5;

/// Walk L1..L5 and return the level below the first unsatisfied one.
///
/// `None` when L1 itself is unsatisfied, L5 when every level holds.
pub(crate) fn highest_satisfied(mut satisfied: impl FnMut(Level) -> bool) -> Option<Level> {
    for level in Level::ALL {
        if !satisfied(level) {
            return level.previous();
        }
    }
    Some(Level::L5)
}

/// `passed / total ≥ 0.6` in exact integer arithmetic
pub(crate) fn meets_pass_rate(passed: usize, total: usize) -> bool {
    passed * PASS_RATE_DENOMINATOR >= total * PASS_RATE_NUMERATOR
}
