//! `any_of` combinator

use super::{evaluate, CheckError, Evidence};
use crate::rubric::CheckDefinition;
use crate::snapshot::RepoSnapshot;
use serde_json::Value;
use std::collections::HashSet;

/// Passes when at least one nested check passes.
///
/// Every nested check is evaluated, so `details.passed_checks` lists all
/// alternatives that held, not just the first.
pub(super) fn any_of(
    snapshot: &RepoSnapshot,
    checks: &[CheckDefinition],
) -> Result<Evidence, CheckError> {
    if checks.is_empty() {
        return Err(CheckError::EmptyParameter("checks"));
    }

    let mut seen = HashSet::new();
    let mut matched_files = Vec::new();
    let mut passed_checks = Vec::new();

    for nested in checks {
        let fact = evaluate(nested, snapshot);
        if !fact.passed {
            continue;
        }
        passed_checks.push(Value::String(fact.check_id));
        for file in fact.matched_files.unwrap_or_default() {
            if seen.insert(file.clone()) {
                matched_files.push(file);
            }
        }
    }

    let evidence = if passed_checks.is_empty() {
        Evidence::fail()
    } else {
        Evidence::pass(matched_files)
    };
    Ok(evidence.with_detail("passed_checks", passed_checks))
}
