//! CI workflow predicates

use super::{CheckError, Evidence};
use crate::snapshot::{RepoSnapshot, Workflow};

fn matching_workflows(snapshot: &RepoSnapshot, predicate: impl Fn(&Workflow) -> bool) -> Evidence {
    let workflows = snapshot.workflows();
    let matched: Vec<String> = workflows
        .iter()
        .filter(|wf| predicate(wf))
        .map(|wf| wf.path.clone())
        .collect();

    let evidence = if matched.is_empty() {
        Evidence::fail()
    } else {
        Evidence::pass(matched)
    };
    evidence.with_detail("workflows_scanned", workflows.len())
}

pub(super) fn workflow_event(snapshot: &RepoSnapshot, event: &str) -> Result<Evidence, CheckError> {
    let event = event.trim();
    if event.is_empty() {
        return Err(CheckError::EmptyParameter("event"));
    }
    Ok(matching_workflows(snapshot, |wf| wf.triggers_on(event)))
}

pub(super) fn action_present(
    snapshot: &RepoSnapshot,
    action: &str,
) -> Result<Evidence, CheckError> {
    if action.trim().is_empty() {
        return Err(CheckError::EmptyParameter("action"));
    }
    Ok(matching_workflows(snapshot, |wf| wf.uses_action(action)))
}
