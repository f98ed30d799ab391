//! GitHub Actions workflow parsing

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeSet;
use tracing::warn;

const WORKFLOW_DIR: &str = ".github/workflows/";

pub(crate) fn is_workflow_path(path: &str) -> bool {
    path.strip_prefix(WORKFLOW_DIR).is_some_and(|name| {
        !name.contains('/') && (name.ends_with(".yml") || name.ends_with(".yaml"))
    })
}

/// Trigger events and action references of one workflow file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub path: String,
    /// Event names from the `on:` section
    pub triggers: BTreeSet<String>,
    /// Every `uses:` reference, verbatim (`actions/checkout@v4`)
    pub uses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl Workflow {
    pub fn parse(path: &str, content: &str) -> Self {
        let mut workflow = Workflow {
            path: path.to_string(),
            triggers: BTreeSet::new(),
            uses: Vec::new(),
            parse_error: None,
        };

        let doc: Value = match serde_yaml::from_str(content) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Failed to parse workflow {}: {}", path, e);
                workflow.parse_error = Some(e.to_string());
                return workflow;
            }
        };

        // YAML 1.1 readers turn a bare `on` key into `true`
        let on = doc.get("on").or_else(|| doc.get(Value::Bool(true)));
        if let Some(on) = on {
            workflow.triggers = trigger_names(on);
        }

        if let Some(jobs) = doc.get("jobs").and_then(Value::as_mapping) {
            for job in jobs.values() {
                if let Some(uses) = job.get("uses").and_then(Value::as_str) {
                    workflow.uses.push(uses.to_string());
                }
                let steps = job.get("steps").and_then(Value::as_sequence);
                for step in steps.into_iter().flatten() {
                    if let Some(uses) = step.get("uses").and_then(Value::as_str) {
                        workflow.uses.push(uses.to_string());
                    }
                }
            }
        }

        workflow
    }

    pub fn triggers_on(&self, event: &str) -> bool {
        self.triggers.contains(event)
    }

    /// Whether any `uses:` names the action, ignoring `@ref` and case
    pub fn uses_action(&self, action: &str) -> bool {
        let wanted = strip_ref(action).to_lowercase();
        self.uses
            .iter()
            .any(|u| strip_ref(u).to_lowercase() == wanted)
    }
}

fn strip_ref(reference: &str) -> &str {
    reference
        .split_once('@')
        .map_or(reference, |(name, _)| name)
        .trim()
}

/// `on: push`, `on: [push, pull_request]` or `on: { push: {...} }`
fn trigger_names(on: &Value) -> BTreeSet<String> {
    match on {
        Value::String(event) => std::iter::once(event.clone()).collect(),
        Value::Sequence(events) => events
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::Mapping(events) => events
            .keys()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => BTreeSet::new(),
    }
}
