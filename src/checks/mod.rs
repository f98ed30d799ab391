//! Predicate engine
//!
//! Turns one [`CheckDefinition`] into one [`CheckResult`] by querying a
//! [`RepoSnapshot`]. Evaluation never touches the filesystem directly and
//! never fails: a malformed definition becomes a failed fact whose
//! `details.error` carries the diagnostic.

mod composite;
mod file;
mod manifest;
mod workflow;

use crate::models::CheckResult;
use crate::rubric::{CheckDefinition, CheckKind};
use crate::snapshot::RepoSnapshot;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Problems with a check definition's parameters
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid content regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("parameter '{0}' must not be empty")]
    EmptyParameter(&'static str),

    #[error("unsupported check type")]
    UnsupportedKind,
}

/// What a predicate found, before it is stamped with the check's identity
#[derive(Debug, Default)]
pub(crate) struct Evidence {
    passed: bool,
    matched_files: Vec<String>,
    details: Map<String, Value>,
}

impl Evidence {
    fn pass(matched_files: Vec<String>) -> Self {
        Self {
            passed: true,
            matched_files,
            details: Map::new(),
        }
    }

    fn fail() -> Self {
        Self::default()
    }

    fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Evaluate a single check against a snapshot.
pub fn evaluate(check: &CheckDefinition, snapshot: &RepoSnapshot) -> CheckResult {
    let evidence = match run(check, snapshot) {
        Ok(evidence) => evidence,
        Err(e) => {
            warn!(
                "Check '{}' ({}) is malformed: {}",
                check.id,
                check.kind.type_name(),
                e
            );
            Evidence::fail().with_detail("error", e.to_string())
        }
    };
    into_result(check, evidence)
}

fn run(check: &CheckDefinition, snapshot: &RepoSnapshot) -> Result<Evidence, CheckError> {
    match &check.kind {
        CheckKind::FileExists {
            path,
            content_regex,
            case_sensitive,
        } => file::file_exists(snapshot, path, content_regex.as_deref(), *case_sensitive),
        CheckKind::PathGlob {
            pattern,
            min_matches,
        } => file::path_glob(snapshot, pattern, *min_matches),
        CheckKind::AnyOf { checks } => composite::any_of(snapshot, checks),
        CheckKind::GithubWorkflowEvent { event } => workflow::workflow_event(snapshot, event),
        CheckKind::GithubActionPresent { action } => workflow::action_present(snapshot, action),
        CheckKind::BuildCommandDetect { commands } => manifest::build_command(snapshot, commands),
        CheckKind::DependencyDetect { packages } => manifest::dependency(snapshot, packages),
        CheckKind::Unsupported => Err(CheckError::UnsupportedKind),
    }
}

fn into_result(check: &CheckDefinition, evidence: Evidence) -> CheckResult {
    let Evidence {
        passed,
        matched_files,
        mut details,
    } = evidence;

    if !passed {
        if let Some(template) = &check.template {
            details.insert("template".to_string(), Value::String(template.clone()));
        }
    }

    CheckResult {
        check_id: check.id.clone(),
        check_name: check.name.clone(),
        pillar: check.pillar,
        level: check.level,
        required: check.required,
        passed,
        matched_files: (!matched_files.is_empty()).then_some(matched_files),
        details: (!details.is_empty()).then_some(details),
        // Suggestions are attached to failed facts only
        suggestions: if passed {
            None
        } else {
            check.suggestions.clone()
        },
    }
}
