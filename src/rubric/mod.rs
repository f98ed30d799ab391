//! Rubric definitions
//!
//! A rubric (profile) is an ordered list of check definitions. Each check
//! belongs to one pillar and one level and carries a tagged predicate kind:
//!
//! ```yaml
//! - id: docs.readme
//!   name: README exists
//!   type: file_exists
//!   pillar: docs
//!   level: L1
//!   required: true
//!   path: README.md
//!   suggestions: ["Add a README.md describing the project"]
//! ```

mod loader;

pub use loader::{ProfileError, ProfileLoader, BUILTIN_PROFILES, DEFAULT_PROFILE};

use crate::models::{Level, Pillar};
use serde::{Deserialize, Serialize};

/// One rubric entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub pillar: Pillar,
    pub level: Level,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: CheckKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    /// Template identifier handed to remediation tooling when the check fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Predicate kind with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckKind {
    /// Path exists, optionally with content matching a regex
    FileExists {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_regex: Option<String>,
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    /// At least `min_matches` indexed paths match a glob
    PathGlob {
        pattern: String,
        #[serde(default = "default_min_matches")]
        min_matches: usize,
    },
    /// Logical OR over nested checks
    AnyOf { checks: Vec<CheckDefinition> },
    /// A CI workflow triggers on the named event
    GithubWorkflowEvent { event: String },
    /// A CI workflow references the named action
    GithubActionPresent { action: String },
    /// The manifest script table or Makefile defines one of the commands
    BuildCommandDetect { commands: Vec<String> },
    /// The manifest declares one of the packages
    DependencyDetect { packages: Vec<String> },
    /// Any `type` this build does not know; evaluates to a failed fact
    #[serde(other)]
    Unsupported,
}

fn default_case_sensitive() -> bool {
    true
}

fn default_min_matches() -> usize {
    1
}

impl CheckKind {
    /// Serialized tag of the kind
    pub fn type_name(&self) -> &'static str {
        match self {
            CheckKind::FileExists { .. } => "file_exists",
            CheckKind::PathGlob { .. } => "path_glob",
            CheckKind::AnyOf { .. } => "any_of",
            CheckKind::GithubWorkflowEvent { .. } => "github_workflow_event",
            CheckKind::GithubActionPresent { .. } => "github_action_present",
            CheckKind::BuildCommandDetect { .. } => "build_command_detect",
            CheckKind::DependencyDetect { .. } => "dependency_detect",
            CheckKind::Unsupported => "unsupported",
        }
    }
}

/// A named, versioned rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub checks: Vec<CheckDefinition>,
}

impl Profile {
    /// Checks belonging to one pillar, in rubric order
    pub fn checks_for(&self, pillar: Pillar) -> Vec<&CheckDefinition> {
        self.checks.iter().filter(|c| c.pillar == pillar).collect()
    }
}
