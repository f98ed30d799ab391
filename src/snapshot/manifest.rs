//! Package manifest and Makefile parsing
//!
//! Only the parts the checks care about are extracted: script names,
//! dependency names and workspace declarations. Manifests that fail to parse
//! are skipped with a warning rather than failing the snapshot.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::warn;

/// Supported manifest formats, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestKind {
    Npm,
    Cargo,
    Pyproject,
}

impl ManifestKind {
    pub const ALL: [ManifestKind; 3] = [
        ManifestKind::Npm,
        ManifestKind::Cargo,
        ManifestKind::Pyproject,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ManifestKind::Npm => "package.json",
            ManifestKind::Cargo => "Cargo.toml",
            ManifestKind::Pyproject => "pyproject.toml",
        }
    }
}

/// The subset of a package manifest used by checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub kind: ManifestKind,
    pub name: Option<String>,
    /// Script name to command line (`package.json` only)
    pub scripts: BTreeMap<String, String>,
    pub dependencies: BTreeSet<String>,
    pub dev_dependencies: BTreeSet<String>,
    /// Declares workspaces / workspace members
    pub is_workspace: bool,
    pub workspace_members: Vec<String>,
}

impl PackageManifest {
    pub fn parse(kind: ManifestKind, content: &str) -> Option<Self> {
        let parsed = match kind {
            ManifestKind::Npm => parse_package_json(content).map_err(|e| e.to_string()),
            ManifestKind::Cargo => parse_cargo_toml(content).map_err(|e| e.to_string()),
            ManifestKind::Pyproject => parse_pyproject(content).map_err(|e| e.to_string()),
        };
        match parsed {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!("Ignoring unparseable {}: {}", kind.file_name(), e);
                None
            }
        }
    }

    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }

    /// Whether a package appears in either dependency table
    pub fn declares(&self, package: &str) -> bool {
        self.dependencies.contains(package) || self.dev_dependencies.contains(package)
    }
}

fn parse_package_json(content: &str) -> Result<PackageManifest, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    let keys = |field: &str| -> BTreeSet<String> {
        value
            .get(field)
            .and_then(|v| v.as_object())
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    };

    let scripts = value
        .get("scripts")
        .and_then(|v| v.as_object())
        .map(|m| {
            m.iter()
                .map(|(k, v)| (k.clone(), v.as_str().unwrap_or_default().to_string()))
                .collect()
        })
        .unwrap_or_default();

    // "workspaces": [..] or "workspaces": { "packages": [..] }
    let workspaces = value.get("workspaces");
    let members: Vec<String> = workspaces
        .and_then(|w| {
            w.as_array()
                .or_else(|| w.get("packages").and_then(|p| p.as_array()))
        })
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(PackageManifest {
        kind: ManifestKind::Npm,
        name: value
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        scripts,
        dependencies: keys("dependencies"),
        dev_dependencies: keys("devDependencies"),
        is_workspace: workspaces.is_some(),
        workspace_members: members,
    })
}

fn toml_table_keys(value: Option<&toml::Value>) -> BTreeSet<String> {
    value
        .and_then(|v| v.as_table())
        .map(|t| t.keys().cloned().collect())
        .unwrap_or_default()
}

fn parse_cargo_toml(content: &str) -> Result<PackageManifest, toml::de::Error> {
    let value: toml::Value = toml::from_str(content)?;

    let mut dependencies = toml_table_keys(value.get("dependencies"));
    let workspace = value.get("workspace");
    dependencies.extend(toml_table_keys(
        workspace.and_then(|w| w.get("dependencies")),
    ));
    let members = workspace
        .and_then(|w| w.get("members"))
        .and_then(|m| m.as_array())
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(PackageManifest {
        kind: ManifestKind::Cargo,
        name: value
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(str::to_string),
        scripts: BTreeMap::new(),
        dependencies,
        dev_dependencies: toml_table_keys(value.get("dev-dependencies")),
        is_workspace: workspace.is_some(),
        workspace_members: members,
    })
}

/// Package name from a PEP 508 requirement (`requests>=2; python_version>"3"`)
fn requirement_name(requirement: &str) -> Option<String> {
    let name: String = requirement
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    (!name.is_empty()).then(|| name.to_lowercase())
}

fn requirement_list(value: Option<&toml::Value>) -> impl Iterator<Item = String> + '_ {
    value
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str().and_then(requirement_name))
}

fn parse_pyproject(content: &str) -> Result<PackageManifest, toml::de::Error> {
    let value: toml::Value = toml::from_str(content)?;
    let project = value.get("project");
    let poetry = value.get("tool").and_then(|t| t.get("poetry"));

    let mut dependencies: BTreeSet<String> =
        requirement_list(project.and_then(|p| p.get("dependencies"))).collect();
    dependencies.extend(
        toml_table_keys(poetry.and_then(|p| p.get("dependencies")))
            .into_iter()
            .filter(|name| name != "python")
            .map(|name| name.to_lowercase()),
    );

    let mut dev_dependencies = BTreeSet::new();
    if let Some(groups) = project
        .and_then(|p| p.get("optional-dependencies"))
        .and_then(|o| o.as_table())
    {
        for group in groups.values() {
            dev_dependencies.extend(requirement_list(Some(group)));
        }
    }
    if let Some(groups) = value.get("dependency-groups").and_then(|g| g.as_table()) {
        for group in groups.values() {
            dev_dependencies.extend(requirement_list(Some(group)));
        }
    }
    let poetry_dev = poetry.and_then(|p| p.get("dev-dependencies"));
    let poetry_group_dev = poetry
        .and_then(|p| p.get("group"))
        .and_then(|g| g.get("dev"))
        .and_then(|d| d.get("dependencies"));
    for table in [poetry_dev, poetry_group_dev] {
        dev_dependencies.extend(toml_table_keys(table).into_iter().map(|n| n.to_lowercase()));
    }

    Ok(PackageManifest {
        kind: ManifestKind::Pyproject,
        name: project
            .or(poetry)
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(str::to_string),
        scripts: BTreeMap::new(),
        dependencies,
        dev_dependencies,
        is_workspace: false,
        workspace_members: Vec::new(),
    })
}

static MAKE_TARGET: OnceLock<Regex> = OnceLock::new();

fn make_target_regex() -> &'static Regex {
    MAKE_TARGET.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9_.\-]*(?:\s+[A-Za-z0-9_][A-Za-z0-9_.\-]*)*)\s*::?(?:[^=]|$)")
            .expect("valid regex")
    })
}

/// Target names declared at column 0 of a Makefile.
///
/// Special targets (`.PHONY`) and variable assignments (`CC := gcc`) are not
/// targets.
pub fn make_targets(content: &str) -> BTreeSet<String> {
    let re = make_target_regex();
    content
        .lines()
        .filter(|line| !line.starts_with('\t'))
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| caps.get(1))
        .flat_map(|m| {
            m.as_str()
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}
