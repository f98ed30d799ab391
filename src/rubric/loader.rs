//! Profile loading
//!
//! Resolves a profile name to a [`Profile`]. Directories configured by the
//! user are searched first (`<name>.yaml`, then `<name>.yml`), then the
//! profiles compiled into the binary.

use super::{CheckDefinition, CheckKind, Profile};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Profile used when none is requested
pub const DEFAULT_PROFILE: &str = "factory_compat";

/// Profiles embedded at compile time: (name, yaml source)
pub const BUILTIN_PROFILES: &[(&str, &str)] = &[(
    "factory_compat",
    include_str!("../../profiles/factory_compat.yaml"),
)];

/// Errors raised while resolving a profile
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profile '{name}' not found. Available profiles: {available}")]
    NotFound { name: String, available: String },

    #[error("Failed to parse profile {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to read profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Profile '{0}' defines no checks")]
    Empty(String),
}

/// Resolves profile names against search directories and built-ins
#[derive(Debug, Clone, Default)]
pub struct ProfileLoader {
    dirs: Vec<PathBuf>,
}

impl ProfileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory searched before the built-in profiles
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    pub fn with_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.dirs.extend(dirs);
        self
    }

    /// Load a profile by name
    pub fn load(&self, name: &str) -> Result<Profile, ProfileError> {
        for dir in &self.dirs {
            for ext in ["yaml", "yml"] {
                let candidate = dir.join(format!("{}.{}", name, ext));
                if candidate.is_file() {
                    debug!("Loading profile '{}' from {}", name, candidate.display());
                    return load_profile_file(&candidate);
                }
            }
        }

        if let Some((_, source)) = BUILTIN_PROFILES.iter().find(|(n, _)| *n == name) {
            debug!("Loading built-in profile '{}'", name);
            return parse_profile(source, &format!("<builtin:{}>", name));
        }

        Err(ProfileError::NotFound {
            name: name.to_string(),
            available: self.list().join(", "),
        })
    }

    /// Names of every resolvable profile, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = BUILTIN_PROFILES
            .iter()
            .map(|(n, _)| n.to_string())
            .collect();

        for dir in &self.dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                let is_yaml = matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml")
                );
                if is_yaml {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.insert(stem.to_string());
                    }
                }
            }
        }

        names.into_iter().collect()
    }
}

/// Load a profile from an explicit file path
pub fn load_profile_file(path: &Path) -> Result<Profile, ProfileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_profile(&content, &path.display().to_string())
}

fn parse_profile(source: &str, origin: &str) -> Result<Profile, ProfileError> {
    let profile: Profile = serde_yaml::from_str(source).map_err(|source| ProfileError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    if profile.checks.is_empty() {
        return Err(ProfileError::Empty(profile.name));
    }

    let mut seen = HashSet::new();
    for check in &profile.checks {
        warn_duplicates(check, &mut seen);
    }

    Ok(profile)
}

fn warn_duplicates<'a>(check: &'a CheckDefinition, seen: &mut HashSet<&'a str>) {
    if !seen.insert(check.id.as_str()) {
        warn!("Duplicate check id '{}' in profile", check.id);
    }
    if let CheckKind::AnyOf { checks } = &check.kind {
        for nested in checks {
            warn_duplicates(nested, seen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, Pillar};

    #[test]
    fn test_builtin_profile_loads() {
        let profile = ProfileLoader::new().load(DEFAULT_PROFILE).unwrap();
        assert_eq!(profile.name, "factory_compat");
        assert!(!profile.version.is_empty());

        // Every pillar is covered and L1 carries required checks
        for pillar in Pillar::ALL {
            assert!(
                !profile.checks_for(pillar).is_empty(),
                "pillar {} has no checks",
                pillar
            );
        }
        assert!(profile
            .checks
            .iter()
            .any(|c| c.required && c.level == Level::L1));
    }

    #[test]
    fn test_builtin_profile_uses_every_kind() {
        let profile = ProfileLoader::new().load(DEFAULT_PROFILE).unwrap();
        let kinds: BTreeSet<&str> = profile.checks.iter().map(|c| c.kind.type_name()).collect();
        for kind in [
            "file_exists",
            "path_glob",
            "any_of",
            "github_workflow_event",
            "github_action_present",
            "build_command_detect",
            "dependency_detect",
        ] {
            assert!(kinds.contains(kind), "missing kind {}", kind);
        }
    }

    #[test]
    fn test_unknown_profile() {
        let err = ProfileLoader::new().load("nope").unwrap_err();
        assert!(matches!(err, ProfileError::NotFound { .. }));
        assert!(err.to_string().contains("factory_compat"));
    }

    #[test]
    fn test_directory_profile_shadows_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("factory_compat.yml"),
            r#"
name: factory_compat
version: "9.9.9"
checks:
  - id: docs.readme
    name: README
    type: file_exists
    pillar: docs
    level: L1
    path: README.md
"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("strict.yaml"),
            "name: strict\nversion: \"1\"\nchecks: []\n",
        )
        .unwrap();

        let loader = ProfileLoader::new().with_dir(dir.path());
        let profile = loader.load("factory_compat").unwrap();
        assert_eq!(profile.version, "9.9.9");
        assert_eq!(profile.checks.len(), 1);

        assert_eq!(
            loader.list(),
            vec!["factory_compat".to_string(), "strict".to_string()]
        );
        assert!(matches!(loader.load("strict"), Err(ProfileError::Empty(_))));
    }

    #[test]
    fn test_malformed_profile() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.yaml"), "name: [unclosed").unwrap();
        let err = ProfileLoader::new()
            .with_dir(dir.path())
            .load("bad")
            .unwrap_err();
        assert!(matches!(err, ProfileError::Parse { .. }));
    }
}
