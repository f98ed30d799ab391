//! Project-level configuration support
//!
//! Loads per-project configuration from `agent-ready.toml` or
//! `.agent-readyrc.json` in the repository root.
//!
//! # Configuration Format
//!
//! ```toml
//! # agent-ready.toml
//!
//! [scan]
//! profile = "factory_compat"
//! language = "en"   # en | zh
//! workers = 8
//!
//! [exclude]
//! paths = ["generated/**"]
//! skip_defaults = false
//!
//! [profiles]
//! dirs = ["rubrics/"]
//! ```

use crate::i18n::Language;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Preferred project config file name
pub const PROJECT_CONFIG_FILE: &str = "agent-ready.toml";
const PROJECT_CONFIG_JSON: &str = ".agent-readyrc.json";

/// Project-level configuration loaded from agent-ready.toml or similar
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ProjectConfig {
    /// Default scan options
    #[serde(default)]
    pub scan: ScanDefaults,

    /// Path exclusion patterns
    #[serde(default)]
    pub exclude: ExcludeConfig,

    /// Extra rubric profile locations
    #[serde(default)]
    pub profiles: ProfilesConfig,
}

/// Scan options that can be set in config files
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ScanDefaults {
    /// Profile name to evaluate
    #[serde(default)]
    pub profile: Option<String>,

    /// Report language
    #[serde(default)]
    pub language: Option<Language>,

    /// Worker threads for check evaluation
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Path exclusion configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ExcludeConfig {
    /// Glob patterns excluded on top of the built-in ones
    #[serde(default)]
    pub paths: Vec<String>,

    /// If true, disable built-in default exclusion patterns
    #[serde(default)]
    pub skip_defaults: bool,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ProfilesConfig {
    /// Directories searched for `<name>.yaml` before the built-in profiles
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
}

impl ProjectConfig {
    /// Profile directories, relative entries resolved against `repo_path`
    pub fn profile_dirs(&self, repo_path: &Path) -> Vec<PathBuf> {
        self.profiles
            .dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    repo_path.join(dir)
                }
            })
            .collect()
    }
}

/// Load project configuration from the repository root.
///
/// Searches for configuration files in this order:
/// 1. `agent-ready.toml`
/// 2. `.agent-readyrc.json`
///
/// Returns default configuration if no config file is found or the file
/// cannot be parsed.
pub fn load_project_config(repo_path: &Path) -> ProjectConfig {
    let toml_path = repo_path.join(PROJECT_CONFIG_FILE);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = repo_path.join(PROJECT_CONFIG_JSON);
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

fn load_json_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = serde_json::from_str(&content)?;
    Ok(config)
}
