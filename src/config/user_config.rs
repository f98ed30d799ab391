//! User-level configuration for agent-ready
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/agent-ready/config.toml

use super::project_config::{ProfilesConfig, ScanDefaults};
use crate::i18n::Language;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Overrides the profile name
pub const ENV_PROFILE: &str = "AGENT_READY_PROFILE";
/// Overrides the report language
pub const ENV_LANGUAGE: &str = "AGENT_READY_LANG";

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
pub struct UserConfig {
    #[serde(default)]
    pub scan: ScanDefaults,

    #[serde(default)]
    pub profiles: ProfilesConfig,
}

impl UserConfig {
    /// Load `~/.config/agent-ready/config.toml`, defaults when absent.
    ///
    /// A file that exists but fails to parse is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::user_config_path().filter(|p| p.exists()) else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => {
                debug!("Loaded user config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("agent-ready").join("config.toml"))
    }
}

/// Values taken from `AGENT_READY_*` environment variables
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnvOverrides {
    pub profile: Option<String>,
    pub language: Option<Language>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let language = get(ENV_LANGUAGE).and_then(|raw| match raw.parse::<Language>() {
            Ok(lang) => Some(lang),
            Err(e) => {
                warn!("Ignoring {}: {}", ENV_LANGUAGE, e);
                None
            }
        });

        Self {
            profile: get(ENV_PROFILE),
            language,
        }
    }
}
