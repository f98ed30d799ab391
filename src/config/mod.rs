//! Configuration module for agent-ready
//!
//! This module handles:
//! - Project-level configuration (agent-ready.toml)
//! - User-level configuration (~/.config/agent-ready/config.toml)
//! - Environment overrides
//! - Resolving all of the above into the settings for one scan

mod project_config;
mod user_config;

pub use project_config::{
    load_project_config, ExcludeConfig, ProfilesConfig, ProjectConfig, ScanDefaults,
    PROJECT_CONFIG_FILE,
};
pub use user_config::{EnvOverrides, UserConfig, ENV_LANGUAGE, ENV_PROFILE};

use crate::i18n::Language;
use crate::rubric::DEFAULT_PROFILE;
use std::path::{Path, PathBuf};

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub profile: Option<String>,
    pub language: Option<Language>,
    pub workers: Option<usize>,
}

/// Fully resolved settings for one scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    pub profile: String,
    pub language: Language,
    /// `None` means one worker per available core
    pub workers: Option<usize>,
    pub exclude: Vec<String>,
    pub skip_default_excludes: bool,
    /// Project directories first, then user directories
    pub profile_dirs: Vec<PathBuf>,
}

impl ScanSettings {
    /// Merge every source with precedence env > CLI > project > user > defaults.
    ///
    /// Environment variables win even over explicit flags. `workers` has no
    /// environment source.
    ///
    /// Relative profile directories from the project config resolve against
    /// `repo_path`.
    pub fn resolve(
        repo_path: &Path,
        user: &UserConfig,
        project: &ProjectConfig,
        cli: &CliOverrides,
        env: &EnvOverrides,
    ) -> Self {
        let profile = env
            .profile
            .clone()
            .or_else(|| cli.profile.clone())
            .or_else(|| project.scan.profile.clone())
            .or_else(|| user.scan.profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let language = env
            .language
            .or(cli.language)
            .or(project.scan.language)
            .or(user.scan.language)
            .unwrap_or_default();

        let workers = cli.workers.or(project.scan.workers).or(user.scan.workers);

        let mut profile_dirs = project.profile_dirs(repo_path);
        for dir in &user.profiles.dirs {
            if !profile_dirs.contains(dir) {
                profile_dirs.push(dir.clone());
            }
        }

        Self {
            profile,
            language,
            workers,
            exclude: project.exclude.paths.clone(),
            skip_default_excludes: project.exclude.skip_defaults,
            profile_dirs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(toml_str: &str) -> ProjectConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let settings = ScanSettings::resolve(
            Path::new("/repo"),
            &UserConfig::default(),
            &ProjectConfig::default(),
            &CliOverrides::default(),
            &EnvOverrides::default(),
        );
        assert_eq!(settings.profile, DEFAULT_PROFILE);
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.workers, None);
        assert!(settings.exclude.is_empty());
        assert!(!settings.skip_default_excludes);
        assert!(settings.profile_dirs.is_empty());
    }

    #[test]
    fn test_precedence_chain() {
        let user: UserConfig = toml::from_str(
            r#"
[scan]
profile = "user_profile"
language = "zh"
workers = 2
"#,
        )
        .unwrap();
        let proj = project(
            r#"
[scan]
profile = "project_profile"
workers = 4
"#,
        );

        // Project beats user for profile and workers; language falls through to user
        let settings = ScanSettings::resolve(
            Path::new("/repo"),
            &user,
            &proj,
            &CliOverrides::default(),
            &EnvOverrides::default(),
        );
        assert_eq!(settings.profile, "project_profile");
        assert_eq!(settings.language, Language::Zh);
        assert_eq!(settings.workers, Some(4));

        // CLI beats project
        let cli = CliOverrides {
            profile: Some("cli_profile".to_string()),
            language: Some(Language::En),
            workers: Some(8),
        };
        let settings = ScanSettings::resolve(
            Path::new("/repo"),
            &user,
            &proj,
            &cli,
            &EnvOverrides::default(),
        );
        assert_eq!(settings.profile, "cli_profile");
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.workers, Some(8));

        // Environment beats everything
        let env = EnvOverrides {
            profile: Some("env_profile".to_string()),
            language: Some(Language::Zh),
        };
        let settings = ScanSettings::resolve(Path::new("/repo"), &user, &proj, &cli, &env);
        assert_eq!(settings.profile, "env_profile");
        assert_eq!(settings.language, Language::Zh);
        assert_eq!(settings.workers, Some(8));
    }

    #[test]
    fn test_profile_dirs_project_first() {
        let user: UserConfig = toml::from_str(
            r#"
[profiles]
dirs = ["/home/me/rubrics", "/repo/rubrics"]
"#,
        )
        .unwrap();
        let proj = project(
            r#"
[profiles]
dirs = ["rubrics"]

[exclude]
paths = ["generated/**"]
skip_defaults = true
"#,
        );
        let settings = ScanSettings::resolve(
            Path::new("/repo"),
            &user,
            &proj,
            &CliOverrides::default(),
            &EnvOverrides::default(),
        );
        assert_eq!(
            settings.profile_dirs,
            vec![PathBuf::from("/repo/rubrics"), PathBuf::from("/home/me/rubrics")]
        );
        assert_eq!(settings.exclude, vec!["generated/**".to_string()]);
        assert!(settings.skip_default_excludes);
    }
}
