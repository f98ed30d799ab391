//! Profiles command - list rubric profiles or print one

use agent_ready::config::{
    load_project_config, CliOverrides, EnvOverrides, ScanSettings, UserConfig,
};
use agent_ready::rubric::ProfileLoader;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub(super) fn run(path: &Path, show: Option<&str>) -> Result<()> {
    let settings = ScanSettings::resolve(
        path,
        &UserConfig::load(),
        &load_project_config(path),
        &CliOverrides::default(),
        &EnvOverrides::default(),
    );
    let loader = ProfileLoader::new().with_dirs(settings.profile_dirs);

    if let Some(name) = show {
        let profile = loader.load(name)?;
        let json = serde_json::to_string_pretty(&profile)
            .with_context(|| format!("Failed to serialize profile '{}'", name))?;
        println!("{}", json);
        return Ok(());
    }

    for name in loader.list() {
        match loader.load(&name) {
            Ok(profile) => println!(
                "{:<24} {:<10} {} checks",
                style(&name).bold(),
                profile.version,
                profile.checks.len()
            ),
            Err(e) => println!("{:<24} {}", name, style(format!("invalid: {}", e)).red()),
        }
    }
    Ok(())
}
