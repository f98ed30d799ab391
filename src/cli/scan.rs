//! Scan command - evaluate a repository and print the report

use agent_ready::config::{
    load_project_config, CliOverrides, EnvOverrides, ScanSettings, UserConfig,
};
use agent_ready::i18n::Language;
use agent_ready::models::Level;
use agent_ready::pipeline::{ScanRequest, Scanner};
use agent_ready::reporters::{render, OutputFormat, RenderOptions};
use agent_ready::scan::InMemoryScanStore;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub(super) struct ScanArgs {
    pub path: PathBuf,
    pub profile: Option<String>,
    pub format: String,
    pub output_file: Option<PathBuf>,
    pub language: Option<Language>,
    pub target_level: Option<Level>,
    pub verbose: bool,
    pub workers: Option<usize>,
}

pub(super) fn run(args: ScanArgs) -> Result<()> {
    let repo_path = args
        .path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", args.path.display()))?;
    if !repo_path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", repo_path.display());
    }

    let format: OutputFormat = args.format.parse()?;
    let settings = ScanSettings::resolve(
        &repo_path,
        &UserConfig::load(),
        &load_project_config(&repo_path),
        &CliOverrides {
            profile: args.profile,
            language: args.language,
            workers: args.workers,
        },
        &EnvOverrides::from_env(),
    );
    debug!("Resolved scan settings: {:?}", settings);

    let spinner = if format == OutputFormat::Text {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(create_spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Scanning {}...", repo_path.display()));
        spinner
    } else {
        ProgressBar::hidden()
    };

    let progress = spinner.clone();
    let scanner = settings
        .workers
        .map(Scanner::new)
        .unwrap_or_default()
        .with_progress_callback(Box::new(move |pillar, done, total| {
            progress.set_message(format!("Evaluated {} ({}/{})", pillar, done, total));
        }));

    let request = ScanRequest {
        path: repo_path,
        profile: settings.profile,
        language: settings.language,
        exclude: settings.exclude,
        skip_default_excludes: settings.skip_default_excludes,
        profile_dirs: settings.profile_dirs,
    };

    let store = InMemoryScanStore::new();
    let result = scanner.run_tracked(&store, &request);
    spinner.finish_and_clear();
    let (scan_id, report) = result?;
    debug!("Scan {} completed", scan_id);

    let options = RenderOptions {
        verbose: args.verbose,
    };
    let output = render(&report, format, options)?;
    match &args.output_file {
        Some(out_path) => {
            std::fs::write(out_path, &output)
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                style(out_path.display()).cyan()
            );
        }
        None => println!("{}", output),
    }

    if let Some(target) = args.target_level {
        if !meets_target(report.executive_summary.level, target) {
            eprintln!(
                "Repository is at {} but {} was required",
                report
                    .executive_summary
                    .level
                    .map_or("no level", |l| l.as_str()),
                target
            );
            std::process::exit(1);
        }
    }
    Ok(())
}

fn meets_target(achieved: Option<Level>, target: Level) -> bool {
    achieved.is_some_and(|level| level >= target)
}

/// Create spinner progress style
fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_target() {
        assert!(meets_target(Some(Level::L3), Level::L2));
        assert!(meets_target(Some(Level::L2), Level::L2));
        assert!(!meets_target(Some(Level::L1), Level::L2));
        assert!(!meets_target(None, Level::L1));
    }
}
