//! Scan pipeline
//!
//! Orchestrates one scan end to end:
//! 1. Resolve the profile
//! 2. Build the repository snapshot
//! 3. Evaluate every pillar in parallel
//! 4. Combine pillar outcomes into one evaluation
//! 5. Assemble the report

use crate::git::GitHistory;
use crate::i18n::{BuiltinLocalizer, Language, Localizer};
use crate::models::Pillar;
use crate::report::{Report, ReportAssembler, RunMeta};
use crate::rubric::{CheckDefinition, Profile, ProfileError, ProfileLoader};
use crate::scan::{ScanRecord, ScanStatus, ScanStore, StoreError};
use crate::scoring::{evaluate_all, evaluate_pillar, PillarOutcome};
use crate::snapshot::{RepoSnapshot, SnapshotBuilder, SnapshotError};
use chrono::Utc;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Worker count bounds accepted by [`Scanner::new`]
pub const MIN_WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 64;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("Profile '{0}' has no checks to evaluate")]
    EmptyRubric(String),

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Called after each pillar finishes: (pillar, done, total)
pub type ProgressCallback = Box<dyn Fn(Pillar, usize, usize) + Send + Sync>;

/// What to scan and how
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub path: PathBuf,
    pub profile: String,
    pub language: Language,
    /// Extra exclusion globs on top of the defaults
    pub exclude: Vec<String>,
    pub skip_default_excludes: bool,
    /// Searched before the built-in profiles
    pub profile_dirs: Vec<PathBuf>,
}

impl ScanRequest {
    pub fn new(path: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            profile: profile.into(),
            language: Language::default(),
            exclude: Vec::new(),
            skip_default_excludes: false,
            profile_dirs: Vec::new(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// Runs scans on a dedicated rayon pool
pub struct Scanner {
    workers: usize,
    localizer: Arc<dyn Localizer>,
    progress_callback: Option<ProgressCallback>,
}

impl Scanner {
    /// Create a scanner; `workers` is clamped to 1..=64.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.clamp(MIN_WORKERS, MAX_WORKERS),
            localizer: Arc::new(BuiltinLocalizer),
            progress_callback: None,
        }
    }

    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Load the profile, snapshot the path and evaluate.
    pub fn run(&self, request: &ScanRequest) -> Result<Report, ScanError> {
        let start = Instant::now();
        let profile = ProfileLoader::new()
            .with_dirs(request.profile_dirs.iter().cloned())
            .load(&request.profile)?;

        let snapshot = SnapshotBuilder::new(&request.path)
            .exclude(request.exclude.iter().cloned())
            .skip_defaults(request.skip_default_excludes)
            .build()?;

        self.evaluate_timed(&snapshot, &profile, request.language, start)
    }

    /// Like [`Scanner::run`], recording progress in a scan store.
    ///
    /// The record ends `completed` with the report or `failed` with the
    /// error; the error is also returned.
    pub fn run_tracked(
        &self,
        store: &dyn ScanStore,
        request: &ScanRequest,
    ) -> Result<(Uuid, Report), ScanError> {
        let mut record = ScanRecord::new(
            request.path.display().to_string(),
            request.profile.clone(),
            request.language,
        );
        if let Some(branch) = GitHistory::open(&request.path)
            .ok()
            .and_then(|history| history.current_branch())
        {
            record = record.with_branch(branch);
        }
        let id = store.insert(record);
        store.transition(id, ScanStatus::Scanning)?;

        match self.run(request) {
            Ok(report) => {
                store.complete(id, report.clone())?;
                Ok((id, report))
            }
            Err(e) => {
                store.fail(id, e.to_string())?;
                Err(e)
            }
        }
    }

    /// Evaluate a profile against an existing snapshot.
    pub fn evaluate(
        &self,
        snapshot: &RepoSnapshot,
        profile: &Profile,
        language: Language,
    ) -> Result<Report, ScanError> {
        self.evaluate_timed(snapshot, profile, language, Instant::now())
    }

    fn evaluate_timed(
        &self,
        snapshot: &RepoSnapshot,
        profile: &Profile,
        language: Language,
        start: Instant,
    ) -> Result<Report, ScanError> {
        if profile.checks.is_empty() {
            return Err(ScanError::EmptyRubric(profile.name.clone()));
        }
        let timestamp = Utc::now();
        info!(
            "Scanning {} with profile {} v{} ({} checks, {} workers)",
            snapshot.repo_name(),
            profile.name,
            profile.version,
            profile.checks.len(),
            self.workers
        );

        let outcomes = self.evaluate_pillars(snapshot, profile)?;
        let evaluation = evaluate_all(&outcomes);
        let scan_duration_ms = start.elapsed().as_millis() as u64;

        let run = RunMeta {
            profile: profile.name.clone(),
            profile_version: profile.version.clone(),
            language,
            timestamp,
            scan_duration_ms,
        };
        let report = ReportAssembler::new(self.localizer.as_ref())
            .assemble(&snapshot.meta(), &evaluation, &outcomes, &run);

        info!(
            "Scan complete in {}ms: level {}, score {}",
            scan_duration_ms,
            evaluation
                .level
                .map_or("none".to_string(), |l| l.to_string()),
            evaluation.overall_score
        );
        Ok(report)
    }

    fn evaluate_pillars(
        &self,
        snapshot: &RepoSnapshot,
        profile: &Profile,
    ) -> Result<Vec<PillarOutcome>, ScanError> {
        let by_pillar: Vec<(Pillar, Vec<&CheckDefinition>)> = Pillar::ALL
            .iter()
            .map(|&pillar| (pillar, profile.checks_for(pillar)))
            .collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        let completed = AtomicUsize::new(0);
        let total = by_pillar.len();
        let outcomes = pool.install(|| {
            by_pillar
                .par_iter()
                .map(|(pillar, checks)| {
                    let outcome = evaluate_pillar(*pillar, checks, snapshot);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(*pillar, done, total);
                    }
                    outcome
                })
                .collect()
        });

        debug!("Evaluated {} pillars", total);
        Ok(outcomes)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(num_cpus_hint())
    }
}

fn num_cpus_hint() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;
    use crate::rubric::DEFAULT_PROFILE;
    use crate::scan::InMemoryScanStore;
    use std::fs;
    use std::sync::Mutex;

    fn write(root: &std::path::Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_workers_are_clamped() {
        assert_eq!(Scanner::new(0).workers(), 1);
        assert_eq!(Scanner::new(500).workers(), 64);
        assert_eq!(Scanner::new(8).workers(), 8);
    }

    #[test]
    fn test_empty_repository_reaches_no_level() {
        let dir = tempfile::tempdir().unwrap();
        let report = Scanner::new(2)
            .run(&ScanRequest::new(dir.path(), DEFAULT_PROFILE))
            .unwrap();
        assert_eq!(report.executive_summary.level, None);
        assert_eq!(report.meta.agents_used, 9);
        assert_eq!(report.meta.profile, "factory_compat");
        assert_eq!(report.detailed_analysis.pillars.len(), 9);
        assert!(!report.improvement_roadmap.quick_wins.is_empty());
    }

    #[test]
    fn test_unknown_profile() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scanner::new(1)
            .run(&ScanRequest::new(dir.path(), "missing"))
            .unwrap_err();
        assert!(matches!(err, ScanError::Profile(ProfileError::NotFound { .. })));
    }

    #[test]
    fn test_missing_path() {
        let err = Scanner::new(1)
            .run(&ScanRequest::new("/no/such/repo", DEFAULT_PROFILE))
            .unwrap_err();
        assert!(matches!(err, ScanError::Snapshot(SnapshotError::NotFound(_))));
    }

    #[test]
    fn test_empty_rubric_rejected() {
        let snapshot = RepoSnapshot::from_files("r", "s", vec![("README.md", "")]);
        let profile = Profile {
            name: "empty".to_string(),
            version: "0".to_string(),
            description: String::new(),
            checks: Vec::new(),
        };
        let err = Scanner::new(1)
            .evaluate(&snapshot, &profile, Language::En)
            .unwrap_err();
        assert!(matches!(err, ScanError::EmptyRubric(_)));
    }

    #[test]
    fn test_scans_are_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "README.md", "# Demo\n\n## Installation\n");
        write(
            dir.path(),
            "package.json",
            r#"{"scripts":{"test":"vitest","build":"tsc"}}"#,
        );
        write(
            dir.path(),
            ".github/workflows/ci.yml",
            "on: [push, pull_request]\njobs: {}\n",
        );

        let scanner = Scanner::new(4);
        let request = ScanRequest::new(dir.path(), DEFAULT_PROFILE);
        let mut a = scanner.run(&request).unwrap();
        let mut b = scanner.run(&request).unwrap();
        for report in [&mut a, &mut b] {
            report.meta.timestamp.clear();
            report.meta.scan_duration_ms = 0;
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_progress_callback_sees_every_pillar() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let scanner = Scanner::new(2).with_progress_callback(Box::new(move |pillar, done, total| {
            sink.lock().unwrap().push((pillar, done, total));
        }));
        let snapshot = RepoSnapshot::from_files("r", "s", vec![("README.md", "")]);
        let profile = ProfileLoader::new().load(DEFAULT_PROFILE).unwrap();
        scanner.evaluate(&snapshot, &profile, Language::En).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 9);
        assert!(seen.iter().all(|(_, _, total)| *total == 9));
        let mut done: Vec<usize> = seen.iter().map(|(_, d, _)| *d).collect();
        done.sort();
        assert_eq!(done, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_pillar_order_is_canonical() {
        let snapshot = RepoSnapshot::from_files("r", "s", vec![("README.md", "")]);
        let profile = ProfileLoader::new().load(DEFAULT_PROFILE).unwrap();
        let report = Scanner::new(8)
            .evaluate(&snapshot, &profile, Language::En)
            .unwrap();
        let order: Vec<Pillar> = report
            .detailed_analysis
            .pillars
            .iter()
            .map(|p| p.pillar)
            .collect();
        assert_eq!(order, Pillar::ALL.to_vec());
        assert_eq!(report.charts.level_progress.len(), Level::ALL.len());
    }

    #[test]
    fn test_run_tracked_records_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryScanStore::new();
        let scanner = Scanner::new(1);

        let (id, report) = scanner
            .run_tracked(&store, &ScanRequest::new(dir.path(), DEFAULT_PROFILE))
            .unwrap();
        let record = store.get(id).unwrap();
        assert_eq!(record.status, ScanStatus::Completed);
        assert_eq!(record.result.as_ref(), Some(&report));

        let err = scanner.run_tracked(&store, &ScanRequest::new(dir.path(), "missing"));
        assert!(err.is_err());
        assert_eq!(store.len(), 2);
        let failed_ids = store.find_by_status(ScanStatus::Failed);
        assert_eq!(failed_ids.len(), 1);
        let failed = store.get(failed_ids[0]).unwrap();
        assert!(failed.error.unwrap().contains("missing"));
    }
}
