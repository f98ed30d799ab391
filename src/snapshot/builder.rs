//! Snapshot construction from a working tree on disk

use super::{normalize_path, ContentSource, RepoSnapshot};
use crate::git::GitHistory;
use dashmap::DashMap;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Paths never indexed unless the caller opts out
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/.git/**",
    "**/target/**",
    "**/dist/**",
    "**/build/**",
    "**/vendor/**",
    "**/__pycache__/**",
    "**/.venv/**",
    "**/venv/**",
    "**/.next/**",
    "**/coverage/**",
];

/// Commit recorded when the root is not inside a git repository
const UNKNOWN_COMMIT: &str = "unknown";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Repository path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Repository path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidExclude {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Walks a working tree and produces a [`RepoSnapshot`]
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    root: PathBuf,
    exclude: Vec<String>,
    skip_defaults: bool,
}

impl SnapshotBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: Vec::new(),
            skip_defaults: false,
        }
    }

    /// Extra glob patterns excluded from the index
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Drop [`DEFAULT_EXCLUDE_PATTERNS`] from the exclusion set
    pub fn skip_defaults(mut self, skip: bool) -> Self {
        self.skip_defaults = skip;
        self
    }

    fn exclude_set(&self) -> Result<GlobSet, SnapshotError> {
        let mut builder = GlobSetBuilder::new();
        let defaults = if self.skip_defaults {
            &[][..]
        } else {
            DEFAULT_EXCLUDE_PATTERNS
        };
        let patterns = defaults
            .iter()
            .map(|p| p.to_string())
            .chain(self.exclude.iter().cloned());

        for pattern in patterns {
            let glob = Glob::new(&pattern).map_err(|source| SnapshotError::InvalidExclude {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| SnapshotError::InvalidExclude {
            pattern: "<set>".to_string(),
            source,
        })
    }

    pub fn build(self) -> Result<RepoSnapshot, SnapshotError> {
        if !self.root.exists() {
            return Err(SnapshotError::NotFound(self.root));
        }
        if !self.root.is_dir() {
            return Err(SnapshotError::NotADirectory(self.root));
        }

        let root = self
            .root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone());
        let excluded = self.exclude_set()?;
        let files = self.collect_files(&root, &excluded);

        let repo_name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("repository")
            .to_string();
        let commit_sha = head_commit(&root);

        info!(
            "Indexed {} files in {} (commit {})",
            files.len(),
            root.display(),
            commit_sha
        );

        Ok(RepoSnapshot::assemble(
            root,
            repo_name,
            commit_sha,
            files,
            ContentSource::Disk,
            DashMap::new(),
        ))
    }

    fn collect_files(&self, root: &Path, excluded: &GlobSet) -> BTreeSet<String> {
        let mut files = BTreeSet::new();

        let walk_root = root.to_path_buf();
        let prune = excluded.clone();
        // Dotfiles (.github, .eslintrc, .env.example) are part of what gets scored
        let walker = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false)
            .filter_entry(move |entry| {
                if entry.file_name() == ".git" {
                    return false;
                }
                if !entry.file_type().is_some_and(|t| t.is_dir()) {
                    return true;
                }
                match entry.path().strip_prefix(&walk_root) {
                    Ok(relative) => !is_excluded_dir(&prune, &relative.to_string_lossy()),
                    Err(_) => true,
                }
            })
            .build();

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let relative = normalize_path(&relative.to_string_lossy());
            if relative.is_empty() || excluded.is_match(&relative) {
                continue;
            }
            files.insert(relative);
        }

        files
    }
}

/// Whether everything below `dir` is excluded, so the walk can skip it
fn is_excluded_dir(excluded: &GlobSet, dir: &str) -> bool {
    let dir = normalize_path(dir);
    !dir.is_empty() && excluded.is_match(format!("{}/", dir))
}

fn head_commit(root: &Path) -> String {
    match GitHistory::open(root).and_then(|history| history.head_commit()) {
        Ok(hash) => hash,
        Err(e) => {
            debug!("No commit for {}: {}", root.display(), e);
            UNKNOWN_COMMIT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_build_indexes_hidden_files_and_skips_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "README.md", "# hi");
        write(
            dir.path(),
            ".github/workflows/ci.yml",
            "on: push\njobs: {}\n",
        );
        write(dir.path(), "node_modules/left-pad/index.js", "");
        write(dir.path(), "src/main.rs", "fn main() {}");

        let snap = SnapshotBuilder::new(dir.path()).build().unwrap();
        let files: Vec<&str> = snap.files().collect();
        assert_eq!(
            files,
            vec![".github/workflows/ci.yml", "README.md", "src/main.rs"]
        );
        assert_eq!(snap.commit_sha(), UNKNOWN_COMMIT);
        assert_eq!(snap.workflows().len(), 1);
    }

    #[test]
    fn test_custom_excludes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "README.md", "");
        write(dir.path(), "fixtures/big.json", "{}");
        write(dir.path(), "node_modules/x/package.json", "{}");

        let snap = SnapshotBuilder::new(dir.path())
            .exclude(["fixtures/**"])
            .skip_defaults(true)
            .build()
            .unwrap();
        assert!(!snap.exists("fixtures/big.json"));
        assert!(snap.exists("node_modules/x/package.json"));
    }

    #[test]
    fn test_invalid_exclude() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnapshotBuilder::new(dir.path())
            .exclude(["[oops"])
            .build()
            .unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidExclude { .. }));
    }

    #[test]
    fn test_missing_root() {
        let err = SnapshotBuilder::new("/definitely/not/here")
            .build()
            .unwrap_err();
        assert!(matches!(err, SnapshotError::NotFound(_)));
    }

    #[test]
    fn test_excluded_dirs_are_pruned() {
        let builder = SnapshotBuilder::new(".").exclude(["fixtures/**"]);
        let set = builder.exclude_set().unwrap();
        assert!(is_excluded_dir(&set, "node_modules"));
        assert!(is_excluded_dir(&set, "web/node_modules"));
        assert!(is_excluded_dir(&set, "target"));
        assert!(is_excluded_dir(&set, "fixtures"));
        assert!(!is_excluded_dir(&set, "src"));
        assert!(!is_excluded_dir(&set, "targets"));
        assert!(!is_excluded_dir(&set, ""));

        let bare = SnapshotBuilder::new(".")
            .skip_defaults(true)
            .exclude_set()
            .unwrap();
        assert!(!is_excluded_dir(&bare, "node_modules"));
    }

    #[test]
    fn test_nested_default_dirs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "apps/web/package.json", "{}");
        write(dir.path(), "apps/web/node_modules/react/package.json", "{}");
        write(dir.path(), "crates/core/target/debug/build.log", "");
        write(dir.path(), "fixtures/nested/big.json", "{}");

        let snap = SnapshotBuilder::new(dir.path())
            .exclude(["fixtures/**"])
            .build()
            .unwrap();
        let files: Vec<&str> = snap.files().collect();
        assert_eq!(files, vec!["apps/web/package.json"]);
    }
}
