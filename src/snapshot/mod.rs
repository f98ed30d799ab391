//! Read-only repository snapshot
//!
//! The snapshot is built once per scan and shared by every check
//! evaluation. It holds the file index, parsed manifests and CI workflows,
//! plus two memo caches (file contents and glob matches). The caches use
//! `DashMap` so concurrent readers never need an outer lock; nothing else in
//! the snapshot changes after construction.

mod builder;
mod manifest;
mod workflow;

pub use builder::{SnapshotBuilder, SnapshotError, DEFAULT_EXCLUDE_PATTERNS};
pub use manifest::{ManifestKind, PackageManifest};
pub use workflow::Workflow;

use dashmap::DashMap;
use globset::GlobBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Files larger than this are never loaded into the content cache
const MAX_CONTENT_BYTES: u64 = 2 * 1024 * 1024;

/// Identity of the scanned repository, as carried into the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub repo_name: String,
    pub commit_sha: String,
    pub root_path: PathBuf,
    pub is_monorepo: bool,
    pub monorepo_apps: Vec<String>,
}

/// Where file contents come from when the cache misses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentSource {
    /// Read lazily from `root` on first access
    Disk,
    /// Everything was supplied up front
    Memory,
}

/// Immutable view of a repository at one commit
#[derive(Debug)]
pub struct RepoSnapshot {
    root: PathBuf,
    repo_name: String,
    commit_sha: String,
    /// Relative file paths, `/`-separated
    files: BTreeSet<String>,
    /// Relative directory paths, `/`-separated
    dirs: BTreeSet<String>,
    source: ContentSource,
    contents: DashMap<String, Option<Arc<String>>>,
    glob_cache: DashMap<String, Arc<Vec<String>>>,
    manifests: Vec<PackageManifest>,
    make_targets: BTreeSet<String>,
    workflows: Vec<Workflow>,
    monorepo_apps: Vec<String>,
    is_monorepo: bool,
}

impl RepoSnapshot {
    /// Build a snapshot from in-memory `(path, content)` pairs.
    ///
    /// Used by tests and by embedders that already hold the tree in memory.
    pub fn from_files<P, C>(
        repo_name: impl Into<String>,
        commit_sha: impl Into<String>,
        files: impl IntoIterator<Item = (P, C)>,
    ) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        let contents = DashMap::new();
        let mut index = BTreeSet::new();
        for (path, content) in files {
            let path = normalize_path(&path.into());
            if path.is_empty() {
                continue;
            }
            contents.insert(path.clone(), Some(Arc::new(content.into())));
            index.insert(path);
        }

        Self::assemble(
            PathBuf::from("."),
            repo_name.into(),
            commit_sha.into(),
            index,
            ContentSource::Memory,
            contents,
        )
    }

    fn assemble(
        root: PathBuf,
        repo_name: String,
        commit_sha: String,
        files: BTreeSet<String>,
        source: ContentSource,
        contents: DashMap<String, Option<Arc<String>>>,
    ) -> Self {
        let dirs = parent_dirs(&files);
        let mut snapshot = Self {
            root,
            repo_name,
            commit_sha,
            files,
            dirs,
            source,
            contents,
            glob_cache: DashMap::new(),
            manifests: Vec::new(),
            make_targets: BTreeSet::new(),
            workflows: Vec::new(),
            monorepo_apps: Vec::new(),
            is_monorepo: false,
        };
        snapshot.index_metadata();
        snapshot
    }

    /// Parse manifests, Makefile targets, workflows and monorepo layout
    fn index_metadata(&mut self) {
        let mut manifests = Vec::new();
        for kind in ManifestKind::ALL {
            if let Some(content) = self.read_file(kind.file_name()) {
                if let Some(manifest) = PackageManifest::parse(kind, &content) {
                    manifests.push(manifest);
                }
            }
        }

        let make_targets = ["Makefile", "makefile", "GNUmakefile"]
            .iter()
            .find_map(|name| self.read_file(name))
            .map(|content| manifest::make_targets(&content))
            .unwrap_or_default();

        let workflow_paths: Vec<String> = self
            .files
            .iter()
            .filter(|p| workflow::is_workflow_path(p))
            .cloned()
            .collect();
        let workflows: Vec<Workflow> = workflow_paths
            .into_iter()
            .filter_map(|path| {
                let content = self.read_file(&path)?;
                Some(Workflow::parse(&path, &content))
            })
            .collect();

        let mut apps: BTreeSet<String> = self
            .files
            .iter()
            .filter_map(|p| monorepo_app_dir(p))
            .collect();
        for m in &manifests {
            apps.extend(
                m.workspace_members
                    .iter()
                    .filter(|w| !w.contains('*'))
                    .cloned(),
            );
        }
        let declares_workspace = manifests.iter().any(|m| m.is_workspace)
            || self.files.contains("pnpm-workspace.yaml")
            || self.files.contains("lerna.json");

        self.is_monorepo = declares_workspace || apps.len() > 1;
        self.monorepo_apps = apps.into_iter().collect();
        self.manifests = manifests;
        self.make_targets = make_targets;
        self.workflows = workflows;

        debug!(
            "Snapshot {}: {} files, {} manifests, {} workflows, monorepo={}",
            self.repo_name,
            self.files.len(),
            self.manifests.len(),
            self.workflows.len(),
            self.is_monorepo
        );
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn commit_sha(&self) -> &str {
        &self.commit_sha
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// All indexed file paths in sorted order
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// Whether a file or directory exists at `path` (relative to the root)
    pub fn exists(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.files.contains(&path) || self.dirs.contains(&path)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.files.contains(&normalize_path(path))
    }

    /// Contents of an indexed file, memoized.
    ///
    /// Returns `None` for unknown paths, unreadable or oversized files and
    /// non-UTF-8 content.
    pub fn read_file(&self, path: &str) -> Option<Arc<String>> {
        let path = normalize_path(path);
        if let Some(cached) = self.contents.get(&path) {
            return cached.value().clone();
        }
        if self.source == ContentSource::Memory || !self.files.contains(&path) {
            return None;
        }

        let loaded = self.load_from_disk(&path);
        self.contents.entry(path).or_insert(loaded).value().clone()
    }

    fn load_from_disk(&self, path: &str) -> Option<Arc<String>> {
        let full = self.root.join(path);
        let meta = std::fs::metadata(&full).ok()?;
        if meta.len() > MAX_CONTENT_BYTES {
            debug!("Skipping oversized file {} ({} bytes)", path, meta.len());
            return None;
        }
        std::fs::read_to_string(&full).ok().map(Arc::new)
    }

    /// Indexed files matching a glob, sorted and memoized per pattern.
    ///
    /// `*` does not cross directory separators; `**` does. Brace
    /// alternation (`{a,b}`) is supported.
    pub fn glob(&self, pattern: &str) -> Result<Arc<Vec<String>>, globset::Error> {
        if let Some(hit) = self.glob_cache.get(pattern) {
            return Ok(Arc::clone(hit.value()));
        }

        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        let matches: Vec<String> = self
            .files
            .iter()
            .filter(|p| matcher.is_match(p.as_str()))
            .cloned()
            .collect();

        let entry = self
            .glob_cache
            .entry(pattern.to_string())
            .or_insert_with(|| Arc::new(matches));
        Ok(Arc::clone(entry.value()))
    }

    /// Primary package manifest (first of package.json, Cargo.toml, pyproject.toml)
    pub fn manifest(&self) -> Option<&PackageManifest> {
        self.manifests.first()
    }

    pub fn manifests(&self) -> &[PackageManifest] {
        &self.manifests
    }

    /// Target names declared in the root Makefile
    pub fn make_targets(&self) -> &BTreeSet<String> {
        &self.make_targets
    }

    /// Parsed CI workflow definitions, sorted by path
    pub fn workflows(&self) -> &[Workflow] {
        &self.workflows
    }

    pub fn is_monorepo(&self) -> bool {
        self.is_monorepo
    }

    pub fn monorepo_apps(&self) -> &[String] {
        &self.monorepo_apps
    }

    pub fn meta(&self) -> SnapshotMeta {
        SnapshotMeta {
            repo_name: self.repo_name.clone(),
            commit_sha: self.commit_sha.clone(),
            root_path: self.root.clone(),
            is_monorepo: self.is_monorepo,
            monorepo_apps: self.monorepo_apps.clone(),
        }
    }
}

/// Normalize to a relative, `/`-separated path without `./` or trailing `/`
pub(crate) fn normalize_path(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let mut trimmed = replaced.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed
        .trim_start_matches('/')
        .trim_end_matches('/')
        .to_string()
}

fn parent_dirs(files: &BTreeSet<String>) -> BTreeSet<String> {
    let mut dirs = BTreeSet::new();
    for file in files {
        let mut current = file.as_str();
        while let Some(idx) = current.rfind('/') {
            current = &current[..idx];
            if !dirs.insert(current.to_string()) {
                break;
            }
        }
    }
    dirs
}

/// `apps/<name>/package.json` style layouts
fn monorepo_app_dir(path: &str) -> Option<String> {
    let mut parts = path.split('/');
    let top = parts.next()?;
    let name = parts.next()?;
    let file = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let is_container = matches!(top, "apps" | "packages" | "services" | "crates");
    let is_manifest = ManifestKind::ALL.iter().any(|k| k.file_name() == file);
    (is_container && is_manifest).then(|| format!("{}/{}", top, name))
}
