//! HEAD commit lookup using libgit2

use anyhow::{Context, Result};
use git2::Repository;
use std::path::Path;
use tracing::debug;

/// Read-only handle on the repository containing a scan root
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    /// Open the repository containing `path` (or any of its parents).
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("Failed to open git repository at {:?}", path))?;
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self { repo })
    }

    /// Full hash of the commit HEAD points at.
    ///
    /// Fails on an unborn branch (fresh `git init` with no commits).
    pub fn head_commit(&self) -> Result<String> {
        let head = self.repo.head().context("Repository has no HEAD")?;
        let commit = head
            .peel_to_commit()
            .context("HEAD does not point at a commit")?;
        Ok(commit.id().to_string())
    }

    /// Short name of the checked-out branch, `None` when detached.
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(str::to_string)
    }
}
