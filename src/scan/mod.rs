//! Scan registry
//!
//! Tracks scans by id through an explicit lifecycle:
//!
//! ```text
//! queued ──► cloning ──► scanning ──► completed
//!    │          │           │
//!    └──────────┴───────────┴──────► failed
//! ```
//!
//! Local paths need no clone and may go straight from `queued` to
//! `scanning`. Terminal states never change again.

use crate::i18n::Language;
use crate::report::Report;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Queued,
    Cloning,
    Scanning,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(self, next: ScanStatus) -> bool {
        use ScanStatus::*;
        match (self, next) {
            (Queued, Cloning)
            | (Queued, Scanning)
            | (Cloning, Scanning)
            | (Scanning, Completed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Queued => "queued",
            ScanStatus::Cloning => "cloning",
            ScanStatus::Scanning => "scanning",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("Scan {0} not found")]
    NotFound(Uuid),

    #[error("Scan {id}: cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: ScanStatus,
        to: ScanStatus,
    },
}

/// One tracked scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: Uuid,
    /// Remote URL or local path of the repository
    pub repo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub profile: String,
    pub language: Language,
    pub status: ScanStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Report>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanRecord {
    /// A fresh record in the `queued` state
    pub fn new(
        repo_url: impl Into<String>,
        profile: impl Into<String>,
        language: Language,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            repo_url: repo_url.into(),
            branch: None,
            profile: profile.into(),
            language,
            status: ScanStatus::Queued,
            created_at: Utc::now(),
            completed_at: None,
            result: None,
            error: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Storage for scan records keyed by id
pub trait ScanStore: Send + Sync {
    /// Register a record and return its id
    fn insert(&self, record: ScanRecord) -> Uuid;

    fn get(&self, id: Uuid) -> Option<ScanRecord>;

    /// Move a scan to a non-terminal state
    fn transition(&self, id: Uuid, to: ScanStatus) -> Result<(), StoreError>;

    /// Attach the report and mark the scan completed
    fn complete(&self, id: Uuid, report: Report) -> Result<(), StoreError>;

    /// Record the error and mark the scan failed
    fn fail(&self, id: Uuid, error: String) -> Result<(), StoreError>;
}

/// Process-local [`ScanStore`]
#[derive(Debug, Default)]
pub struct InMemoryScanStore {
    records: DashMap<Uuid, ScanRecord>,
}

impl InMemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids of every scan currently in `status`, oldest first
    pub fn find_by_status(&self, status: ScanStatus) -> Vec<Uuid> {
        let mut matching: Vec<(DateTime<Utc>, Uuid)> = self
            .records
            .iter()
            .filter(|r| r.status == status)
            .map(|r| (r.created_at, r.id))
            .collect();
        matching.sort();
        matching.into_iter().map(|(_, id)| id).collect()
    }

    /// Apply a checked status change plus any extra mutation under the entry lock
    fn update(
        &self,
        id: Uuid,
        to: ScanStatus,
        apply: impl FnOnce(&mut ScanRecord),
    ) -> Result<(), StoreError> {
        let mut entry = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let from = entry.status;
        if !from.can_transition_to(to) {
            return Err(StoreError::InvalidTransition { id, from, to });
        }
        entry.status = to;
        apply(&mut entry);
        debug!("Scan {} {} -> {}", id, from, to);
        Ok(())
    }
}

impl ScanStore for InMemoryScanStore {
    fn insert(&self, record: ScanRecord) -> Uuid {
        let id = record.id;
        self.records.insert(id, record);
        id
    }

    fn get(&self, id: Uuid) -> Option<ScanRecord> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    fn transition(&self, id: Uuid, to: ScanStatus) -> Result<(), StoreError> {
        if to.is_terminal() {
            let from = self.get(id).ok_or(StoreError::NotFound(id))?.status;
            return Err(StoreError::InvalidTransition { id, from, to });
        }
        self.update(id, to, |_| {})
    }

    fn complete(&self, id: Uuid, report: Report) -> Result<(), StoreError> {
        self.update(id, ScanStatus::Completed, |record| {
            record.result = Some(report);
            record.completed_at = Some(Utc::now());
        })
    }

    fn fail(&self, id: Uuid, error: String) -> Result<(), StoreError> {
        self.update(id, ScanStatus::Failed, |record| {
            record.error = Some(error);
            record.completed_at = Some(Utc::now());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::BuiltinLocalizer;
    use crate::report::{ReportAssembler, RunMeta};
    use crate::scoring::evaluate_all;
    use crate::snapshot::RepoSnapshot;

    fn empty_report() -> Report {
        let snapshot = RepoSnapshot::from_files("r", "s", Vec::<(String, String)>::new());
        ReportAssembler::new(&BuiltinLocalizer).assemble(
            &snapshot.meta(),
            &evaluate_all(&[]),
            &[],
            &RunMeta {
                profile: "factory_compat".to_string(),
                profile_version: "1.0.0".to_string(),
                language: Language::En,
                timestamp: Utc::now(),
                scan_duration_ms: 0,
            },
        )
    }

    #[test]
    fn test_full_lifecycle() {
        let store = InMemoryScanStore::new();
        let id = store.insert(
            ScanRecord::new(
                "https://github.com/acme/widgets",
                "factory_compat",
                Language::Zh,
            )
            .with_branch("main"),
        );
        assert_eq!(store.get(id).unwrap().status, ScanStatus::Queued);

        store.transition(id, ScanStatus::Cloning).unwrap();
        store.transition(id, ScanStatus::Scanning).unwrap();
        store.complete(id, empty_report()).unwrap();

        let record = store.get(id).unwrap();
        assert_eq!(record.status, ScanStatus::Completed);
        assert!(record.result.is_some());
        assert!(record.completed_at.is_some());
        assert_eq!(record.branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_illegal_transitions() {
        let store = InMemoryScanStore::new();
        let id = store.insert(ScanRecord::new(".", "factory_compat", Language::En));

        // Completing before scanning is not allowed
        assert_eq!(
            store.complete(id, empty_report()),
            Err(StoreError::InvalidTransition {
                id,
                from: ScanStatus::Queued,
                to: ScanStatus::Completed
            })
        );

        store.transition(id, ScanStatus::Scanning).unwrap();
        assert!(store.transition(id, ScanStatus::Cloning).is_err());
        store.fail(id, "boom".to_string()).unwrap();

        // Terminal states are final
        assert!(store.transition(id, ScanStatus::Scanning).is_err());
        assert!(store.fail(id, "again".to_string()).is_err());
        let record = store.get(id).unwrap();
        assert_eq!(record.status, ScanStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_transition_rejects_terminal_targets() {
        let store = InMemoryScanStore::new();
        let id = store.insert(ScanRecord::new(".", "p", Language::En));
        store.transition(id, ScanStatus::Scanning).unwrap();
        assert!(matches!(
            store.transition(id, ScanStatus::Completed),
            Err(StoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_unknown_id() {
        let store = InMemoryScanStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            store.transition(id, ScanStatus::Scanning),
            Err(StoreError::NotFound(id))
        );
        assert!(store.get(id).is_none());
        assert!(store.is_empty());
        assert!(store.find_by_status(ScanStatus::Queued).is_empty());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ScanStatus::Cloning).unwrap(),
            "\"cloning\""
        );
        assert!(ScanStatus::Completed.is_terminal());
        assert!(!ScanStatus::Scanning.is_terminal());
    }
}
