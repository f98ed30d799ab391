//! Git metadata for scanned repositories
//!
//! Only the identity of the checked-out commit is needed: it is recorded in
//! the report so two scans of the same tree can be told apart.

pub mod history;

pub use history::GitHistory;
