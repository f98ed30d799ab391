//! agent-ready - repository maturity scanner
//!
//! Evaluates a repository snapshot against a rubric of checks, gates each
//! pillar to a level L1-L5 and assembles a bilingual report.
//!
//! ```no_run
//! use agent_ready::pipeline::{ScanRequest, Scanner};
//! use agent_ready::rubric::DEFAULT_PROFILE;
//!
//! let report = Scanner::default()
//!     .run(&ScanRequest::new(".", DEFAULT_PROFILE))
//!     .unwrap();
//! println!("{:?}", report.executive_summary.level);
//! ```

pub mod checks;
pub mod config;
pub mod git;
pub mod i18n;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod reporters;
pub mod rubric;
pub mod scan;
pub mod scoring;
pub mod snapshot;
