//! Lint log regression detection.
//!
//! A lint builder fails when its checker reports errors that the most recent
//! default-branch build did not. This crate parses checker output into
//! grouped error sets, computes what is new, and formats the resulting logs.

pub mod checker;
pub mod diff;
pub mod error;
pub mod history;
pub mod pydoctor;
pub mod pyflakes;
pub mod twistedchecker;

pub use checker::{CheckerKind, LintChecker, LintReport, NamedLog, evaluate};
pub use diff::{ErrorMap, compute_difference};
pub use error::LintError;
pub use history::{BuildHistory, PastBuild, baseline_log, previous_log};
