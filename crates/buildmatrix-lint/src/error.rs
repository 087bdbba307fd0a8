//! Lint errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LintError {
    #[error("unknown lint checker: {0}")]
    UnknownChecker(String),
}
