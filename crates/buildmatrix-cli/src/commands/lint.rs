//! Lint log comparison.

use anyhow::{Context, Result};
use buildmatrix_lint::CheckerKind;
use std::path::Path;
use tracing::info;

pub fn diff(checker: CheckerKind, previous: &Path, current: &Path) -> Result<()> {
    let previous_text = std::fs::read_to_string(previous)
        .with_context(|| format!("failed to read {}", previous.display()))?;
    let current_text = std::fs::read_to_string(current)
        .with_context(|| format!("failed to read {}", current.display()))?;

    let report = checker.evaluate(&previous_text, &current_text);
    for log in &report.logs {
        info!(log = %log.name, lines = log.text.lines().count(), "current errors");
    }

    match report.new_errors {
        Some(new) => {
            println!("{}:", new.name);
            println!("{}", new.text);
            std::process::exit(1);
        }
        None => {
            println!("No new {} errors", checker);
            Ok(())
        }
    }
}
