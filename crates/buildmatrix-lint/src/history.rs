//! Locating the baseline log from earlier builds.

use std::collections::BTreeMap;
use tracing::debug;

use crate::checker::{LintChecker, NamedLog};

/// How many earlier builds are searched for a default-branch build.
pub const LOOKBACK: u64 = 10;

/// A finished build on the same builder.
#[derive(Debug, Clone, Default)]
pub struct PastBuild {
    pub number: u64,
    /// Branch property; `None` or empty means the default branch.
    pub branch: Option<String>,
    pub logs: Vec<NamedLog>,
}

impl PastBuild {
    pub fn on_default_branch(&self) -> bool {
        self.branch.as_deref().is_none_or(str::is_empty)
    }

    pub fn log(&self, name: &str) -> Option<&NamedLog> {
        self.logs.iter().find(|log| log.name == name)
    }
}

/// Read access to a builder's past builds.
pub trait BuildHistory {
    fn build(&self, number: u64) -> Option<&PastBuild>;
}

impl BuildHistory for BTreeMap<u64, PastBuild> {
    fn build(&self, number: u64) -> Option<&PastBuild> {
        self.get(&number)
    }
}

/// Most recent default-branch build before `current`, within [`LOOKBACK`].
pub fn last_default_branch_build<H: BuildHistory + ?Sized>(
    history: &H,
    current: u64,
) -> Option<&PastBuild> {
    if current == 0 {
        debug!("first build has no predecessor");
        return None;
    }
    for number in (current.saturating_sub(LOOKBACK)..current).rev() {
        let Some(build) = history.build(number) else {
            continue;
        };
        if build.on_default_branch() {
            debug!(build = number, "found build on default branch");
            return Some(build);
        }
        debug!(build = number, branch = ?build.branch, "skipping branch build");
    }
    debug!(current, "no default-branch build within lookback");
    None
}

/// Text of `log_name` from the baseline build, or empty when there is none.
///
/// Checkers that split their errors over several logs need [`baseline_log`].
pub fn previous_log<H: BuildHistory + ?Sized>(history: &H, current: u64, log_name: &str) -> String {
    let Some(build) = last_default_branch_build(history, current) else {
        return String::new();
    };
    match build.log(log_name) {
        Some(log) => {
            debug!(build = build.number, bytes = log.text.len(), "found error log");
            log.text.clone()
        }
        None => {
            debug!(build = build.number, log_name, "build has no such log");
            String::new()
        }
    }
}

/// Baseline error text for checker `C`.
///
/// Checkers that split their errors over several logs (one per package)
/// get all of those logs joined, so the baseline covers every error.
pub fn baseline_log<C: LintChecker, H: BuildHistory + ?Sized>(history: &H, current: u64) -> String {
    let Some(build) = last_default_branch_build(history, current) else {
        return String::new();
    };
    let logs: Vec<&str> = build
        .logs
        .iter()
        .filter(|log| C::is_current_log(&log.name))
        .map(|log| log.text.as_str())
        .collect();
    debug!(build = build.number, logs = logs.len(), checker = C::NAME, "collected baseline logs");
    logs.join("\n")
}
