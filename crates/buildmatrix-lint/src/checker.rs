//! The checker abstraction and lint evaluation.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::diff::{ErrorMap, compute_difference};
use crate::error::LintError;
use crate::pydoctor::Pydoctor;
use crate::pyflakes::PyFlakes;
use crate::twistedchecker::TwistedChecker;

/// A log attached to a build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedLog {
    pub name: String,
    pub text: String,
}

impl NamedLog {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Parses and formats the output of one lint tool.
pub trait LintChecker {
    type Error: Ord + Clone;

    /// Tool name used in log titles.
    const NAME: &'static str;

    fn compute_errors(log: &str) -> ErrorMap<Self::Error>;

    /// Render errors as log lines.
    fn format_errors(errors: &ErrorMap<Self::Error>) -> Vec<String>;

    /// Logs recording the full set of current errors.
    fn current_logs(errors: &ErrorMap<Self::Error>) -> Vec<NamedLog> {
        vec![NamedLog::new(
            format!("{} errors", Self::NAME),
            Self::format_errors(errors).join("\n"),
        )]
    }

    /// Whether `name` is one of the logs written by [`current_logs`](Self::current_logs).
    fn is_current_log(name: &str) -> bool {
        name == format!("{} errors", Self::NAME)
    }
}

/// Outcome of comparing a lint run with the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintReport {
    /// Logs listing every current error.
    pub logs: Vec<NamedLog>,
    /// Log listing only the errors the previous run did not have.
    pub new_errors: Option<NamedLog>,
    /// True when new errors appeared; the step should fail.
    pub worse: bool,
}

/// Compare `current` checker output against `previous`.
pub fn evaluate<C: LintChecker>(previous: &str, current: &str) -> LintReport {
    let current_errors = C::compute_errors(current);
    let previous_errors = C::compute_errors(previous);

    let logs = C::current_logs(&current_errors);
    let new = compute_difference(&current_errors, &previous_errors);
    let worse = !new.is_empty();
    let new_errors = worse.then(|| {
        NamedLog::new(
            format!("new {} errors", C::NAME),
            C::format_errors(&new).join("\n"),
        )
    });

    LintReport {
        logs,
        new_errors,
        worse,
    }
}

/// The supported checkers, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerKind {
    Pydoctor,
    TwistedChecker,
    PyFlakes,
}

impl CheckerKind {
    pub fn name(&self) -> &'static str {
        match self {
            CheckerKind::Pydoctor => Pydoctor::NAME,
            CheckerKind::TwistedChecker => TwistedChecker::NAME,
            CheckerKind::PyFlakes => PyFlakes::NAME,
        }
    }

    pub fn evaluate(&self, previous: &str, current: &str) -> LintReport {
        match self {
            CheckerKind::Pydoctor => evaluate::<Pydoctor>(previous, current),
            CheckerKind::TwistedChecker => evaluate::<TwistedChecker>(previous, current),
            CheckerKind::PyFlakes => evaluate::<PyFlakes>(previous, current),
        }
    }
}

impl fmt::Display for CheckerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CheckerKind {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pydoctor" => Ok(CheckerKind::Pydoctor),
            "twistedchecker" => Ok(CheckerKind::TwistedChecker),
            "pyflakes" => Ok(CheckerKind::PyFlakes),
            other => Err(LintError::UnknownChecker(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    /// Treats each line as `key value`.
    struct FakeChecker;

    impl LintChecker for FakeChecker {
        type Error = String;
        const NAME: &'static str = "test-lint";

        fn compute_errors(log: &str) -> ErrorMap<String> {
            let mut errors = ErrorMap::new();
            for line in log.lines() {
                if let Some((key, value)) = line.split_once(' ') {
                    errors
                        .entry(key.to_string())
                        .or_insert_with(BTreeSet::new)
                        .insert(value.to_string());
                }
            }
            errors
        }

        fn format_errors(errors: &ErrorMap<String>) -> Vec<String> {
            errors
                .iter()
                .flat_map(|(k, vs)| vs.iter().map(move |v| format!("{} {}", k, v)))
                .collect()
        }
    }

    #[test]
    fn test_new_errors_make_it_worse() {
        let report = evaluate::<FakeChecker>("old a\nold b\nnew a", "old a\nnew a\nnew c");
        assert!(report.worse);
        assert_eq!(report.logs[0].name, "test-lint errors");
        assert_eq!(report.logs[0].text, "new a\nnew c\nold a");
        assert_eq!(report.new_errors, Some(NamedLog::new("new test-lint errors", "new c")));
    }

    #[test]
    fn test_fixed_errors_are_fine() {
        let report = evaluate::<FakeChecker>("old a\nold b\nold c", "old a\nold b");
        assert!(!report.worse);
        assert!(report.new_errors.is_none());
    }

    #[test]
    fn test_same_errors_are_fine() {
        let report = evaluate::<FakeChecker>("old a\nnew b", "old a\nnew b");
        assert!(!report.worse);
    }

    #[test]
    fn test_current_log_names() {
        assert!(FakeChecker::is_current_log("test-lint errors"));
        assert!(!FakeChecker::is_current_log("new test-lint errors"));
        assert!(TwistedChecker::is_current_log("twistedchecker twisted.python errors"));
        assert!(!TwistedChecker::is_current_log("new twistedchecker errors"));
        assert!(!TwistedChecker::is_current_log("twistedchecker errors"));
    }

    #[test]
    fn test_checker_kind_parsing() {
        assert_eq!("pyflakes".parse::<CheckerKind>().unwrap(), CheckerKind::PyFlakes);
        assert_eq!(CheckerKind::TwistedChecker.to_string(), "twistedchecker");
        assert!(matches!(
            "pylint".parse::<CheckerKind>(),
            Err(LintError::UnknownChecker(_))
        ));
    }
}
