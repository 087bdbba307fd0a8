//! Static analysis output, one `path:line: text` report per line.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use crate::checker::LintChecker;
use crate::diff::ErrorMap;

static REPORT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<path>[^:]+):(?P<line>\d+): (?P<text>.*)$").unwrap());

/// A single report. Identified by file and text; the line number is
/// kept for display only.
#[derive(Debug, Clone)]
pub struct FlakesReport {
    message: String,
    pub path: String,
    pub line: u32,
    pub text: String,
}

impl FlakesReport {
    pub fn parse(message: &str) -> Option<Self> {
        let caps = REPORT_REGEX.captures(message)?;
        Some(Self {
            message: message.to_string(),
            path: caps["path"].to_string(),
            line: caps["line"].parse().ok()?,
            text: caps["text"].to_string(),
        })
    }
}

impl PartialEq for FlakesReport {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.text == other.text
    }
}

impl Eq for FlakesReport {}

impl PartialOrd for FlakesReport {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FlakesReport {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.path, &self.text).cmp(&(&other.path, &other.text))
    }
}

impl fmt::Display for FlakesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub struct PyFlakes;

impl LintChecker for PyFlakes {
    type Error = FlakesReport;
    const NAME: &'static str = "pyflakes";

    fn compute_errors(log: &str) -> ErrorMap<FlakesReport> {
        let mut errors = ErrorMap::new();
        for report in log.lines().filter_map(FlakesReport::parse) {
            errors
                .entry(Self::NAME.to_string())
                .or_default()
                .insert(report);
        }
        errors
    }

    fn format_errors(errors: &ErrorMap<FlakesReport>) -> Vec<String> {
        let mut all: Vec<&FlakesReport> = errors.values().flatten().collect();
        all.sort_by(|a, b| (&a.path, a.line, &a.text).cmp(&(&b.path, b.line, &b.text)));
        all.into_iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::evaluate;

    const LOG: [&str; 5] = [
        "twisted/conch/manhole_tap.py:14: 'session' imported but unused",
        "twisted/conch/manhole_tap.py:15: 'iconch' imported but unused",
        "twisted/mail/bounce.py:40: local variable 'boundary' is assigned to but never used",
        "twisted/test/test_jelly.py:571: local variable 'n11' is assigned to but never used",
        "twisted/test/test_jelly.py:572: local variable 'n2' is assigned to but never used",
    ];

    #[test]
    fn test_compute_errors() {
        let errors = PyFlakes::compute_errors(&LOG.join("\n"));

        assert_eq!(errors.len(), 1);
        let reports = &errors["pyflakes"];
        assert_eq!(reports.len(), 5);

        let first = reports.iter().next().unwrap();
        assert_eq!(first.path, "twisted/conch/manhole_tap.py");
        assert_eq!(first.text, "'iconch' imported but unused");
        assert_eq!(first.line, 15);
    }

    #[test]
    fn test_format_orders_by_file_then_line() {
        let log = [LOG[4], LOG[0], LOG[3], LOG[2], LOG[1]].join("\n");
        let errors = PyFlakes::compute_errors(&log);
        assert_eq!(PyFlakes::format_errors(&errors), LOG.to_vec());
    }

    #[test]
    fn test_moved_report_is_not_new() {
        let previous = "twisted/mail/bounce.py:40: local variable 'boundary' is assigned to but never used";
        let current = "twisted/mail/bounce.py:52: local variable 'boundary' is assigned to but never used";
        assert!(!evaluate::<PyFlakes>(previous, current).worse);
    }

    #[test]
    fn test_new_errors() {
        let report = evaluate::<PyFlakes>(&LOG[..3].join("\n"), &LOG.join("\n"));

        assert!(report.worse);
        let new = report.new_errors.unwrap();
        assert_eq!(new.name, "new pyflakes errors");
        assert_eq!(new.text, [LOG[3], LOG[4]].join("\n"));
    }

    #[test]
    fn test_noise_is_ignored() {
        assert!(FlakesReport::parse("checking twisted").is_none());
        assert!(PyFlakes::compute_errors("\n\nchecking twisted\n").is_empty());
    }
}
