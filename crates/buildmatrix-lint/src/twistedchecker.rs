//! Coding-standard checker output, grouped by module.

use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::checker::{LintChecker, NamedLog};
use crate::diff::ErrorMap;

const MODULE_PREFIX: &str = "************* Module ";

static WARNING_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[WCEFR]\d{4}:").unwrap());

static WARNING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<code>[WCEFR]\d{4}):(?P<line>\s*\d+),(?P<indent>\d+):(?P<text>.*)").unwrap()
});

/// One reported warning.
///
/// Two warnings are the same when code and text match; line and indent
/// shift as unrelated code moves and are only used for display order.
#[derive(Debug, Clone)]
pub struct CheckerWarning {
    message: String,
    pub code: String,
    pub line: String,
    pub indent: String,
    pub text: String,
}

impl CheckerWarning {
    pub fn parse(message: &str) -> Self {
        match WARNING_REGEX.captures(message) {
            Some(caps) => Self {
                message: message.to_string(),
                code: caps["code"].to_string(),
                line: caps["line"].to_string(),
                indent: caps["indent"].to_string(),
                text: caps["text"].to_string(),
            },
            None => {
                warn!(warning = message, "unparseable twistedchecker warning");
                Self {
                    message: message.to_string(),
                    code: "UXXXX".to_string(),
                    line: "9999".to_string(),
                    indent: "9".to_string(),
                    text: "Unparseable".to_string(),
                }
            }
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn display_key(&self) -> (&str, &str, &str, &str) {
        (&self.line, &self.indent, &self.code, &self.text)
    }
}

impl PartialEq for CheckerWarning {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.text == other.text
    }
}

impl Eq for CheckerWarning {}

impl PartialOrd for CheckerWarning {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CheckerWarning {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.code, &self.text).cmp(&(&other.code, &other.text))
    }
}

impl fmt::Display for CheckerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub struct TwistedChecker;

impl TwistedChecker {
    fn collect(module: &str, lines: &[String]) -> BTreeSet<CheckerWarning> {
        let mut warnings = BTreeSet::new();
        for line in lines {
            // First occurrence wins among equal warnings.
            let warning = CheckerWarning::parse(line);
            if warnings.contains(&warning) {
                debug!(module, line = %warning.line, "duplicate warning");
                continue;
            }
            warnings.insert(warning);
        }
        warnings
    }

    /// `twisted.python.util` -> `twisted.python`.
    fn package_of(module: &str) -> String {
        module.split('.').take(2).collect::<Vec<_>>().join(".")
    }
}

impl LintChecker for TwistedChecker {
    type Error = CheckerWarning;
    const NAME: &'static str = "twistedchecker";

    fn compute_errors(log: &str) -> ErrorMap<CheckerWarning> {
        let mut errors = ErrorMap::new();
        let mut current: Option<String> = None;
        let mut pending: Vec<String> = Vec::new();

        for line in log.lines() {
            if let Some(module) = line.strip_prefix(MODULE_PREFIX) {
                if let Some(previous) = current.take() {
                    let warnings = Self::collect(&previous, &pending);
                    errors.insert(previous, warnings);
                }
                current = Some(module.to_string());
                pending.clear();
            } else if WARNING_START.is_match(line) {
                pending.push(line.to_string());
            } else if let Some(last) = pending.last_mut() {
                last.push('\n');
                last.push_str(line);
            } else {
                debug!(module = ?current, "bad result format");
            }
        }
        if let Some(module) = current {
            let warnings = Self::collect(&module, &pending);
            errors.insert(module, warnings);
        }
        errors
    }

    fn format_errors(errors: &ErrorMap<CheckerWarning>) -> Vec<String> {
        let mut lines = Vec::new();
        for (module, warnings) in errors {
            lines.push(format!("{}{}", MODULE_PREFIX, module));
            let mut sorted: Vec<&CheckerWarning> = warnings.iter().collect();
            sorted.sort_by(|a, b| a.display_key().cmp(&b.display_key()));
            lines.extend(sorted.into_iter().map(ToString::to_string));
        }
        lines
    }

    fn current_logs(errors: &ErrorMap<CheckerWarning>) -> Vec<NamedLog> {
        let mut packages: BTreeMap<String, ErrorMap<CheckerWarning>> = BTreeMap::new();
        for (module, warnings) in errors {
            packages
                .entry(Self::package_of(module))
                .or_default()
                .insert(module.clone(), warnings.clone());
        }
        packages
            .into_iter()
            .map(|(package, modules)| {
                NamedLog::new(
                    format!("{} {} errors", Self::NAME, package),
                    Self::format_errors(&modules).join("\n"),
                )
            })
            .collect()
    }

    fn is_current_log(name: &str) -> bool {
        name.strip_prefix(Self::NAME)
            .and_then(|rest| rest.strip_prefix(' '))
            .is_some_and(|rest| rest.ends_with(" errors"))
    }
}
