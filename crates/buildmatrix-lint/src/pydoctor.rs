//! API documentation checker output.

use crate::checker::LintChecker;
use crate::diff::ErrorMap;

/// Reports invalid cross references and unknown docstring fields.
pub struct Pydoctor;

impl LintChecker for Pydoctor {
    type Error = String;
    const NAME: &'static str = "pydoctor";

    fn compute_errors(log: &str) -> ErrorMap<String> {
        let mut errors = ErrorMap::new();
        for line in log.lines() {
            let line = line.trim();
            let (key, value) = if line.contains("invalid ref to") {
                // Line numbers drift between revisions; keep only the name.
                let (location, rest) = line.split_once(' ').unwrap_or((line, ""));
                let name = location.split_once(':').map_or(location, |(name, _)| name);
                ("invalid ref", format!("{}: {}", name, rest))
            } else if line.contains("found unknown field on") {
                ("unknown fields", line.to_string())
            } else {
                continue;
            };
            errors.entry(key.to_string()).or_default().insert(value);
        }
        errors
    }

    fn format_errors(errors: &ErrorMap<String>) -> Vec<String> {
        let mut all: Vec<String> = errors.values().flatten().cloned().collect();
        all.sort();
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::evaluate;

    const LOG: [&str; 6] = [
        "twisted.spread.ui.tkutil:0 invalid ref to Tkinter",
        "twisted.spread.pb.CopyableFailure:404 invalid ref to flavors.RemoteCopy",
        "twisted.spread.pb.CopyableFailure:404 invalid ref to flavors.Copyable",
        "found unknown field on 'twisted.internet.process._FDDetector': <Field 'ivars' 'listdir' 'The implementation ....'>",
        "found unknown field on 'twisted.internet.process._FDDetector': <Field 'ivars' 'getpid' 'The implementation ....'>",
        "found unknown field on 'twisted.internet.process._FDDetector': <Field 'ivars' 'openfile' 'The implementation ....'>",
    ];

    #[test]
    fn test_compute_errors() {
        let errors = Pydoctor::compute_errors(&LOG.join("\n"));

        assert_eq!(errors.len(), 2);
        let refs: Vec<_> = errors["invalid ref"].iter().map(String::as_str).collect();
        assert_eq!(
            refs,
            vec![
                "twisted.spread.pb.CopyableFailure: invalid ref to flavors.Copyable",
                "twisted.spread.pb.CopyableFailure: invalid ref to flavors.RemoteCopy",
                "twisted.spread.ui.tkutil: invalid ref to Tkinter",
            ]
        );
        assert_eq!(errors["unknown fields"].len(), 3);
    }

    #[test]
    fn test_new_errors() {
        let previous = [LOG[0], LOG[2], LOG[4]].join("\n");
        let report = evaluate::<Pydoctor>(&previous, &LOG.join("\n"));

        assert!(report.worse);
        assert_eq!(report.logs[0].name, "pydoctor errors");
        assert_eq!(
            report.logs[0].text,
            [
                "found unknown field on 'twisted.internet.process._FDDetector': <Field 'ivars' 'getpid' 'The implementation ....'>",
                "found unknown field on 'twisted.internet.process._FDDetector': <Field 'ivars' 'listdir' 'The implementation ....'>",
                "found unknown field on 'twisted.internet.process._FDDetector': <Field 'ivars' 'openfile' 'The implementation ....'>",
                "twisted.spread.pb.CopyableFailure: invalid ref to flavors.Copyable",
                "twisted.spread.pb.CopyableFailure: invalid ref to flavors.RemoteCopy",
                "twisted.spread.ui.tkutil: invalid ref to Tkinter",
            ]
            .join("\n")
        );

        let new = report.new_errors.unwrap();
        assert_eq!(new.name, "new pydoctor errors");
        assert_eq!(
            new.text,
            [
                "found unknown field on 'twisted.internet.process._FDDetector': <Field 'ivars' 'listdir' 'The implementation ....'>",
                "found unknown field on 'twisted.internet.process._FDDetector': <Field 'ivars' 'openfile' 'The implementation ....'>",
                "twisted.spread.pb.CopyableFailure: invalid ref to flavors.RemoteCopy",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_unrelated_lines_ignored() {
        assert!(Pydoctor::compute_errors("building html\n\n42 files processed").is_empty());
    }
}
