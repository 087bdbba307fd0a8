//! Grouped error sets and their difference.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Errors reported by a checker, grouped by kind or module.
pub type ErrorMap<E> = BTreeMap<String, BTreeSet<E>>;

/// Key-wise set difference: errors in `current` that `previous` lacks.
///
/// Keys with nothing new are dropped; keys present only in `previous` are ignored.
pub fn compute_difference<E: Ord + Clone>(
    current: &ErrorMap<E>,
    previous: &ErrorMap<E>,
) -> ErrorMap<E> {
    let mut new = ErrorMap::new();
    for (key, errors) in current {
        let fresh: BTreeSet<E> = match previous.get(key) {
            Some(old) => errors.difference(old).cloned().collect(),
            None => errors.clone(),
        };
        debug!(key = %key, count = fresh.len(), "Found new errors");
        if !fresh.is_empty() {
            new.insert(key.clone(), fresh);
        }
    }
    new
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &[&str])]) -> ErrorMap<String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_empty_previous() {
        let current = map(&[("stuff", &["a", "b"]), ("other", &["x", "y"])]);
        assert_eq!(compute_difference(&current, &ErrorMap::new()), current);
    }

    #[test]
    fn test_empty_current() {
        let previous = map(&[("stuff", &["a", "b"]), ("other", &["x", "y"])]);
        assert!(compute_difference(&ErrorMap::new(), &previous).is_empty());
    }

    #[test]
    fn test_new_key() {
        let previous = map(&[("stuff", &["a", "b"])]);
        let current = map(&[("stuff", &["a", "b"]), ("other", &["x", "y"])]);
        assert_eq!(
            compute_difference(&current, &previous),
            map(&[("other", &["x", "y"])])
        );
    }

    #[test]
    fn test_fewer_keys() {
        let current = map(&[("stuff", &["a", "b"])]);
        let previous = map(&[("stuff", &["a"]), ("other", &["x", "y"])]);
        assert_eq!(
            compute_difference(&current, &previous),
            map(&[("stuff", &["b"])])
        );
    }

    #[test]
    fn test_same_key() {
        let current = map(&[("stuff", &["a", "b"])]);
        assert!(compute_difference(&current, &current.clone()).is_empty());
    }
}
