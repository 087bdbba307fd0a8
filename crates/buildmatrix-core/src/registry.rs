//! The builder registry.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::builder::{BuilderDefinition, Category};
use crate::{Error, Result};

/// An immutable, validated collection of builders.
///
/// Iteration follows declaration order. Cloning is cheap; extending returns
/// a new registry and leaves the receiver untouched.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    builders: Arc<[BuilderDefinition]>,
    index: Arc<HashMap<String, usize>>,
}

impl Registry {
    /// Validate and register a list of builder definitions.
    pub fn register(defs: Vec<BuilderDefinition>) -> Result<Self> {
        Self::default().extend(defs)
    }

    /// Return a new registry containing this registry's builders followed by `defs`.
    pub fn extend(&self, defs: Vec<BuilderDefinition>) -> Result<Self> {
        let mut index = (*self.index).clone();
        let mut builders: Vec<BuilderDefinition> = self.builders.to_vec();
        let start = builders.len();

        for def in defs {
            validate(&def)?;
            if index.contains_key(&def.name) {
                return Err(Error::DuplicateBuilderName(def.name));
            }
            index.insert(def.name.clone(), builders.len());
            builders.push(def);
        }

        let (existing, added) = builders.split_at(start);
        for shared in shared_build_directories(existing, added) {
            warn!(
                worker = shared.worker,
                build_directory = shared.directory,
                first = shared.first,
                second = shared.second,
                "Builders share a build directory on the same worker"
            );
        }
        debug!(builders = builders.len(), "Registered builders");

        Ok(Self {
            builders: builders.into(),
            index: Arc::new(index),
        })
    }

    pub fn get(&self, name: &str) -> Option<&BuilderDefinition> {
        self.index.get(name).map(|&i| &self.builders[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Builders in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &BuilderDefinition> {
        self.builders.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.builders.iter().map(|b| b.name.as_str())
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &BuilderDefinition> {
        self.builders.iter().filter(move |b| b.category == category)
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a BuilderDefinition;
    type IntoIter = std::slice::Iter<'a, BuilderDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.builders.iter()
    }
}

fn validate(def: &BuilderDefinition) -> Result<()> {
    if def.eligible_workers.is_empty() {
        return Err(Error::EmptyWorkerList(def.name.clone()));
    }
    for lock in &def.resource_locks {
        lock.validate()?;
    }
    Ok(())
}

/// Two builders using one build directory on the same worker.
#[derive(Debug, PartialEq, Eq)]
struct SharedDirectory<'a> {
    worker: &'a str,
    directory: &'a str,
    first: &'a str,
    second: &'a str,
}

/// Build directory clashes introduced by `added`.
///
/// Clashes among `existing` builders were reported when they were
/// registered and are not repeated.
fn shared_build_directories<'a>(
    existing: &'a [BuilderDefinition],
    added: &'a [BuilderDefinition],
) -> Vec<SharedDirectory<'a>> {
    let mut seen: HashMap<(&str, &str), &str> = HashMap::new();
    for builder in existing {
        for worker in &builder.eligible_workers {
            seen.entry((worker.as_str(), builder.build_directory.as_str()))
                .or_insert(builder.name.as_str());
        }
    }

    let mut shared = Vec::new();
    for builder in added {
        for worker in &builder.eligible_workers {
            let key = (worker.as_str(), builder.build_directory.as_str());
            if let Some(first) = seen.insert(key, builder.name.as_str()) {
                shared.push(SharedDirectory {
                    worker: key.0,
                    directory: key.1,
                    first,
                    second: builder.name.as_str(),
                });
            }
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PipelineRef;
    use crate::lock::LockRef;

    fn builder(name: &str, category: Category) -> BuilderDefinition {
        BuilderDefinition::new(name, category, PipelineRef::new("full")).with_workers(["bot-1"])
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = Registry::register(vec![
            builder("linux-a", Category::Supported),
            builder("linux-b", Category::Unsupported),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("linux-b").unwrap().category, Category::Unsupported);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = Registry::register(vec![
            builder("linux-a", Category::Supported),
            builder("linux-a", Category::Translator),
        ]);
        assert!(matches!(result, Err(Error::DuplicateBuilderName(name)) if name == "linux-a"));
    }

    #[test]
    fn test_empty_worker_list_rejected() {
        let def = BuilderDefinition::new("orphan", Category::Supported, PipelineRef::new("full"));
        assert!(matches!(
            Registry::register(vec![def]),
            Err(Error::EmptyWorkerList(_))
        ));
    }

    #[test]
    fn test_malformed_lock_rejected() {
        let def = builder("linux-a", Category::Supported).with_lock(LockRef::counting(""));
        assert!(matches!(
            Registry::register(vec![def]),
            Err(Error::MalformedLockReference(_))
        ));
    }

    #[test]
    fn test_extend_keeps_original() {
        let base = Registry::register(vec![builder("linux-a", Category::Supported)]).unwrap();
        let extended = base
            .extend(vec![builder("osx-ssl", Category::PyOpenSsl)])
            .unwrap();

        assert_eq!(base.len(), 1);
        assert_eq!(extended.names().collect::<Vec<_>>(), vec!["linux-a", "osx-ssl"]);
        assert!(!base.contains("osx-ssl"));
    }

    #[test]
    fn test_extend_rejects_existing_name() {
        let base = Registry::register(vec![builder("linux-a", Category::Supported)]).unwrap();
        assert!(matches!(
            base.extend(vec![builder("linux-a", Category::PyOpenSsl)]),
            Err(Error::DuplicateBuilderName(_))
        ));
    }

    #[test]
    fn test_shared_build_directory_is_allowed() {
        let registry = Registry::register(vec![
            builder("win32-a", Category::Supported).with_build_directory("win32"),
            builder("win32-b", Category::Unsupported).with_build_directory("win32"),
        ]);
        assert!(registry.is_ok());
    }

    #[test]
    fn test_shared_directories_reported_only_for_added_builders() {
        let existing = vec![
            builder("win32-a", Category::Supported).with_build_directory("win32"),
            builder("win32-b", Category::Unsupported).with_build_directory("win32"),
        ];
        let added = vec![
            builder("ssl-win32", Category::PyOpenSsl).with_build_directory("win32"),
            builder("ssl-linux", Category::PyOpenSsl),
        ];

        assert_eq!(
            shared_build_directories(&existing, &added),
            vec![SharedDirectory {
                worker: "bot-1",
                directory: "win32",
                first: "win32-a",
                second: "ssl-win32",
            }]
        );
        assert!(shared_build_directories(&existing, &[]).is_empty());
        assert_eq!(shared_build_directories(&[], &existing).len(), 1);
    }

    #[test]
    fn test_by_category_preserves_order() {
        let registry = Registry::register(vec![
            builder("a", Category::Supported),
            builder("b", Category::Benchmark),
            builder("c", Category::Supported),
        ])
        .unwrap();
        let names: Vec<_> = registry
            .by_category(Category::Supported)
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
