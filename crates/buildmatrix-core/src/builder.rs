//! Builder definitions.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::lock::LockRef;

/// Name of a remote worker permitted to run builds.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
pub struct WorkerName(String);

impl WorkerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkerName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Opaque handle to a pipeline owned by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct PipelineRef(String);

impl PipelineRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tag controlling which trigger groups include a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Supported,
    Unsupported,
    Translator,
    Benchmark,
    #[serde(rename = "pyopenssl")]
    PyOpenSsl,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Supported,
        Category::Unsupported,
        Category::Translator,
        Category::Benchmark,
        Category::PyOpenSsl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Supported => "supported",
            Category::Unsupported => "unsupported",
            Category::Translator => "translator",
            Category::Benchmark => "benchmark",
            Category::PyOpenSsl => "pyopenssl",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when a category name is outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedCategory(pub String);

impl fmt::Display for UnrecognizedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized category '{}'", self.0)
    }
}

impl std::error::Error for UnrecognizedCategory {}

impl FromStr for Category {
    type Err = UnrecognizedCategory;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnrecognizedCategory(s.to_string()))
    }
}

/// A named, worker-assignable build job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderDefinition {
    /// Unique name; the engine keys build history by it.
    pub name: String,
    pub category: Category,
    /// Workers allowed to run this job, in preference order.
    pub eligible_workers: Vec<WorkerName>,
    /// Where build state lives on the worker.
    pub build_directory: String,
    pub pipeline: PipelineRef,
    /// Capacity locks held for the duration of a build.
    pub resource_locks: Vec<LockRef>,
}

impl BuilderDefinition {
    /// Create a definition whose build directory defaults to its name.
    pub fn new(name: impl Into<String>, category: Category, pipeline: PipelineRef) -> Self {
        let name = name.into();
        Self {
            build_directory: name.clone(),
            name,
            category,
            eligible_workers: Vec::new(),
            pipeline,
            resource_locks: Vec::new(),
        }
    }

    pub fn with_workers<I, W>(mut self, workers: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<WorkerName>,
    {
        self.eligible_workers = workers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_build_directory(mut self, dir: impl Into<String>) -> Self {
        self.build_directory = dir.into();
        self
    }

    pub fn with_lock(mut self, lock: LockRef) -> Self {
        self.resource_locks.push(lock);
        self
    }

    /// Whether this builder may run on the given worker.
    pub fn runs_on(&self, worker: &WorkerName) -> bool {
        self.eligible_workers.contains(worker)
    }
}
