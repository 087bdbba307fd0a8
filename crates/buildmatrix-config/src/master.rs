//! Master configuration: the whole build matrix in one document.
//!
//! Loading is a single pass with one ordering rule. The main builders are
//! registered and the main schedulers derived first; each `builder-set` then
//! derives its own schedulers over its own builders before being appended
//! to the registry. Builders in a set are therefore never members of the
//! main continuous or scheduled groups.

use buildmatrix_core::lock::LockSpec;
use buildmatrix_core::{
    BuilderDefinition, Registry, TriggerGroup, TriggerPlan, derive_trigger_groups,
};
use kdl::{KdlDocument, KdlNode};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::builders::{parse_builder, parse_lock};
use crate::nodes::{required_name, string_prop};
use crate::pipeline::{PipelineSpec, parse_pipeline};
use crate::schedulers::parse_scheduler;
use crate::secrets::{EnvSecrets, SecretSource};
use crate::system::{
    ChangeSourceConfig, ListenerConfig, StatusConfig, WorkerConfig, parse_change_source,
    parse_listener, parse_status, parse_worker,
};
use crate::{ConfigError, ConfigResult};

/// Project identity shown by status sinks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    pub name: String,
    pub url: Option<String>,
}

/// A validated, fully assembled master configuration.
#[derive(Debug, Clone)]
pub struct MasterConfig {
    pub project: ProjectConfig,
    pub listener: ListenerConfig,
    pub change_source: Option<ChangeSourceConfig>,
    pub workers: Vec<WorkerConfig>,
    pub locks: Vec<LockSpec>,
    pub pipelines: Vec<PipelineSpec>,
    pub registry: Registry,
    pub trigger_groups: Vec<TriggerGroup>,
    pub status: StatusConfig,
}

/// Builders and schedulers declared together, derived as one unit.
#[derive(Debug, Default)]
struct BuilderSet {
    name: String,
    builders: Vec<BuilderDefinition>,
    plan: TriggerPlan,
}

impl MasterConfig {
    /// Read and parse a configuration file, resolving secrets from the environment.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading master configuration");
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, &EnvSecrets)
    }

    /// Parse configuration text.
    pub fn parse(kdl: &str, secrets: &dyn SecretSource) -> ConfigResult<Self> {
        let doc: KdlDocument = kdl.parse()?;

        let mut project = ProjectConfig::default();
        let mut listener = ListenerConfig::default();
        let mut change_source = None;
        let mut workers = Vec::new();
        let mut locks = Vec::new();
        let mut pipelines = Vec::new();
        let mut status = StatusConfig::default();
        let mut main = BuilderSet {
            name: "main".to_string(),
            ..Default::default()
        };
        let mut sets = Vec::new();

        for node in doc.nodes() {
            match node.name().value() {
                "project" => {
                    project = ProjectConfig {
                        name: required_name(node, "project name")?,
                        url: string_prop(node, "url"),
                    };
                }
                "listener" => listener = parse_listener(node)?,
                "change-source" => change_source = Some(parse_change_source(node)?),
                "worker" => workers.push(parse_worker(node, secrets)?),
                "lock" => locks.push(parse_lock(node)?),
                "pipeline" => pipelines.push(parse_pipeline(node)?),
                "builder" => main.builders.push(parse_builder(node)?),
                "scheduler" => main.plan.push(parse_scheduler(node)?),
                "builder-set" => sets.push(parse_builder_set(node)?),
                "status" => status = parse_status(node)?,
                _ => {} // Ignore unknown nodes
            }
        }

        if project.name.is_empty() {
            return Err(ConfigError::MissingField("project name".to_string()));
        }

        check_unique("worker", workers.iter().map(|w| w.name.as_str()))?;
        check_unique("lock", locks.iter().map(|l| l.name.as_str()))?;
        check_unique("pipeline", pipelines.iter().map(|p| p.name.as_str()))?;
        check_unique(
            "scheduler",
            main.plan
                .groups
                .iter()
                .chain(sets.iter().flat_map(|s| s.plan.groups.iter()))
                .map(|g| g.name.as_str()),
        )?;

        let refs = References::new(&workers, &locks, &pipelines);
        for set in std::iter::once(&main).chain(sets.iter()) {
            for builder in &set.builders {
                refs.check(builder)?;
            }
        }

        let mut registry = Registry::register(main.builders)?;
        let mut trigger_groups = derive_trigger_groups(&registry, &main.plan)?;

        for set in sets {
            let partial = Registry::register(set.builders.clone())?;
            let groups = derive_trigger_groups(&partial, &set.plan)?;
            debug!(set = %set.name, builders = partial.len(), groups = groups.len(), "Merging builder set");
            trigger_groups.extend(groups);
            registry = registry.extend(set.builders)?;
        }

        info!(
            project = %project.name,
            workers = workers.len(),
            builders = registry.len(),
            schedulers = trigger_groups.len(),
            "Loaded master configuration"
        );

        Ok(Self {
            project,
            listener,
            change_source,
            workers,
            locks,
            pipelines,
            registry,
            trigger_groups,
            status,
        })
    }

    pub fn worker(&self, name: &str) -> Option<&WorkerConfig> {
        self.workers.iter().find(|w| w.name.as_str() == name)
    }

    pub fn trigger_group(&self, name: &str) -> Option<&TriggerGroup> {
        self.trigger_groups.iter().find(|g| g.name == name)
    }

    pub fn pipeline(&self, name: &str) -> Option<&PipelineSpec> {
        self.pipelines.iter().find(|p| p.name == name)
    }
}

fn parse_builder_set(node: &KdlNode) -> ConfigResult<BuilderSet> {
    let name = required_name(node, "builder-set name")?;
    let mut set = BuilderSet {
        name,
        ..Default::default()
    };

    for child in node.children().into_iter().flat_map(|doc| doc.nodes()) {
        match child.name().value() {
            "builder" => set.builders.push(parse_builder(child)?),
            "scheduler" => set.plan.push(parse_scheduler(child)?),
            other => {
                return Err(ConfigError::invalid(
                    "builder-set",
                    format!("unexpected node '{}' in set '{}'", other, set.name),
                ));
            }
        }
    }

    Ok(set)
}

fn check_unique<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::Duplicate(format!("{} '{}'", kind, name)));
        }
    }
    Ok(())
}

/// Names a builder may refer to.
struct References<'a> {
    workers: HashSet<&'a str>,
    locks: HashSet<&'a str>,
    pipelines: HashSet<&'a str>,
}

impl<'a> References<'a> {
    fn new(workers: &'a [WorkerConfig], locks: &'a [LockSpec], pipelines: &'a [PipelineSpec]) -> Self {
        Self {
            workers: workers.iter().map(|w| w.name.as_str()).collect(),
            locks: locks.iter().map(|l| l.name.as_str()).collect(),
            pipelines: pipelines.iter().map(|p| p.name.as_str()).collect(),
        }
    }

    fn check(&self, builder: &BuilderDefinition) -> ConfigResult<()> {
        for worker in &builder.eligible_workers {
            if !self.workers.contains(worker.as_str()) {
                return Err(ConfigError::InvalidReference(format!(
                    "builder '{}' uses unknown worker '{}'",
                    builder.name, worker
                )));
            }
        }
        for lock in &builder.resource_locks {
            if !self.locks.contains(lock.name.as_str()) {
                return Err(ConfigError::InvalidReference(format!(
                    "builder '{}' uses unknown lock '{}'",
                    builder.name, lock.name
                )));
            }
        }
        if !self.pipelines.contains(builder.pipeline.as_str()) {
            return Err(ConfigError::InvalidReference(format!(
                "builder '{}' uses unknown pipeline '{}'",
                builder.name, builder.pipeline
            )));
        }
        Ok(())
    }
}
