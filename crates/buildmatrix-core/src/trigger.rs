//! Trigger groups and their derivation from the registry.
//!
//! A trigger group ("scheduler") names the builders to enqueue when it fires.
//! Membership is a pure function of the registry: groups are derived once
//! and never mutated, so extending the registry later does not change them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::builder::Category;
use crate::change::{Change, ChangeFilter};
use crate::registry::Registry;
use crate::schedule::Schedule;
use crate::{Error, Result};

/// An operator-suppliable parameter on a manual trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualParameter {
    pub name: String,
    pub label: String,
    pub default: String,
}

impl ManualParameter {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            default: default.into(),
        }
    }

    /// The free-text branch and test-case parameters every forced build accepts.
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new("branch", "Branch", ""),
            Self::new("test-case", "Test case", "twisted"),
        ]
    }
}

/// When a trigger group fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Activation {
    /// On every accepted change, once the tree has been quiet for `tree_stable_timer`.
    Continuous {
        tree_stable_timer: Option<Duration>,
        change_filter: ChangeFilter,
    },
    /// On a calendar schedule, optionally only if something changed since the last run.
    Scheduled {
        schedule: Schedule,
        only_if_changed: bool,
    },
    /// Only on explicit operator request.
    Manual { parameters: Vec<ManualParameter> },
}

impl Activation {
    pub fn continuous() -> Self {
        Activation::Continuous {
            tree_stable_timer: None,
            change_filter: ChangeFilter::default(),
        }
    }

    pub fn scheduled(schedule: Schedule) -> Self {
        Activation::Scheduled {
            schedule,
            only_if_changed: false,
        }
    }

    pub fn manual() -> Self {
        Activation::Manual {
            parameters: ManualParameter::standard(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Activation::Continuous { .. } => "continuous",
            Activation::Scheduled { .. } => "scheduled",
            Activation::Manual { .. } => "manual",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.kind())
    }
}

/// Which builders a group selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// Every builder whose category is listed.
    Categories(Vec<Category>),
    /// A fixed set of builders, by name.
    Builders(Vec<String>),
}

/// Declaration of one trigger group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    pub selection: Selection,
    pub activation: Activation,
}

impl GroupSpec {
    pub fn for_categories(
        name: impl Into<String>,
        categories: impl IntoIterator<Item = Category>,
        activation: Activation,
    ) -> Self {
        Self {
            name: name.into(),
            selection: Selection::Categories(categories.into_iter().collect()),
            activation,
        }
    }

    pub fn for_builders<I, S>(name: impl Into<String>, builders: I, activation: Activation) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            selection: Selection::Builders(builders.into_iter().map(Into::into).collect()),
            activation,
        }
    }
}

/// The ordered set of groups to derive from a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPlan {
    pub groups: Vec<GroupSpec>,
}

impl TriggerPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, spec: GroupSpec) -> Self {
        self.groups.push(spec);
        self
    }

    pub fn push(&mut self, spec: GroupSpec) {
        self.groups.push(spec);
    }

    /// Categories selected by at least one group.
    pub fn covered_categories(&self) -> HashSet<Category> {
        self.groups
            .iter()
            .filter_map(|g| match &g.selection {
                Selection::Categories(cats) => Some(cats.iter().copied()),
                Selection::Builders(_) => None,
            })
            .flatten()
            .collect()
    }

    /// Builders selected by name in at least one group.
    pub fn named_builders(&self) -> HashSet<&str> {
        self.groups
            .iter()
            .filter_map(|g| match &g.selection {
                Selection::Builders(names) => Some(names.iter().map(String::as_str)),
                Selection::Categories(_) => None,
            })
            .flatten()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// A derived trigger group: the builders to enqueue when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerGroup {
    pub name: String,
    pub activation: Activation,
    pub members: Vec<String>,
}

impl TriggerGroup {
    /// Whether a change notification should fire this group.
    pub fn fires_on(&self, change: &Change) -> bool {
        match &self.activation {
            Activation::Continuous { change_filter, .. } => change_filter.is_important(change),
            Activation::Scheduled { .. } | Activation::Manual { .. } => false,
        }
    }

    pub fn contains(&self, builder: &str) -> bool {
        self.members.iter().any(|m| m == builder)
    }
}

/// Derive one trigger group per plan entry, in plan order.
///
/// Members are listed in the registry's declared order. Every builder must
/// be reachable from some group, either through its category or by name; a
/// selection that matches nothing yields an empty group.
pub fn derive_trigger_groups(registry: &Registry, plan: &TriggerPlan) -> Result<Vec<TriggerGroup>> {
    let mut names = HashSet::new();
    for spec in &plan.groups {
        if !names.insert(spec.name.as_str()) {
            return Err(Error::DuplicateTriggerGroup(spec.name.clone()));
        }
    }

    let covered = plan.covered_categories();
    let named = plan.named_builders();
    if let Some(builder) = registry
        .iter()
        .find(|b| !covered.contains(&b.category) && !named.contains(b.name.as_str()))
    {
        return Err(Error::UnknownCategory {
            builder: builder.name.clone(),
            category: builder.category.to_string(),
        });
    }

    let mut groups = Vec::with_capacity(plan.groups.len());
    for spec in &plan.groups {
        let members: Vec<String> = match &spec.selection {
            Selection::Categories(categories) => registry
                .iter()
                .filter(|b| categories.contains(&b.category))
                .map(|b| b.name.clone())
                .collect(),
            Selection::Builders(wanted) => {
                if let Some(missing) = wanted.iter().find(|n| !registry.contains(n)) {
                    return Err(Error::UnknownBuilder {
                        group: spec.name.clone(),
                        builder: missing.clone(),
                    });
                }
                registry
                    .iter()
                    .filter(|b| wanted.contains(&b.name))
                    .map(|b| b.name.clone())
                    .collect()
            }
        };

        if members.is_empty() {
            debug!(group = %spec.name, "Trigger group has no members");
        }
        info!(
            group = %spec.name,
            activation = spec.activation.kind(),
            members = members.len(),
            "Derived trigger group"
        );

        groups.push(TriggerGroup {
            name: spec.name.clone(),
            activation: spec.activation.clone(),
            members,
        });
    }

    Ok(groups)
}
