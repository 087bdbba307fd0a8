//! Scheduler (trigger group) declarations.

use buildmatrix_core::change::ChangeFilter;
use buildmatrix_core::schedule::Schedule;
use buildmatrix_core::trigger::ManualParameter;
use buildmatrix_core::{Activation, Category, GroupSpec, Selection};
use chrono::Weekday;
use kdl::KdlNode;

use crate::nodes::{
    bool_prop, children_named, int_prop, required_name, seconds_prop, string_list, string_prop,
};
use crate::{ConfigError, ConfigResult};

/// Parse a `scheduler` node into a group declaration.
pub fn parse_scheduler(node: &KdlNode) -> ConfigResult<GroupSpec> {
    let name = required_name(node, "scheduler name")?;
    let kind = string_prop(node, "kind")
        .ok_or_else(|| ConfigError::MissingField(format!("kind for scheduler '{}'", name)))?;

    let selection = parse_selection(node, &name)?;
    let activation = match kind.as_str() {
        "continuous" => parse_continuous(node)?,
        "scheduled" => parse_scheduled(node)?,
        "manual" => parse_manual(node)?,
        other => {
            return Err(ConfigError::invalid(
                "scheduler kind",
                format!("unknown kind '{}' for scheduler '{}'", other, name),
            ));
        }
    };

    Ok(GroupSpec {
        name,
        selection,
        activation,
    })
}

fn parse_selection(node: &KdlNode, name: &str) -> ConfigResult<Selection> {
    let categories = string_list(node, "categories");
    let builders = string_list(node, "builders");

    match (categories.is_empty(), builders.is_empty()) {
        (false, true) => {
            let parsed = categories
                .iter()
                .map(|c| {
                    c.parse::<Category>()
                        .map_err(|e| ConfigError::invalid("categories", e.to_string()))
                })
                .collect::<ConfigResult<Vec<_>>>()?;
            Ok(Selection::Categories(parsed))
        }
        (true, false) => Ok(Selection::Builders(builders)),
        (false, false) => Err(ConfigError::invalid(
            "scheduler selection",
            format!("scheduler '{}' lists both categories and builders", name),
        )),
        (true, true) => Err(ConfigError::MissingField(format!(
            "categories or builders for scheduler '{}'",
            name
        ))),
    }
}

fn parse_continuous(node: &KdlNode) -> ConfigResult<Activation> {
    let change_filter = if bool_prop(node, "filter-changes") == Some(false) {
        ChangeFilter::accept_all()
    } else {
        let ignored = string_list(node, "ignore");
        if ignored.is_empty() {
            ChangeFilter::default()
        } else {
            ChangeFilter {
                ignored_prefixes: ignored,
            }
        }
    };

    Ok(Activation::Continuous {
        tree_stable_timer: seconds_prop(node, "tree-stable-timer")?,
        change_filter,
    })
}

fn parse_scheduled(node: &KdlNode) -> ConfigResult<Activation> {
    let schedule = match seconds_prop(node, "interval")? {
        Some(interval) => Schedule::periodic(interval)?,
        None => {
            let hour = int_prop::<u32>(node, "hour")?
                .ok_or_else(|| ConfigError::MissingField("hour or interval".to_string()))?;
            let minute = int_prop::<u32>(node, "minute")?.unwrap_or(0);
            let days = string_list(node, "days")
                .iter()
                .map(|d| {
                    d.parse::<Weekday>()
                        .map_err(|_| ConfigError::invalid("days", format!("unknown day '{}'", d)))
                })
                .collect::<ConfigResult<Vec<_>>>()?;
            Schedule::weekly(days, hour, minute)?
        }
    };

    Ok(Activation::Scheduled {
        schedule,
        only_if_changed: bool_prop(node, "only-if-changed").unwrap_or(false),
    })
}

fn parse_manual(node: &KdlNode) -> ConfigResult<Activation> {
    let mut parameters = Vec::new();
    for param in children_named(node, "parameter") {
        let name = required_name(param, "parameter name")?;
        let label = string_prop(param, "label").unwrap_or_else(|| name.clone());
        let default = string_prop(param, "default").unwrap_or_default();
        parameters.push(ManualParameter::new(name, label, default));
    }
    if parameters.is_empty() {
        parameters = ManualParameter::standard();
    }
    Ok(Activation::Manual { parameters })
}
