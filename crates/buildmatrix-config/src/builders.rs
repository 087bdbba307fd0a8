//! Builder and lock declarations.

use buildmatrix_core::lock::{LockAccess, LockRef, LockSpec};
use buildmatrix_core::{BuilderDefinition, Category, PipelineRef};
use kdl::KdlNode;

use crate::nodes::{children_named, int_prop, required_name, string_list, string_prop};
use crate::{ConfigError, ConfigResult};

pub(crate) fn parse_builder(node: &KdlNode) -> ConfigResult<BuilderDefinition> {
    let name = required_name(node, "builder name")?;

    let raw_category = string_prop(node, "category")
        .ok_or_else(|| ConfigError::MissingField(format!("category for builder '{}'", name)))?;
    let category: Category =
        raw_category
            .parse()
            .map_err(|_| buildmatrix_core::Error::UnknownCategory {
                builder: name.clone(),
                category: raw_category.clone(),
            })?;

    let pipeline = string_prop(node, "pipeline")
        .ok_or_else(|| ConfigError::MissingField(format!("pipeline for builder '{}'", name)))?;

    let mut builder = BuilderDefinition::new(name, category, PipelineRef::new(pipeline))
        .with_workers(string_list(node, "workers"));
    if let Some(dir) = string_prop(node, "builddir") {
        builder = builder.with_build_directory(dir);
    }

    for lock in children_named(node, "lock") {
        let lock_name = required_name(lock, "lock reference")?;
        let access = match string_prop(lock, "access") {
            Some(access) => access.parse::<LockAccess>()?,
            None => LockAccess::Counting,
        };
        builder = builder.with_lock(LockRef {
            name: lock_name,
            access,
        });
    }

    Ok(builder)
}

pub(crate) fn parse_lock(node: &KdlNode) -> ConfigResult<LockSpec> {
    let name = required_name(node, "lock name")?;
    let max = int_prop::<u32>(node, "max")?.unwrap_or(1);
    Ok(LockSpec::new(name, max)?)
}
