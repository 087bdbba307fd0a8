//! CLI command implementations.

pub mod lint;

use anyhow::{Context, Result};
use buildmatrix_config::MasterConfig;
use buildmatrix_core::Category;
use std::path::Path;

fn load(path: &Path) -> Result<MasterConfig> {
    MasterConfig::load(path).with_context(|| format!("failed to load {}", path.display()))
}

pub fn validate(path: &Path) -> Result<()> {
    match MasterConfig::load(path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  project:        {}", config.project.name);
            println!("  workers:        {}", config.workers.len());
            println!("  builders:       {}", config.registry.len());
            println!("  trigger groups: {}", config.trigger_groups.len());
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn builders(path: &Path, category: Option<Category>) -> Result<()> {
    let config = load(path)?;

    println!("{:<28} {:<12} {:<16} WORKERS", "NAME", "CATEGORY", "PIPELINE");
    for builder in config
        .registry
        .iter()
        .filter(|b| category.is_none_or(|c| b.category == c))
    {
        let workers: Vec<&str> = builder.eligible_workers.iter().map(|w| w.as_str()).collect();
        println!(
            "{:<28} {:<12} {:<16} {}",
            builder.name,
            builder.category,
            builder.pipeline,
            workers.join(",")
        );
    }
    Ok(())
}

pub fn schedulers(path: &Path, json: bool) -> Result<()> {
    let config = load(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.trigger_groups)?);
        return Ok(());
    }

    for group in &config.trigger_groups {
        println!("{} ({})", group.name, group.activation);
        if group.members.is_empty() {
            println!("  (no builders)");
        }
        for member in &group.members {
            println!("  {}", member);
        }
    }
    Ok(())
}
