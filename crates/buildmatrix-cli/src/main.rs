//! buildmatrix CLI tool.

use buildmatrix_core::Category;
use buildmatrix_lint::CheckerKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "buildmatrix")]
#[command(about = "Build matrix master configuration tool", long_about = None)]
struct Cli {
    /// Path to the master configuration
    #[arg(long, env = "BUILDMATRIX_CONFIG", default_value = "master.kdl")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the master configuration
    Validate,
    /// List registered builders
    Builders {
        /// Only show builders in this category
        #[arg(long)]
        category: Option<Category>,
    },
    /// List derived trigger groups
    Schedulers {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare two lint logs and report new errors
    LintDiff {
        /// Checker that produced the logs
        #[arg(long)]
        checker: CheckerKind,
        /// Log from the baseline build
        previous: PathBuf,
        /// Log from the current build
        current: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate => {
            commands::validate(&cli.config)?;
        }
        Commands::Builders { category } => {
            commands::builders(&cli.config, category)?;
        }
        Commands::Schedulers { json } => {
            commands::schedulers(&cli.config, json)?;
        }
        Commands::LintDiff {
            checker,
            previous,
            current,
        } => {
            commands::lint::diff(checker, &previous, &current)?;
        }
    }

    Ok(())
}
