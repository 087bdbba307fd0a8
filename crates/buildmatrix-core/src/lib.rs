//! Core domain types for the buildmatrix master configuration.
//!
//! This crate contains:
//! - Builder definitions and their categories
//! - Resource lock declarations
//! - The immutable builder registry
//! - Trigger group derivation (continuous, scheduled, manual)
//! - Calendar schedules and change filtering

pub mod builder;
pub mod change;
pub mod error;
pub mod lock;
pub mod registry;
pub mod schedule;
pub mod trigger;

pub use builder::{BuilderDefinition, Category, PipelineRef, WorkerName};
pub use error::{Error, Result};
pub use registry::Registry;
pub use trigger::{Activation, GroupSpec, Selection, TriggerGroup, TriggerPlan, derive_trigger_groups};
