//! KDL master configuration parsing for buildmatrix.
//!
//! This crate handles parsing of:
//! - Workers, the worker listener and the change source
//! - Locks, pipelines, builders and schedulers
//! - Auxiliary builder sets merged after trigger derivation
//! - Status sinks (chat bot, mail, build history)

mod builders;
pub mod error;
pub mod master;
mod nodes;
pub mod pipeline;
pub mod schedulers;
pub mod secrets;
pub mod system;

pub use error::{ConfigError, ConfigResult};
pub use master::MasterConfig;
pub use secrets::{EnvSecrets, SecretSource, StaticSecrets};
