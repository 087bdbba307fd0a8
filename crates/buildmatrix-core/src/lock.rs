//! Resource lock declarations.
//!
//! Locks are declarative: the execution engine acquires and releases them.
//! This module only checks that names and access modes are well-formed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::{Error, Result};

static LOCK_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

/// How a builder holds a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockAccess {
    /// Takes one of the lock's `max_count` slots.
    Counting,
    /// Takes every slot.
    Exclusive,
}

impl fmt::Display for LockAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockAccess::Counting => f.pad("counting"),
            LockAccess::Exclusive => f.pad("exclusive"),
        }
    }
}

impl FromStr for LockAccess {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "counting" => Ok(LockAccess::Counting),
            "exclusive" => Ok(LockAccess::Exclusive),
            other => Err(Error::MalformedLockReference(format!(
                "unsupported access mode '{}'",
                other
            ))),
        }
    }
}

/// A named capacity token shared by builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSpec {
    pub name: String,
    /// Maximum number of concurrent counting holders.
    pub max_count: u32,
}

impl LockSpec {
    pub fn new(name: impl Into<String>, max_count: u32) -> Result<Self> {
        let name = name.into();
        validate_lock_name(&name)?;
        if max_count == 0 {
            return Err(Error::MalformedLockReference(format!(
                "lock '{}' must allow at least one holder",
                name
            )));
        }
        Ok(Self { name, max_count })
    }
}

/// A builder's reference to a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRef {
    pub name: String,
    pub access: LockAccess,
}

impl LockRef {
    pub fn counting(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: LockAccess::Counting,
        }
    }

    pub fn exclusive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: LockAccess::Exclusive,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_lock_name(&self.name)
    }
}

/// Check that a lock name is a non-empty token.
pub fn validate_lock_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::MalformedLockReference("empty lock name".to_string()));
    }
    if !LOCK_NAME_REGEX.is_match(name) {
        return Err(Error::MalformedLockReference(format!(
            "'{}' is not a valid lock name",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_lock_names() {
        for name in ["cpu-1", "cpu.2", "Bench_Lock"] {
            assert!(validate_lock_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_malformed_lock_names() {
        for name in ["", "-cpu", "cpu 1", "cpu/1"] {
            assert!(matches!(
                validate_lock_name(name),
                Err(Error::MalformedLockReference(_))
            ));
        }
    }

    #[test]
    fn test_access_mode_parsing() {
        assert_eq!("counting".parse::<LockAccess>().unwrap(), LockAccess::Counting);
        assert_eq!("exclusive".parse::<LockAccess>().unwrap(), LockAccess::Exclusive);
        assert!(matches!(
            "shared".parse::<LockAccess>(),
            Err(Error::MalformedLockReference(_))
        ));
        assert_eq!(format!("{:<10}|", LockAccess::Counting), "counting  |");
    }

    #[test]
    fn test_zero_capacity_lock_rejected() {
        assert!(LockSpec::new("cpu-1", 0).is_err());
        assert_eq!(LockSpec::new("cpu-2", 2).unwrap().max_count, 2);
    }
}
