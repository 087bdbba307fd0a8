//! Secret resolution for worker credentials.
//!
//! Credentials never appear in the configuration file. A worker names the
//! key holding its password and the key is resolved once, at load time,
//! through a [`SecretSource`] handed to the parser.

use std::collections::HashMap;
use std::fmt;

/// A source of secret values keyed by name.
pub trait SecretSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads secrets from process environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecrets;

impl SecretSource for EnvSecrets {
    fn get(&self, key: &str) -> Option<String> {
        // Non-unicode values are treated as unset.
        std::env::var(key).ok()
    }
}

/// A fixed in-memory set of secrets.
#[derive(Debug, Default, Clone)]
pub struct StaticSecrets(HashMap<String, String>);

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl SecretSource for StaticSecrets {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// A resolved secret. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_secrets() {
        let secrets = StaticSecrets::new().with("BOT_PASSWORD", "hunter2");
        assert_eq!(secrets.get("BOT_PASSWORD").as_deref(), Some("hunter2"));
        assert_eq!(secrets.get("OTHER"), None);
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{:?}", secret), "Secret(***)");
        assert_eq!(secret.expose(), "hunter2");
    }
}
