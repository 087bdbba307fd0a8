//! Workers, the worker listener, the change source and status sinks.

use buildmatrix_core::WorkerName;
use buildmatrix_core::change::Change;
use kdl::KdlNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::nodes::{
    all_string_args, bool_prop, children_named, int_prop, required_name, seconds_prop,
    string_list, string_prop,
};
use crate::secrets::{Secret, SecretSource};
use crate::{ConfigError, ConfigResult};

pub const DEFAULT_LISTENER_PORT: u16 = 9989;
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(600);

/// A remote worker allowed to connect to the master.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub name: WorkerName,
    pub password: Secret,
    /// Concurrent builds allowed on this worker; unbounded when `None`.
    pub max_builds: Option<u32>,
    /// Recipients notified when the worker goes missing.
    pub notify_on_missing: Vec<String>,
    /// Ping interval for the worker connection.
    pub keepalive: Duration,
}

/// Where workers connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerConfig {
    pub port: u16,
    /// Enable TCP keepalive on accepted worker sockets.
    pub tcp_keepalive: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_LISTENER_PORT,
            tcp_keepalive: false,
        }
    }
}

/// The long-lived listener receiving commit events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSourceConfig {
    pub kind: String,
    pub port: Option<u16>,
    /// Path prefix stripped from incoming file names.
    pub prefix: Option<String>,
}

impl ChangeSourceConfig {
    /// Strip the configured prefix; `None` for paths outside it.
    pub fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        match &self.prefix {
            Some(prefix) => path.strip_prefix(prefix.as_str()),
            None => Some(path),
        }
    }

    /// Rewrite a change's paths relative to the prefix, dropping the change
    /// if none of its files fall under it.
    pub fn accept(&self, mut change: Change) -> Option<Change> {
        change.files = change
            .files
            .iter()
            .filter_map(|f| self.strip_prefix(f))
            .map(|f| f.to_string())
            .collect();
        (!change.files.is_empty()).then_some(change)
    }
}

/// When a status sink reports a finished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMode {
    /// Every build.
    All,
    /// Every failing build.
    Failing,
    /// Only builds that newly broke.
    Problem,
}

impl FromStr for NotifyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s {
            "all" => Ok(NotifyMode::All),
            "failing" => Ok(NotifyMode::Failing),
            "problem" => Ok(NotifyMode::Problem),
            other => Err(ConfigError::invalid(
                "notify mode",
                format!("unknown mode '{}'", other),
            )),
        }
    }
}

impl fmt::Display for NotifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyMode::All => f.pad("all"),
            NotifyMode::Failing => f.pad("failing"),
            NotifyMode::Problem => f.pad("problem"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrcConfig {
    pub host: String,
    pub port: u16,
    pub nick: String,
    pub channels: Vec<String>,
    pub mode: NotifyMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailConfig {
    pub from: String,
    pub recipients: Vec<String>,
    pub mode: NotifyMode,
}

/// Status sinks fed by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    pub irc: Option<IrcConfig>,
    pub mail: Option<MailConfig>,
    /// Port of the persistent build-history listener.
    pub history_port: Option<u16>,
}

pub(crate) fn parse_worker(node: &KdlNode, secrets: &dyn SecretSource) -> ConfigResult<WorkerConfig> {
    let name = required_name(node, "worker name")?;
    let key = string_prop(node, "password-env")
        .ok_or_else(|| ConfigError::MissingField(format!("password-env for worker '{}'", name)))?;
    let password = secrets
        .get(&key)
        .map(Secret::new)
        .ok_or(ConfigError::MissingSecret(key))?;

    let max_builds = int_prop::<u32>(node, "max-builds")?;
    if max_builds == Some(0) {
        return Err(ConfigError::invalid(
            "max-builds",
            format!("worker '{}' must allow at least one build", name),
        ));
    }

    Ok(WorkerConfig {
        name: WorkerName::new(name),
        password,
        max_builds,
        notify_on_missing: string_list(node, "notify"),
        keepalive: seconds_prop(node, "keepalive")?.unwrap_or(DEFAULT_KEEPALIVE),
    })
}

pub(crate) fn parse_listener(node: &KdlNode) -> ConfigResult<ListenerConfig> {
    Ok(ListenerConfig {
        port: int_prop::<u16>(node, "port")?.unwrap_or(DEFAULT_LISTENER_PORT),
        tcp_keepalive: bool_prop(node, "tcp-keepalive").unwrap_or(false),
    })
}

pub(crate) fn parse_change_source(node: &KdlNode) -> ConfigResult<ChangeSourceConfig> {
    let kind = required_name(node, "change-source kind")?;
    let prefix = string_prop(node, "prefix").filter(|p| !p.is_empty());
    Ok(ChangeSourceConfig {
        kind,
        port: int_prop::<u16>(node, "port")?,
        prefix,
    })
}

pub(crate) fn parse_status(node: &KdlNode) -> ConfigResult<StatusConfig> {
    let mut status = StatusConfig::default();

    for child in node.children().into_iter().flat_map(|doc| doc.nodes()) {
        match child.name().value() {
            "irc" => {
                let host = string_prop(child, "host")
                    .ok_or_else(|| ConfigError::MissingField("irc host".to_string()))?;
                let nick = string_prop(child, "nick")
                    .ok_or_else(|| ConfigError::MissingField("irc nick".to_string()))?;
                status.irc = Some(IrcConfig {
                    host,
                    port: int_prop::<u16>(child, "port")?.unwrap_or(6667),
                    nick,
                    channels: string_list(child, "channel"),
                    mode: notify_mode(child)?,
                });
            }
            "mail" => {
                let from = string_prop(child, "from")
                    .ok_or_else(|| ConfigError::MissingField("mail from".to_string()))?;
                let recipients: Vec<String> =
                    children_named(child, "to").flat_map(all_string_args).collect();
                if recipients.is_empty() {
                    return Err(ConfigError::MissingField("mail recipients".to_string()));
                }
                status.mail = Some(MailConfig {
                    from,
                    recipients,
                    mode: notify_mode(child)?,
                });
            }
            "history" => {
                status.history_port = Some(
                    int_prop::<u16>(child, "port")?
                        .ok_or_else(|| ConfigError::MissingField("history port".to_string()))?,
                );
            }
            other => {
                return Err(ConfigError::invalid(
                    "status",
                    format!("unknown status sink '{}'", other),
                ));
            }
        }
    }

    Ok(status)
}

fn notify_mode(node: &KdlNode) -> ConfigResult<NotifyMode> {
    string_prop(node, "mode")
        .map(|m| m.parse::<NotifyMode>())
        .transpose()
        .map(|m| m.unwrap_or(NotifyMode::Problem))
}
