// Helpers for extracting values from KDL nodes.

use kdl::KdlNode;
use std::time::Duration;

use crate::{ConfigError, ConfigResult};

pub(crate) fn first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// The node's first positional string, or `MissingField(what)`.
pub(crate) fn required_name(node: &KdlNode, what: &str) -> ConfigResult<String> {
    first_string_arg(node)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingField(what.to_string()))
}

pub(crate) fn all_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

pub(crate) fn string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

pub(crate) fn bool_prop(node: &KdlNode, name: &str) -> Option<bool> {
    node.get(name).and_then(|v| v.as_bool())
}

/// An integer property that must fit in `T`.
pub(crate) fn int_prop<T: TryFrom<i128>>(node: &KdlNode, name: &str) -> ConfigResult<Option<T>> {
    let Some(value) = node.get(name) else {
        return Ok(None);
    };
    let raw = value
        .as_integer()
        .ok_or_else(|| ConfigError::invalid(name, "expected an integer"))?;
    T::try_from(raw)
        .map(Some)
        .map_err(|_| ConfigError::invalid(name, format!("{} is out of range", raw)))
}

/// A whole-seconds property.
pub(crate) fn seconds_prop(node: &KdlNode, name: &str) -> ConfigResult<Option<Duration>> {
    Ok(int_prop::<u64>(node, name)?.map(Duration::from_secs))
}

/// A list given either as a whitespace-separated property (`days="mon fri"`)
/// or as the arguments of a child node (`days "mon" "fri"`).
pub(crate) fn string_list(node: &KdlNode, name: &str) -> Vec<String> {
    if let Some(joined) = string_prop(node, name) {
        return joined.split_whitespace().map(|s| s.to_string()).collect();
    }

    node.children()
        .into_iter()
        .flat_map(|doc| doc.nodes())
        .filter(|child| child.name().value() == name)
        .flat_map(all_string_args)
        .collect()
}

/// Child nodes with the given name.
pub(crate) fn children_named<'a>(
    node: &'a KdlNode,
    name: &'a str,
) -> impl Iterator<Item = &'a KdlNode> + 'a {
    node.children()
        .into_iter()
        .flat_map(|doc| doc.nodes())
        .filter(move |child| child.name().value() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdl::KdlDocument;

    fn node(text: &str) -> KdlNode {
        let doc: KdlDocument = text.parse().unwrap();
        doc.nodes()[0].clone()
    }

    #[test]
    fn test_string_list_from_property() {
        let n = node(r#"scheduler "a" categories="supported unsupported""#);
        assert_eq!(string_list(&n, "categories"), vec!["supported", "unsupported"]);
    }

    #[test]
    fn test_string_list_from_children() {
        let n = node(
            r#"
            builder "a" {
                workers "bot-1" "bot-2"
                workers "bot-3"
            }
            "#,
        );
        assert_eq!(string_list(&n, "workers"), vec!["bot-1", "bot-2", "bot-3"]);
    }

    #[test]
    fn test_int_prop_range() {
        let n = node(r#"worker "a" max-builds=300"#);
        assert_eq!(int_prop::<u32>(&n, "max-builds").unwrap(), Some(300));
        assert!(int_prop::<u8>(&n, "max-builds").is_err());
        assert_eq!(int_prop::<u32>(&n, "missing").unwrap(), None);
    }

    #[test]
    fn test_required_name() {
        assert_eq!(required_name(&node(r#"lock "cpu-1""#), "lock name").unwrap(), "cpu-1");
        assert!(matches!(
            required_name(&node("lock"), "lock name"),
            Err(ConfigError::MissingField(_))
        ));
    }
}
