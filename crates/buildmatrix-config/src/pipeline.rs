//! Pipeline declarations.
//!
//! Pipelines belong to the execution engine. The master configuration only
//! names them, records the source checkout they start with and lists their
//! steps so builders can be checked against something real.

use kdl::KdlNode;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

use crate::nodes::{first_string_arg, required_name, string_prop};
use crate::{ConfigError, ConfigResult};

/// How the worker refreshes its source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    /// Update an existing checkout in place.
    Update,
    /// Keep a pristine checkout and copy it for each build.
    Copy,
    /// Export a fresh tree without version-control metadata.
    Export,
}

impl FromStr for CheckoutMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s {
            "update" => Ok(CheckoutMode::Update),
            "copy" => Ok(CheckoutMode::Copy),
            "export" => Ok(CheckoutMode::Export),
            other => Err(ConfigError::invalid(
                "checkout mode",
                format!("unknown mode '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCheckout {
    pub repository: Url,
    pub mode: CheckoutMode,
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub name: String,
    pub checkout: Option<SourceCheckout>,
    /// Engine step names, run in order.
    pub steps: Vec<String>,
}

pub(crate) fn parse_pipeline(node: &KdlNode) -> ConfigResult<PipelineSpec> {
    let name = required_name(node, "pipeline name")?;
    let mut checkout = None;
    let mut steps = Vec::new();

    for child in node.children().into_iter().flat_map(|doc| doc.nodes()) {
        match child.name().value() {
            "checkout" => {
                if checkout.is_some() {
                    return Err(ConfigError::Duplicate(format!(
                        "checkout in pipeline '{}'",
                        name
                    )));
                }
                checkout = Some(parse_checkout(child)?);
            }
            "step" => {
                let step = first_string_arg(child).ok_or_else(|| {
                    ConfigError::MissingField(format!("step name in pipeline '{}'", name))
                })?;
                steps.push(step);
            }
            _ => {}
        }
    }

    Ok(PipelineSpec {
        name,
        checkout,
        steps,
    })
}

fn parse_checkout(node: &KdlNode) -> ConfigResult<SourceCheckout> {
    let raw = required_name(node, "checkout repository")?;
    let repository =
        Url::parse(&raw).map_err(|e| ConfigError::invalid("checkout repository", e.to_string()))?;
    let mode = match string_prop(node, "mode") {
        Some(mode) => mode.parse()?,
        None => CheckoutMode::Update,
    };

    Ok(SourceCheckout {
        repository,
        mode,
        default_branch: string_prop(node, "branch"),
    })
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
    fn test_parse_pipeline() {
        let pipeline = parse_pipeline(&node(
            r#"
            pipeline "full" {
                checkout "svn://svn.example.org/project/trunk" mode="copy"
                step "compile"
                step "remove-pyc"
                step "trial"
            }
            "#,
        ))
        .unwrap();

        assert_eq!(pipeline.name, "full");
        assert_eq!(pipeline.steps, vec!["compile", "remove-pyc", "trial"]);
        let checkout = pipeline.checkout.unwrap();
        assert_eq!(checkout.mode, CheckoutMode::Copy);
        assert_eq!(checkout.repository.scheme(), "svn");
    }

    #[test]
    fn test_bad_checkout_mode() {
        let result = parse_pipeline(&node(
            r#"
            pipeline "full" {
                checkout "https://example.org/repo" mode="clobber"
            }
            "#,
        ));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_bad_repository_url() {
        let result = parse_pipeline(&node(
            r#"
            pipeline "full" {
                checkout "not a url"
            }
            "#,
        ));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
