// src/css/prefix.rs

use std::path::Path;

use crate::css::printer::print_pretty;
use crate::css::{parse, Dialect, Node};
use crate::pipeline::{Stage, StageError};

/// Properties that still need vendor prefixes for the browsers we target.
const PROPERTY_PREFIXES: &[(&str, &[&str])] = &[
    ("appearance", &["-webkit-", "-moz-"]),
    ("backdrop-filter", &["-webkit-"]),
    ("backface-visibility", &["-webkit-"]),
    ("box-decoration-break", &["-webkit-"]),
    ("hyphens", &["-webkit-", "-ms-"]),
    ("mask-image", &["-webkit-"]),
    ("tab-size", &["-moz-"]),
    ("text-size-adjust", &["-webkit-", "-moz-", "-ms-"]),
    ("user-select", &["-webkit-", "-moz-", "-ms-"]),
];

/// `(property, value, prefixed value)`
const VALUE_PREFIXES: &[(&str, &str, &str)] = &[("position", "sticky", "-webkit-sticky")];

/// Inserts vendor-prefixed declarations ahead of the standard one.
///
/// A prefixed form that the author already wrote in the same block is left
/// alone, so running the stage twice is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct Autoprefix;

impl Stage for Autoprefix {
    fn name(&self) -> &'static str {
        "autoprefix"
    }

    fn apply(&self, _path: &Path, input: &str) -> Result<String, StageError> {
        let nodes = parse(input, Dialect::Css)?;
        Ok(print_pretty(&prefix_block(nodes)))
    }
}

fn prefix_block(nodes: Vec<Node>) -> Vec<Node> {
    let existing: Vec<(String, String)> = nodes
        .iter()
        .filter_map(|n| match n {
            Node::Declaration {
                property, value, ..
            } => Some((property.to_ascii_lowercase(), value.clone())),
            _ => None,
        })
        .collect();
    let has = |property: &str, value: Option<&str>| {
        existing
            .iter()
            .any(|(p, v)| p == property && value.is_none_or(|value| v == value))
    };

    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Declaration {
                property,
                value,
                line,
            } => {
                let lower = property.to_ascii_lowercase();
                if let Some((_, prefixes)) = PROPERTY_PREFIXES.iter().find(|(p, _)| *p == lower) {
                    for prefix in prefixes.iter() {
                        let prefixed = format!("{prefix}{lower}");
                        if !has(prefixed.as_str(), None) {
                            out.push(Node::Declaration {
                                property: prefixed,
                                value: value.clone(),
                                line,
                            });
                        }
                    }
                }
                for (p, v, prefixed_value) in VALUE_PREFIXES {
                    if *p == lower && value.eq_ignore_ascii_case(v) && !has(*p, Some(*prefixed_value)) {
                        out.push(Node::Declaration {
                            property: property.clone(),
                            value: (*prefixed_value).to_string(),
                            line,
                        });
                    }
                }
                out.push(Node::Declaration {
                    property,
                    value,
                    line,
                });
            }
            Node::Rule {
                selector,
                body,
                line,
            } => out.push(Node::Rule {
                selector,
                body: prefix_block(body),
                line,
            }),
            Node::AtRule {
                name,
                prelude,
                body,
                line,
            } => out.push(Node::AtRule {
                name,
                prelude,
                body: body.map(prefix_block),
                line,
            }),
            other => out.push(other),
        }
    }
    out
}
