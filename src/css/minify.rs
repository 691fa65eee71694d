// src/css/minify.rs

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::css::printer::print_compact;
use crate::css::{parse, Dialect, Node};
use crate::pipeline::{Stage, StageError};

/// Quoted strings are matched first in every pattern so their contents are
/// never rewritten.
const STRING: &str = r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{STRING}|(\s+)")).expect("whitespace regex is valid")
});

static SELECTOR_PUNCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{STRING}|\s*([,>~+])\s*")).expect("selector regex is valid")
});

static VALUE_PUNCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{STRING}|\s*(,)\s*|\s*(!)\s*")).expect("value regex is valid")
});

static PRELUDE_PUNCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{STRING}|\s*([,:])\s*|(\()\s+|\s+(\))")).expect("prelude regex is valid")
});

/// Compacts a stylesheet: drops comments (except `/*!` banners) and empty
/// rules, collapses whitespace and removes optional separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minify;

impl Stage for Minify {
    fn name(&self) -> &'static str {
        "clean-css"
    }

    fn apply(&self, _path: &Path, input: &str) -> Result<String, StageError> {
        let nodes = parse(input, Dialect::Css)?;
        Ok(print_compact(&minify_block(nodes)))
    }
}

fn minify_block(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::Rule {
                selector,
                body,
                line,
            } => {
                let body = minify_block(body);
                (!body.is_empty()).then(|| Node::Rule {
                    selector: tighten(&SELECTOR_PUNCT, &collapse(&selector)),
                    body,
                    line,
                })
            }
            Node::Declaration {
                property,
                value,
                line,
            } => Some(Node::Declaration {
                property: normalize_property(property),
                value: tighten(&VALUE_PUNCT, &collapse(&value)),
                line,
            }),
            Node::AtRule {
                name,
                prelude,
                body,
                line,
            } => {
                let prelude = tighten(&PRELUDE_PUNCT, &collapse(&prelude));
                match body {
                    None => Some(Node::AtRule {
                        name,
                        prelude,
                        body: None,
                        line,
                    }),
                    Some(body) => {
                        let body = minify_block(body);
                        (!body.is_empty()).then(|| Node::AtRule {
                            name,
                            prelude,
                            body: Some(body),
                            line,
                        })
                    }
                }
            }
            other => Some(other),
        })
        .collect()
}

/// Custom properties are case-sensitive and keep their spelling.
fn normalize_property(property: String) -> String {
    if property.starts_with("--") {
        property
    } else {
        property.to_ascii_lowercase()
    }
}

/// Replace every whitespace run outside strings with a single space.
fn collapse(text: &str) -> String {
    WHITESPACE
        .replace_all(text.trim(), |caps: &Captures| match caps.get(1) {
            Some(_) => " ".to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Drop whitespace around the punctuation captured by `re`.
fn tighten(re: &Regex, text: &str) -> String {
    re.replace_all(text, |caps: &Captures| {
        (1..caps.len())
            .find_map(|i| caps.get(i))
            .map_or_else(|| caps[0].to_string(), |m| m.as_str().to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> String {
        Minify.apply(Path::new("a.css"), src).unwrap()
    }

    #[test]
    fn compacts_rules() {
        let out = run("/* header */\n.a ,  .b > p {\n  color : red ;\n  font-family: \"Helvetica  Neue\" , sans-serif !important;\n}\n");
        assert_eq!(
            out,
            ".a,.b>p{color:red;font-family:\"Helvetica  Neue\",sans-serif!important}"
        );
    }

    #[test]
    fn drops_empty_rules_and_blocks() {
        assert_eq!(run("a { }\n@media print { b { } }\nc { top: 0 }"), "c{top:0}");
    }

    #[test]
    fn tightens_media_preludes() {
        assert_eq!(
            run("@media screen and ( min-width : 768px ) { a { top: 0; } }"),
            "@media screen and (min-width:768px){a{top:0}}"
        );
    }

    #[test]
    fn keeps_calc_operators_spaced() {
        assert_eq!(run("a { width: calc(100% - 10px); }"), "a{width:calc(100% - 10px)}");
    }

    #[test]
    fn custom_properties_keep_their_case() {
        assert_eq!(
            run("a { --Brand: red; COLOR: var(--Brand); }"),
            "a{--Brand:red;color:var(--Brand)}"
        );
    }

    #[test]
    fn keeps_license_banners() {
        let out = run("/*! lib v1 | MIT */\n/* note */\na { color: red; }");
        assert_eq!(out, "/*! lib v1 | MIT */a{color:red}");
    }
}
