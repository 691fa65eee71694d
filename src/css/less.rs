// src/css/less.rs

//! LESS subset compiler.
//!
//! Supported: `//` comments, block-scoped `@variables` (last definition wins,
//! may reference each other), nested rules with `&`, `@media`/`@supports`
//! bubbling out of rules, and `@{var}` interpolation in selectors, strings
//! and urls. Mixins, operations, guards and `@import` of other LESS files
//! are rejected.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::css::printer::print_pretty;
use crate::css::{parse, Dialect, Node};
use crate::pipeline::{Stage, StageError};

/// Matches a literal (a quoted string or an unquoted `url(...)`) or a
/// variable reference, either `@{name}` or `@name`. Inside literals only
/// `@{name}` is expanded.
static VAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|\burl\([^)"']*\)|@\{([\w-]+)\}|@([\w-]+)"#,
    )
    .expect("variable reference regex is valid")
});

static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@\{([\w-]+)\}").expect("interpolation regex is valid")
});

/// `url(@name)`: a bare variable as the whole url.
static URL_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^url\(\s*@([\w-]+)\s*\)$").expect("url variable regex is valid")
});

/// Conditional group rules that bubble up when nested inside a rule.
const BUBBLING_AT_RULES: &[&str] = &["media", "supports", "document"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Less;

impl Stage for Less {
    fn name(&self) -> &'static str {
        "less"
    }

    fn apply(&self, _path: &Path, input: &str) -> Result<String, StageError> {
        let nodes = parse(input, Dialect::Less)?;
        let flat = compile(&nodes)?;
        Ok(print_pretty(&flat))
    }
}

/// Flatten a parsed LESS tree into plain CSS nodes.
pub fn compile(nodes: &[Node]) -> Result<Vec<Node>, StageError> {
    let scope = Scope::new(nodes, None);
    let mut out = Vec::new();
    compile_block(nodes, &[], &scope, &mut out, 1)?;
    Ok(out)
}

struct Scope<'a> {
    vars: HashMap<String, String>,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    fn new(body: &[Node], parent: Option<&'a Scope<'a>>) -> Self {
        let mut vars = HashMap::new();
        for node in body {
            if let Node::Variable { name, value, .. } = node {
                vars.insert(name.clone(), value.clone());
            }
        }
        Self { vars, parent }
    }

    fn find(&self, name: &str) -> Option<(&str, &Scope<'a>)> {
        match self.vars.get(name) {
            Some(value) => Some((value.as_str(), self)),
            None => self.parent?.find(name),
        }
    }

    fn resolve(&self, text: &str, line: usize) -> Result<String, StageError> {
        self.substitute(text, line, &mut Vec::new())
    }

    fn substitute(
        &self,
        text: &str,
        line: usize,
        stack: &mut Vec<String>,
    ) -> Result<String, StageError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in VAR_REF.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let replacement = match caps.get(1).or_else(|| caps.get(2)) {
                Some(name) => self.lookup(name.as_str(), line, stack)?,
                None => self.interpolate(whole.as_str(), line, stack)?,
            };
            out.push_str(&text[last..whole.start()]);
            out.push_str(&replacement);
            last = whole.end();
        }

        out.push_str(&text[last..]);
        Ok(out)
    }

    /// Expand `@{name}` inside a string or url literal. A string variable
    /// is spliced in without its quotes.
    fn interpolate(
        &self,
        literal: &str,
        line: usize,
        stack: &mut Vec<String>,
    ) -> Result<String, StageError> {
        if let Some(name) = URL_VARIABLE.captures(literal).and_then(|c| c.get(1)) {
            let value = self.lookup(name.as_str(), line, stack)?;
            return Ok(format!("url({value})"));
        }

        let mut out = String::with_capacity(literal.len());
        let mut last = 0;
        for caps in INTERPOLATION.captures_iter(literal) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = self.lookup(name.as_str(), line, stack)?;
            out.push_str(&literal[last..whole.start()]);
            out.push_str(unquote(&value));
            last = whole.end();
        }
        out.push_str(&literal[last..]);
        Ok(out)
    }

    fn lookup(
        &self,
        name: &str,
        line: usize,
        stack: &mut Vec<String>,
    ) -> Result<String, StageError> {
        if stack.iter().any(|n| n == name) {
            return Err(StageError::syntax(
                line,
                format!("recursive variable definition @{name}"),
            ));
        }
        let Some((raw, defined_in)) = self.find(name) else {
            return Err(StageError::UndefinedVariable {
                line,
                name: name.to_string(),
            });
        };

        stack.push(name.to_string());
        let resolved = defined_in.substitute(raw, line, stack);
        stack.pop();
        resolved
    }
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(value)
}

fn compile_block(
    body: &[Node],
    selectors: &[String],
    scope: &Scope<'_>,
    out: &mut Vec<Node>,
    line: usize,
) -> Result<(), StageError> {
    let mut declarations = Vec::new();
    let mut trailing = Vec::new();

    for node in body {
        match node {
            Node::Variable { .. } => {}
            Node::Comment { .. } if selectors.is_empty() => trailing.push(node.clone()),
            Node::Comment { .. } => declarations.push(node.clone()),
            Node::Declaration {
                property,
                value,
                line,
            } => declarations.push(Node::Declaration {
                property: property.clone(),
                value: scope.resolve(value, *line)?,
                line: *line,
            }),
            Node::Rule {
                selector,
                body,
                line,
            } => {
                let own = split_selectors(&scope.resolve(selector, *line)?);
                let combined = combine_selectors(selectors, &own);
                let child = Scope::new(body, Some(scope));
                compile_block(body, &combined, &child, &mut trailing, *line)?;
            }
            Node::AtRule {
                name,
                prelude,
                body: inner,
                line,
            } => {
                let prelude = scope.resolve(prelude, *line)?;
                if name == "import" {
                    check_import(&prelude, *line)?;
                }
                let Some(inner) = inner else {
                    trailing.push(Node::AtRule {
                        name: name.clone(),
                        prelude,
                        body: None,
                        line: *line,
                    });
                    continue;
                };

                let bubbles = BUBBLING_AT_RULES.contains(&name.as_str());
                let inner_selectors: &[String] = if bubbles { selectors } else { &[] };
                let child = Scope::new(inner, Some(scope));
                let mut inner_out = Vec::new();
                compile_block(inner, inner_selectors, &child, &mut inner_out, *line)?;

                if !inner_out.is_empty() || !bubbles {
                    trailing.push(Node::AtRule {
                        name: name.clone(),
                        prelude,
                        body: Some(inner_out),
                        line: *line,
                    });
                }
            }
        }
    }

    if !declarations.is_empty() {
        if selectors.is_empty() {
            // Declarations directly inside an at-rule such as `@font-face`.
            out.extend(declarations);
        } else {
            out.push(Node::Rule {
                selector: selectors.join(", "),
                body: declarations,
                line,
            });
        }
    }
    out.extend(trailing);
    Ok(())
}

/// Split a selector list on top-level commas.
fn split_selectors(selector: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in selector.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

/// Combine each parent selector with each child selector; `&` refers to the
/// parent, otherwise the child is a descendant.
fn combine_selectors(parents: &[String], children: &[String]) -> Vec<String> {
    if parents.is_empty() {
        return children
            .iter()
            .map(|c| c.replace('&', "").trim().to_string())
            .collect();
    }

    let mut combined = Vec::with_capacity(parents.len() * children.len());
    for parent in parents {
        for child in children {
            if child.contains('&') {
                combined.push(child.replace('&', parent));
            } else {
                combined.push(format!("{parent} {child}"));
            }
        }
    }
    combined
}

/// Plain CSS imports pass through; importing another LESS file would need
/// file resolution, which this stage does not do.
fn check_import(prelude: &str, line: usize) -> Result<(), StageError> {
    let target = prelude
        .trim()
        .trim_start_matches("url(")
        .trim_end_matches(|c: char| c == ')' || c.is_whitespace())
        .trim_matches(|c| c == '"' || c == '\'');
    let is_css = target.ends_with(".css")
        || target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("//");
    if is_css {
        Ok(())
    } else {
        Err(StageError::unsupported(
            line,
            format!("@import of LESS file {target}"),
        ))
    }
}
