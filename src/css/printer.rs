// src/css/printer.rs

use std::fmt::Write as _;

use crate::css::Node;

const INDENT: &str = "  ";

/// Readable output: one declaration per line, two-space indent.
pub fn print_pretty(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_pretty(&mut out, nodes, 0);
    out
}

fn write_pretty(out: &mut String, nodes: &[Node], depth: usize) {
    let pad = INDENT.repeat(depth);
    for node in nodes {
        match node {
            Node::Rule { selector, body, .. } => {
                let _ = writeln!(out, "{pad}{selector} {{");
                write_pretty(out, body, depth + 1);
                let _ = writeln!(out, "{pad}}}");
            }
            Node::Declaration {
                property, value, ..
            } => {
                let _ = writeln!(out, "{pad}{property}: {value};");
            }
            Node::Variable { name, value, .. } => {
                let _ = writeln!(out, "{pad}@{name}: {value};");
            }
            Node::AtRule {
                name,
                prelude,
                body,
                ..
            } => {
                let head = at_rule_head(name, prelude);
                match body {
                    Some(body) => {
                        let _ = writeln!(out, "{pad}{head} {{");
                        write_pretty(out, body, depth + 1);
                        let _ = writeln!(out, "{pad}}}");
                    }
                    None => {
                        let _ = writeln!(out, "{pad}{head};");
                    }
                }
            }
            Node::Comment { text, .. } => {
                let _ = writeln!(out, "{pad}{text}");
            }
        }
    }
}

/// Minimal output: no whitespace between items, no trailing semicolons.
pub fn print_compact(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_compact(&mut out, nodes);
    out
}

fn write_compact(out: &mut String, nodes: &[Node]) {
    for (i, node) in nodes.iter().enumerate() {
        let has_next = i + 1 < nodes.len();
        match node {
            Node::Rule { selector, body, .. } => {
                out.push_str(selector);
                out.push('{');
                write_compact(out, body);
                out.push('}');
            }
            Node::Declaration {
                property, value, ..
            } => {
                let _ = write!(out, "{property}:{value}");
                if has_next {
                    out.push(';');
                }
            }
            Node::Variable { name, value, .. } => {
                let _ = write!(out, "@{name}:{value}");
                if has_next {
                    out.push(';');
                }
            }
            Node::AtRule {
                name,
                prelude,
                body,
                ..
            } => {
                out.push_str(&at_rule_head(name, prelude));
                match body {
                    Some(body) => {
                        out.push('{');
                        write_compact(out, body);
                        out.push('}');
                    }
                    None => out.push(';'),
                }
            }
            Node::Comment { text, .. } => out.push_str(text),
        }
    }
}

fn at_rule_head(name: &str, prelude: &str) -> String {
    if prelude.is_empty() {
        format!("@{name}")
    } else {
        format!("@{name} {prelude}")
    }
}
