// src/css/mod.rs

//! Stylesheet stages used by the `css` task.
//!
//! All three stages share one small parser ([`parser`]) and printer
//! ([`printer`]):
//!
//! - [`less::Less`] compiles a LESS subset (variables, nesting, `&`) to CSS.
//! - [`prefix::Autoprefix`] adds vendor-prefixed declarations.
//! - [`minify::Minify`] produces compact output.

pub mod less;
pub mod minify;
pub mod parser;
pub mod prefix;
pub mod printer;

pub use less::Less;
pub use minify::Minify;
pub use parser::{parse, Dialect};
pub use prefix::Autoprefix;

/// A parsed stylesheet item.
///
/// `line` is the 1-based line the item starts on, used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `selector { body }`. Bodies may nest rules before LESS flattening.
    Rule {
        selector: String,
        body: Vec<Node>,
        line: usize,
    },
    /// `property: value`
    Declaration {
        property: String,
        value: String,
        line: usize,
    },
    /// LESS `@name: value;`
    Variable {
        name: String,
        value: String,
        line: usize,
    },
    /// `@name prelude;` or `@name prelude { body }`.
    AtRule {
        name: String,
        prelude: String,
        body: Option<Vec<Node>>,
        line: usize,
    },
    /// A `/*! ... */` banner, delimiters included.
    Comment { text: String, line: usize },
}

impl Node {
    pub fn line(&self) -> usize {
        match self {
            Node::Rule { line, .. }
            | Node::Declaration { line, .. }
            | Node::Variable { line, .. }
            | Node::AtRule { line, .. }
            | Node::Comment { line, .. } => *line,
        }
    }
}
