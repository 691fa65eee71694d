// src/css/parser.rs

//! Hand-rolled recursive-descent parser for CSS and the LESS subset we
//! support. Comments are dropped except `/*! ... */` banners between items;
//! strings and parenthesised groups are kept verbatim.

use crate::css::Node;
use crate::pipeline::StageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Css,
    /// Adds `//` line comments and `@variable: value;` declarations.
    Less,
}

/// Parse a whole stylesheet.
pub fn parse(src: &str, dialect: Dialect) -> Result<Vec<Node>, StageError> {
    let mut parser = Parser {
        src: src.chars().collect(),
        pos: 0,
        line: 1,
        dialect,
    };
    parser.parse_block(None)
}

struct Parser {
    src: Vec<char>,
    pos: usize,
    line: usize,
    dialect: Dialect,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn at_line_comment(&self) -> bool {
        self.dialect == Dialect::Less && self.peek() == Some('/') && self.peek_at(1) == Some('/')
    }

    fn at_block_comment(&self) -> bool {
        self.peek() == Some('/') && self.peek_at(1) == Some('*')
    }

    /// `/*!` marks a comment that must survive minification.
    fn at_banner(&self) -> bool {
        self.at_block_comment() && self.peek_at(2) == Some('!')
    }

    /// Skip whitespace and comments, stopping in front of a banner.
    fn skip_trivia(&mut self) -> Result<(), StageError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.at_banner() => return Ok(()),
                Some('/') if self.at_block_comment() => self.skip_block_comment()?,
                Some('/') if self.at_line_comment() => self.skip_line_comment(),
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), StageError> {
        let start = self.line;
        self.pos += 2;
        loop {
            match self.bump() {
                None => return Err(StageError::syntax(start, "unterminated comment")),
                Some('*') if self.peek() == Some('/') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => {}
            }
        }
    }

    fn read_banner(&mut self) -> Result<Node, StageError> {
        let line = self.line;
        let start = self.pos;
        self.skip_block_comment()?;
        Ok(Node::Comment {
            text: self.src[start..self.pos].iter().collect(),
            line,
        })
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    /// Parse items until the closing `}` of a block opened on `open_line`, or
    /// until end of input at the top level (`open_line == None`).
    fn parse_block(&mut self, open_line: Option<usize>) -> Result<Vec<Node>, StageError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => {
                    return match open_line {
                        Some(line) => Err(StageError::syntax(line, "unclosed '{'")),
                        None => Ok(nodes),
                    };
                }
                Some('}') => {
                    if open_line.is_none() {
                        return Err(StageError::syntax(self.line, "unexpected '}'"));
                    }
                    self.bump();
                    return Ok(nodes);
                }
                Some(';') => {
                    self.bump();
                }
                Some('@') => nodes.push(self.parse_at_rule()?),
                Some('/') if self.at_banner() => nodes.push(self.read_banner()?),
                Some(_) => {
                    if let Some(node) = self.parse_rule_or_declaration()? {
                        if open_line.is_none() && matches!(node, Node::Declaration { .. }) {
                            return Err(StageError::syntax(
                                node.line(),
                                "declaration outside of a rule",
                            ));
                        }
                        nodes.push(node);
                    }
                }
            }
        }
    }

    /// Read raw text up to (not including) one of `stops` found outside
    /// strings, comments and parentheses. Returns the text and the stop
    /// character, or `None` at end of input.
    fn read_until(&mut self, stops: &[char]) -> Result<(String, Option<char>), StageError> {
        let mut out = String::new();
        let mut depth = 0usize;
        loop {
            let Some(c) = self.peek() else {
                if depth > 0 {
                    return Err(StageError::syntax(self.line, "unclosed '('"));
                }
                return Ok((out, None));
            };
            match c {
                '"' | '\'' => self.read_string(&mut out)?,
                '@' if self.dialect == Dialect::Less && self.peek_at(1) == Some('{') => {
                    self.read_interpolation(&mut out)?
                }
                '/' if self.at_block_comment() => {
                    self.skip_block_comment()?;
                    out.push(' ');
                }
                '/' if depth == 0 && self.at_line_comment() => self.skip_line_comment(),
                '(' => {
                    depth += 1;
                    out.push(c);
                    self.bump();
                }
                ')' => {
                    if depth == 0 {
                        return Err(StageError::syntax(self.line, "unbalanced ')'"));
                    }
                    depth -= 1;
                    out.push(c);
                    self.bump();
                }
                c if depth == 0 && stops.contains(&c) => return Ok((out, Some(c))),
                _ => {
                    out.push(c);
                    self.bump();
                }
            }
        }
    }

    fn read_string(&mut self, out: &mut String) -> Result<(), StageError> {
        let start = self.line;
        let Some(quote) = self.bump() else {
            return Ok(());
        };
        out.push(quote);
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(StageError::syntax(start, "unterminated string"));
                }
                Some('\\') => {
                    out.push('\\');
                    if let Some(escaped) = self.bump() {
                        out.push(escaped);
                    }
                }
                Some(c) if c == quote => {
                    out.push(c);
                    return Ok(());
                }
                Some(c) => out.push(c),
            }
        }
    }

    /// Copy a LESS `@{name}` interpolation verbatim.
    fn read_interpolation(&mut self, out: &mut String) -> Result<(), StageError> {
        let start = self.line;
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(StageError::syntax(start, "unterminated @{...}"));
                }
                Some('}') => {
                    out.push('}');
                    return Ok(());
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn read_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        ident
    }

    fn parse_at_rule(&mut self) -> Result<Node, StageError> {
        let line = self.line;
        self.bump();
        let name = self.read_ident();
        if name.is_empty() {
            return Err(StageError::syntax(line, "expected a name after '@'"));
        }

        if self.dialect == Dialect::Less && name != "page" {
            let saved = (self.pos, self.line);
            self.skip_trivia()?;
            if self.peek() == Some(':') {
                self.bump();
                let (value, stop) = self.read_until(&[';', '}'])?;
                if stop == Some(';') {
                    self.bump();
                }
                let value = value.trim().to_string();
                if value.is_empty() {
                    return Err(StageError::syntax(line, format!("empty value for @{name}")));
                }
                return Ok(Node::Variable { name, value, line });
            }
            (self.pos, self.line) = saved;
        }

        let (prelude, stop) = self.read_until(&[';', '{', '}'])?;
        let prelude = prelude.trim().to_string();
        let body = match stop {
            Some('{') => {
                self.bump();
                Some(self.parse_block(Some(line))?)
            }
            Some(';') => {
                self.bump();
                None
            }
            // A missing `;` before `}` or at end of input.
            _ => None,
        };

        Ok(Node::AtRule {
            name,
            prelude,
            body,
            line,
        })
    }

    fn parse_rule_or_declaration(&mut self) -> Result<Option<Node>, StageError> {
        let line = self.line;
        let (head, stop) = self.read_until(&[';', '{', '}'])?;
        let head = head.trim();

        if stop == Some('{') {
            self.bump();
            if head.is_empty() {
                return Err(StageError::syntax(line, "missing selector before '{'"));
            }
            let body = self.parse_block(Some(line))?;
            return Ok(Some(Node::Rule {
                selector: head.to_string(),
                body,
                line,
            }));
        }

        if stop == Some(';') {
            self.bump();
        }
        if head.is_empty() {
            return Ok(None);
        }
        declaration(head, line).map(Some)
    }
}

fn declaration(head: &str, line: usize) -> Result<Node, StageError> {
    let Some((property, value)) = head.split_once(':') else {
        if (head.starts_with('.') || head.starts_with('#')) && head.ends_with(')') {
            return Err(StageError::unsupported(
                line,
                format!("mixin call `{head}`"),
            ));
        }
        return Err(StageError::syntax(
            line,
            format!("expected ':' in declaration `{head}`"),
        ));
    };

    let property = property.trim();
    let value = value.trim();
    if property.is_empty() || property.contains(char::is_whitespace) {
        return Err(StageError::syntax(
            line,
            format!("invalid property name `{property}`"),
        ));
    }
    if value.is_empty() {
        return Err(StageError::syntax(
            line,
            format!("empty value for `{property}`"),
        ));
    }

    Ok(Node::Declaration {
        property: property.to_string(),
        value: value.to_string(),
        line,
    })
}
