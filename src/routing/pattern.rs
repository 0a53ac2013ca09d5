//! Path pattern tokenizer.
//!
//! # Grammar
//! ```text
//! pattern     := (literal | placeholder)*
//! placeholder := '{' identifier '}'
//! literal     := any run of characters other than '{' and '}'
//! ```
//!
//! # Design Decisions
//! - Tokenized once when a route is built; compilation works on segments
//! - Unbalanced braces and repeated placeholders are rejected up front

use std::collections::HashSet;

use crate::routing::rule::is_identifier;

/// One piece of a tokenized path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text matched verbatim.
    Literal(String),
    /// `{name}` bound to a rule (or the default fragment) at match time.
    Placeholder(String),
}

/// Why a pattern could not be tokenized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    Unclosed { position: usize },
    UnexpectedClose { position: usize },
    Nested { position: usize },
    InvalidName { name: String },
    Repeated { name: String },
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternError::Unclosed { position } => {
                write!(f, "unclosed '{{' at byte {}", position)
            }
            PatternError::UnexpectedClose { position } => {
                write!(f, "unexpected '}}' at byte {}", position)
            }
            PatternError::Nested { position } => {
                write!(f, "nested '{{' at byte {}", position)
            }
            PatternError::InvalidName { name } => {
                write!(f, "placeholder name '{}' is not an identifier", name)
            }
            PatternError::Repeated { name } => {
                write!(f, "placeholder '{}' appears more than once", name)
            }
        }
    }
}

/// Split a path pattern into literal and placeholder segments, left to right.
pub fn tokenize(pattern: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut seen = HashSet::new();
    let mut literal = String::new();
    let mut open: Option<(usize, String)> = None;

    for (position, c) in pattern.char_indices() {
        match c {
            '{' => {
                if open.is_some() {
                    return Err(PatternError::Nested { position });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                open = Some((position, String::new()));
            }
            '}' => {
                let Some((_, name)) = open.take() else {
                    return Err(PatternError::UnexpectedClose { position });
                };
                if !is_identifier(&name) {
                    return Err(PatternError::InvalidName { name });
                }
                if !seen.insert(name.clone()) {
                    return Err(PatternError::Repeated { name });
                }
                segments.push(Segment::Placeholder(name));
            }
            _ => match open.as_mut() {
                Some((_, name)) => name.push(c),
                None => literal.push(c),
            },
        }
    }

    if let Some((position, _)) = open {
        return Err(PatternError::Unclosed { position });
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}
