//! Parse tree types for templates

use std::cell::OnceCell;
use std::fmt;
use std::str::FromStr;

use crate::error::Span;
use crate::format::Formatter;
use crate::template::Template;

/// One attribute of a tag, as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr {
    /// `key=value`; keys are lowercased
    Named { key: String, value: String },
    /// Inline comparison such as `>= 5`
    Compare { op: String, value: String },
    /// A value without a key, such as the name in `{{VAR user}}`
    Bare(String),
}

/// A node of the parse tree
#[derive(Debug)]
pub enum Node {
    /// Literal text, a range into the owning template's source
    Text(Span),
    Variable(Variable),
    /// Used for both `IF` and `ELSIF`; an `ELSIF` is a conditional in the else branch
    Conditional(Conditional),
    Loop(LoopBlock),
    Break { level: usize },
    Continue { level: usize },
    Include(Include),
}

#[derive(Debug)]
pub struct Variable {
    pub name: String,
    pub default: Option<String>,
    pub formatter: Option<Formatter>,
}

#[derive(Debug)]
pub struct Conditional {
    pub test: Condition,
    pub then_branch: Vec<Node>,
    pub else_branch: Vec<Node>,
}

/// Test of an `IF` or `ELSIF` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub name: String,
    /// `None` means an existence test
    pub comparison: Option<(Operator, String)>,
}

#[derive(Debug)]
pub struct LoopBlock {
    pub name: String,
    pub body: Vec<Node>,
}

/// An `INCLUDE` tag; the included template is parsed on first visit
#[derive(Debug)]
pub struct Include {
    /// Reference as written in the tag
    pub reference: String,
    pub line: usize,
    pub span: Span,
    pub cached: OnceCell<Box<Template>>,
}

impl Include {
    pub fn new(reference: String, line: usize, span: Span) -> Self {
        Self {
            reference,
            line,
            span,
            cached: OnceCell::new(),
        }
    }
}

/// Comparison operator of a conditional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

impl Operator {
    /// Compare a bound value against the tag's literal, byte-wise
    pub fn compare(self, value: &str, literal: &str) -> bool {
        match self {
            Operator::Equal => value == literal,
            Operator::NotEqual => value != literal,
            Operator::Less => value < literal,
            Operator::Greater => value > literal,
            Operator::LessOrEqual => value <= literal,
            Operator::GreaterOrEqual => value >= literal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
        }
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::Less),
            ">" => Ok(Operator::Greater),
            "<=" => Ok(Operator::LessOrEqual),
            ">=" => Ok(Operator::GreaterOrEqual),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
