//! Template parser: scanner, attribute grammar and recursive descent

pub mod ast;
mod descent;
mod grammar;
pub mod lexer;
mod scanner;

pub use ast::*;
pub use descent::{parse, ParseContext};
