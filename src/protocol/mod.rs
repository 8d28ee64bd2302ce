mod arena;
pub(crate) mod ast;
pub(crate) mod eval;
mod input_source;
mod lexer;
pub(crate) mod parser;

#[cfg(test)]
mod tests;

pub use input_source::{
    ErrorStatement, InputPosition, InputSource, InputSpan, ParseError, ParseErrorKind, StatementKind,
};
