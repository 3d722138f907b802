//! Lexer & parser for the std expression grammar.

pub mod lexer;
pub mod parser;

pub use lexer::{BoolLexer, BoolToken};
pub use parser::{expression, BoolParser};
