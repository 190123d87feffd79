//! Frontend module - Lexer and Parser for Go declaration syntax

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;

pub use parser::Parser;
