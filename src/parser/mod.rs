//! Front end for the scripting subset
//!
//! This module transforms a token stream into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`stream`]: The pull interface the parser reads tokens through
//! - [`grammar`]: Productions and precedence declarations
//! - [`table`]: LALR(1) table construction
//! - [`parse`]: Shift/reduce driver and reduction actions (tokens → AST)
//! - [`literal`]: NUMBER text → typed constants
//! - [`ast`]: AST node definitions and canonical rendering
//!
//! # Supported Subset
//!
//! - Numeric literals: decimal integers, floats, `0x`/`0o`/`0b` radix integers
//! - Binary operators: `+`, `/`, `%`, `===`, `=~`, `!~`
//! - Statements separated by newlines or `;`
//!
//! # Parser Implementation
//!
//! Table-driven LALR(1). The table is built once from [`grammar::Grammar`] and
//! borrowed by every [`parse::Parser`]. All binary operators share one
//! right-associative precedence level.

pub mod ast;
pub mod config;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod literal;
pub mod parse;
pub mod stream;
pub mod table;

pub use config::{ParseOptions, RadixDetection, DEFAULT_MAX_DEPTH};
pub use error::{GrammarError, ParseError};
pub use parse::{parse_source, parse_tokens, Parser};
pub use table::ParseTable;
