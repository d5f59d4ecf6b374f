//! # Introduction
//!
//! rbparse is the syntactic front end for a small expression-oriented
//! scripting-language subset: numeric literals, a handful of binary
//! operators and newline-separated statements.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → TokenStream → Parser (+ ParseTable) → AST
//! ```
//!
//! 1. [`parser::lexer`]: tokenises source text. Any other producer of
//!    [`parser::lexer::Token`]s can stand in for it.
//! 2. [`parser::table`]: builds the LALR(1) table from
//!    [`parser::grammar::Grammar::ruby_subset`]. Build it once and share it.
//! 3. [`parser::parse`]: runs the shift/reduce loop and the reduction
//!    actions, interpreting NUMBER lexemes through [`parser::literal`].
//! 4. [`parser::ast`]: the resulting `Main → Block → Statement → Expr` tree.
//!
//! ```
//! use rbparse::parser::grammar::Grammar;
//! use rbparse::parser::{parse_source, ParseOptions, ParseTable};
//!
//! let table = ParseTable::build(&Grammar::ruby_subset()).unwrap();
//! let main = parse_source(&table, "1 + 2\n0xFF", ParseOptions::default()).unwrap();
//! assert_eq!(main.body.statements.len(), 2);
//! assert_eq!(main.to_string(), "1 + 2\n255");
//! ```

pub mod parser;
