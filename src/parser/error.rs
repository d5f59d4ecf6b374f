//! Error types for parsing and table construction
//!
//! [`ParseError`] covers everything that can go wrong while turning a token
//! stream into a tree: syntax errors, literal interpretation failures and
//! lexer failures. [`GrammarError`] is raised only while building a
//! [`super::table::ParseTable`] and indicates a grammar bug, not bad input.
//!
//! All parse errors are fatal: parsing stops at the first one and no partial
//! tree is returned.

use thiserror::Error;

use super::grammar::NonTerminal;
use super::lexer::{LexError, TokenKind};
use super::table::Lookahead;

/// Errors produced while parsing a token stream
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A token arrived that no action of the current state accepts
    #[error("syntax error at line {line}: unexpected {kind} {text:?}")]
    UnexpectedToken {
        kind: TokenKind,
        text: String,
        line: usize,
    },

    /// The token stream ran out before EOF was reduced
    #[error("syntax error at line {line}: token stream ended before EOF")]
    UnexpectedEndOfStream { line: usize },

    /// A NUMBER lexeme could not be interpreted
    #[error("invalid number literal {text:?} at line {line}: {reason}")]
    NumberFormat {
        text: String,
        line: usize,
        reason: String,
    },

    /// An expression nested deeper than [`super::ParseOptions::max_depth`]
    #[error("expression at line {line} nests deeper than {limit} levels")]
    TooDeep { line: usize, limit: usize },

    #[error(transparent)]
    Lex(#[from] LexError),

    /// The value stack did not hold what a production's action expected
    #[error("parser stack mismatch while reducing {production}")]
    StackMismatch { production: String },
}

impl ParseError {
    /// Line the error was reported at.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedToken { line, .. }
            | ParseError::UnexpectedEndOfStream { line }
            | ParseError::NumberFormat { line, .. }
            | ParseError::TooDeep { line, .. } => Some(*line),
            ParseError::Lex(err) => Some(err.line),
            ParseError::StackMismatch { .. } => None,
        }
    }

    /// Whether this error comes from the shift/reduce decision rather than
    /// from literal interpretation or lexing.
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            ParseError::UnexpectedToken { .. } | ParseError::UnexpectedEndOfStream { .. }
        )
    }
}

/// Errors produced while building a parse table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Two actions compete for one table cell and the precedence
    /// declarations do not decide between them
    #[error("unresolved {kind} conflict in state {state} on {lookahead}: {detail}")]
    Conflict {
        kind: ConflictKind,
        state: usize,
        lookahead: Lookahead,
        detail: String,
    },

    /// A nonterminal is used but no production defines it
    #[error("nonterminal {0} has no productions")]
    MissingProductions(NonTerminal),
}

/// Kind of table conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::ShiftReduce => write!(f, "shift/reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce/reduce"),
        }
    }
}
