//! Shift/reduce parser
//!
//! This module provides the [`Parser`] struct: the LALR(1) driver that walks a
//! [`ParseTable`] over a token stream and runs each production's reduction
//! action to build the tree bottom-up.
//!
//! # Parser Architecture
//!
//! - [`super::grammar`]: productions and precedence declarations
//! - [`super::table`]: table construction, run once by the caller
//! - This module: the state/value stack and the reduction actions
//!
//! Every parser borrows its table, so a single table built at startup can be
//! shared by any number of parsers.

use tracing::{debug, trace};

use super::ast::{Block, Expr, Main, Operator, Statement};
use super::config::ParseOptions;
use super::error::ParseError;
use super::grammar::{Production, ReduceAction};
use super::lexer::{Lexer, Token, TokenKind};
use super::literal::interpret_number;
use super::stream::{TokenSource, TokenStream};
use super::table::{Action, Lookahead, ParseTable};

/// Values held on the parser stack alongside states
#[derive(Debug)]
enum Value {
    Token(Token),
    Main(Main),
    Block(Block),
    Statements(Vec<Statement>),
    Statement(Statement),
    /// An expression and its nesting depth
    Expr(Expr, usize),
    Unit,
}

/// Table-driven LALR(1) parser
pub struct Parser<'t> {
    table: &'t ParseTable,
    options: ParseOptions,
    stack: Vec<(usize, Value)>,
}

impl<'t> Parser<'t> {
    pub fn new(table: &'t ParseTable) -> Self {
        Self::with_options(table, ParseOptions::default())
    }

    pub fn with_options(table: &'t ParseTable, options: ParseOptions) -> Self {
        Self {
            table,
            options,
            stack: Vec::new(),
        }
    }

    /// Parse a whole token stream into a [`Main`] node.
    pub fn parse(&mut self, mut tokens: impl TokenSource) -> Result<Main, ParseError> {
        self.stack.clear();
        self.stack.push((0, Value::Unit));

        let mut last_line = 1;
        let mut lookahead = tokens.next_token();

        loop {
            let state = self.state();
            let key = match &lookahead {
                Some(token) => Lookahead::Token(token.kind),
                None => Lookahead::End,
            };

            match self.table.action(state, key) {
                Some(Action::Shift(next)) => {
                    let Some(token) = lookahead.take() else {
                        return Err(ParseError::UnexpectedEndOfStream { line: last_line });
                    };
                    trace!(state, next, kind = %token.kind, line = token.line, "shift");
                    last_line = token.line;
                    self.stack.push((next, Value::Token(token)));
                    lookahead = tokens.next_token();
                }
                Some(Action::Reduce(index)) => {
                    self.reduce(index)?;
                }
                Some(Action::Accept) => {
                    return match self.stack.pop() {
                        Some((_, Value::Main(main))) => {
                            debug!(statements = main.body.statements.len(), "parse complete");
                            Ok(main)
                        }
                        _ => Err(ParseError::StackMismatch {
                            production: "accept".to_string(),
                        }),
                    };
                }
                None => {
                    debug!(
                        state,
                        lookahead = %key,
                        expected = ?self.table.expected(state),
                        "syntax error"
                    );
                    return Err(match lookahead {
                        Some(token) => ParseError::UnexpectedToken {
                            kind: token.kind,
                            text: token.text,
                            line: token.line,
                        },
                        None => ParseError::UnexpectedEndOfStream { line: last_line },
                    });
                }
            }
        }
    }

    fn state(&self) -> usize {
        self.stack.last().map(|(state, _)| *state).unwrap_or(0)
    }

    /// Pop the production's right-hand side, run its action and push the
    /// result under the goto state.
    fn reduce(&mut self, index: usize) -> Result<(), ParseError> {
        let table = self.table;
        let production = table.production(index);
        let len = production.rhs.len();
        if self.stack.len() <= len {
            return Err(mismatch(production));
        }

        let start = self.stack.len() - len;
        let args: Vec<Value> = self
            .stack
            .drain(start..)
            .map(|(_, value)| value)
            .collect();
        let value = self.run_action(production, args)?;

        let state = self.state();
        let next = self
            .table
            .goto(state, production.lhs)
            .ok_or_else(|| mismatch(production))?;
        trace!(state, next, production = %production, "reduce");
        self.stack.push((next, value));
        Ok(())
    }

    fn run_action(&self, production: &Production, args: Vec<Value>) -> Result<Value, ParseError> {
        let mut args = Args {
            values: args.into_iter(),
            production,
        };

        let value = match production.action {
            ReduceAction::Main => {
                let body = args.block()?;
                Value::Main(Main::new(body))
            }
            ReduceAction::Suite => Value::Block(Block::new(args.statements()?)),
            ReduceAction::EmptyStatements => Value::Statements(Vec::new()),
            ReduceAction::FirstStatement => Value::Statements(vec![args.statement()?]),
            ReduceAction::AppendStatement => {
                let mut statements = args.statements()?;
                args.skip();
                statements.push(args.statement()?);
                Value::Statements(statements)
            }
            ReduceAction::Discard => Value::Unit,
            ReduceAction::Statement => {
                let (expr, _) = args.expr()?;
                Value::Statement(Statement::new(expr))
            }
            ReduceAction::BinaryOp => {
                let (left, left_depth) = args.expr()?;
                let op_token = args.token()?;
                let (right, right_depth) = args.expr()?;
                let op = operator_for(op_token.kind).ok_or_else(|| mismatch(production))?;
                let depth = self.check_depth(left_depth.max(right_depth) + 1, op_token.line)?;
                Value::Expr(Expr::binop(op, left, right, op_token.line), depth)
            }
            ReduceAction::NotMatch => {
                let (left, left_depth) = args.expr()?;
                let op_token = args.token()?;
                let (right, right_depth) = args.expr()?;
                let depth = self.check_depth(left_depth.max(right_depth) + 2, op_token.line)?;
                Value::Expr(
                    Expr::not(Expr::binop(Operator::Match, left, right, op_token.line)),
                    depth,
                )
            }
            ReduceAction::Number => {
                let token = args.token()?;
                let expr = interpret_number(&token.text, token.line, self.options.radix_detection)?;
                Value::Expr(expr, 0)
            }
        };
        Ok(value)
    }

    fn check_depth(&self, depth: usize, line: usize) -> Result<usize, ParseError> {
        if depth > self.options.max_depth {
            debug!(depth, line, "expression too deep");
            return Err(ParseError::TooDeep {
                line,
                limit: self.options.max_depth,
            });
        }
        Ok(depth)
    }
}

/// Typed access to the values a reduction popped, in order
struct Args<'p> {
    values: std::vec::IntoIter<Value>,
    production: &'p Production,
}

impl Args<'_> {
    fn next(&mut self) -> Result<Value, ParseError> {
        self.values.next().ok_or_else(|| mismatch(self.production))
    }

    fn skip(&mut self) {
        self.values.next();
    }

    fn token(&mut self) -> Result<Token, ParseError> {
        match self.next()? {
            Value::Token(token) => Ok(token),
            _ => Err(mismatch(self.production)),
        }
    }

    fn expr(&mut self) -> Result<(Expr, usize), ParseError> {
        match self.next()? {
            Value::Expr(expr, depth) => Ok((expr, depth)),
            _ => Err(mismatch(self.production)),
        }
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        match self.next()? {
            Value::Statement(statement) => Ok(statement),
            _ => Err(mismatch(self.production)),
        }
    }

    fn statements(&mut self) -> Result<Vec<Statement>, ParseError> {
        match self.next()? {
            Value::Statements(statements) => Ok(statements),
            _ => Err(mismatch(self.production)),
        }
    }

    fn block(&mut self) -> Result<Block, ParseError> {
        match self.next()? {
            Value::Block(block) => Ok(block),
            _ => Err(mismatch(self.production)),
        }
    }
}

fn operator_for(kind: TokenKind) -> Option<Operator> {
    match kind {
        TokenKind::Plus => Some(Operator::Plus),
        TokenKind::Div => Some(Operator::Div),
        TokenKind::Modulo => Some(Operator::Modulo),
        TokenKind::EqEqEq => Some(Operator::CaseEq),
        TokenKind::EqualTilde => Some(Operator::Match),
        _ => None,
    }
}

fn mismatch(production: &Production) -> ParseError {
    ParseError::StackMismatch {
        production: production.to_string(),
    }
}

/// Parse an already produced token sequence.
pub fn parse_tokens(
    table: &ParseTable,
    tokens: impl IntoIterator<Item = Token>,
    options: ParseOptions,
) -> Result<Main, ParseError> {
    Parser::with_options(table, options).parse(TokenStream::new(tokens))
}

/// Lex and parse source text.
pub fn parse_source(
    table: &ParseTable,
    source: &str,
    options: ParseOptions,
) -> Result<Main, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    parse_tokens(table, tokens, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::Grammar;

    fn table() -> ParseTable {
        ParseTable::build(&Grammar::ruby_subset()).unwrap()
    }

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, 1)
    }

    #[test]
    fn test_single_number() {
        let table = table();
        let main = parse_tokens(
            &table,
            vec![tok(TokenKind::Number, "42"), tok(TokenKind::Eof, "")],
            ParseOptions::default(),
        )
        .unwrap();

        assert_eq!(main.body.statements, vec![Statement::new(Expr::int(42))]);
    }

    #[test]
    fn test_parser_is_reusable() {
        let table = table();
        let mut parser = Parser::new(&table);

        let err = parser
            .parse(TokenStream::new(vec![tok(TokenKind::Plus, "+")]))
            .unwrap_err();
        assert!(err.is_syntax_error());

        let main = parser
            .parse(TokenStream::new(vec![
                tok(TokenKind::Number, "1"),
                tok(TokenKind::Eof, ""),
            ]))
            .unwrap();
        assert_eq!(main.body.statements.len(), 1);
    }

    #[test]
    fn test_token_after_eof() {
        let table = table();
        let err = parse_tokens(
            &table,
            vec![
                tok(TokenKind::Number, "1"),
                tok(TokenKind::Eof, ""),
                tok(TokenKind::Number, "2"),
            ],
            ParseOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                kind: TokenKind::Number,
                ..
            }
        ));
    }

    #[test]
    fn test_operator_mapping() {
        assert_eq!(operator_for(TokenKind::EqEqEq), Some(Operator::CaseEq));
        assert_eq!(operator_for(TokenKind::ExclamationTilde), None);
        assert_eq!(operator_for(TokenKind::Number), None);
    }
}
