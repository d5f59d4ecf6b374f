//! Grammar definition
//!
//! A [`Grammar`] is a list of [`Production`]s plus precedence declarations
//! for terminals. Each production carries a [`ReduceAction`] tag naming what
//! the engine builds when the production is reduced; the actions themselves
//! live in [`super::parse`].
//!
//! [`Grammar::ruby_subset`] defines the statement/operator/literal subset:
//!
//! ```text
//! main          → suite EOF
//! suite         → stmts opt_line_ends
//! stmts         → ε | stmt | stmts line_ends stmt
//! line_ends     → LINE_END | line_ends LINE_END
//! opt_line_ends → ε | line_ends
//! stmt          → arg
//! arg           → arg (PLUS | DIV | MODULO | EQEQEQ | EQUAL_TILDE) arg
//!               | arg EXCLAMATION_TILDE arg
//!               | NUMBER
//! ```

use std::fmt;

use rustc_hash::FxHashMap;

use super::lexer::TokenKind;

/// Grammar nonterminals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonTerminal {
    Main,
    Suite,
    Stmts,
    LineEnds,
    OptLineEnds,
    Stmt,
    Arg,
}

impl NonTerminal {
    pub fn name(self) -> &'static str {
        match self {
            NonTerminal::Main => "main",
            NonTerminal::Suite => "suite",
            NonTerminal::Stmts => "stmts",
            NonTerminal::LineEnds => "line_ends",
            NonTerminal::OptLineEnds => "opt_line_ends",
            NonTerminal::Stmt => "stmt",
            NonTerminal::Arg => "arg",
        }
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A grammar symbol on the right-hand side of a production
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Term(TokenKind),
    Nonterm(NonTerminal),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Term(kind) => write!(f, "{}", kind),
            Symbol::Nonterm(nt) => write!(f, "{}", nt),
        }
    }
}

/// What the engine builds when a production is reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceAction {
    /// `main → suite EOF`
    Main,
    /// `suite → stmts opt_line_ends`
    Suite,
    /// `stmts → ε`
    EmptyStatements,
    /// `stmts → stmt`
    FirstStatement,
    /// `stmts → stmts line_ends stmt`
    AppendStatement,
    /// Separator productions whose value is discarded
    Discard,
    /// `stmt → arg`
    Statement,
    /// `arg → arg OP arg`
    BinaryOp,
    /// `arg → arg EXCLAMATION_TILDE arg`
    NotMatch,
    /// `arg → NUMBER`
    Number,
}

/// Associativity of a precedence level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    NonAssoc,
}

/// A single grammar rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: Vec<Symbol>,
    pub action: ReduceAction,
}

impl Production {
    /// The last terminal of the right-hand side, which gives the production
    /// its precedence.
    pub fn last_terminal(&self) -> Option<TokenKind> {
        self.rhs.iter().rev().find_map(|sym| match sym {
            Symbol::Term(kind) => Some(*kind),
            Symbol::Nonterm(_) => None,
        })
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :", self.lhs)?;
        for sym in &self.rhs {
            write!(f, " {}", sym)?;
        }
        Ok(())
    }
}

/// Productions, start symbol and precedence declarations
#[derive(Debug, Clone)]
pub struct Grammar {
    start: NonTerminal,
    productions: Vec<Production>,
    // terminal -> (level, associativity); higher levels bind tighter
    precedence: FxHashMap<TokenKind, (usize, Assoc)>,
    levels: usize,
}

impl Grammar {
    pub fn new(start: NonTerminal) -> Self {
        Grammar {
            start,
            productions: Vec::new(),
            precedence: FxHashMap::default(),
            levels: 0,
        }
    }

    /// Add a production.
    pub fn rule(
        &mut self,
        lhs: NonTerminal,
        rhs: impl IntoIterator<Item = Symbol>,
        action: ReduceAction,
    ) -> &mut Self {
        self.productions.push(Production {
            lhs,
            rhs: rhs.into_iter().collect(),
            action,
        });
        self
    }

    /// Declare a precedence level. Each call binds tighter than the previous.
    pub fn precedence(&mut self, assoc: Assoc, terminals: &[TokenKind]) -> &mut Self {
        self.levels += 1;
        for &kind in terminals {
            self.precedence.insert(kind, (self.levels, assoc));
        }
        self
    }

    pub fn start(&self) -> NonTerminal {
        self.start
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    /// Precedence of a terminal, if declared.
    pub fn terminal_precedence(&self, kind: TokenKind) -> Option<(usize, Assoc)> {
        self.precedence.get(&kind).copied()
    }

    /// Precedence of a production, taken from its last terminal.
    pub fn production_precedence(&self, index: usize) -> Option<(usize, Assoc)> {
        self.productions[index]
            .last_terminal()
            .and_then(|kind| self.terminal_precedence(kind))
    }

    /// The statement/operator/literal subset.
    ///
    /// All binary operators share one right-associative level, so a chain
    /// such as `1 + 2 / 3` groups as `1 + (2 / 3)`.
    pub fn ruby_subset() -> Self {
        use NonTerminal::*;
        use TokenKind as T;

        let t = Symbol::Term;
        let n = Symbol::Nonterm;

        let mut g = Grammar::new(Main);
        g.precedence(
            Assoc::Right,
            &[
                T::Plus,
                T::Div,
                T::Modulo,
                T::EqEqEq,
                T::EqualTilde,
                T::ExclamationTilde,
            ],
        );

        g.rule(Main, [n(Suite), t(T::Eof)], ReduceAction::Main)
            .rule(Suite, [n(Stmts), n(OptLineEnds)], ReduceAction::Suite)
            .rule(Stmts, Vec::<Symbol>::new(), ReduceAction::EmptyStatements)
            .rule(Stmts, [n(Stmt)], ReduceAction::FirstStatement)
            .rule(
                Stmts,
                [n(Stmts), n(LineEnds), n(Stmt)],
                ReduceAction::AppendStatement,
            )
            .rule(LineEnds, [n(LineEnds), t(T::LineEnd)], ReduceAction::Discard)
            .rule(LineEnds, [t(T::LineEnd)], ReduceAction::Discard)
            .rule(OptLineEnds, Vec::<Symbol>::new(), ReduceAction::Discard)
            .rule(OptLineEnds, [n(LineEnds)], ReduceAction::Discard)
            .rule(Stmt, [n(Arg)], ReduceAction::Statement);

        for op in [T::Plus, T::Div, T::Modulo, T::EqEqEq, T::EqualTilde] {
            g.rule(Arg, [n(Arg), t(op), n(Arg)], ReduceAction::BinaryOp);
        }
        g.rule(
            Arg,
            [n(Arg), t(T::ExclamationTilde), n(Arg)],
            ReduceAction::NotMatch,
        )
        .rule(Arg, [t(T::Number)], ReduceAction::Number);

        g
    }
}
