// AST (Abstract Syntax Tree) definitions for the scripting subset

use std::fmt;

use num_bigint::BigInt;

/// Binary operators that build a [`Expr::BinOp`] node.
///
/// `!~` has no variant of its own: it is represented as
/// `Not(BinOp(Match, ..))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Plus,   // +
    Div,    // /
    Modulo, // %
    CaseEq, // ===
    Match,  // =~
}

impl Operator {
    /// The operator as written in source.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Div => "/",
            Operator::Modulo => "%",
            Operator::CaseEq => "===",
            Operator::Match => "=~",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    BinOp {
        op: Operator,
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize, // line of the operator token
    },
    Not(Box<Expr>),
    ConstantInt(BigInt),
    ConstantFloat(f64),
}

impl Expr {
    pub fn binop(op: Operator, left: Expr, right: Expr, line: usize) -> Self {
        Expr::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
            line,
        }
    }

    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn int(value: impl Into<BigInt>) -> Self {
        Expr::ConstantInt(value.into())
    }

    /// Copy of this tree with every operator line set to `line`.
    ///
    /// Used to compare trees whose shapes should match but whose source
    /// positions differ, e.g. after re-rendering.
    pub fn with_line(&self, line: usize) -> Expr {
        match self {
            Expr::BinOp {
                op, left, right, ..
            } => Expr::binop(*op, left.with_line(line), right.with_line(line), line),
            Expr::Not(inner) => Expr::not(inner.with_line(line)),
            Expr::ConstantInt(_) | Expr::ConstantFloat(_) => self.clone(),
        }
    }
}

// Operator chains nest one level per operator, so the default recursive drop
// would use one stack frame per operator. Children are moved onto a work-list
// instead.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut expr) = pending.pop() {
            detach_children(&mut expr, &mut pending);
        }
    }
}

fn detach_children(expr: &mut Expr, pending: &mut Vec<Expr>) {
    let mut detach = |child: &mut Box<Expr>| {
        if matches!(**child, Expr::BinOp { .. } | Expr::Not(_)) {
            pending.push(std::mem::replace(&mut **child, Expr::ConstantFloat(0.0)));
        }
    };
    match expr {
        Expr::BinOp { left, right, .. } => {
            detach(left);
            detach(right);
        }
        Expr::Not(inner) => detach(inner),
        Expr::ConstantInt(_) | Expr::ConstantFloat(_) => {}
    }
}

/// An expression evaluated for its value at statement level.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub expr: Expr,
}

impl Statement {
    pub fn new(expr: Expr) -> Self {
        Statement { expr }
    }
}

/// Ordered sequence of statements, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Block { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Root of a parsed program
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Main {
    pub body: Block,
}

impl Main {
    pub fn new(body: Block) -> Self {
        Main { body }
    }

    /// Copy of this tree with all operator lines set to `line`.
    pub fn with_line(&self, line: usize) -> Main {
        Main::new(Block::new(
            self.body
                .statements
                .iter()
                .map(|s| Statement::new(s.expr.with_line(line)))
                .collect(),
        ))
    }
}

// ===== Canonical rendering =====
//
// The grammar has no grouping syntax, so nested operators render flat. A
// tree produced by the parser is always nested to the right, which is the
// shape the flat text reparses into.

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::BinOp {
                op, left, right, ..
            } => write!(f, "{} {} {}", left, op, right),
            Expr::Not(inner) => match &**inner {
                Expr::BinOp {
                    op: Operator::Match,
                    left,
                    right,
                    ..
                } => write!(f, "{} !~ {}", left, right),
                // Not a form the grammar produces; no source text reparses into it.
                other => write!(f, "!({})", other),
            },
            Expr::ConstantInt(value) => write!(f, "{}", value),
            // overflows back to +inf when reparsed
            Expr::ConstantFloat(value) if *value == f64::INFINITY => f.write_str("1E999"),
            Expr::ConstantFloat(value) => {
                // `{:?}` always keeps a fraction or an exponent, so the text
                // lexes back as a float. Negative and NaN values have no
                // source form.
                let text = format!("{:?}", value).replace('e', "E");
                f.write_str(&text)
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Main {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body)
    }
}
