//! LALR(1) parse table construction
//!
//! [`ParseTable::build`] turns a [`Grammar`] into an immutable action/goto
//! table. Construction follows the usual recipe:
//!
//! 1. FIRST sets and nullability of every nonterminal.
//! 2. LR(1) item sets, built from kernels by closure. States whose kernels
//!    share an LR(0) core are merged as they are discovered, and a state is
//!    revisited whenever merging grows one of its lookahead sets, so the
//!    automaton converges to the LALR(1) one.
//! 3. Shift and goto entries from the transitions, reduce entries from
//!    completed items, accept from the augmented start item.
//!
//! Shift/reduce conflicts are settled only by the grammar's precedence
//! declarations; anything they do not cover, and every reduce/reduce
//! conflict, is a [`GrammarError`].
//!
//! The table is built once and then shared read-only by any number of
//! parsers.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::error::{ConflictKind, GrammarError};
use super::grammar::{Assoc, Grammar, NonTerminal, Production, Symbol};
use super::lexer::TokenKind;

/// A lookahead: a terminal kind, or the end of the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lookahead {
    Token(TokenKind),
    End,
}

impl fmt::Display for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookahead::Token(kind) => write!(f, "{}", kind),
            Lookahead::End => write!(f, "$end"),
        }
    }
}

/// A parse table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

/// Immutable LALR(1) action/goto table
#[derive(Debug, Clone)]
pub struct ParseTable {
    productions: Vec<Production>,
    actions: Vec<FxHashMap<Lookahead, Action>>,
    gotos: Vec<FxHashMap<NonTerminal, usize>>,
    resolved_conflicts: usize,
}

impl ParseTable {
    /// Build the table for `grammar`.
    pub fn build(grammar: &Grammar) -> Result<Self, GrammarError> {
        let builder = Builder::new(grammar)?;
        let table = builder.build()?;
        debug!(
            states = table.state_count(),
            productions = table.productions.len(),
            resolved_conflicts = table.resolved_conflicts,
            "built LALR(1) parse table"
        );
        Ok(table)
    }

    pub fn action(&self, state: usize, lookahead: Lookahead) -> Option<Action> {
        self.actions.get(state)?.get(&lookahead).copied()
    }

    pub fn goto(&self, state: usize, nonterminal: NonTerminal) -> Option<usize> {
        self.gotos.get(state)?.get(&nonterminal).copied()
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    /// Number of shift/reduce conflicts settled by precedence declarations.
    pub fn resolved_conflicts(&self) -> usize {
        self.resolved_conflicts
    }

    /// Lookaheads with an action in `state`, sorted.
    pub fn expected(&self, state: usize) -> Vec<Lookahead> {
        let mut expected: Vec<Lookahead> = self
            .actions
            .get(state)
            .map(|row| row.keys().copied().collect())
            .unwrap_or_default();
        expected.sort();
        expected
    }
}

/// An LR(0) item. `production` equal to the grammar's production count
/// names the augmented start rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    production: usize,
    dot: usize,
}

/// LR(1) items grouped by core.
type ItemSet = BTreeMap<Item, BTreeSet<Lookahead>>;

struct Builder<'g> {
    grammar: &'g Grammar,
    augmented: usize,
    start_rhs: [Symbol; 1],
    by_lhs: FxHashMap<NonTerminal, Vec<usize>>,
    nullable: FxHashSet<NonTerminal>,
    first: FxHashMap<NonTerminal, BTreeSet<TokenKind>>,
}

impl<'g> Builder<'g> {
    fn new(grammar: &'g Grammar) -> Result<Self, GrammarError> {
        let mut by_lhs: FxHashMap<NonTerminal, Vec<usize>> = FxHashMap::default();
        for (index, production) in grammar.productions().iter().enumerate() {
            by_lhs.entry(production.lhs).or_default().push(index);
        }

        let referenced = grammar
            .productions()
            .iter()
            .flat_map(|p| p.rhs.iter())
            .filter_map(|sym| match sym {
                Symbol::Nonterm(nt) => Some(*nt),
                Symbol::Term(_) => None,
            })
            .chain(std::iter::once(grammar.start()));
        for nt in referenced {
            if !by_lhs.contains_key(&nt) {
                return Err(GrammarError::MissingProductions(nt));
            }
        }

        let mut builder = Builder {
            grammar,
            augmented: grammar.productions().len(),
            start_rhs: [Symbol::Nonterm(grammar.start())],
            by_lhs,
            nullable: FxHashSet::default(),
            first: FxHashMap::default(),
        };
        builder.compute_first_sets();
        Ok(builder)
    }

    fn rhs(&self, production: usize) -> &[Symbol] {
        if production == self.augmented {
            &self.start_rhs
        } else {
            &self.grammar.production(production).rhs
        }
    }

    fn compute_first_sets(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.grammar.productions() {
                let mut first = BTreeSet::new();
                let mut all_nullable = true;
                for sym in &production.rhs {
                    match sym {
                        Symbol::Term(kind) => {
                            first.insert(*kind);
                            all_nullable = false;
                        }
                        Symbol::Nonterm(nt) => {
                            if let Some(set) = self.first.get(nt) {
                                first.extend(set.iter().copied());
                            }
                            all_nullable = self.nullable.contains(nt);
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }

                let entry = self.first.entry(production.lhs).or_default();
                let before = entry.len();
                entry.extend(first);
                changed |= entry.len() != before;
                if all_nullable {
                    changed |= self.nullable.insert(production.lhs);
                }
            }
        }
    }

    /// FIRST of a symbol sequence, and whether the whole sequence can
    /// derive the empty string.
    fn first_of(&self, symbols: &[Symbol]) -> (BTreeSet<Lookahead>, bool) {
        let mut first = BTreeSet::new();
        for sym in symbols {
            match sym {
                Symbol::Term(kind) => {
                    first.insert(Lookahead::Token(*kind));
                    return (first, false);
                }
                Symbol::Nonterm(nt) => {
                    if let Some(set) = self.first.get(nt) {
                        first.extend(set.iter().map(|k| Lookahead::Token(*k)));
                    }
                    if !self.nullable.contains(nt) {
                        return (first, false);
                    }
                }
            }
        }
        (first, true)
    }

    fn closure(&self, kernel: &ItemSet) -> ItemSet {
        let mut items = kernel.clone();
        let mut pending: Vec<Item> = items.keys().copied().collect();

        while let Some(item) = pending.pop() {
            let rhs = self.rhs(item.production);
            let Some(Symbol::Nonterm(next)) = rhs.get(item.dot) else {
                continue;
            };

            let (mut follow, nullable) = self.first_of(&rhs[item.dot + 1..]);
            if nullable {
                if let Some(lookaheads) = items.get(&item) {
                    follow.extend(lookaheads.iter().copied());
                }
            }

            for &production in self.by_lhs.get(next).into_iter().flatten() {
                let start = Item { production, dot: 0 };
                let entry = items.entry(start).or_default();
                let before = entry.len();
                entry.extend(follow.iter().copied());
                if entry.len() != before {
                    pending.push(start);
                }
            }
        }

        items
    }

    /// Kernels reached from a closed item set, keyed by the symbol moved over.
    fn transitions(&self, closed: &ItemSet) -> BTreeMap<Symbol, ItemSet> {
        let mut kernels: BTreeMap<Symbol, ItemSet> = BTreeMap::new();
        for (item, lookaheads) in closed {
            if let Some(&sym) = self.rhs(item.production).get(item.dot) {
                let advanced = Item {
                    production: item.production,
                    dot: item.dot + 1,
                };
                kernels
                    .entry(sym)
                    .or_default()
                    .entry(advanced)
                    .or_default()
                    .extend(lookaheads.iter().copied());
            }
        }
        kernels
    }

    fn build(self) -> Result<ParseTable, GrammarError> {
        let mut initial = ItemSet::new();
        initial.insert(
            Item {
                production: self.augmented,
                dot: 0,
            },
            BTreeSet::from([Lookahead::End]),
        );

        let mut kernels = vec![initial];
        let mut by_core: FxHashMap<Vec<Item>, usize> = FxHashMap::default();
        by_core.insert(core(&kernels[0]), 0);
        let mut edges: Vec<BTreeMap<Symbol, usize>> = vec![BTreeMap::new()];
        let mut queued = vec![true];
        let mut pending = VecDeque::from([0]);

        while let Some(state) = pending.pop_front() {
            queued[state] = false;
            let closed = self.closure(&kernels[state]);

            for (sym, kernel) in self.transitions(&closed) {
                let key = core(&kernel);
                let target = match by_core.get(&key) {
                    Some(&target) => {
                        if merge(&mut kernels[target], kernel) && !queued[target] {
                            queued[target] = true;
                            pending.push_back(target);
                        }
                        target
                    }
                    None => {
                        let target = kernels.len();
                        kernels.push(kernel);
                        edges.push(BTreeMap::new());
                        queued.push(true);
                        pending.push_back(target);
                        by_core.insert(key, target);
                        target
                    }
                };
                edges[state].insert(sym, target);
            }
        }

        let mut actions = Vec::with_capacity(kernels.len());
        let mut gotos = Vec::with_capacity(kernels.len());
        let mut resolved_conflicts = 0;

        for (state, kernel) in kernels.iter().enumerate() {
            let mut row = Row::default();
            let mut goto_row = FxHashMap::default();

            for (&sym, &target) in &edges[state] {
                match sym {
                    Symbol::Term(kind) => {
                        row.cells.insert(Lookahead::Token(kind), Action::Shift(target));
                    }
                    Symbol::Nonterm(nt) => {
                        goto_row.insert(nt, target);
                    }
                }
            }

            for (item, lookaheads) in self.closure(kernel) {
                if item.dot < self.rhs(item.production).len() {
                    continue;
                }
                if item.production == self.augmented {
                    row.cells.insert(Lookahead::End, Action::Accept);
                    continue;
                }
                for lookahead in lookaheads {
                    self.add_reduce(&mut row, state, lookahead, item.production)?;
                }
            }

            resolved_conflicts += row.resolved;
            actions.push(row.cells);
            gotos.push(goto_row);
        }

        Ok(ParseTable {
            productions: self.grammar.productions().to_vec(),
            actions,
            gotos,
            resolved_conflicts,
        })
    }

    fn add_reduce(
        &self,
        row: &mut Row,
        state: usize,
        lookahead: Lookahead,
        production: usize,
    ) -> Result<(), GrammarError> {
        if row.blocked.contains(&lookahead) {
            return Ok(());
        }

        match row.cells.get(&lookahead).copied() {
            None => {
                row.cells.insert(lookahead, Action::Reduce(production));
            }
            Some(Action::Reduce(other)) if other == production => {}
            Some(Action::Reduce(other)) => {
                return Err(GrammarError::Conflict {
                    kind: ConflictKind::ReduceReduce,
                    state,
                    lookahead,
                    detail: format!(
                        "reduce `{}` or reduce `{}`",
                        self.grammar.production(other),
                        self.grammar.production(production)
                    ),
                });
            }
            Some(Action::Shift(target)) => {
                let resolution = match lookahead {
                    Lookahead::Token(kind) => self
                        .grammar
                        .terminal_precedence(kind)
                        .zip(self.grammar.production_precedence(production)),
                    Lookahead::End => None,
                };
                let Some(((shift_level, assoc), (reduce_level, _))) = resolution else {
                    return Err(GrammarError::Conflict {
                        kind: ConflictKind::ShiftReduce,
                        state,
                        lookahead,
                        detail: format!(
                            "shift to state {} or reduce `{}`",
                            target,
                            self.grammar.production(production)
                        ),
                    });
                };

                row.resolved += 1;
                let choice = if reduce_level > shift_level {
                    Some(Action::Reduce(production))
                } else if reduce_level < shift_level {
                    Some(Action::Shift(target))
                } else {
                    match assoc {
                        Assoc::Left => Some(Action::Reduce(production)),
                        Assoc::Right => Some(Action::Shift(target)),
                        Assoc::NonAssoc => None,
                    }
                };
                trace!(state, %lookahead, ?choice, "resolved shift/reduce conflict");

                match choice {
                    Some(action) => {
                        row.cells.insert(lookahead, action);
                    }
                    None => {
                        row.cells.remove(&lookahead);
                        row.blocked.insert(lookahead);
                    }
                }
            }
            Some(Action::Accept) => {
                return Err(GrammarError::Conflict {
                    kind: ConflictKind::ShiftReduce,
                    state,
                    lookahead,
                    detail: format!(
                        "accept or reduce `{}`",
                        self.grammar.production(production)
                    ),
                });
            }
        }
        Ok(())
    }
}

/// One state's actions while the table is being assembled
#[derive(Default)]
struct Row {
    cells: FxHashMap<Lookahead, Action>,
    // cells emptied by a nonassociative operator; they stay errors
    blocked: FxHashSet<Lookahead>,
    resolved: usize,
}

fn core(kernel: &ItemSet) -> Vec<Item> {
    kernel.keys().copied().collect()
}

/// Merge lookaheads of `from` into `into`, which has the same core.
/// Returns whether anything was added.
fn merge(into: &mut ItemSet, from: ItemSet) -> bool {
    let mut grew = false;
    for (item, lookaheads) in from {
        let entry = into.entry(item).or_default();
        let before = entry.len();
        entry.extend(lookaheads);
        grew |= entry.len() != before;
    }
    grew
}
