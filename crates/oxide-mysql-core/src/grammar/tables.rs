//! ACTION and GOTO tables.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use tracing::debug;

use super::error::GrammarError;
use super::lalr::{self, StateId};
use super::precedence::{self, Resolution};
use super::reader::parse_grammar;
use super::symbol::{Grammar, NonterminalId, RuleId, Symbol, TerminalId, ERROR};

/// One ACTION table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAction {
    Error,
    Shift(StateId),
    Reduce(RuleId),
    Accept,
}

/// A conflict precedence could not settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// Settled in favor of the shift.
    ShiftReduce {
        state: StateId,
        terminal: TerminalId,
        rule: RuleId,
    },
    /// Settled in favor of the rule declared first.
    ReduceReduce {
        state: StateId,
        terminal: TerminalId,
        kept: RuleId,
        dropped: RuleId,
    },
}

/// LALR(1) parse tables together with the grammar they were built from.
#[derive(Debug)]
pub struct ParseTables {
    grammar: Grammar,
    state_count: usize,
    actions: Vec<ParseAction>,
    gotos: Vec<Option<StateId>>,
    conflicts: Vec<Conflict>,
}

const MYSQL_GRAMMAR: &str = include_str!("mysql.y");

static MYSQL: LazyLock<Result<ParseTables, GrammarError>> =
    LazyLock::new(|| ParseTables::from_source(MYSQL_GRAMMAR));

impl ParseTables {
    /// The tables of the built-in MySQL grammar, built on first use.
    pub fn mysql() -> Result<&'static Self, GrammarError> {
        MYSQL.as_ref().map_err(Clone::clone)
    }

    /// The built-in grammar text.
    #[must_use]
    pub const fn mysql_source() -> &'static str {
        MYSQL_GRAMMAR
    }

    /// Reads grammar text and builds its tables.
    pub fn from_source(text: &str) -> Result<Self, GrammarError> {
        parse_grammar(text).map(Self::build)
    }

    #[must_use]
    pub fn build(grammar: Grammar) -> Self {
        let automaton = lalr::build(&grammar);
        let terminals = grammar.terminals().len();
        let nonterminals = grammar.nonterminals().len();
        let state_count = automaton.state_count();
        let mut actions = vec![ParseAction::Error; state_count * terminals];
        let mut gotos = vec![None; state_count * nonterminals];
        let mut conflicts = Vec::new();

        for state in 0..state_count {
            for &(symbol, target) in &automaton.gotos[state] {
                match symbol {
                    Symbol::Terminal(t) => actions[state * terminals + t] = ParseAction::Shift(target),
                    Symbol::Nonterminal(n) => gotos[state * nonterminals + n] = Some(target),
                }
            }

            let mut chosen: BTreeMap<TerminalId, RuleId> = BTreeMap::new();
            for (rule, lookaheads) in &automaton.reductions[state] {
                for terminal in lookaheads.iter() {
                    match chosen.entry(terminal) {
                        Entry::Vacant(entry) => {
                            entry.insert(*rule);
                        }
                        Entry::Occupied(mut entry) => {
                            let (kept, dropped) = if *rule < *entry.get() {
                                (*rule, *entry.get())
                            } else {
                                (*entry.get(), *rule)
                            };
                            debug!(
                                state,
                                terminal = %grammar.terminals()[terminal].name,
                                kept = %grammar.display_rule(kept),
                                dropped = %grammar.display_rule(dropped),
                                "reduce/reduce conflict"
                            );
                            conflicts.push(Conflict::ReduceReduce {
                                state,
                                terminal,
                                kept,
                                dropped,
                            });
                            entry.insert(kept);
                        }
                    }
                }
            }

            for (terminal, rule) in chosen {
                let cell = &mut actions[state * terminals + terminal];
                if rule == 0 {
                    *cell = ParseAction::Accept;
                    continue;
                }
                *cell = match *cell {
                    ParseAction::Shift(target) => {
                        let rule_prec = grammar.rules()[rule].precedence;
                        let term_prec = grammar.terminals()[terminal].precedence;
                        match precedence::resolve(rule_prec, term_prec) {
                            Resolution::Shift => ParseAction::Shift(target),
                            Resolution::Reduce => ParseAction::Reduce(rule),
                            Resolution::Error => ParseAction::Error,
                            Resolution::Unresolved => {
                                debug!(
                                    state,
                                    terminal = %grammar.terminals()[terminal].name,
                                    rule = %grammar.display_rule(rule),
                                    "shift/reduce conflict"
                                );
                                conflicts.push(Conflict::ShiftReduce {
                                    state,
                                    terminal,
                                    rule,
                                });
                                ParseAction::Shift(target)
                            }
                        }
                    }
                    _ => ParseAction::Reduce(rule),
                };
            }
        }

        debug!(
            states = state_count,
            terminals,
            rules = grammar.rules().len(),
            conflicts = conflicts.len(),
            "built parse tables"
        );
        Self {
            grammar,
            state_count,
            actions,
            gotos,
            conflicts,
        }
    }

    #[must_use]
    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    #[must_use]
    pub const fn state_count(&self) -> usize {
        self.state_count
    }

    #[must_use]
    pub fn action(&self, state: StateId, terminal: TerminalId) -> ParseAction {
        let width = self.grammar.terminals().len();
        if terminal >= width {
            return ParseAction::Error;
        }
        self.actions
            .get(state * width + terminal)
            .copied()
            .unwrap_or(ParseAction::Error)
    }

    #[must_use]
    pub fn goto(&self, state: StateId, nonterminal: NonterminalId) -> Option<StateId> {
        let width = self.grammar.nonterminals().len();
        if nonterminal >= width {
            return None;
        }
        self.gotos.get(state * width + nonterminal).copied().flatten()
    }

    /// Terminals with a non-error action in `state`, not counting `error`.
    #[must_use]
    pub fn expected(&self, state: StateId) -> Vec<TerminalId> {
        (0..self.grammar.terminals().len())
            .filter(|&t| t != ERROR && self.action(state, t) != ParseAction::Error)
            .collect()
    }

    /// Conflicts settled by the default rules while building.
    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}
