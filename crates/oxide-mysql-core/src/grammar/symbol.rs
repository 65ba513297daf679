//! Grammar symbols, rules and the grammar itself.

use std::collections::HashMap;
use std::fmt;

use crate::lexer::TokenKind;

pub type TerminalId = usize;
pub type NonterminalId = usize;
pub type RuleId = usize;

/// The end-of-input terminal.
pub const END: TerminalId = 0;
/// The reserved `error` terminal used by recovery rules.
pub const ERROR: TerminalId = 1;

/// A grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(TerminalId),
    Nonterminal(NonterminalId),
}

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    NonAssoc,
}

/// A precedence level; higher levels bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    pub level: u16,
    pub assoc: Assoc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub name: String,
    /// The token kind this terminal stands for. `None` for `error` and for
    /// names that only exist to carry a precedence (such as `UMINUS`).
    pub kind: Option<TokenKind>,
    pub precedence: Option<Precedence>,
}

/// A production `lhs -> rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    pub lhs: NonterminalId,
    pub rhs: Vec<Symbol>,
    pub precedence: Option<Precedence>,
}

/// A context-free grammar. Rule 0 is always `$accept -> <start>` and
/// nonterminal 0 is `$accept`.
#[derive(Debug, Clone)]
pub struct Grammar {
    terminals: Vec<Terminal>,
    nonterminals: Vec<String>,
    rules: Vec<Rule>,
    rules_by_lhs: Vec<Vec<RuleId>>,
    by_kind: HashMap<TokenKind, TerminalId>,
}

impl Grammar {
    pub(crate) fn new(terminals: Vec<Terminal>, nonterminals: Vec<String>, rules: Vec<Rule>) -> Self {
        let mut rules_by_lhs = vec![Vec::new(); nonterminals.len()];
        for rule in &rules {
            rules_by_lhs[rule.lhs].push(rule.id);
        }
        let by_kind = terminals
            .iter()
            .enumerate()
            .filter_map(|(id, t)| t.kind.map(|k| (k, id)))
            .collect();
        Self {
            terminals,
            nonterminals,
            rules,
            rules_by_lhs,
            by_kind,
        }
    }

    #[must_use]
    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    #[must_use]
    pub fn nonterminals(&self) -> &[String] {
        &self.nonterminals
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id)
    }

    /// Rules whose left-hand side is `nonterminal`, in declaration order.
    #[must_use]
    pub fn rules_for(&self, nonterminal: NonterminalId) -> &[RuleId] {
        self.rules_by_lhs
            .get(nonterminal)
            .map_or(&[], Vec::as_slice)
    }

    /// The terminal a token kind maps to.
    #[must_use]
    pub fn terminal_for(&self, kind: TokenKind) -> Option<TerminalId> {
        self.by_kind.get(&kind).copied()
    }

    #[must_use]
    pub fn terminal_id(&self, name: &str) -> Option<TerminalId> {
        self.terminals.iter().position(|t| t.name == name)
    }

    #[must_use]
    pub fn nonterminal_id(&self, name: &str) -> Option<NonterminalId> {
        self.nonterminals.iter().position(|n| n == name)
    }

    #[must_use]
    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(t) => self.terminals.get(t).map_or("?", |t| t.name.as_str()),
            Symbol::Nonterminal(n) => self.nonterminals.get(n).map_or("?", String::as_str),
        }
    }

    /// Renders a rule as `lhs -> a b c`, or `lhs -> %empty`.
    #[must_use]
    pub fn display_rule(&self, id: RuleId) -> String {
        let Some(rule) = self.rule(id) else {
            return format!("<rule {id}>");
        };
        let lhs = self.symbol_name(Symbol::Nonterminal(rule.lhs));
        if rule.rhs.is_empty() {
            return format!("{lhs} -> %empty");
        }
        let rhs: Vec<&str> = rule.rhs.iter().map(|&s| self.symbol_name(s)).collect();
        format!("{lhs} -> {}", rhs.join(" "))
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "R{}  {}", rule.id, self.display_rule(rule.id))?;
        }
        Ok(())
    }
}
