//! Semantic sinks
//!
//! The parser hands every shifted token and every reduction to a [`Sink`].
//! Three sinks ship with the crate:
//!
//! - [`Recognizer`] runs the semantic checks and keeps nothing.
//! - [`TraceSink`] records one `R<id>  lhs -> rhs` line per reduction.
//! - [`TreeSink`] builds a [`SyntaxTree`](crate::ast::SyntaxTree).

mod checks;
mod recognizer;
mod trace;
mod tree;

pub use checks::check_reduction;
pub use recognizer::Recognizer;
pub use trace::TraceSink;
pub use tree::TreeSink;

use crate::grammar::{Grammar, Rule, RuleId, Symbol};
use crate::lexer::{Location, Token};
use crate::parser::{ActionError, SyntaxError, Value};

/// Receives parser events.
pub trait Sink {
    /// Produces the stack value for a shifted token.
    fn shift(&mut self, token: &Token) -> Value {
        Value::from_token(token)
    }

    /// Combines the values of a rule's right-hand side into the value of its
    /// left-hand side. `values` has one entry per right-hand side symbol.
    fn reduce(&mut self, reduction: &Reduction<'_>, values: Vec<Value>) -> Result<Value, ActionError>;

    /// Called once per reported syntax error.
    fn syntax_error(&mut self, _error: &SyntaxError) {}

    /// Called when the input is accepted.
    fn accept(&mut self) {}
}

/// A view of one reduction: the rule and the tokens shifted for its
/// terminal symbols.
#[derive(Debug, Clone, Copy)]
pub struct Reduction<'a> {
    grammar: &'a Grammar,
    rule: &'a Rule,
    tokens: &'a [Option<Token>],
    location: Location,
}

impl<'a> Reduction<'a> {
    #[must_use]
    pub const fn new(
        grammar: &'a Grammar,
        rule: &'a Rule,
        tokens: &'a [Option<Token>],
        location: Location,
    ) -> Self {
        Self {
            grammar,
            rule,
            tokens,
            location,
        }
    }

    #[must_use]
    pub const fn rule_id(&self) -> RuleId {
        self.rule.id
    }

    #[must_use]
    pub const fn rule(&self) -> &'a Rule {
        self.rule
    }

    /// Name of the left-hand side nonterminal.
    #[must_use]
    pub fn lhs(&self) -> &'a str {
        self.grammar.symbol_name(Symbol::Nonterminal(self.rule.lhs))
    }

    #[must_use]
    pub fn rhs(&self) -> &'a [Symbol] {
        &self.rule.rhs
    }

    /// Name of the `i`th right-hand side symbol.
    #[must_use]
    pub fn symbol_name(&self, i: usize) -> Option<&'a str> {
        self.rule.rhs.get(i).map(|&s| self.grammar.symbol_name(s))
    }

    /// The token shifted for the `i`th symbol, when that symbol is a
    /// terminal other than `error`.
    #[must_use]
    pub fn token(&self, i: usize) -> Option<&'a Token> {
        self.tokens.get(i).and_then(Option::as_ref)
    }

    /// Tokens shifted directly by this rule, in order.
    pub fn tokens(&self) -> impl Iterator<Item = &'a Token> {
        self.tokens.iter().flatten()
    }

    /// Where the reduced phrase starts. Empty rules report the lookahead.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// The rule as `lhs -> rhs`.
    #[must_use]
    pub fn display(&self) -> String {
        self.grammar.display_rule(self.rule.id)
    }
}
