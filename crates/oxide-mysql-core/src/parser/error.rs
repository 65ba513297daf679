//! Parser errors.

use std::fmt;

use crate::grammar::{GrammarError, RuleId, StateId};
use crate::lexer::{LexError, Location, Token};

/// An unexpected token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub location: Location,
    /// Description of the offending token, such as `NAME 'x'`.
    pub found: String,
    pub lexeme: String,
    /// Names of the terminals the parser would have accepted.
    pub expected: Vec<String>,
}

impl SyntaxError {
    #[must_use]
    pub fn new(token: &Token, expected: Vec<String>) -> Self {
        Self {
            location: token.location,
            found: token.describe(),
            lexeme: token.lexeme.clone(),
            expected,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: unexpected {}, expected {{{}}}",
            self.location,
            self.found,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for SyntaxError {}

/// A semantic action refused a reduction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that end a parse.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(SyntaxError),

    /// Every error found while recovering, in source order.
    #[error("{}", render_all(.0))]
    Multiple(Vec<SyntaxError>),

    /// A semantic action failed.
    #[error("semantic action for R{rule} failed: {message}")]
    Action { rule: RuleId, message: String },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// The tables have no goto entry where the automaton needs one.
    #[error("parse tables have no goto on {symbol} from state {state}")]
    Table { state: StateId, symbol: String },
}

impl ParseError {
    /// The syntax errors carried by this error, if any.
    #[must_use]
    pub fn syntax_errors(&self) -> &[SyntaxError] {
        match self {
            Self::Syntax(e) => std::slice::from_ref(e),
            Self::Multiple(errors) => errors,
            _ => &[],
        }
    }
}

fn render_all(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
