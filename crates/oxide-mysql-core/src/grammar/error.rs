//! Grammar errors.

/// The grammar text is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    /// A lexical or structural problem in the grammar text.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A rule mentions a terminal no token kind maps to.
    #[error("unknown terminal '{0}'")]
    UnknownTerminal(String),

    /// A nonterminal is used but never defined.
    #[error("nonterminal '{name}' used on line {line} has no rules")]
    UndefinedNonterminal { name: String, line: usize },

    /// The start symbol has no rules.
    #[error("start symbol '{0}' has no rules")]
    MissingStart(String),

    /// The grammar has no rules at all.
    #[error("grammar has no rules")]
    Empty,
}
