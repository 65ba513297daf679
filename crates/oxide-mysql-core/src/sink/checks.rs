//! Reduction checks shared by the shipped sinks.

use crate::lexer::{sub, TokenKind};
use crate::parser::ActionError;

use super::Reduction;

/// Rejects reductions the grammar accepts but MySQL does not:
///
/// - a comparison used as an assignment (outside `expr`) must be `=`;
/// - `IF EXISTS` and `IF NOT EXISTS` must appear where each belongs.
pub fn check_reduction(reduction: &Reduction<'_>) -> Result<(), ActionError> {
    match reduction.lhs() {
        "expr" => Ok(()),
        "opt_if_not_exists" => check_exists(reduction, sub::NOT_EXISTS, "IF NOT EXISTS"),
        "opt_if_exists" => check_exists(reduction, sub::EXISTS, "IF EXISTS"),
        _ => check_assignment(reduction),
    }
}

fn check_assignment(reduction: &Reduction<'_>) -> Result<(), ActionError> {
    for token in reduction.tokens() {
        if token.kind == TokenKind::Comparison && token.sub_token() != Some(sub::EQ) {
            return Err(ActionError::new(format!(
                "expected '=' in {} but found '{}' at {}",
                reduction.lhs(),
                token.lexeme,
                token.location
            )));
        }
    }
    Ok(())
}

fn check_exists(reduction: &Reduction<'_>, wanted: i32, spelling: &str) -> Result<(), ActionError> {
    match reduction.tokens().find(|t| t.kind == TokenKind::Exists) {
        Some(token) if token.sub_token() != Some(wanted) => Err(ActionError::new(format!(
            "expected {spelling} at {}",
            token.location
        ))),
        _ => Ok(()),
    }
}
