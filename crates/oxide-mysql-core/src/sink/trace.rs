//! Reduction trace.

use crate::parser::{ActionError, SyntaxError, Value};

use super::{check_reduction, Reduction, Sink};

/// Records the parse as text, one line per event:
///
/// ```text
/// R12  select_core -> SELECT select_opts select_expr_list opt_into_list
/// ERROR at 1:8: unexpected end of input, expected {...}
/// ACCEPT
/// ```
#[derive(Debug, Default, Clone)]
pub struct TraceSink {
    lines: Vec<String>,
}

impl TraceSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Number of recorded reductions of rules whose left-hand side is `lhs`.
    #[must_use]
    pub fn count(&self, lhs: &str) -> usize {
        self.lines
            .iter()
            .filter(|line| {
                line.starts_with('R')
                    && line
                        .split_once("  ")
                        .is_some_and(|(_, rule)| rule.split(' ').next() == Some(lhs))
            })
            .count()
    }
}

impl Sink for TraceSink {
    fn shift(&mut self, _token: &crate::lexer::Token) -> Value {
        Value::None
    }

    fn reduce(&mut self, reduction: &Reduction<'_>, _values: Vec<Value>) -> Result<Value, ActionError> {
        check_reduction(reduction)?;
        self.lines
            .push(format!("R{}  {}", reduction.rule_id(), reduction.display()));
        Ok(Value::None)
    }

    fn syntax_error(&mut self, error: &SyntaxError) {
        self.lines.push(format!("ERROR at {error}"));
    }

    fn accept(&mut self) {
        self.lines.push("ACCEPT".to_string());
    }
}
