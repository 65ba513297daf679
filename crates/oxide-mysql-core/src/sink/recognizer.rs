use crate::parser::{ActionError, Value};

use super::{check_reduction, Reduction, Sink};

/// A sink that only checks: it accepts or rejects and keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Recognizer;

impl Sink for Recognizer {
    fn shift(&mut self, _token: &crate::lexer::Token) -> Value {
        Value::None
    }

    fn reduce(&mut self, reduction: &Reduction<'_>, _values: Vec<Value>) -> Result<Value, ActionError> {
        check_reduction(reduction)?;
        Ok(Value::None)
    }
}
