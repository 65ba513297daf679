//! The table-driven LALR(1) parse loop.

use tracing::{debug, trace};

use crate::grammar::{ParseAction, ParseTables, RuleId, StateId, Symbol, TerminalId, END, ERROR};
use crate::lexer::{Lexer, Location, Token, TokenKind, TokenSource};
use crate::sink::{Reduction, Sink};

use super::error::{ParseError, SyntaxError};
use super::value::Value;

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    /// Resynchronize on `error` rules instead of stopping at the first
    /// syntax error.
    pub recover: bool,
}

/// One parser stack entry.
#[derive(Debug)]
struct Cell {
    state: StateId,
    value: Value,
    /// The shifted token, for terminal cells other than `error`.
    token: Option<Token>,
    location: Location,
}

impl Cell {
    const fn new(state: StateId, value: Value, token: Option<Token>, location: Location) -> Self {
        Self {
            state,
            value,
            token,
            location,
        }
    }
}

/// Drives parse tables over a token source, reporting to a [`Sink`].
pub struct Parser<'t, S> {
    tables: &'t ParseTables,
    sink: S,
    options: ParserOptions,
}

impl<S: Sink> Parser<'static, S> {
    /// A parser for the built-in MySQL grammar.
    pub fn mysql(sink: S) -> Result<Self, ParseError> {
        Ok(Self::new(ParseTables::mysql()?, sink))
    }
}

impl<'t, S: Sink> Parser<'t, S> {
    #[must_use]
    pub fn new(tables: &'t ParseTables, sink: S) -> Self {
        Self {
            tables,
            sink,
            options: ParserOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Parses an in-memory string with the MySQL lexer.
    pub fn parse_str(&mut self, input: &str) -> Result<Value, ParseError> {
        let mut lexer = Lexer::new(input);
        self.parse(&mut lexer)
    }

    /// Parses tokens from `source` until the input is accepted or rejected.
    ///
    /// Returns the value of the start symbol. With recovery enabled, errors
    /// found on the way are returned once the rest of the input is parsed.
    /// The source is stopped before returning either way.
    pub fn parse<T: TokenSource + ?Sized>(&mut self, source: &mut T) -> Result<Value, ParseError> {
        let result = self.drive(source);
        source.stop();
        result
    }

    fn drive<T: TokenSource + ?Sized>(&mut self, source: &mut T) -> Result<Value, ParseError> {
        let tables = self.tables;
        let mut stack = vec![Cell::new(0, Value::None, None, Location::default())];
        let mut lookahead: Option<(Token, TerminalId)> = None;
        let mut errors: Vec<SyntaxError> = Vec::new();
        // Set between shifting `error` and the next real shift.
        let mut discarding = false;

        loop {
            let (token, terminal) = match lookahead.take() {
                Some(pending) => pending,
                None => {
                    let token = source.next_token()?;
                    let terminal = self.terminal(&token);
                    (token, terminal)
                }
            };
            let state = top_state(&stack);

            match tables.action(state, terminal) {
                ParseAction::Shift(next) => {
                    trace!(state, next, token = %token.describe(), "shift");
                    let value = self.sink.shift(&token);
                    let location = token.location;
                    stack.push(Cell::new(next, value, Some(token), location));
                    discarding = false;
                }
                ParseAction::Reduce(rule) => {
                    self.reduce(&mut stack, rule, token.location)?;
                    lookahead = Some((token, terminal));
                }
                ParseAction::Accept => {
                    debug!(errors = errors.len(), "input accepted");
                    source.stop();
                    self.sink.accept();
                    let value = stack.pop().map(|cell| cell.value).unwrap_or_default();
                    return if errors.is_empty() {
                        Ok(value)
                    } else {
                        Err(collect(errors))
                    };
                }
                ParseAction::Error => {
                    if !discarding {
                        let error = SyntaxError::new(&token, self.expected(state));
                        debug!(%error, "syntax error");
                        self.sink.syntax_error(&error);
                        if !self.options.recover {
                            return Err(ParseError::Syntax(error));
                        }
                        errors.push(error);
                    }

                    if discarding {
                        if terminal == END {
                            debug!("end of input while recovering");
                            return Err(collect(errors));
                        }
                        trace!(token = %token.describe(), "discard");
                        continue;
                    }

                    // Unwind to a state that can shift `error`.
                    let recovered = loop {
                        let top = top_state(&stack);
                        if let ParseAction::Shift(next) = tables.action(top, ERROR) {
                            break Some(next);
                        }
                        if stack.len() == 1 {
                            break None;
                        }
                        stack.pop();
                    };
                    let Some(next) = recovered else {
                        debug!("no state accepts error, giving up");
                        return Err(collect(errors));
                    };
                    trace!(state = next, "shift error");
                    stack.push(Cell::new(next, Value::None, None, token.location));
                    discarding = true;
                    lookahead = Some((token, terminal));
                }
            }
        }
    }

    fn reduce(&mut self, stack: &mut Vec<Cell>, rule_id: RuleId, at: Location) -> Result<(), ParseError> {
        let tables = self.tables;
        let grammar = tables.grammar();
        let state = top_state(stack);
        let rule = grammar.rule(rule_id).ok_or_else(|| ParseError::Table {
            state,
            symbol: format!("R{rule_id}"),
        })?;
        let lhs_name = grammar.symbol_name(Symbol::Nonterminal(rule.lhs));
        if stack.len() <= rule.rhs.len() {
            return Err(ParseError::Table {
                state,
                symbol: lhs_name.to_string(),
            });
        }

        let cells = stack.split_off(stack.len() - rule.rhs.len());
        let location = cells.first().map_or(at, |cell| cell.location);
        let (tokens, values): (Vec<Option<Token>>, Vec<Value>) =
            cells.into_iter().map(|cell| (cell.token, cell.value)).unzip();

        let reduction = Reduction::new(grammar, rule, &tokens, location);
        trace!(rule = rule_id, %location, "reduce {}", reduction.display());
        let value = self
            .sink
            .reduce(&reduction, values)
            .map_err(|e| ParseError::Action {
                rule: rule_id,
                message: e.message,
            })?;

        let below = top_state(stack);
        let next = tables
            .goto(below, rule.lhs)
            .ok_or_else(|| ParseError::Table {
                state: below,
                symbol: lhs_name.to_string(),
            })?;
        stack.push(Cell::new(next, value, None, location));
        Ok(())
    }

    fn terminal(&self, token: &Token) -> TerminalId {
        if token.kind == TokenKind::Eof {
            return END;
        }
        // A kind the grammar never mentions can only be a syntax error.
        self.tables
            .grammar()
            .terminal_for(token.kind)
            .unwrap_or(usize::MAX)
    }

    fn expected(&self, state: StateId) -> Vec<String> {
        let grammar = self.tables.grammar();
        self.tables
            .expected(state)
            .into_iter()
            .map(|t| grammar.symbol_name(Symbol::Terminal(t)).to_string())
            .collect()
    }
}

fn top_state(stack: &[Cell]) -> StateId {
    stack.last().map_or(0, |cell| cell.state)
}

fn collect(mut errors: Vec<SyntaxError>) -> ParseError {
    if errors.len() == 1 {
        if let Some(error) = errors.pop() {
            return ParseError::Syntax(error);
        }
    }
    ParseError::Multiple(errors)
}
