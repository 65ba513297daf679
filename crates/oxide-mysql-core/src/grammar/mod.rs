//! Grammar and LALR(1) parse tables
//!
//! The MySQL grammar ships as yacc-like text (`mysql.y`). It is read into a
//! [`Grammar`], turned into an LALR(1) automaton and flattened into
//! [`ParseTables`]. Shift/reduce conflicts are settled by `%left`, `%right`
//! and `%nonassoc` declarations the way yacc does it.

mod error;
mod lalr;
mod precedence;
mod reader;
mod symbol;
mod tables;

pub use error::GrammarError;
pub use lalr::{StateId, TerminalSet};
pub use reader::parse_grammar;
pub use symbol::{
    Assoc, Grammar, NonterminalId, Precedence, Rule, RuleId, Symbol, Terminal, TerminalId, END,
    ERROR,
};
pub use tables::{Conflict, ParseAction, ParseTables};
