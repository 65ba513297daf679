//! LALR(1) parser
//!
//! [`Parser`] runs [`ParseTables`](crate::grammar::ParseTables) over any
//! [`TokenSource`](crate::lexer::TokenSource) and reports shifts,
//! reductions and syntax errors to a [`Sink`](crate::sink::Sink).

mod driver;
mod error;
mod value;

pub use driver::{Parser, ParserOptions};
pub use error::{ActionError, ParseError, SyntaxError};
pub use value::Value;
