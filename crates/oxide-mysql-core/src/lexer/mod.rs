//! MySQL lexer
//!
//! A bank of DFAs scanned in lockstep with longest-match semantics, followed
//! by a classifier that turns each match into a token. The scanner can run
//! inline ([`Lexer`]) or on a worker thread behind a bounded channel
//! ([`spawn_scanner`]).

mod channel;
mod classify;
mod diagnostic;
pub mod dfa;
mod location;
mod rules;
mod scanner;
mod source;
mod token;
mod tokenizer;

pub use channel::{spawn_scanner, ChannelOptions, ScannerChannel};
pub use classify::Classification;
pub use dfa::{Dfa, DfaBank, DfaBuilder, DfaError, RuneClass};
pub use diagnostic::{Diagnostic, DiagnosticKind, LexError};
pub use location::Location;
pub use rules::{Action, Lexicon};
pub use scanner::{Frame, LexerOptions, ScanItem, Scanner};
pub use source::{Decoded, Input, ReaderInput, Rune, RuneInput};
pub use token::{sub, Keyword, Token, TokenKind, TokenValue};
pub use tokenizer::{Lexer, TokenSource};
