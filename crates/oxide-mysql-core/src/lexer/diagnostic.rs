//! Lexical diagnostics and fatal lexer errors.

use std::io;

use super::Location;

/// What a [`Diagnostic`] reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Bytes that are not well-formed UTF-8. They are skipped.
    InvalidUtf8(Vec<u8>),
    /// A rune no lexical rule accepts. It is dropped.
    UnrecognizedCharacter(char),
    UnterminatedString,
    UnterminatedComment,
    UnterminatedName,
    /// An integer literal that does not fit in 64 bits.
    IntegerOutOfRange(String),
}

/// A non-fatal lexical finding. Scanning continues after it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} at {location}", message(.kind))]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: Location,
}

impl Diagnostic {
    #[must_use]
    pub const fn new(kind: DiagnosticKind, location: Location) -> Self {
        Self { kind, location }
    }
}

fn message(kind: &DiagnosticKind) -> String {
    match kind {
        DiagnosticKind::InvalidUtf8(bytes) => {
            let hex: Vec<_> = bytes.iter().map(|b| format!("{b:02X}")).collect();
            format!("invalid UTF-8 sequence {}", hex.join(" "))
        }
        DiagnosticKind::UnrecognizedCharacter(c) => format!("unrecognized character {c:?}"),
        DiagnosticKind::UnterminatedString => "unterminated string".to_string(),
        DiagnosticKind::UnterminatedComment => "unterminated block comment".to_string(),
        DiagnosticKind::UnterminatedName => "unterminated quoted name".to_string(),
        DiagnosticKind::IntegerOutOfRange(lexeme) => {
            format!("integer literal {lexeme} out of range")
        }
    }
}

/// A failure that ends scanning.
#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// The scanner behind a channel went away before end of input.
    #[error("scanner stopped before end of input")]
    Stopped,
}
