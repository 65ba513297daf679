//! Turns scanner frames into tokens.
//!
//! Classification is a pure function of the frame: the rule index selects an
//! [`Action`], and the action decides the token kind and value. Whitespace
//! and comments produce nothing; the error rules produce only a diagnostic.

use super::diagnostic::{Diagnostic, DiagnosticKind};
use super::rules::{Action, Lexicon};
use super::scanner::Frame;
use super::token::{Token, TokenKind, TokenValue};

/// The outcome of classifying one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    pub token: Option<Token>,
    pub diagnostic: Option<Diagnostic>,
}

impl Classification {
    fn token(token: Token) -> Self {
        Self {
            token: Some(token),
            diagnostic: None,
        }
    }

    fn diagnostic(kind: DiagnosticKind, frame: &Frame) -> Self {
        Self {
            token: None,
            diagnostic: Some(Diagnostic::new(kind, frame.location)),
        }
    }
}

impl Lexicon {
    /// Classifies a frame produced by a scanner running this lexicon's bank.
    ///
    /// Frames from nested banks (depth above 0) have no action here and
    /// classify to nothing.
    #[must_use]
    pub fn classify(&self, frame: &Frame) -> Classification {
        let Some(rule) = frame.rule else {
            return Classification::token(Token::eof(frame.location));
        };
        if frame.depth > 0 {
            return Classification::default();
        }
        let Some(action) = self.action(rule) else {
            return Classification::default();
        };

        let lexeme = frame.lexeme.as_str();
        let (kind, value) = match action {
            Action::Keyword(k) | Action::Logical(k) => (TokenKind::Keyword(k), TokenValue::None),
            Action::Bool(n) => (TokenKind::Bool, TokenValue::SubToken(n)),
            Action::Exists(n) => (TokenKind::Exists, TokenValue::SubToken(n)),
            Action::Comparison(n) => (TokenKind::Comparison, TokenValue::SubToken(n)),
            Action::Shift(n) => (TokenKind::Shift, TokenValue::SubToken(n)),
            Action::Assign => (TokenKind::Assign, TokenValue::None),
            Action::Punct => match lexeme.chars().next() {
                Some(c) => (TokenKind::Punct(c), TokenValue::None),
                None => return Classification::default(),
            },
            Action::QuotedString => (TokenKind::String, TokenValue::Str(unquote(lexeme))),
            Action::RawString => (TokenKind::String, TokenValue::Str(lexeme.to_string())),
            Action::Int => {
                if let Ok(n) = lexeme.parse::<i64>() {
                    (TokenKind::IntNum, TokenValue::Int(n))
                } else {
                    let approx = lexeme.parse::<f64>().unwrap_or(f64::INFINITY);
                    let token = Token::new(
                        TokenKind::ApproxNum,
                        TokenValue::Float(approx),
                        lexeme,
                        frame.location,
                    );
                    let kind = DiagnosticKind::IntegerOutOfRange(lexeme.to_string());
                    return Classification {
                        token: Some(token),
                        diagnostic: Some(Diagnostic::new(kind, frame.location)),
                    };
                }
            }
            Action::Float => (
                TokenKind::ApproxNum,
                TokenValue::Float(lexeme.parse().unwrap_or(f64::NAN)),
            ),
            Action::QuotedName => (TokenKind::Name, TokenValue::Str(unquote(lexeme))),
            Action::Name | Action::UserVar => {
                let kind = if action == Action::Name {
                    TokenKind::Name
                } else {
                    TokenKind::UserVar
                };
                (kind, TokenValue::Str(lexeme.to_string()))
            }
            Action::Function(kind) => (kind, TokenValue::None),
            Action::Skip => return Classification::default(),
            Action::UnterminatedString => {
                return Classification::diagnostic(DiagnosticKind::UnterminatedString, frame)
            }
            Action::UnterminatedComment => {
                return Classification::diagnostic(DiagnosticKind::UnterminatedComment, frame)
            }
            Action::UnterminatedName => {
                return Classification::diagnostic(DiagnosticKind::UnterminatedName, frame)
            }
        };
        Classification::token(Token::new(kind, value, lexeme, frame.location))
    }
}

/// Strips the first and last rune, which the rules guarantee are quotes.
fn unquote(lexeme: &str) -> String {
    let mut chars = lexeme.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}
