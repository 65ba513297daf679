//! The synchronous lexer: a scanner plus a classifier.

use std::io::Read;

use tracing::debug;

use super::diagnostic::{Diagnostic, LexError};
use super::rules::Lexicon;
use super::scanner::{LexerOptions, ScanItem, Scanner};
use super::source::{Input, ReaderInput};
use super::location::Location;
use super::token::{Token, TokenKind, TokenValue};

/// Anything that can feed tokens to the parser.
pub trait TokenSource {
    /// Returns the next token. After the EOF token, keeps returning EOF.
    fn next_token(&mut self) -> Result<Token, LexError>;

    /// Tells the source no more tokens are wanted.
    fn stop(&mut self) {}

    /// Drains the diagnostics gathered so far.
    fn take_diagnostics(&mut self) -> Vec<Diagnostic>;
}

/// Undoes the minus sign the number rules glue onto a literal when the
/// literal follows an operand: `a-1` is `a - 1`, while `(-1` keeps `-1`.
#[derive(Debug, Default)]
pub(crate) struct SignSplitter {
    after_operand: bool,
    pending: Option<Token>,
}

impl SignSplitter {
    /// The unsigned literal left over from the last split.
    pub(crate) fn take_pending(&mut self) -> Option<Token> {
        let literal = self.pending.take()?;
        self.after_operand = true;
        Some(literal)
    }

    /// Passes `token` through, or returns a `'-'` and keeps the unsigned
    /// literal for [`take_pending`](Self::take_pending).
    pub(crate) fn split(&mut self, token: Token) -> Token {
        if self.after_operand {
            if let Some((minus, literal)) = split_sign(&token) {
                self.pending = Some(literal);
                self.after_operand = false;
                return minus;
            }
        }
        self.after_operand = token.ends_operand();
        token
    }
}

fn split_sign(token: &Token) -> Option<(Token, Token)> {
    let digits = token.lexeme.strip_prefix('-')?;
    let (kind, value) = match (token.kind, &token.value) {
        (TokenKind::IntNum, _) => match digits.parse::<i64>() {
            Ok(n) => (TokenKind::IntNum, TokenValue::Int(n)),
            // Only -9223372036854775808 loses its range here.
            Err(_) => (
                TokenKind::ApproxNum,
                TokenValue::Float(digits.parse().unwrap_or(f64::INFINITY)),
            ),
        },
        (TokenKind::ApproxNum, TokenValue::Float(x)) => (TokenKind::ApproxNum, TokenValue::Float(-x)),
        _ => return None,
    };
    let at = token.location;
    let minus = Token::new(TokenKind::Punct('-'), TokenValue::None, "-", at);
    let literal = Token::new(kind, value, digits, Location::new(at.line, at.column + 1));
    Some((minus, literal))
}

/// A lexer that tokenizes MySQL input.
pub struct Lexer<'b, I> {
    scanner: Scanner<'b, I>,
    lexicon: &'b Lexicon,
    signs: SignSplitter,
    diagnostics: Vec<Diagnostic>,
    eof: Option<Token>,
}

impl<'a> Lexer<'static, ReaderInput<&'a [u8]>> {
    /// Creates a lexer over an in-memory string.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::from_reader(input.as_bytes())
    }
}

impl<R: Read> Lexer<'static, ReaderInput<R>> {
    /// Creates a lexer decoding `reader` incrementally.
    #[must_use]
    pub fn from_reader(reader: R) -> Self {
        Self::with_options(reader, LexerOptions::default())
    }

    #[must_use]
    pub fn with_options(reader: R, options: LexerOptions) -> Self {
        Lexer::with_lexicon(Lexicon::mysql(), ReaderInput::new(reader), options)
    }
}

impl<'b, I: Input> Lexer<'b, I> {
    /// Creates a lexer running `lexicon` over `input`.
    #[must_use]
    pub fn with_lexicon(lexicon: &'b Lexicon, input: I, options: LexerOptions) -> Self {
        Self {
            scanner: Scanner::new(lexicon.bank(), input, options),
            lexicon,
            signs: SignSplitter::default(),
            diagnostics: Vec::new(),
            eof: None,
        }
    }

    /// Returns the next token, skipping whitespace and comments.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(eof) = &self.eof {
            return Ok(eof.clone());
        }
        if let Some(literal) = self.signs.take_pending() {
            return Ok(literal);
        }
        loop {
            let frame = match self.scanner.next_item()? {
                Some(ScanItem::Frame(frame)) => frame,
                Some(ScanItem::Diagnostic(d)) => {
                    self.record(d);
                    continue;
                }
                // The scanner always ends with an EOF frame.
                None => return Err(LexError::Stopped),
            };
            let classified = self.lexicon.classify(&frame);
            if let Some(d) = classified.diagnostic {
                self.record(d);
            }
            if let Some(token) = classified.token {
                if token.kind == TokenKind::Eof {
                    self.eof = Some(token.clone());
                }
                return Ok(self.signs.split(token));
            }
        }
    }

    /// Lexes the rest of the input, ending with the EOF token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Diagnostics gathered so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        debug!(%diagnostic, "lexical diagnostic");
        self.diagnostics.push(diagnostic);
    }
}

impl<I: Input> TokenSource for Lexer<'_, I> {
    fn next_token(&mut self) -> Result<Token, LexError> {
        Lexer::next_token(self)
    }

    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

impl<I: Input> Iterator for Lexer<'_, I> {
    type Item = Result<Token, LexError>;

    /// Yields tokens up to and including EOF, then stops.
    fn next(&mut self) -> Option<Self::Item> {
        if self.eof.is_some() {
            return None;
        }
        Some(self.next_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::token::{Keyword, TokenValue};

    fn kinds(sql: &str) -> Vec<TokenKind> {
        Lexer::new(sql)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_select() {
        assert_eq!(
            kinds("SELECT 1;"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::IntNum,
                TokenKind::Punct(';'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Name);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let tokens: Vec<_> = Lexer::new("a b").map(Result::unwrap).collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].kind, TokenKind::Eof);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("a -- note\n# other\n/* block */ b // tail"),
            vec![TokenKind::Name, TokenKind::Name, TokenKind::Eof]
        );
    }

    #[test]
    fn test_diagnostics_collected() {
        let mut lexer = Lexer::new("SELECT ? 'open");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens.len(), 2);
        let messages: Vec<_> = lexer.diagnostics().iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "unrecognized character '?' at 1:8".to_string(),
                "unterminated string at 1:10".to_string(),
            ]
        );
    }

    #[test]
    fn test_token_values() {
        let tokens = Lexer::new("`my col` @v 2.5").tokenize().unwrap();
        assert_eq!(tokens[0].value, TokenValue::Str("my col".into()));
        assert_eq!(tokens[1].kind, TokenKind::UserVar);
        assert_eq!(tokens[2].value, TokenValue::Float(2.5));
    }

    #[test]
    fn test_minus_after_operand_is_split() {
        let tokens = Lexer::new("a-0 (-1) x -2.5").tokenize().unwrap();
        let lines: Vec<_> = tokens.iter().map(Token::trace_line).collect();
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        assert_eq!(
            lines[..lines.len() - 1],
            vec![
                "1:1  NAME  a",
                "1:2  '-'  -",
                "1:3  INTNUM  0",
                "1:5  '('  (",
                "1:6  INTNUM  -1",
                "1:8  ')'  )",
                "1:10  NAME  x",
                "1:12  '-'  -",
                "1:13  APPROXNUM  2.5",
            ]
        );
    }

    #[test]
    fn test_split_keeps_the_range_of_the_literal() {
        let tokens = Lexer::new("a-9223372036854775808").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Punct('-'));
        assert_eq!(tokens[2].kind, TokenKind::ApproxNum);
        assert_eq!(tokens[2].lexeme, "9223372036854775808");
    }
}
