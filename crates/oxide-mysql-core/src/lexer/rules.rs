//! The MySQL lexical rules.
//!
//! Each rule is a DFA paired with the [`Action`] that turns its matches into
//! tokens. Rule order matters only for equal-length matches, where the
//! earlier rule wins: keywords come before `NAME`, and so on.

use std::sync::LazyLock;

use tracing::debug;

use super::dfa::{whitespace, Dfa, DfaBank, DfaBuilder, RuneClass};
use super::token::{sub, Keyword, TokenKind};

/// What to do with a match of one lexical rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Keyword(Keyword),
    /// `&&` and `||`, emitted as the `AND` and `OR` keywords.
    Logical(Keyword),
    Bool(i32),
    Exists(i32),
    Comparison(i32),
    Shift(i32),
    Assign,
    Punct,
    /// A quoted string; the outer quotes are stripped, escapes are kept.
    QuotedString,
    /// Hex and bit literals, kept verbatim as `STRING`.
    RawString,
    Int,
    Float,
    /// A backtick-quoted name; the backticks are stripped.
    QuotedName,
    Name,
    UserVar,
    Function(TokenKind),
    /// Whitespace and comments.
    Skip,
    UnterminatedString,
    UnterminatedComment,
    UnterminatedName,
}

/// A DFA bank together with the action of each rule.
#[derive(Debug)]
pub struct Lexicon {
    bank: DfaBank,
    actions: Vec<Action>,
}

static MYSQL: LazyLock<Lexicon> = LazyLock::new(Lexicon::build_mysql);

impl Lexicon {
    /// Pairs `rules` into a lexicon; rule `i` is the `i`-th DFA of the bank.
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = (Dfa, Action)>) -> Self {
        let (dfas, actions): (Vec<_>, Vec<_>) = rules.into_iter().unzip();
        Self {
            bank: DfaBank::new(dfas),
            actions,
        }
    }

    /// The shipped MySQL lexicon, built on first use.
    #[must_use]
    pub fn mysql() -> &'static Self {
        &MYSQL
    }

    #[must_use]
    pub const fn bank(&self) -> &DfaBank {
        &self.bank
    }

    #[must_use]
    pub fn action(&self, rule: usize) -> Option<Action> {
        self.actions.get(rule).copied()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn build_mysql() -> Self {
        let mut rules: Vec<(Dfa, Action)> = Keyword::ALL
            .iter()
            .map(|&k| (Dfa::keyword(k.as_str(), k.spellings()), Action::Keyword(k)))
            .collect();

        rules.extend([
            (Dfa::keyword("EXISTS", &["EXISTS"]), Action::Exists(sub::EXISTS)),
            (
                Dfa::keyword("NOT EXISTS", &["NOT EXISTS"]),
                Action::Exists(sub::NOT_EXISTS),
            ),
        ]);

        for (name, spellings, kind) in [
            ("COUNT", &["COUNT"][..], TokenKind::FCount),
            ("TRIM", &["TRIM"][..], TokenKind::FTrim),
            ("SUBSTRING", &["SUBSTRING", "SUBSTR"][..], TokenKind::FSubstring),
            ("DATE_ADD", &["DATE_ADD"][..], TokenKind::FDateAdd),
            ("DATE_SUB", &["DATE_SUB"][..], TokenKind::FDateSub),
        ] {
            let dfa = Dfa::keyword(name, spellings).with_follow(RuneClass::char('('));
            rules.push((dfa, Action::Function(kind)));
        }

        rules.extend([
            (Dfa::keyword("TRUE", &["TRUE"]), Action::Bool(sub::TRUE)),
            (Dfa::keyword("UNKNOWN", &["UNKNOWN"]), Action::Bool(sub::UNKNOWN)),
            (Dfa::keyword("FALSE", &["FALSE"]), Action::Bool(sub::FALSE)),
            (Dfa::keyword("&&", &["&&"]), Action::Logical(Keyword::And)),
            (Dfa::keyword("||", &["||"]), Action::Logical(Keyword::Or)),
            (punctuation(), Action::Punct),
            (Dfa::keyword("=", &["="]), Action::Comparison(sub::EQ)),
            (Dfa::keyword("<=>", &["<=>"]), Action::Comparison(sub::NULL_SAFE_EQ)),
            (Dfa::keyword(">=", &[">="]), Action::Comparison(sub::GE)),
            (Dfa::keyword(">", &[">"]), Action::Comparison(sub::GT)),
            (Dfa::keyword("<=", &["<="]), Action::Comparison(sub::LE)),
            (Dfa::keyword("<", &["<"]), Action::Comparison(sub::LT)),
            (Dfa::keyword("!=", &["!=", "<>"]), Action::Comparison(sub::NE)),
            (Dfa::keyword("<<", &["<<"]), Action::Shift(sub::SHIFT_LEFT)),
            (Dfa::keyword(">>", &[">>"]), Action::Shift(sub::SHIFT_RIGHT)),
            (Dfa::keyword(":=", &[":="]), Action::Assign),
            (quoted("string", '\'', true), Action::QuotedString),
            (quoted("dstring", '"', true), Action::QuotedString),
            (quoted("unterminated string", '\'', false), Action::UnterminatedString),
            (quoted("unterminated dstring", '"', false), Action::UnterminatedString),
            (hex(), Action::RawString),
            (bits(), Action::RawString),
            (integer(), Action::Int),
            (float(), Action::Float),
            (backtick(true), Action::QuotedName),
            (backtick(false), Action::UnterminatedName),
            (identifier(), Action::Name),
            (user_variable(), Action::UserVar),
            (whitespace_run(), Action::Skip),
            (line_comment("#comment", "#"), Action::Skip),
            (dash_comment(), Action::Skip),
            (line_comment("//comment", "//"), Action::Skip),
            (block_comment(true), Action::Skip),
            (block_comment(false), Action::UnterminatedComment),
        ]);

        let lexicon = Self::new(rules);
        debug!(rules = lexicon.len(), "built MySQL lexicon");
        lexicon
    }
}

fn punctuation() -> Dfa {
    let mut b = DfaBuilder::new("punctuation");
    let done = b.accepting();
    let start = b.start();
    b.edge(start, RuneClass::set(TokenKind::PUNCTUATION), done);
    b.build()
}

/// `q(\\.|qq|[^q\\])*q`, or its unterminated form anchored at end of input.
fn quoted(name: &str, quote: char, terminated: bool) -> Dfa {
    let mut b = DfaBuilder::new(name);
    let start = b.start();
    let body = b.state();
    let escape = b.state();
    let closed = b.state();
    b.edge(start, RuneClass::char(quote), body);
    b.edge(body, RuneClass::char('\\'), escape);
    b.edge(body, RuneClass::char(quote), closed);
    b.edge(body, RuneClass::any(), body);
    b.edge(escape, RuneClass::any(), body);
    b.edge(closed, RuneClass::char(quote), body);
    if terminated {
        b.accept(closed);
    } else {
        let end = b.accepting();
        b.end_edge(body, end);
        b.end_edge(escape, end);
    }
    b.build()
}

fn hex_digit() -> RuneClass {
    RuneClass::digit().with_range('a', 'f').with_range('A', 'F')
}

/// `0[xX][0-9a-fA-F]+` or `[xX]'[0-9a-fA-F]*'`.
fn hex() -> Dfa {
    radix_literal("hex", 'x', hex_digit())
}

/// `0[bB][01]+` or `[bB]'[01]*'`.
fn bits() -> Dfa {
    radix_literal("bits", 'b', RuneClass::set("01"))
}

fn radix_literal(name: &str, marker: char, digits: RuneClass) -> Dfa {
    let mut b = DfaBuilder::new(name);
    let start = b.start();
    let zero = b.state();
    let prefixed = b.state();
    let number = b.accepting();
    b.edge(start, RuneClass::char('0'), zero);
    b.edge(zero, RuneClass::ignore_case(marker), prefixed);
    b.edge(prefixed, digits.clone(), number);
    b.edge(number, digits.clone(), number);

    let letter = b.state();
    let open = b.state();
    let closed = b.accepting();
    b.edge(start, RuneClass::ignore_case(marker), letter);
    b.edge(letter, RuneClass::char('\''), open);
    b.edge(open, digits, open);
    b.edge(open, RuneClass::char('\''), closed);
    b.build()
}

/// `-?[0-9]+`
fn integer() -> Dfa {
    let mut b = DfaBuilder::new("integer");
    let start = b.start();
    let sign = b.state();
    let digits = b.accepting();
    b.edge(start, RuneClass::char('-'), sign);
    b.edge(start, RuneClass::digit(), digits);
    b.edge(sign, RuneClass::digit(), digits);
    b.edge(digits, RuneClass::digit(), digits);
    b.build()
}

/// `-?([0-9]+\.[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?` or `-?[0-9]+[eE][-+]?[0-9]+`
fn float() -> Dfa {
    let mut b = DfaBuilder::new("float");
    let start = b.start();
    let sign = b.state();
    let whole = b.state();
    let dot = b.state();
    let fraction = b.accepting();
    let exponent = b.state();
    let exponent_sign = b.state();
    let exponent_digits = b.accepting();

    let digit = RuneClass::digit;
    let e = || RuneClass::ignore_case('e');
    b.edge(start, RuneClass::char('-'), sign);
    b.edge(start, digit(), whole);
    b.edge(start, RuneClass::char('.'), dot);
    b.edge(sign, digit(), whole);
    b.edge(sign, RuneClass::char('.'), dot);
    b.edge(whole, digit(), whole);
    b.edge(whole, RuneClass::char('.'), fraction);
    b.edge(whole, e(), exponent);
    b.edge(dot, digit(), fraction);
    b.edge(fraction, digit(), fraction);
    b.edge(fraction, e(), exponent);
    b.edge(exponent, RuneClass::set("+-"), exponent_sign);
    b.edge(exponent, digit(), exponent_digits);
    b.edge(exponent_sign, digit(), exponent_digits);
    b.edge(exponent_digits, digit(), exponent_digits);
    b.build()
}

/// `` `[^`\n]+` ``, or `` `[^`\n]* `` at end of input.
fn backtick(terminated: bool) -> Dfa {
    let name = if terminated { "quoted name" } else { "unterminated quoted name" };
    let mut b = DfaBuilder::new(name);
    let start = b.start();
    let open = b.state();
    let body = b.state();
    let inner = RuneClass::none_of("`\n");
    b.edge(start, RuneClass::char('`'), open);
    b.edge(open, inner.clone(), body);
    b.edge(body, inner, body);
    if terminated {
        let closed = b.accepting();
        b.edge(body, RuneClass::char('`'), closed);
    } else {
        let end = b.accepting();
        b.end_edge(open, end);
        b.end_edge(body, end);
    }
    b.build()
}

/// `[A-Za-z_][A-Za-z0-9_$]*`, also admitting any non-ASCII rune.
fn identifier() -> Dfa {
    let first = RuneClass::range('a', 'z')
        .with_range('A', 'Z')
        .with_chars("_")
        .with_range('\u{80}', char::MAX);
    let rest = first.clone().with_range('0', '9').with_chars("$");
    let mut b = DfaBuilder::new("identifier");
    let start = b.start();
    let word = b.accepting();
    b.edge(start, first, word);
    b.edge(word, rest, word);
    b.build()
}

/// `@[A-Za-z0-9_.$]+`
fn user_variable() -> Dfa {
    let class = RuneClass::range('a', 'z')
        .with_range('A', 'Z')
        .with_range('0', '9')
        .with_chars("_.$");
    let mut b = DfaBuilder::new("user variable");
    let start = b.start();
    let at = b.state();
    let name = b.accepting();
    b.edge(start, RuneClass::char('@'), at);
    b.edge(at, class.clone(), name);
    b.edge(name, class, name);
    b.build()
}

fn whitespace_run() -> Dfa {
    let mut b = DfaBuilder::new("whitespace");
    let start = b.start();
    let run = b.accepting();
    b.edge(start, whitespace(), run);
    b.edge(run, whitespace(), run);
    b.build()
}

/// `<opener>[^\n]*`
fn line_comment(name: &str, opener: &str) -> Dfa {
    let mut b = DfaBuilder::new(name);
    let mut state = b.start();
    for c in opener.chars() {
        let next = b.state();
        b.edge(state, RuneClass::char(c), next);
        state = next;
    }
    b.accept(state);
    b.edge(state, RuneClass::none_of("\n"), state);
    b.build()
}

/// `--[ \t\r][^\n]*`, `--\n`, or a bare `--` at end of input.
fn dash_comment() -> Dfa {
    let mut b = DfaBuilder::new("--comment");
    let start = b.start();
    let dash = b.state();
    let dashes = b.state();
    let text = b.accepting();
    let empty = b.accepting();
    b.edge(start, RuneClass::char('-'), dash);
    b.edge(dash, RuneClass::char('-'), dashes);
    b.edge(dashes, RuneClass::set(" \t\r"), text);
    b.edge(dashes, RuneClass::char('\n'), empty);
    b.edge(text, RuneClass::none_of("\n"), text);
    b.end_edge(dashes, text);
    b.build()
}

/// `/\*([^*]|\*+[^*/])*\*+/`, or an opened comment running to end of input.
fn block_comment(terminated: bool) -> Dfa {
    let name = if terminated { "block comment" } else { "unterminated block comment" };
    let mut b = DfaBuilder::new(name);
    let start = b.start();
    let slash = b.state();
    let body = b.state();
    let star = b.state();
    b.edge(start, RuneClass::char('/'), slash);
    b.edge(slash, RuneClass::char('*'), body);
    b.edge(body, RuneClass::char('*'), star);
    b.edge(body, RuneClass::any(), body);
    b.edge(star, RuneClass::char('*'), star);
    if terminated {
        let closed = b.accepting();
        b.edge(star, RuneClass::char('/'), closed);
        b.edge(star, RuneClass::any(), body);
    } else {
        let end = b.accepting();
        b.edge(star, RuneClass::none_of("/"), body);
        b.end_edge(body, end);
        b.end_edge(star, end);
    }
    b.build()
}
