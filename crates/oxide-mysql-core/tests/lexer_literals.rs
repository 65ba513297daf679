//! Tests for literals, names, comments and lexical diagnostics.

mod common;
use common::*;

use oxide_mysql_core::lexer::{DiagnosticKind, Lexer, LexerOptions, TokenKind, TokenValue};

#[test]
fn quoted_strings_keep_escapes_and_doubled_quotes() {
    let tokens = lex(r#"'it''s' 'a\'b' "dq""#);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, TokenValue::Str("it''s".into()));
    assert_eq!(tokens[0].lexeme, "'it''s'");
    assert_eq!(tokens[1].value, TokenValue::Str(r"a\'b".into()));
    assert_eq!(tokens[2].value, TokenValue::Str("dq".into()));
}

#[test]
fn hex_and_bit_literals_are_verbatim_strings() {
    let tokens = lex("0x1F X'1f' 0b101 b'01'");
    let values: Vec<_> = tokens[..4].iter().map(|t| (t.kind, t.value.clone())).collect();
    assert_eq!(
        values,
        ["0x1F", "X'1f'", "0b101", "b'01'"]
            .map(|s| (TokenKind::String, TokenValue::Str(s.into())))
            .to_vec()
    );
}

#[test]
fn numbers() {
    let tokens = lex("42, -7, 1.5, .5, 1e3, -2.5E-2, 3.");
    let values: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Punct(','))
        .map(|t| t.value.clone())
        .collect();
    assert_eq!(
        values,
        vec![
            TokenValue::Int(42),
            TokenValue::Int(-7),
            TokenValue::Float(1.5),
            TokenValue::Float(0.5),
            TokenValue::Float(1000.0),
            TokenValue::Float(-0.025),
            TokenValue::Float(3.0),
            TokenValue::None,
        ]
    );
    assert_eq!(tokens[10].lexeme, "-2.5E-2");
}

#[test]
fn minus_sign_binds_to_a_following_number() {
    assert_eq!(kinds("(-1"), vec!["'('", "INTNUM"]);
    assert_eq!(lex("(-1")[1].value, TokenValue::Int(-1));
    assert_eq!(lex("= -1.5")[1].value, TokenValue::Float(-1.5));
    assert_eq!(kinds("a - 1"), vec!["NAME", "'-'", "INTNUM"]);
    assert_eq!(kinds("x--y"), vec!["NAME", "'-'", "'-'", "NAME"]);
}

#[test]
fn minus_sign_after_an_operand_is_an_operator() {
    let tokens = lex("a-0");
    assert_eq!(kinds("a-0"), vec!["NAME", "'-'", "INTNUM"]);
    assert_eq!(tokens[2].value, TokenValue::Int(0));
    assert_eq!(tokens[2].lexeme, "0");
    assert_eq!(tokens[2].location.to_string(), "1:3");

    assert_eq!(kinds("3-2"), vec!["INTNUM", "'-'", "INTNUM"]);
    assert_eq!(kinds(")-2.5"), vec!["')'", "'-'", "APPROXNUM"]);
    assert_eq!(lex("'s' -1e3")[2].value, TokenValue::Float(1000.0));
    assert_eq!(kinds("NULL-1"), vec!["NULL", "'-'", "INTNUM"]);
    // Operators and keywords leave the sign on the literal.
    assert_eq!(kinds("1--1"), vec!["INTNUM", "'-'", "INTNUM"]);
    assert_eq!(lex("1--1")[2].value, TokenValue::Int(-1));
    assert_eq!(lex("SELECT -1")[1].value, TokenValue::Int(-1));
}

#[test]
fn floats_round_trip_within_one_ulp() {
    let mut state = 0x2545_F491_4F6C_DD1D_u64;
    let mut values = vec![0.1, 1.0 / 3.0, 5e-324, f64::MAX, f64::MIN_POSITIVE, -0.0, -1.5e-7];
    while values.len() < 500 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let x = f64::from_bits(state);
        if x.is_finite() {
            values.push(x);
        }
    }
    let text: Vec<String> = values
        .iter()
        .flat_map(|x| [format!("{x:?}"), format!("{x:e}")])
        .collect();
    let tokens = lex(&text.join(", "));
    let literals: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::ApproxNum)
        .collect();
    assert_eq!(literals.len(), text.len());
    for (token, expected) in literals.iter().zip(values.iter().flat_map(|&x| [x, x])) {
        let TokenValue::Float(got) = token.value else {
            panic!("Expected a float for {}", token.lexeme);
        };
        assert_eq!(got.is_sign_negative(), expected.is_sign_negative(), "{}", token.lexeme);
        let ulps = got.to_bits().abs_diff(expected.to_bits());
        assert!(ulps <= 1, "{} lexed as {got:e}", token.lexeme);
    }
}

#[test]
fn locations_only_move_forward() {
    let sql = "SELECT a-1, 'x\ny' AS s -- note\nFROM t /* multi\nline */ WHERE b\n  <=> @v;\n\tON  DUPLICATE";
    let tokens = lex(sql);
    assert_eq!(tokens.len(), 17);
    for pair in tokens.windows(2) {
        assert!(
            pair[0].location < pair[1].location,
            "{} then {}",
            pair[0],
            pair[1]
        );
    }
    let lines: Vec<_> = tokens.iter().map(|t| t.location.line).collect();
    assert_eq!(lines, vec![0, 0, 0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 4, 5, 5]);
}

#[test]
fn integer_overflow_becomes_approximate() {
    let (tokens, diagnostics) = lex_with_diagnostics("99999999999999999999");
    assert_eq!(tokens[0].kind, TokenKind::ApproxNum);
    assert_eq!(tokens[0].value, TokenValue::Float(1e20));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].to_string(),
        "integer literal 99999999999999999999 out of range at 1:1"
    );
}

#[test]
fn names_and_user_variables() {
    let tokens = lex("_x1 a$b `my col` @a.b @$x café");
    assert_eq!(tokens[0].value, TokenValue::Str("_x1".into()));
    assert_eq!(tokens[1].value, TokenValue::Str("a$b".into()));
    assert_eq!(tokens[2].kind, TokenKind::Name);
    assert_eq!(tokens[2].value, TokenValue::Str("my col".into()));
    assert_eq!(tokens[2].lexeme, "`my col`");
    assert_eq!(tokens[3].kind, TokenKind::UserVar);
    assert_eq!(tokens[3].lexeme, "@a.b");
    assert_eq!(tokens[4].lexeme, "@$x");
    assert_eq!(tokens[5].value, TokenValue::Str("café".into()));
    assert_eq!(tokens[6].location.to_string(), "1:31");
}

#[test]
fn comments_are_skipped() {
    let tokens = lex("SELECT # c\n1 -- d\n, 2 /* e */ + 3");
    assert_eq!(
        kinds("SELECT # c\n1 -- d\n, 2 /* e */ + 3"),
        vec!["SELECT", "INTNUM", "','", "INTNUM", "'+'", "INTNUM"]
    );
    assert_eq!(tokens[1].location.to_string(), "2:1");
    assert_eq!(tokens[4].location.to_string(), "3:13");
    // `--` needs trailing whitespace to open a comment.
    assert_eq!(kinds("--x"), vec!["'-'", "'-'", "NAME"]);
    let tokens = lex("a --\nb --");
    assert_eq!(kinds("a --\nb --"), vec!["NAME", "NAME"]);
    assert_eq!(tokens[1].location.to_string(), "2:1");
}

#[test]
fn unterminated_constructs_are_diagnosed() {
    let (tokens, diagnostics) = lex_with_diagnostics("a 'open");
    assert_eq!(tokens.len(), 2);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::UnterminatedString);

    let (_, diagnostics) = lex_with_diagnostics("`open");
    assert_eq!(diagnostics[0].kind, DiagnosticKind::UnterminatedName);

    let (tokens, diagnostics) = lex_with_diagnostics("a /* b */ c /* d");
    assert_eq!(tokens.len(), 3);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].to_string(), "unterminated block comment at 1:13");
}

#[test]
fn unrecognized_characters() {
    let (tokens, diagnostics) = lex_with_diagnostics("a?b");
    assert_eq!(kinds("a?b"), vec!["NAME", "NAME"]);
    assert_eq!(tokens[1].location.to_string(), "1:3");
    assert_eq!(diagnostics[0].to_string(), "unrecognized character '?' at 1:2");

    let mut quiet = Lexer::with_options(
        "a?b".as_bytes(),
        LexerOptions {
            report_unrecognized: false,
        },
    );
    assert_eq!(quiet.tokenize().expect("lexes").len(), 3);
    assert!(quiet.diagnostics().is_empty());
}

#[test]
fn invalid_utf8_is_reported_and_skipped() {
    let mut lexer = Lexer::from_reader(&b"a \xff b"[..]);
    let tokens = lexer.tokenize().expect("lexes");
    assert_eq!(tokens.len(), 3);
    assert_eq!(lexer.diagnostics().len(), 1);
    assert_eq!(
        lexer.diagnostics()[0].kind,
        DiagnosticKind::InvalidUtf8(vec![0xFF])
    );
}
