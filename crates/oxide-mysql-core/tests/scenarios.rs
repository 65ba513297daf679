//! End-to-end checks of lexing and parsing small inputs.

mod common;
use common::*;

use oxide_mysql_core::lexer::{sub, Keyword, TokenKind, TokenValue};
use oxide_mysql_core::parser::Parser;
use oxide_mysql_core::sink::{Recognizer, TraceSink};

#[test]
fn single_select_statement() {
    let tokens = lex("SELECT 1;");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword(Keyword::Select),
            TokenKind::IntNum,
            TokenKind::Punct(';'),
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[1].value, TokenValue::Int(1));

    let mut parser = Parser::mysql(TraceSink::new()).expect("tables build");
    parser.parse_str("SELECT 1;").expect("accepted");
    let sink = parser.into_sink();
    assert_eq!(sink.count("select_stmt"), 1);
    assert_eq!(sink.lines().last().map(String::as_str), Some("ACCEPT"));
}

#[test]
fn keywords_in_any_case() {
    let tokens = lex("select Select SELECT");
    assert_eq!(tokens.len(), 4);
    assert!(tokens[..3]
        .iter()
        .all(|t| t.kind == TokenKind::Keyword(Keyword::Select)));
}

#[test]
fn integer_aliases_and_longest_match() {
    assert_eq!(
        kinds("INT INT1 INT2 INT4 INT8 INTEGER INTO"),
        vec!["INTEGER", "TINYINT", "SMALLINT", "INTEGER", "BIGINT", "INTEGER", "INTO"]
    );
}

#[test]
fn null_safe_comparison() {
    let sql = "SELECT * FROM t WHERE a<=>b AND c IS NOT NULL;";
    assert_eq!(
        kinds(sql),
        vec![
            "SELECT", "'*'", "FROM", "NAME", "WHERE", "NAME", "COMPARISON", "NAME", "AND", "NAME",
            "IS", "NOT", "NULL", "';'",
        ]
    );
    let tokens = lex(sql);
    assert_eq!(tokens[6].sub_token(), Some(sub::NULL_SAFE_EQ));
    assert_eq!(tokens[6].lexeme, "<=>");
    assert_eq!(tokens[6].location.to_string(), "1:24");
    assert_eq!(tokens[7].location.to_string(), "1:27");

    let mut parser = Parser::mysql(Recognizer).expect("tables build");
    assert!(parser.parse_str(sql).is_ok());

    let tree = parse(sql);
    let filter = tree.find("opt_where").expect("has a WHERE clause");
    assert_eq!(
        tree.render(filter),
        "(opt_where WHERE (expr (expr (expr NAME(a)) COMPARISON(<=>) (expr NAME(b))) \
         AND (expr (expr NAME(c)) IS NOT NULL)))"
    );
}

#[test]
fn unterminated_comment() {
    let (tokens, diagnostics) = lex_with_diagnostics("/* unterminated");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].to_string(), "unterminated block comment at 1:1");
}

#[test]
fn backslash_escapes_stay_literal() {
    let sql = r"SELECT 'a\nb';";
    let tokens = lex(sql);
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].value, TokenValue::Str(r"a\nb".into()));
    assert_eq!(parse(sql).count("STRING"), 1);
}
