//! Tests for syntax errors, the reduction trace and error recovery.

mod common;
use common::*;

use oxide_mysql_core::parser::{ParseError, SyntaxError};

fn syntax(sql: &str) -> SyntaxError {
    match parse_err(sql) {
        ParseError::Syntax(e) => e,
        other => panic!("Expected syntax error for {sql}, got {other:?}"),
    }
}

#[test]
fn unexpected_end_of_input() {
    let err = syntax("SELECT * FROM");
    assert_eq!(err.found, "end of input");
    assert_eq!(err.location.to_string(), "1:14");
    assert_eq!(err.expected, vec!["NAME", "'('"]);
    assert_eq!(
        err.to_string(),
        "1:14: unexpected end of input, expected {NAME, '('}"
    );
}

#[test]
fn expected_sets_follow_the_grammar() {
    assert_eq!(syntax("SELECT * FROM a LEFT JOIN b").expected, vec!["ON", "USING"]);
    assert_eq!(
        syntax("INSERT INTO t").expected,
        vec!["SELECT", "SET", "VALUES", "'('"]
    );
    assert_eq!(
        syntax("DROP").expected,
        vec!["DATABASE", "FUNCTION", "INDEX", "PROCEDURE", "SCHEMA", "TABLE", "TEMPORARY"]
    );
    assert_eq!(syntax("UPDATE t SET").expected, vec!["NAME"]);
    assert!(syntax("SELECT (1 + 2").expected.contains(&"')'".to_string()));
}

#[test]
fn unexpected_token_is_described() {
    // A leading name can only start a labeled block.
    let err = syntax("FOO t");
    assert_eq!(err.found, "NAME 't'");
    assert_eq!(err.lexeme, "t");
    assert_eq!(err.expected, vec!["':'"]);
}

#[test]
fn error_location_on_later_line() {
    let err = syntax("SELECT 1;\nSELECT FROM t");
    assert_eq!(err.found, "FROM");
    assert_eq!(err.location.to_string(), "2:8");
}

#[test]
fn trace_lists_reductions_then_accept() {
    let (lines, result) = trace("SELECT a FROM t;");
    assert!(result.is_ok());
    assert_eq!(lines.last().map(String::as_str), Some("ACCEPT"));
    assert!(lines
        .iter()
        .any(|l| l.ends_with("  select_stmt -> select_core")));
    assert!(lines.iter().all(|l| l == "ACCEPT" || l.starts_with('R')));
}

#[test]
fn trace_ends_with_error_line() {
    let (lines, result) = trace("SELECT a FROM t WHERE");
    assert!(result.is_err());
    let last = lines.last().expect("trace is not empty");
    assert!(
        last.starts_with("ERROR at 1:22: unexpected end of input, expected {"),
        "{last}"
    );
}

#[test]
fn recovery_reports_every_bad_statement() {
    let (tree, result) = recover("SELECT FROM; SELECT 1; UPDATE SET");
    let err = result.expect_err("two statements are broken");
    assert!(matches!(err, ParseError::Multiple(_)));
    let errors = err.syntax_errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].found, "FROM");
    assert_eq!(errors[0].location.to_string(), "1:8");
    assert_eq!(errors[1].found, "SET");
    assert_eq!(errors[1].location.to_string(), "1:31");

    assert_eq!(tree.count("error"), 2);
    assert_eq!(tree.count("select_stmt"), 1);
    assert_eq!(tree.count("opt_stmt"), 3);
    assert!(tree.to_string().starts_with("(stmt_list (stmt_list (stmt_list (opt_stmt error))"));
}

#[test]
fn recovery_still_stops_on_action_errors() {
    let (_, result) = recover("SELECT 1; SET a < 1; SELECT 3");
    assert!(matches!(result, Err(ParseError::Action { .. })));
}

#[test]
fn recovery_on_clean_input_is_ok() {
    let (tree, result) = recover("SELECT 1; SELECT 2");
    assert!(result.is_ok());
    assert_eq!(tree.count("error"), 0);
}
