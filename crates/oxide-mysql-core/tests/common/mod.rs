//! Shared helpers for the integration tests.

#![allow(dead_code)]

use oxide_mysql_core::lexer::{Diagnostic, Lexer, Token, TokenKind};
use oxide_mysql_core::parser::{ParseError, Parser, ParserOptions};
use oxide_mysql_core::sink::{TraceSink, TreeSink};
use oxide_mysql_core::SyntaxTree;

/// Lexes `sql`, panicking on a fatal lexer error.
pub fn lex(sql: &str) -> Vec<Token> {
    lex_with_diagnostics(sql).0
}

pub fn lex_with_diagnostics(sql: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(sql);
    let tokens = lexer
        .tokenize()
        .unwrap_or_else(|e| panic!("Failed to lex: {sql}\nError: {e}"));
    (tokens, lexer.diagnostics().to_vec())
}

/// Terminal names of the tokens in `sql`, without the trailing EOF.
pub fn kinds(sql: &str) -> Vec<String> {
    lex(sql)
        .iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind.symbol_name().into_owned())
        .collect()
}

/// Parses `sql` into a syntax tree, panicking on any error.
pub fn parse(sql: &str) -> SyntaxTree {
    let mut parser = Parser::mysql(TreeSink::new()).expect("MySQL tables should build");
    if let Err(e) = parser.parse_str(sql) {
        panic!("Failed to parse: {sql}\nError: {e}");
    }
    parser.into_sink().into_tree()
}

/// Parses `sql`, expecting it to be rejected.
pub fn parse_err(sql: &str) -> ParseError {
    let mut parser = Parser::mysql(TreeSink::new()).expect("MySQL tables should build");
    parser
        .parse_str(sql)
        .map(|_| ())
        .expect_err(&format!("Expected error for: {sql}"))
}

/// Parses `sql` with a [`TraceSink`], returning the recorded lines.
pub fn trace(sql: &str) -> (Vec<String>, Result<(), ParseError>) {
    let mut parser = Parser::mysql(TraceSink::new()).expect("MySQL tables should build");
    let result = parser.parse_str(sql).map(|_| ());
    (parser.into_sink().into_lines(), result)
}

/// Parses `sql` with error recovery on.
pub fn recover(sql: &str) -> (SyntaxTree, Result<(), ParseError>) {
    let mut parser = Parser::mysql(TreeSink::new())
        .expect("MySQL tables should build")
        .with_options(ParserOptions { recover: true });
    let result = parser.parse_str(sql).map(|_| ());
    (parser.into_sink().into_tree(), result)
}

/// Renders the first select expression of `sql`.
pub fn expr(sql: &str) -> String {
    let tree = parse(sql);
    let select_expr = tree
        .find("select_expr")
        .unwrap_or_else(|| panic!("No select_expr in: {sql}"));
    tree.render(tree.children(select_expr)[0])
}
