//! Tests for parsing from a scanner running behind a channel.

mod common;
use common::*;

use std::io::Cursor;

use oxide_mysql_core::lexer::{spawn_scanner, ChannelOptions, LexerOptions, TokenSource};
use oxide_mysql_core::parser::{ParseError, Parser};
use oxide_mysql_core::sink::{Recognizer, TreeSink};
use tokio::runtime::{Builder, Runtime};

fn runtime() -> Runtime {
    Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .expect("runtime should build")
}

fn channel(rt: &Runtime, sql: &str, capacity: usize) -> oxide_mysql_core::lexer::ScannerChannel {
    spawn_scanner(
        rt.handle(),
        Cursor::new(sql.as_bytes().to_vec()),
        LexerOptions::default(),
        ChannelOptions { capacity },
    )
}

#[test]
fn channel_parse_matches_inline_parse() {
    let rt = runtime();
    let sql = "SELECT a, COUNT(*) FROM t WHERE b <=> 1 GROUP BY a; UPDATE t SET a = a - 1";
    let mut source = channel(&rt, sql, 1);
    let mut parser = Parser::mysql(TreeSink::new()).expect("tables build");
    parser.parse(&mut source).expect("parses");
    let tree = parser.into_sink().into_tree();
    assert_eq!(tree.to_string(), parse(sql).to_string());
}

#[test]
fn syntax_error_stops_the_scanner() {
    let rt = runtime();
    let sql = format!("SELECT FROM t;{}", "SELECT 1;".repeat(20_000));
    let mut source = channel(&rt, &sql, 4);
    let mut parser = Parser::mysql(Recognizer).expect("tables build");
    let err = parser.parse(&mut source).expect_err("FROM is misplaced");
    assert!(matches!(err, ParseError::Syntax(_)));
    let task = source.shutdown().expect("task handle is kept until shutdown");
    rt.block_on(task).expect("scanner task exits cleanly");
}

#[test]
fn diagnostics_cross_the_channel() {
    let rt = runtime();
    let mut source = channel(&rt, "SELECT 1 ? 2", 8);
    let mut parser = Parser::mysql(Recognizer).expect("tables build");
    // `?` is dropped, which leaves two literals with no operator between them.
    match parser.parse(&mut source) {
        Err(ParseError::Syntax(e)) => assert_eq!(e.location.to_string(), "1:12"),
        other => panic!("Expected syntax error, got {other:?}"),
    }
    let diagnostics = source.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].to_string(), "unrecognized character '?' at 1:10");
}

#[test]
fn stop_is_idempotent() {
    let rt = runtime();
    let mut source = channel(&rt, "SELECT 1", 1);
    source.stop();
    source.stop();
    let eof = source.next_token().expect("stopped channel yields EOF");
    assert_eq!(eof.kind, oxide_mysql_core::TokenKind::Eof);
}
