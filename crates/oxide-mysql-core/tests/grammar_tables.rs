//! Tests for the built-in grammar and its tables.

use oxide_mysql_core::grammar::{Conflict, ParseAction, ParseTables, END, ERROR};
use oxide_mysql_core::lexer::TokenKind;

#[test]
fn mysql_tables_only_keep_between_conflicts() {
    let tables = ParseTables::mysql().expect("built-in grammar builds");
    let grammar = tables.grammar();
    let conflicts = tables.conflicts();
    assert_eq!(conflicts.len(), 42);
    for conflict in conflicts {
        match conflict {
            Conflict::ReduceReduce { kept, dropped, .. } => {
                let kept = grammar.display_rule(*kept);
                assert!(kept.contains("BETWEEN"), "{kept}");
                assert_eq!(grammar.display_rule(*dropped), "expr -> expr AND expr");
            }
            Conflict::ShiftReduce { .. } => panic!("Unexpected conflict: {conflict:?}"),
        }
    }
}

#[test]
fn every_token_kind_has_a_terminal() {
    let grammar = ParseTables::mysql().expect("built-in grammar builds").grammar();
    for kind in TokenKind::all() {
        assert!(grammar.terminal_for(kind).is_some(), "{kind}");
    }
    assert_eq!(grammar.terminal_id("$end"), Some(END));
    assert_eq!(grammar.terminal_id("error"), Some(ERROR));
}

#[test]
fn empty_input_is_accepted_from_start() {
    let tables = ParseTables::mysql().expect("built-in grammar builds");
    // The empty statement list reduces on end of input.
    assert!(matches!(tables.action(0, END), ParseAction::Reduce(_)));
    assert!(!tables.expected(0).contains(&ERROR));
    assert_eq!(tables.action(0, usize::MAX), ParseAction::Error);
}

#[test]
fn custom_grammar_from_source() {
    let tables = ParseTables::from_source(
        "%left '+'
%%
sum: sum '+' sum | NAME ;",
    )
    .expect("grammar builds");
    assert!(tables.conflicts().is_empty());
    let grammar = tables.grammar();
    assert_eq!(grammar.display_rule(1), "sum -> sum '+' sum");
    let name = grammar.terminal_for(TokenKind::Name).expect("NAME is declared");
    assert!(matches!(tables.action(0, name), ParseAction::Shift(_)));
}
