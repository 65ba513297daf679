//! # oxide-mysql-core
//!
//! A table-driven front end for a MySQL-flavored SQL dialect.
//!
//! This crate provides:
//! - A lexer that runs a bank of DFAs in lockstep with longest-match
//!   semantics, inline or on a worker thread behind a bounded channel
//! - An LALR(1) table builder for yacc-style grammars, with the MySQL
//!   grammar built in
//! - A parser driving those tables, with panic-mode error recovery
//! - Semantic sinks that check, trace or build a syntax tree
//!
//! ## Lexing
//!
//! ```rust
//! use oxide_mysql_core::lexer::{sub, Lexer, TokenKind};
//!
//! let tokens = Lexer::new("a <=> b").tokenize()?;
//! assert_eq!(tokens[1].kind, TokenKind::Comparison);
//! assert_eq!(tokens[1].sub_token(), Some(sub::NULL_SAFE_EQ));
//! assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
//! # Ok::<(), oxide_mysql_core::lexer::LexError>(())
//! ```
//!
//! ## Parsing
//!
//! ```rust
//! use oxide_mysql_core::parser::Parser;
//! use oxide_mysql_core::sink::TreeSink;
//!
//! let mut parser = Parser::mysql(TreeSink::new())?;
//! parser.parse_str("SELECT a FROM t WHERE b = 1")?;
//! let tree = parser.into_sink().into_tree();
//! assert_eq!(tree.count("select_core"), 1);
//! # Ok::<(), oxide_mysql_core::parser::ParseError>(())
//! ```

pub mod ast;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod sink;

pub use ast::SyntaxTree;
pub use grammar::{Grammar, ParseTables};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, Parser, ParserOptions};
pub use sink::{Recognizer, Sink, TraceSink, TreeSink};
