//! Reader for the yacc-like grammar text.
//!
//! ```text
//! %left '+' '-'
//! %nonassoc UMINUS
//! %start expr
//! %%
//! expr: expr '+' expr
//!     | '-' expr %prec UMINUS
//!     | INTNUM
//!     ;
//! ```
//!
//! Terminals are token kind names (`SELECT`, `INTNUM`, `COMPARISON`, ...) or
//! quoted punctuation. Lowercase names are nonterminals. `error` is the
//! reserved recovery terminal. Comments are `/* ... */` and `// ...`.

use std::collections::HashMap;

use crate::lexer::TokenKind;

use super::error::GrammarError;
use super::symbol::{
    Assoc, Grammar, NonterminalId, Precedence, Rule, Symbol, Terminal, TerminalId, END, ERROR,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Ident(String),
    Char(char),
    Directive(String),
    Colon,
    Pipe,
    Semicolon,
    Separator,
}

/// Splits the grammar text into items, each tagged with its 1-based line.
struct Reader<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Reader<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> GrammarError {
        GrammarError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), GrammarError> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.advance();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.advance() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.line;
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(GrammarError::Syntax {
                                    line: start,
                                    message: "unterminated comment".to_string(),
                                })
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_word(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                self.advance();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn next_item(&mut self) -> Result<Option<(Item, usize)>, GrammarError> {
        self.skip_trivia()?;
        let line = self.line;
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let item = match c {
            ':' => {
                self.advance();
                Item::Colon
            }
            '|' => {
                self.advance();
                Item::Pipe
            }
            ';' => {
                self.advance();
                Item::Semicolon
            }
            '%' => {
                self.advance();
                if self.peek() == Some('%') {
                    self.advance();
                    Item::Separator
                } else {
                    let word = self.read_word();
                    if word.is_empty() {
                        return Err(self.error("expected a directive after '%'"));
                    }
                    Item::Directive(word)
                }
            }
            '\'' => {
                self.advance();
                let ch = self.advance().ok_or_else(|| self.error("unterminated literal"))?;
                if self.advance() != Some('\'') {
                    return Err(self.error("character literals hold exactly one character"));
                }
                Item::Char(ch)
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => Item::Ident(self.read_word()),
            other => return Err(self.error(format!("unexpected character '{other}'"))),
        };
        Ok(Some((item, line)))
    }
}

/// Builds up terminals, nonterminals and rules while reading.
struct Builder {
    terminals: Vec<Terminal>,
    terminal_ids: HashMap<String, TerminalId>,
    nonterminals: Vec<String>,
    nonterminal_ids: HashMap<String, NonterminalId>,
    /// Line of first use for every nonterminal, for error messages.
    first_use: Vec<usize>,
    rules: Vec<Rule>,
}

impl Builder {
    fn new() -> Self {
        let mut builder = Self {
            terminals: Vec::new(),
            terminal_ids: HashMap::new(),
            nonterminals: Vec::new(),
            nonterminal_ids: HashMap::new(),
            first_use: Vec::new(),
            rules: Vec::new(),
        };
        builder.add_terminal("$end".to_string(), Some(TokenKind::Eof));
        builder.add_terminal("error".to_string(), None);
        for kind in TokenKind::all() {
            builder.add_terminal(kind.symbol_name().into_owned(), Some(kind));
        }
        builder.nonterminal("$accept", 0);
        // Rule 0 is filled in once the start symbol is known.
        builder.rules.push(Rule {
            id: 0,
            lhs: 0,
            rhs: Vec::new(),
            precedence: None,
        });
        builder
    }

    fn add_terminal(&mut self, name: String, kind: Option<TokenKind>) -> TerminalId {
        let id = self.terminals.len();
        self.terminal_ids.insert(name.clone(), id);
        self.terminals.push(Terminal {
            name,
            kind,
            precedence: None,
        });
        id
    }

    fn nonterminal(&mut self, name: &str, line: usize) -> NonterminalId {
        if let Some(&id) = self.nonterminal_ids.get(name) {
            return id;
        }
        let id = self.nonterminals.len();
        self.nonterminal_ids.insert(name.to_string(), id);
        self.nonterminals.push(name.to_string());
        self.first_use.push(line);
        id
    }

    /// Resolves a terminal named in a precedence declaration, creating a
    /// precedence-only terminal for unknown uppercase names.
    fn precedence_terminal(&mut self, item: &Item, line: usize) -> Result<TerminalId, GrammarError> {
        match item {
            Item::Char(c) => self.char_terminal(*c),
            Item::Ident(name) => {
                if let Some(&id) = self.terminal_ids.get(name) {
                    Ok(id)
                } else if name.chars().all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit()) {
                    Ok(self.add_terminal(name.clone(), None))
                } else {
                    Err(GrammarError::Syntax {
                        line,
                        message: format!("'{name}' cannot carry a precedence"),
                    })
                }
            }
            _ => Err(GrammarError::Syntax {
                line,
                message: "expected a terminal".to_string(),
            }),
        }
    }

    fn char_terminal(&self, c: char) -> Result<TerminalId, GrammarError> {
        let name = format!("'{c}'");
        self.terminal_ids
            .get(&name)
            .copied()
            .ok_or(GrammarError::UnknownTerminal(name))
    }

    fn symbol(&mut self, item: &Item, line: usize) -> Result<Symbol, GrammarError> {
        match item {
            Item::Char(c) => self.char_terminal(*c).map(Symbol::Terminal),
            Item::Ident(name) if name == "error" => Ok(Symbol::Terminal(ERROR)),
            Item::Ident(name) => {
                if let Some(&id) = self.terminal_ids.get(name) {
                    return Ok(Symbol::Terminal(id));
                }
                if name.starts_with(|c: char| c.is_ascii_lowercase()) {
                    return Ok(Symbol::Nonterminal(self.nonterminal(name, line)));
                }
                Err(GrammarError::UnknownTerminal(name.clone()))
            }
            _ => Err(GrammarError::Syntax {
                line,
                message: "expected a grammar symbol".to_string(),
            }),
        }
    }

    /// A rule without `%prec` takes the precedence of its last terminal that
    /// has one.
    fn last_terminal_precedence(&self, rhs: &[Symbol]) -> Option<Precedence> {
        rhs.iter().rev().find_map(|symbol| match symbol {
            Symbol::Terminal(t) => self.terminals[*t].precedence,
            Symbol::Nonterminal(_) => None,
        })
    }
}

/// Parses grammar text into a [`Grammar`].
pub fn parse_grammar(text: &str) -> Result<Grammar, GrammarError> {
    let mut reader = Reader::new(text);
    let mut items = Vec::new();
    while let Some(item) = reader.next_item()? {
        items.push(item);
    }
    let mut items = items.into_iter().peekable();
    let mut builder = Builder::new();
    let mut start: Option<(String, usize)> = None;
    let mut level: u16 = 0;

    // Declarations.
    loop {
        let Some((item, line)) = items.next() else {
            return Err(GrammarError::Syntax {
                line: reader.line,
                message: "missing '%%' before the rules".to_string(),
            });
        };
        match item {
            Item::Separator => break,
            Item::Directive(directive) => match directive.as_str() {
                "left" | "right" | "nonassoc" => {
                    level += 1;
                    let assoc = match directive.as_str() {
                        "left" => Assoc::Left,
                        "right" => Assoc::Right,
                        _ => Assoc::NonAssoc,
                    };
                    while let Some((next, line)) =
                        items.next_if(|(i, _)| matches!(i, Item::Ident(_) | Item::Char(_)))
                    {
                        let id = builder.precedence_terminal(&next, line)?;
                        builder.terminals[id].precedence = Some(Precedence { level, assoc });
                    }
                }
                "start" => match items.next() {
                    Some((Item::Ident(name), line)) => start = Some((name, line)),
                    _ => {
                        return Err(GrammarError::Syntax {
                            line,
                            message: "%start needs a nonterminal".to_string(),
                        })
                    }
                },
                other => {
                    return Err(GrammarError::Syntax {
                        line,
                        message: format!("unknown directive '%{other}'"),
                    })
                }
            },
            _ => {
                return Err(GrammarError::Syntax {
                    line,
                    message: "expected a directive".to_string(),
                })
            }
        }
    }

    // Rules.
    while let Some((item, line)) = items.next() {
        let Item::Ident(lhs_name) = item else {
            return Err(GrammarError::Syntax {
                line,
                message: "expected a rule name".to_string(),
            });
        };
        if !lhs_name.starts_with(|c: char| c.is_ascii_lowercase()) {
            return Err(GrammarError::Syntax {
                line,
                message: format!("rule name '{lhs_name}' must start with a lowercase letter"),
            });
        }
        if !matches!(items.next(), Some((Item::Colon, _))) {
            return Err(GrammarError::Syntax {
                line,
                message: format!("expected ':' after '{lhs_name}'"),
            });
        }
        if start.is_none() {
            start = Some((lhs_name.clone(), line));
        }
        let lhs = builder.nonterminal(&lhs_name, line);

        loop {
            let mut rhs = Vec::new();
            let mut explicit: Option<Option<Precedence>> = None;
            let end = loop {
                let Some((item, line)) = items.next() else {
                    return Err(GrammarError::Syntax {
                        line: reader.line,
                        message: format!("rule '{lhs_name}' is missing its ';'"),
                    });
                };
                match item {
                    Item::Pipe | Item::Semicolon => break item,
                    Item::Directive(d) if d == "empty" => {}
                    Item::Directive(d) if d == "prec" => match items.next() {
                        Some((next @ (Item::Ident(_) | Item::Char(_)), line)) => {
                            let Symbol::Terminal(t) = builder.symbol(&next, line)? else {
                                return Err(GrammarError::Syntax {
                                    line,
                                    message: "%prec needs a terminal".to_string(),
                                });
                            };
                            explicit = Some(builder.terminals[t].precedence);
                        }
                        _ => {
                            return Err(GrammarError::Syntax {
                                line,
                                message: "%prec needs a terminal".to_string(),
                            })
                        }
                    },
                    Item::Directive(d) => {
                        return Err(GrammarError::Syntax {
                            line,
                            message: format!("unexpected directive '%{d}' in a rule"),
                        })
                    }
                    other @ (Item::Ident(_) | Item::Char(_)) => {
                        rhs.push(builder.symbol(&other, line)?);
                    }
                    Item::Colon | Item::Separator => {
                        return Err(GrammarError::Syntax {
                            line,
                            message: "unexpected token in a rule body".to_string(),
                        })
                    }
                }
            };
            let precedence = explicit.unwrap_or_else(|| builder.last_terminal_precedence(&rhs));
            let id = builder.rules.len();
            builder.rules.push(Rule {
                id,
                lhs,
                rhs,
                precedence,
            });
            if end == Item::Semicolon {
                break;
            }
        }
    }

    let Some((start_name, start_line)) = start else {
        return Err(GrammarError::Empty);
    };
    let start_id = builder.nonterminal(&start_name, start_line);
    builder.rules[0].rhs = vec![Symbol::Nonterminal(start_id)];

    let mut defined = vec![false; builder.nonterminals.len()];
    defined[0] = true;
    for rule in &builder.rules[1..] {
        defined[rule.lhs] = true;
    }
    if !defined[start_id] {
        return Err(GrammarError::MissingStart(start_name));
    }
    if let Some(id) = defined.iter().position(|d| !d) {
        return Err(GrammarError::UndefinedNonterminal {
            name: builder.nonterminals[id].clone(),
            line: builder.first_use[id],
        });
    }
    debug_assert_eq!(builder.terminals[END].name, "$end");

    Ok(Grammar::new(
        builder.terminals,
        builder.nonterminals,
        builder.rules,
    ))
}
