//! The multi-DFA longest-match scanner.
//!
//! Every DFA of the bank is stepped in lockstep over a rune lookahead buffer.
//! The longest accepted prefix wins, ties go to the lower DFA index, and
//! zero-length matches never count. When nothing matches, one rune is
//! dropped so the scan always makes progress.

use std::collections::VecDeque;

use tracing::trace;

use super::dfa::{Dfa, DfaBank, StateId};
use super::diagnostic::{Diagnostic, DiagnosticKind, LexError};
use super::source::{Decoded, Input, Rune, RuneInput};
use super::Location;

/// Scanner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerOptions {
    /// Emit an `UnrecognizedCharacter` diagnostic for each dropped rune.
    pub report_unrecognized: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            report_unrecognized: true,
        }
    }
}

/// One match of the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Index of the matching DFA in its bank; `None` marks end of input.
    pub rule: Option<usize>,
    /// 0 for the top-level bank, incremented for each nested bank.
    pub depth: usize,
    pub lexeme: String,
    /// Location of the first rune of the lexeme.
    pub location: Location,
}

impl Frame {
    #[must_use]
    pub const fn eof(location: Location, depth: usize) -> Self {
        Self {
            rule: None,
            depth,
            lexeme: String::new(),
            location,
        }
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.rule.is_none()
    }
}

/// Everything the scanner emits, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanItem {
    Frame(Frame),
    Diagnostic(Diagnostic),
}

#[derive(Debug, Clone, Copy)]
struct Match {
    rule: usize,
    len: usize,
}

impl Match {
    /// Longer wins; on equal length the lower rule index wins.
    const fn beats(self, best: Option<Self>) -> bool {
        match best {
            None => true,
            Some(b) => self.len > b.len || (self.len == b.len && self.rule < b.rule),
        }
    }
}

/// Longest-match scanner over an [`Input`].
pub struct Scanner<'b, I> {
    bank: &'b DfaBank,
    input: I,
    options: LexerOptions,
    depth: usize,
    lookahead: VecDeque<Decoded>,
    input_done: bool,
    at_start: bool,
    finished: bool,
    pending: VecDeque<ScanItem>,
    states: Vec<StateId>,
    live: Vec<usize>,
}

impl<'b, I: Input> Scanner<'b, I> {
    /// Creates a scanner running `bank` over `input`.
    #[must_use]
    pub fn new(bank: &'b DfaBank, input: I, options: LexerOptions) -> Self {
        Self::with_depth(bank, input, options, 0)
    }

    fn with_depth(bank: &'b DfaBank, input: I, options: LexerOptions, depth: usize) -> Self {
        Self {
            bank,
            input,
            options,
            depth,
            lookahead: VecDeque::new(),
            input_done: false,
            at_start: true,
            finished: false,
            pending: VecDeque::new(),
            states: Vec::with_capacity(bank.len()),
            live: Vec::with_capacity(bank.len()),
        }
    }

    /// Returns the next frame or diagnostic, or `None` after the EOF frame.
    pub fn next_item(&mut self) -> Result<Option<ScanItem>, LexError> {
        if let Some(item) = self.pending.pop_front() {
            return Ok(Some(item));
        }
        if self.finished {
            return Ok(None);
        }

        loop {
            self.fill(1)?;
            match self.lookahead.front() {
                None => {
                    self.finished = true;
                    let frame = Frame::eof(self.input.location(), self.depth);
                    return Ok(Some(ScanItem::Frame(frame)));
                }
                Some(Decoded::Invalid { .. }) => {
                    self.at_start = false;
                    if let Some(Decoded::Invalid { bytes, location }) = self.lookahead.pop_front()
                    {
                        let kind = DiagnosticKind::InvalidUtf8(bytes);
                        return Ok(Some(ScanItem::Diagnostic(Diagnostic::new(kind, location))));
                    }
                }
                Some(Decoded::Rune(_)) => {}
            }

            let at_start = std::mem::replace(&mut self.at_start, false);
            if let Some(m) = self.longest_match(at_start)? {
                return self.emit(m).map(Some);
            }

            if let Some(Decoded::Rune(rune)) = self.lookahead.pop_front() {
                trace!(ch = ?rune.ch, location = %rune.location, "no rule matches, dropping rune");
                if self.options.report_unrecognized {
                    let kind = DiagnosticKind::UnrecognizedCharacter(rune.ch);
                    return Ok(Some(ScanItem::Diagnostic(Diagnostic::new(kind, rune.location))));
                }
            }
        }
    }

    /// Makes sure `n` items are buffered unless the input ends first.
    fn fill(&mut self, n: usize) -> Result<(), LexError> {
        while self.lookahead.len() < n && !self.input_done {
            match self.input.next_decoded()? {
                Some(item) => self.lookahead.push_back(item),
                None => self.input_done = true,
            }
        }
        Ok(())
    }

    fn rune_at(&self, index: usize) -> Option<char> {
        match self.lookahead.get(index) {
            Some(Decoded::Rune(r)) => Some(r.ch),
            _ => None,
        }
    }

    fn longest_match(&mut self, at_start: bool) -> Result<Option<Match>, LexError> {
        let bank = self.bank;
        self.states.clear();
        self.live.clear();
        for (i, dfa) in bank.iter().enumerate() {
            let state = if at_start {
                follow_anchors(dfa, 0, Dfa::start_edge).0
            } else {
                0
            };
            self.states.push(state);
            self.live.push(i);
        }

        let mut best: Option<Match> = None;
        let mut len = 0;
        loop {
            self.fill(len + 1)?;
            let Some(c) = self.rune_at(len) else {
                // Only true end of input reaches the end anchors.
                if self.lookahead.len() == len && self.input_done && len > 0 {
                    for &i in &self.live {
                        let Some(dfa) = bank.get(i) else { continue };
                        let (_, accepted) = follow_anchors(dfa, self.states[i], Dfa::end_edge);
                        let candidate = Match { rule: i, len };
                        if accepted && dfa.follow().is_none() && candidate.beats(best) {
                            best = Some(candidate);
                        }
                    }
                }
                break;
            };
            len += 1;

            let states = &mut self.states;
            self.live.retain(|&i| {
                let next = bank.get(i).and_then(|dfa| dfa.next(states[i], c));
                if let Some(next) = next {
                    states[i] = next;
                }
                next.is_some()
            });
            if self.live.is_empty() {
                break;
            }

            self.fill(len + 1)?;
            let following = self.rune_at(len);
            for &i in &self.live {
                let Some(dfa) = bank.get(i) else { continue };
                if !dfa.is_accepting(self.states[i]) {
                    continue;
                }
                let context_ok = dfa
                    .follow()
                    .is_none_or(|class| following.is_some_and(|c| class.contains(c)));
                let candidate = Match { rule: i, len };
                if context_ok && candidate.beats(best) {
                    best = Some(candidate);
                }
            }
        }
        Ok(best)
    }

    fn emit(&mut self, m: Match) -> Result<ScanItem, LexError> {
        let runes: Vec<Rune> = self
            .lookahead
            .drain(..m.len)
            .filter_map(|d| match d {
                Decoded::Rune(r) => Some(r),
                Decoded::Invalid { .. } => None,
            })
            .collect();
        let location = runes.first().map_or_else(|| self.input.location(), |r| r.location);
        let lexeme: String = runes.iter().map(|r| r.ch).collect();
        trace!(rule = m.rule, %location, lexeme = %lexeme, depth = self.depth, "scanner match");

        let bank = self.bank;
        if let Some(nested) = bank.get(m.rule).and_then(Dfa::nested) {
            let end = runes
                .last()
                .map_or(location, |r| r.location.advance(r.ch));
            let mut inner = Scanner::with_depth(
                nested,
                RuneInput::new(runes, end),
                self.options,
                self.depth + 1,
            );
            while let Some(item) = inner.next_item()? {
                if matches!(&item, ScanItem::Frame(f) if f.is_eof()) {
                    continue;
                }
                self.pending.push_back(item);
            }
        }

        Ok(ScanItem::Frame(Frame {
            rule: Some(m.rule),
            depth: self.depth,
            lexeme,
            location,
        }))
    }
}

impl<I: Input> Iterator for Scanner<'_, I> {
    type Item = Result<ScanItem, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_item() {
            Ok(item) => item.map(Ok),
            Err(e) => {
                self.finished = true;
                self.pending.clear();
                Some(Err(e))
            }
        }
    }
}

/// Follows a chain of anchor edges from `from`, visiting each state once.
///
/// Returns the last state reached and whether any state on the chain,
/// excluding `from`, accepts.
fn follow_anchors(
    dfa: &Dfa,
    from: StateId,
    edge: impl Fn(&Dfa, StateId) -> Option<StateId>,
) -> (StateId, bool) {
    let mut visited = vec![false; dfa.state_count()];
    let mut state = from;
    let mut accepted = false;
    if let Some(slot) = visited.get_mut(from) {
        *slot = true;
    }
    while let Some(next) = edge(dfa, state) {
        match visited.get_mut(next) {
            Some(seen) if !*seen => *seen = true,
            _ => break,
        }
        state = next;
        accepted |= dfa.is_accepting(state);
    }
    (state, accepted)
}
