//! Deterministic finite automata over runes.
//!
//! A [`Dfa`] is the scanner's unit of recognition. State 0 is the start
//! state; each state has an ordered edge list and the first edge whose
//! [`RuneClass`] contains the rune wins. Two optional parallel arrays encode
//! the `^` and `$` anchors: a start edge is followed before the first rune of
//! the stream, an end edge once the stream is exhausted.

use std::fmt;
use std::sync::Arc;

/// Index of a state within one DFA.
pub type StateId = usize;

/// A set of runes described by inclusive ranges, optionally negated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuneClass {
    ranges: Vec<(char, char)>,
    negated: bool,
}

impl RuneClass {
    /// The class containing exactly `c`.
    #[must_use]
    pub fn char(c: char) -> Self {
        Self::range(c, c)
    }

    /// The class of runes in `lo..=hi`.
    #[must_use]
    pub fn range(lo: char, hi: char) -> Self {
        Self {
            ranges: vec![(lo, hi)],
            negated: false,
        }
    }

    /// The class of every rune listed in `chars`.
    #[must_use]
    pub fn set(chars: &str) -> Self {
        Self {
            ranges: chars.chars().map(|c| (c, c)).collect(),
            negated: false,
        }
    }

    /// Every rune not listed in `chars`.
    #[must_use]
    pub fn none_of(chars: &str) -> Self {
        Self {
            negated: true,
            ..Self::set(chars)
        }
    }

    /// Every rune.
    #[must_use]
    pub fn any() -> Self {
        Self {
            ranges: Vec::new(),
            negated: true,
        }
    }

    /// `c` in either ASCII case.
    #[must_use]
    pub fn ignore_case(c: char) -> Self {
        let lower = c.to_ascii_lowercase();
        let upper = c.to_ascii_uppercase();
        if lower == upper {
            Self::char(c)
        } else {
            Self::set(&format!("{lower}{upper}"))
        }
    }

    /// ASCII decimal digits.
    #[must_use]
    pub fn digit() -> Self {
        Self::range('0', '9')
    }

    /// Adds `lo..=hi` to the class (or to the excluded set when negated).
    #[must_use]
    pub fn with_range(mut self, lo: char, hi: char) -> Self {
        self.ranges.push((lo, hi));
        self
    }

    /// Adds every rune of `chars` to the class.
    #[must_use]
    pub fn with_chars(mut self, chars: &str) -> Self {
        self.ranges.extend(chars.chars().map(|c| (c, c)));
        self
    }

    /// Returns true if `c` belongs to the class.
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        let listed = self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
        listed != self.negated
    }
}

/// One outgoing transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub class: RuneClass,
    pub target: StateId,
}

/// A DFA record violates its structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DfaError {
    #[error("DFA '{name}' has no states")]
    Empty { name: String },

    #[error("DFA '{name}': {array} has {found} entries, expected {expected}")]
    LengthMismatch {
        name: String,
        array: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("DFA '{name}': state {state} targets {target}, which is out of range")]
    TargetOutOfRange {
        name: String,
        state: StateId,
        target: StateId,
    },
}

/// A deterministic automaton with optional anchors, nested bank and
/// trailing context.
#[derive(Clone)]
pub struct Dfa {
    name: String,
    accept: Vec<bool>,
    transitions: Vec<Vec<Edge>>,
    start_edges: Vec<Option<StateId>>,
    end_edges: Vec<Option<StateId>>,
    nested: Option<Arc<DfaBank>>,
    follow: Option<RuneClass>,
}

impl Dfa {
    /// Assembles a DFA from its parallel arrays, checking that they agree.
    ///
    /// `start_edges` and `end_edges` may be empty, meaning no anchors.
    pub fn from_parts(
        name: impl Into<String>,
        accept: Vec<bool>,
        transitions: Vec<Vec<Edge>>,
        start_edges: Vec<Option<StateId>>,
        end_edges: Vec<Option<StateId>>,
    ) -> Result<Self, DfaError> {
        let name = name.into();
        let states = accept.len();
        if states == 0 {
            return Err(DfaError::Empty { name });
        }
        for (array, found) in [
            ("transitions", transitions.len()),
            ("start_edges", start_edges.len()),
            ("end_edges", end_edges.len()),
        ] {
            let optional = array != "transitions" && found == 0;
            if found != states && !optional {
                return Err(DfaError::LengthMismatch {
                    name,
                    array,
                    expected: states,
                    found,
                });
            }
        }

        let targets = transitions
            .iter()
            .enumerate()
            .flat_map(|(state, edges)| edges.iter().map(move |e| (state, e.target)))
            .chain(anchor_targets(&start_edges))
            .chain(anchor_targets(&end_edges));
        for (state, target) in targets {
            if target >= states {
                return Err(DfaError::TargetOutOfRange {
                    name,
                    state,
                    target,
                });
            }
        }

        let start_edges = if start_edges.is_empty() {
            vec![None; states]
        } else {
            start_edges
        };
        let end_edges = if end_edges.is_empty() {
            vec![None; states]
        } else {
            end_edges
        };

        Ok(Self {
            name,
            accept,
            transitions,
            start_edges,
            end_edges,
            nested: None,
            follow: None,
        })
    }

    /// Builds a case-insensitive recognizer for any of `spellings`.
    ///
    /// A space inside a spelling matches one or more whitespace runes, so
    /// `"NOT EXISTS"` also accepts `not\n  exists`.
    #[must_use]
    pub fn keyword(name: impl Into<String>, spellings: &[&str]) -> Self {
        let mut builder = DfaBuilder::new(name);
        // (parent, atom, child); atoms are lowercase chars or ' ' for a gap.
        let mut children: Vec<(State, char, State)> = Vec::new();
        for spelling in spellings {
            let mut state = builder.start();
            for atom in spelling.chars().map(|c| c.to_ascii_lowercase()) {
                let existing = children
                    .iter()
                    .find(|(parent, a, _)| *parent == state && *a == atom)
                    .map(|&(_, _, child)| child);
                state = match existing {
                    Some(child) => child,
                    None => {
                        let child = builder.state();
                        if atom == ' ' {
                            builder.edge(state, whitespace(), child);
                            builder.edge(child, whitespace(), child);
                        } else {
                            builder.edge(state, RuneClass::ignore_case(atom), child);
                        }
                        children.push((state, atom, child));
                        child
                    }
                };
            }
            builder.accept(state);
        }
        builder.build()
    }

    /// Attaches a bank that re-scans every lexeme this DFA matches.
    #[must_use]
    pub fn with_nested(mut self, bank: DfaBank) -> Self {
        self.nested = Some(Arc::new(bank));
        self
    }

    /// Requires the rune after a match to belong to `class`.
    #[must_use]
    pub fn with_follow(mut self, class: RuneClass) -> Self {
        self.follow = Some(class);
        self
    }

    /// The name used in logs and diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.accept.len()
    }

    #[must_use]
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accept.get(state).copied().unwrap_or(false)
    }

    /// Follows the first edge of `state` whose class contains `c`.
    #[must_use]
    pub fn next(&self, state: StateId, c: char) -> Option<StateId> {
        self.transitions
            .get(state)?
            .iter()
            .find(|edge| edge.class.contains(c))
            .map(|edge| edge.target)
    }

    #[must_use]
    pub fn start_edge(&self, state: StateId) -> Option<StateId> {
        self.start_edges.get(state).copied().flatten()
    }

    #[must_use]
    pub fn end_edge(&self, state: StateId) -> Option<StateId> {
        self.end_edges.get(state).copied().flatten()
    }

    #[must_use]
    pub fn nested(&self) -> Option<&DfaBank> {
        self.nested.as_deref()
    }

    #[must_use]
    pub const fn follow(&self) -> Option<&RuneClass> {
        self.follow.as_ref()
    }
}

impl fmt::Debug for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dfa")
            .field("name", &self.name)
            .field("states", &self.accept.len())
            .field("nested", &self.nested.as_ref().map(|b| b.len()))
            .field("follow", &self.follow.is_some())
            .finish()
    }
}

fn anchor_targets(edges: &[Option<StateId>]) -> impl Iterator<Item = (StateId, StateId)> + '_ {
    edges
        .iter()
        .enumerate()
        .filter_map(|(state, target)| target.map(|t| (state, t)))
}

/// Whitespace as the lexical rules understand it.
#[must_use]
pub fn whitespace() -> RuneClass {
    RuneClass::set(" \t\r\n\u{0B}\u{0C}")
}

/// A state handle issued by a [`DfaBuilder`].
///
/// Handles can only come from the builder, so every edge it records points
/// at a state that exists and [`DfaBuilder::build`] cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State(StateId);

impl State {
    /// The index of this state in the finished DFA.
    #[must_use]
    pub const fn id(self) -> StateId {
        self.0
    }
}

/// Incremental constructor for [`Dfa`].
#[derive(Debug)]
pub struct DfaBuilder {
    name: String,
    accept: Vec<bool>,
    transitions: Vec<Vec<Edge>>,
    start_edges: Vec<Option<StateId>>,
    end_edges: Vec<Option<StateId>>,
}

impl DfaBuilder {
    /// Creates a builder holding only the start state.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accept: vec![false],
            transitions: vec![Vec::new()],
            start_edges: vec![None],
            end_edges: vec![None],
        }
    }

    /// The start state.
    #[must_use]
    pub const fn start(&self) -> State {
        State(0)
    }

    /// Adds a non-accepting state.
    pub fn state(&mut self) -> State {
        self.accept.push(false);
        self.transitions.push(Vec::new());
        self.start_edges.push(None);
        self.end_edges.push(None);
        State(self.accept.len() - 1)
    }

    /// Adds an accepting state.
    pub fn accepting(&mut self) -> State {
        let state = self.state();
        self.accept(state);
        state
    }

    pub fn accept(&mut self, state: State) -> &mut Self {
        self.accept[state.0] = true;
        self
    }

    /// Appends an edge; edges are tried in insertion order.
    pub fn edge(&mut self, from: State, class: RuneClass, to: State) -> &mut Self {
        self.transitions[from.0].push(Edge {
            class,
            target: to.0,
        });
        self
    }

    pub fn start_edge(&mut self, from: State, to: State) -> &mut Self {
        self.start_edges[from.0] = Some(to.0);
        self
    }

    pub fn end_edge(&mut self, from: State, to: State) -> &mut Self {
        self.end_edges[from.0] = Some(to.0);
        self
    }

    /// Finishes the DFA.
    #[must_use]
    pub fn build(self) -> Dfa {
        Dfa {
            name: self.name,
            accept: self.accept,
            transitions: self.transitions,
            start_edges: self.start_edges,
            end_edges: self.end_edges,
            nested: None,
            follow: None,
        }
    }
}

/// An ordered collection of DFAs. The position of a DFA is its rule index,
/// and on equal match lengths the lower index wins.
#[derive(Debug, Clone, Default)]
pub struct DfaBank {
    dfas: Vec<Dfa>,
}

impl DfaBank {
    #[must_use]
    pub fn new(dfas: Vec<Dfa>) -> Self {
        Self { dfas }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dfas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dfas.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Dfa> {
        self.dfas.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dfa> {
        self.dfas.iter()
    }
}

impl FromIterator<Dfa> for DfaBank {
    fn from_iter<T: IntoIterator<Item = Dfa>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(dfa: &Dfa, input: &str) -> Option<StateId> {
        input.chars().try_fold(0, |state, c| dfa.next(state, c))
    }

    #[test]
    fn test_rune_class_contains() {
        let class = RuneClass::range('a', 'f').with_chars("_");
        assert!(class.contains('c'));
        assert!(class.contains('_'));
        assert!(!class.contains('g'));

        let not_quote = RuneClass::none_of("'\\");
        assert!(not_quote.contains('x'));
        assert!(not_quote.contains('\n'));
        assert!(!not_quote.contains('\''));
        assert!(RuneClass::any().contains('\u{1F600}'));
    }

    #[test]
    fn test_first_matching_edge_wins() {
        let mut b = DfaBuilder::new("pick");
        let digit = b.accepting();
        let other = b.accepting();
        let start = b.start();
        b.edge(start, RuneClass::digit(), digit);
        b.edge(start, RuneClass::any(), other);
        let dfa = b.build();
        assert_eq!(dfa.next(0, '7'), Some(digit.id()));
        assert_eq!(dfa.next(0, 'x'), Some(other.id()));
    }

    #[test]
    fn test_keyword_dfa_is_case_insensitive() {
        let dfa = Dfa::keyword("SELECT", &["select"]);
        for spelling in ["SELECT", "select", "SeLeCt"] {
            let state = run(&dfa, spelling).unwrap();
            assert!(dfa.is_accepting(state), "{spelling}");
        }
        assert!(!dfa.is_accepting(run(&dfa, "SELEC").unwrap()));
        assert_eq!(run(&dfa, "SELECTS"), None);
    }

    #[test]
    fn test_keyword_dfa_shares_prefixes() {
        let dfa = Dfa::keyword("INTEGER", &["INTEGER", "INT", "INT4"]);
        for spelling in ["int", "INT4", "Integer"] {
            assert!(dfa.is_accepting(run(&dfa, spelling).unwrap()), "{spelling}");
        }
        assert!(!dfa.is_accepting(run(&dfa, "inte").unwrap()));
    }

    #[test]
    fn test_keyword_dfa_whitespace_gap() {
        let dfa = Dfa::keyword("NOT EXISTS", &["NOT EXISTS"]);
        assert!(dfa.is_accepting(run(&dfa, "not exists").unwrap()));
        assert!(dfa.is_accepting(run(&dfa, "NOT \n\t EXISTS").unwrap()));
        assert_eq!(run(&dfa, "NOTEXISTS"), None);
    }

    #[test]
    fn test_from_parts_validates_lengths() {
        let err = Dfa::from_parts("bad", vec![false, true], vec![Vec::new()], vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, DfaError::LengthMismatch { array: "transitions", .. }));

        let err = Dfa::from_parts(
            "bad",
            vec![false],
            vec![Vec::new()],
            vec![None, None],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, DfaError::LengthMismatch { array: "start_edges", .. }));
    }

    #[test]
    fn test_from_parts_validates_targets() {
        let edges = vec![vec![Edge {
            class: RuneClass::char('a'),
            target: 5,
        }]];
        let err = Dfa::from_parts("bad", vec![false], edges, vec![], vec![]).unwrap_err();
        assert_eq!(
            err,
            DfaError::TargetOutOfRange {
                name: "bad".into(),
                state: 0,
                target: 5
            }
        );

        let err = Dfa::from_parts("bad", vec![false], vec![Vec::new()], vec![], vec![Some(1)])
            .unwrap_err();
        assert!(matches!(err, DfaError::TargetOutOfRange { target: 1, .. }));
    }

    #[test]
    fn test_from_parts_fills_missing_anchors() {
        let dfa = Dfa::from_parts("ok", vec![false, true], vec![Vec::new(), Vec::new()], vec![], vec![])
            .unwrap();
        assert_eq!(dfa.state_count(), 2);
        assert_eq!(dfa.start_edge(0), None);
        assert_eq!(dfa.end_edge(1), None);
    }

    #[test]
    fn test_empty_dfa_rejected() {
        let err = Dfa::from_parts("none", vec![], vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, DfaError::Empty { .. }));
    }
}
