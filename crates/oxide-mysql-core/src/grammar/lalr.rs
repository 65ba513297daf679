//! LALR(1) automaton construction.
//!
//! The LR(0) item sets are built first. Lookaheads are then attached to each
//! kernel item and propagated along goto edges until nothing changes. Closure
//! items receive spontaneous lookaheads from the FIRST set of the suffix that
//! follows the nonterminal they expand.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::symbol::{Grammar, RuleId, Symbol, TerminalId, END};

pub type StateId = usize;

/// A fixed-size set of terminals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSet {
    words: Vec<u64>,
}

impl TerminalSet {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size.div_ceil(64)],
        }
    }

    /// Inserts `t`, returning true if it was not already present.
    pub fn insert(&mut self, t: TerminalId) -> bool {
        let (word, bit) = (t / 64, 1u64 << (t % 64));
        let fresh = self.words[word] & bit == 0;
        self.words[word] |= bit;
        fresh
    }

    #[must_use]
    pub fn contains(&self, t: TerminalId) -> bool {
        self.words
            .get(t / 64)
            .is_some_and(|w| w & (1u64 << (t % 64)) != 0)
    }

    /// Adds every member of `other`, returning true if anything was added.
    pub fn union_with(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = TerminalId> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| i * 64 + bit)
        })
    }
}

/// An LR(0) item: a rule with a dot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub rule: RuleId,
    pub dot: usize,
}

/// The LALR(1) automaton: goto edges and lookahead-annotated reductions.
#[derive(Debug)]
pub struct Automaton {
    /// Kernel items of each state, sorted.
    pub kernels: Vec<Vec<Item>>,
    /// Outgoing edges of each state, sorted by symbol.
    pub gotos: Vec<Vec<(Symbol, StateId)>>,
    /// Completed items of each state with their lookahead sets.
    pub reductions: Vec<Vec<(RuleId, TerminalSet)>>,
}

impl Automaton {
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.kernels.len()
    }

    #[must_use]
    pub fn goto(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        let edges = &self.gotos[state];
        edges
            .binary_search_by(|(s, _)| s.cmp(&symbol))
            .ok()
            .map(|i| edges[i].1)
    }
}

struct Analysis<'g> {
    grammar: &'g Grammar,
    terminal_count: usize,
    /// FIRST set and nullability of each rule suffix `rhs[i..]`.
    suffix: Vec<Vec<(TerminalSet, bool)>>,
}

impl<'g> Analysis<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let terminal_count = grammar.terminals().len();
        let nonterminal_count = grammar.nonterminals().len();
        let mut nullable = vec![false; nonterminal_count];
        let mut first = vec![TerminalSet::new(terminal_count); nonterminal_count];

        let mut changed = true;
        while changed {
            changed = false;
            for rule in grammar.rules() {
                let mut all_nullable = true;
                for &symbol in &rule.rhs {
                    match symbol {
                        Symbol::Terminal(t) => {
                            changed |= first[rule.lhs].insert(t);
                            all_nullable = false;
                        }
                        Symbol::Nonterminal(n) => {
                            if n != rule.lhs {
                                let other = first[n].clone();
                                changed |= first[rule.lhs].union_with(&other);
                            }
                            all_nullable = nullable[n];
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                if all_nullable && !nullable[rule.lhs] {
                    nullable[rule.lhs] = true;
                    changed = true;
                }
            }
        }

        let suffix = grammar
            .rules()
            .iter()
            .map(|rule| {
                let mut sets = vec![(TerminalSet::new(terminal_count), true)];
                for &symbol in rule.rhs.iter().rev() {
                    let (after, after_nullable) = sets.last().cloned().unwrap_or_else(|| {
                        (TerminalSet::new(terminal_count), true)
                    });
                    let entry = match symbol {
                        Symbol::Terminal(t) => {
                            let mut set = TerminalSet::new(terminal_count);
                            set.insert(t);
                            (set, false)
                        }
                        Symbol::Nonterminal(n) => {
                            let mut set = first[n].clone();
                            if nullable[n] {
                                set.union_with(&after);
                            }
                            (set, nullable[n] && after_nullable)
                        }
                    };
                    sets.push(entry);
                }
                sets.reverse();
                sets
            })
            .collect();

        Self {
            grammar,
            terminal_count,
            suffix,
        }
    }

    fn next_symbol(&self, item: Item) -> Option<Symbol> {
        self.grammar.rules()[item.rule].rhs.get(item.dot).copied()
    }

    fn closure(&self, kernel: &[Item]) -> Vec<Item> {
        let mut items = kernel.to_vec();
        let mut expanded = vec![false; self.grammar.nonterminals().len()];
        let mut i = 0;
        while i < items.len() {
            if let Some(Symbol::Nonterminal(n)) = self.next_symbol(items[i]) {
                if !expanded[n] {
                    expanded[n] = true;
                    items.extend(
                        self.grammar
                            .rules_for(n)
                            .iter()
                            .map(|&rule| Item { rule, dot: 0 }),
                    );
                }
            }
            i += 1;
        }
        items
    }

    /// The closure of a kernel with lookaheads on every item.
    fn closure_lookaheads(&self, kernel: &[Item], lookaheads: &[TerminalSet]) -> Vec<(Item, TerminalSet)> {
        let mut items: Vec<(Item, TerminalSet)> = kernel
            .iter()
            .copied()
            .zip(lookaheads.iter().cloned())
            .collect();
        let mut slot: Vec<Option<usize>> = vec![None; self.grammar.rules().len()];
        let mut stack: Vec<usize> = (0..items.len()).collect();
        while let Some(idx) = stack.pop() {
            let item = items[idx].0;
            let Some(Symbol::Nonterminal(n)) = self.next_symbol(item) else {
                continue;
            };
            let (first, nullable) = &self.suffix[item.rule][item.dot + 1];
            let mut follow = first.clone();
            if *nullable {
                follow.union_with(&items[idx].1);
            }
            for &rule in self.grammar.rules_for(n) {
                if let Some(j) = slot[rule] {
                    if items[j].1.union_with(&follow) {
                        stack.push(j);
                    }
                } else {
                    slot[rule] = Some(items.len());
                    stack.push(items.len());
                    items.push((Item { rule, dot: 0 }, follow.clone()));
                }
            }
        }
        items
    }
}

/// Builds the LALR(1) automaton of `grammar`.
#[must_use]
pub fn build(grammar: &Grammar) -> Automaton {
    let analysis = Analysis::new(grammar);

    // LR(0) states.
    let start = vec![Item { rule: 0, dot: 0 }];
    let mut kernels = vec![start.clone()];
    let mut index: HashMap<Vec<Item>, StateId> = HashMap::from([(start, 0)]);
    let mut gotos = Vec::new();
    let mut state = 0;
    while state < kernels.len() {
        let mut by_symbol: BTreeMap<Symbol, Vec<Item>> = BTreeMap::new();
        for item in analysis.closure(&kernels[state]) {
            if let Some(symbol) = analysis.next_symbol(item) {
                by_symbol.entry(symbol).or_default().push(Item {
                    rule: item.rule,
                    dot: item.dot + 1,
                });
            }
        }
        let mut edges = Vec::with_capacity(by_symbol.len());
        for (symbol, mut kernel) in by_symbol {
            kernel.sort_unstable();
            kernel.dedup();
            let target = if let Some(&target) = index.get(&kernel) {
                target
            } else {
                let target = kernels.len();
                index.insert(kernel.clone(), target);
                kernels.push(kernel);
                target
            };
            edges.push((symbol, target));
        }
        gotos.push(edges);
        state += 1;
    }

    let mut automaton = Automaton {
        kernels,
        gotos,
        reductions: Vec::new(),
    };

    // Lookahead propagation.
    let empty = TerminalSet::new(analysis.terminal_count);
    let mut lookaheads: Vec<Vec<TerminalSet>> = automaton
        .kernels
        .iter()
        .map(|k| vec![empty.clone(); k.len()])
        .collect();
    lookaheads[0][0].insert(END);
    let mut queue: VecDeque<StateId> = (0..automaton.state_count()).collect();
    let mut queued = vec![true; automaton.state_count()];
    while let Some(state) = queue.pop_front() {
        queued[state] = false;
        let items = analysis.closure_lookaheads(&automaton.kernels[state], &lookaheads[state]);
        for (item, set) in items {
            let Some(symbol) = analysis.next_symbol(item) else {
                continue;
            };
            let Some(target) = automaton.goto(state, symbol) else {
                continue;
            };
            let advanced = Item {
                rule: item.rule,
                dot: item.dot + 1,
            };
            let Ok(slot) = automaton.kernels[target].binary_search(&advanced) else {
                continue;
            };
            if lookaheads[target][slot].union_with(&set) && !queued[target] {
                queued[target] = true;
                queue.push_back(target);
            }
        }
    }

    automaton.reductions = (0..automaton.state_count())
        .map(|state| {
            analysis
                .closure_lookaheads(&automaton.kernels[state], &lookaheads[state])
                .into_iter()
                .filter(|(item, _)| item.dot == grammar.rules()[item.rule].rhs.len())
                .map(|(item, set)| (item.rule, set))
                .collect()
        })
        .collect();
    automaton
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::reader::parse_grammar;

    #[test]
    fn test_terminal_set() {
        let mut set = TerminalSet::new(130);
        assert!(set.is_empty());
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.insert(129));
        assert!(set.contains(129));
        assert!(!set.contains(64));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 129]);

        let mut other = TerminalSet::new(130);
        other.insert(64);
        assert!(set.union_with(&other));
        assert!(!set.union_with(&other));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 64, 129]);
    }

    fn reduce_lookaheads(grammar: &Grammar, automaton: &Automaton, rule: RuleId) -> Vec<String> {
        let mut names: Vec<String> = automaton
            .reductions
            .iter()
            .flatten()
            .filter(|(r, _)| *r == rule)
            .flat_map(|(_, set)| set.iter())
            .map(|t| grammar.terminals()[t].name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    #[test]
    fn test_lookaheads_of_classic_lalr_grammar() {
        // S -> L = R | R ; L -> * R | id ; R -> L
        let g = parse_grammar(
            "%%
            s: l '=' r | r;
            l: '*' r | NAME;
            r: l;",
        )
        .unwrap();
        let automaton = build(&g);
        // r -> l reduces on '=' (inside `* r`) and on $end.
        assert_eq!(reduce_lookaheads(&g, &automaton, 5), vec!["$end", "'='"]);
        assert_eq!(reduce_lookaheads(&g, &automaton, 2), vec!["$end"]);
    }

    #[test]
    fn test_nullable_suffix_passes_lookahead_through() {
        let g = parse_grammar(
            "%%
            s: a opt NAME;
            a: INTNUM;
            opt: %empty | STRING;",
        )
        .unwrap();
        let automaton = build(&g);
        assert_eq!(
            reduce_lookaheads(&g, &automaton, 2),
            vec!["NAME", "STRING"]
        );
        assert_eq!(reduce_lookaheads(&g, &automaton, 3), vec!["NAME"]);
    }

    #[test]
    fn test_goto_edges_are_sorted() {
        let g = parse_grammar("%% s: NAME | INTNUM | '(' s ')';").unwrap();
        let automaton = build(&g);
        for edges in &automaton.gotos {
            assert!(edges.windows(2).all(|w| w[0].0 < w[1].0));
        }
        let name = g.terminal_id("NAME").unwrap();
        assert!(automaton.goto(0, Symbol::Terminal(name)).is_some());
    }
}
