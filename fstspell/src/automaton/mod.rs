//! Finite-state acceptors over characters.
//!
//! An [`Automaton`] is built either transition by transition or as a trie
//! over a word list with [`Automaton::build_trie`], and can be reduced to its
//! minimal equivalent with [`Automaton::minimize`]. Undefined transitions
//! reject; there is no implicit sink state.
use std::collections::{BTreeMap, BTreeSet};

use crate::types::StateId;

mod minimize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AutomatonError {
    #[error("Minimization requires a deterministic automaton")]
    NotDeterministic,
    #[error("Automaton has no start state")]
    NoStartState,
    #[error("Automaton accepts infinitely many words")]
    Cyclic,
}

#[derive(Debug, Clone)]
pub struct Automaton {
    transitions: BTreeMap<(StateId, char), Vec<StateId>>,
    start: Option<StateId>,
    accepting: BTreeSet<StateId>,
    states: BTreeSet<StateId>,
    deterministic: bool,
    next_state: StateId,
}

impl Default for Automaton {
    fn default() -> Self {
        Automaton::new()
    }
}

impl Automaton {
    pub fn new() -> Automaton {
        Automaton {
            transitions: BTreeMap::new(),
            start: None,
            accepting: BTreeSet::new(),
            states: BTreeSet::new(),
            deterministic: true,
            next_state: StateId::ZERO,
        }
    }

    /// Trie automaton accepting exactly `words`.
    pub fn from_words<I, S>(words: I) -> Automaton
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut automaton = Automaton::new();
        automaton.build_trie(words);
        automaton
    }

    #[inline(always)]
    fn register(&mut self, state: StateId) {
        self.states.insert(state);
        if state >= self.next_state {
            self.next_state = state.incr();
        }
    }

    #[inline(always)]
    fn allocate(&mut self) -> StateId {
        let state = self.next_state;
        self.register(state);
        state
    }

    /// Adds `from --symbol--> to` and returns `to`.
    ///
    /// A fresh state is allocated when `to` is `None`. The first state ever
    /// passed as `from` becomes the start state. Adding a second target for
    /// an existing `(from, symbol)` makes the automaton non-deterministic.
    pub fn add_transition(
        &mut self,
        from: StateId,
        symbol: char,
        to: Option<StateId>,
        accepting: bool,
    ) -> StateId {
        if self.start.is_none() {
            self.start = Some(from);
        }
        self.register(from);

        let to = match to {
            Some(state) => {
                self.register(state);
                state
            }
            None => self.allocate(),
        };

        let targets = self.transitions.entry((from, symbol)).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
        if targets.len() > 1 {
            self.deterministic = false;
        }

        if accepting {
            self.accepting.insert(to);
        }

        to
    }

    pub fn set_start(&mut self, state: StateId) {
        self.register(state);
        self.start = Some(state);
    }

    pub fn mark_accepting(&mut self, state: StateId) {
        self.register(state);
        self.accepting.insert(state);
    }

    /// States reachable from `from` (the start state if `None`) on `symbol`,
    /// or `None` when no such transition exists.
    pub fn step(&self, symbol: char, from: Option<StateId>) -> Option<&[StateId]> {
        let from = from.or(self.start)?;
        self.transitions.get(&(from, symbol)).map(Vec::as_slice)
    }

    pub fn recognize(&self, input: &str) -> bool {
        if self.deterministic {
            self.recognize_dfa(input)
        } else {
            self.recognize_nfa(input)
        }
    }

    fn recognize_dfa(&self, input: &str) -> bool {
        let mut state = match self.start {
            Some(s) => s,
            None => return false,
        };

        for ch in input.chars() {
            match self.step(ch, Some(state)).and_then(|t| t.first()) {
                Some(next) => state = *next,
                None => return false,
            }
        }

        self.accepting.contains(&state)
    }

    fn recognize_nfa(&self, input: &str) -> bool {
        let start = match self.start {
            Some(s) => s,
            None => return false,
        };
        let input: Vec<char> = input.chars().collect();
        let mut agenda = vec![(start, 0usize)];

        while let Some((state, pos)) = agenda.pop() {
            if pos == input.len() {
                if self.accepting.contains(&state) {
                    return true;
                }
                continue;
            }

            if let Some(targets) = self.step(input[pos], Some(state)) {
                agenda.extend(targets.iter().map(|t| (*t, pos + 1)));
            }
        }

        false
    }

    /// Replaces the automaton with a trie over `words`.
    ///
    /// Words share their common prefix path and branch at the first
    /// divergence; the last state of every word is accepting.
    pub fn build_trie<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        *self = Automaton::new();
        let start = self.allocate();
        self.start = Some(start);

        for word in words {
            let mut state = start;

            for ch in word.as_ref().chars() {
                state = match self.step(ch, Some(state)).and_then(|t| t.first()) {
                    Some(next) => *next,
                    None => self.add_transition(state, ch, None, false),
                };
            }

            self.accepting.insert(state);
        }

        log::debug!(
            "trie built: {} states, {} transitions",
            self.state_count(),
            self.transition_count()
        );
    }

    #[inline(always)]
    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    #[inline(always)]
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    #[inline(always)]
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(&state)
    }

    pub fn accepting(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().copied()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(Vec::len).sum()
    }

    /// All transitions as `(from, symbol, to)`, ordered by source state and symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, char, StateId)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(&(from, sym), targets)| targets.iter().map(move |&to| (from, sym, to)))
    }

    /// Outgoing transitions of `state`, ordered by symbol.
    pub fn transitions_from(
        &self,
        state: StateId,
    ) -> impl Iterator<Item = (char, &[StateId])> + '_ {
        self.transitions
            .range((state, '\0')..=(state, char::MAX))
            .map(|(&(_, sym), targets)| (sym, targets.as_slice()))
    }

    pub fn alphabet(&self) -> BTreeSet<char> {
        self.transitions.keys().map(|&(_, sym)| sym).collect()
    }

    /// Every accepted word, in lexicographic order without duplicates.
    ///
    /// Fails with [`AutomatonError::Cyclic`] if a cycle is reachable from
    /// the start state.
    pub fn words(&self) -> Result<Vec<String>, AutomatonError> {
        let start = self.start.ok_or(AutomatonError::NoStartState)?;
        let mut words = BTreeSet::new();
        let mut path = Vec::new();
        self.collect_words(start, &mut String::new(), &mut path, &mut words)?;
        Ok(words.into_iter().collect())
    }

    fn collect_words(
        &self,
        state: StateId,
        prefix: &mut String,
        path: &mut Vec<StateId>,
        words: &mut BTreeSet<String>,
    ) -> Result<(), AutomatonError> {
        if path.contains(&state) {
            return Err(AutomatonError::Cyclic);
        }
        if self.accepting.contains(&state) {
            words.insert(prefix.clone());
        }

        path.push(state);
        for (sym, targets) in self.transitions_from(state) {
            for &target in targets {
                prefix.push(sym);
                self.collect_words(target, prefix, path, words)?;
                prefix.pop();
            }
        }
        path.pop();

        Ok(())
    }

    /// Same language with every word lower-cased.
    pub fn to_lowercase(&self) -> Result<Automaton, AutomatonError> {
        let words = self.words()?;
        Ok(Automaton::from_words(words.iter().map(|w| w.to_lowercase())))
    }
}
