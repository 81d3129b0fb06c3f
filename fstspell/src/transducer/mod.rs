//! Weighted finite-state transducers.
//!
//! A [`Transducer`] maps `(state, input symbol)` to a list of
//! [`SymbolTransition`]s, each carrying an output symbol, a target state and
//! an additive weight. Inputs and outputs may be [`Symbol::Epsilon`].
use std::collections::BTreeSet;

use hashbrown::HashMap;

use crate::automaton::Automaton;
use crate::types::{StateId, Symbol, Weight};

pub mod compose;
pub mod search;
mod symbol_transition;
pub mod tree_node;

pub use self::compose::{compose, pair_states};
pub use self::search::{Transduction, Transductions};
pub use self::symbol_transition::SymbolTransition;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TransducerError {
    /// The left operand of a composition carries an epsilon transition
    #[error("Composition filter has an epsilon transition at state {state}")]
    EpsilonInFilter { state: StateId },
    /// Pairing two state ids does not fit in a state id
    #[error("Composed state id for ({0}, {1}) overflows")]
    StateOverflow(StateId, StateId),
    #[error("Transducer has no start state")]
    NoStartState,
}

#[derive(Debug, Clone)]
pub struct Transducer {
    transitions: HashMap<(StateId, Symbol), Vec<SymbolTransition>>,
    start: Option<StateId>,
    accepting: BTreeSet<StateId>,
    states: BTreeSet<StateId>,
    input_alphabet: BTreeSet<Symbol>,
    output_alphabet: BTreeSet<Symbol>,
    next_state: StateId,
}

impl Default for Transducer {
    fn default() -> Self {
        Transducer::new()
    }
}

impl From<&Automaton> for Transducer {
    fn from(automaton: &Automaton) -> Self {
        Transducer::from_automaton(automaton)
    }
}

impl Transducer {
    pub fn new() -> Transducer {
        Transducer {
            transitions: HashMap::new(),
            start: None,
            accepting: BTreeSet::new(),
            states: BTreeSet::new(),
            input_alphabet: BTreeSet::new(),
            output_alphabet: BTreeSet::new(),
            next_state: StateId::ZERO,
        }
    }

    /// Identity transducer over the language of `automaton`: every arc
    /// `a` becomes `a:a` with weight zero.
    pub fn from_automaton(automaton: &Automaton) -> Transducer {
        let mut fst = Transducer::new();

        if let Some(start) = automaton.start() {
            fst.set_start(start);
        }
        for state in automaton.states() {
            fst.register(state);
        }
        for (from, sym, to) in automaton.transitions() {
            let sym = Symbol::Char(sym);
            fst.add_transition(from, sym, Some(to), Some(sym), Weight::ZERO, false);
        }
        for state in automaton.accepting() {
            fst.mark_accepting(*state);
        }

        fst
    }

    #[inline(always)]
    fn register(&mut self, state: StateId) {
        self.states.insert(state);
        if state >= self.next_state {
            self.next_state = state.incr();
        }
    }

    /// Adds `from --input:output/weight--> to` and returns `to`.
    ///
    /// `to` is freshly allocated when `None`; `output` defaults to `input`.
    /// The first state passed as `from` becomes the start state unless one
    /// was set. Adding an identical arc twice keeps a single copy.
    pub fn add_transition(
        &mut self,
        from: StateId,
        input: Symbol,
        to: Option<StateId>,
        output: Option<Symbol>,
        weight: Weight,
        accepting: bool,
    ) -> StateId {
        if self.start.is_none() {
            self.start = Some(from);
        }
        self.register(from);

        let to = match to {
            Some(state) => state,
            None => self.next_state,
        };
        self.register(to);

        let output = output.unwrap_or(input);
        self.input_alphabet.insert(input);
        self.output_alphabet.insert(output);

        let transition = SymbolTransition::new(to, output, weight);
        let arcs = self.transitions.entry((from, input)).or_default();
        if !arcs.contains(&transition) {
            arcs.push(transition);
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

    /// Copy with input and output labels swapped on every arc.
    pub fn invert(&self) -> Transducer {
        let mut inverted = Transducer::new();

        if let Some(start) = self.start {
            inverted.set_start(start);
        }
        for state in self.states.iter() {
            inverted.register(*state);
        }
        for (from, input, transition) in self.arcs() {
            inverted.add_transition(
                from,
                transition.symbol(),
                Some(transition.target()),
                Some(input),
                transition.weight(),
                false,
            );
        }
        inverted.accepting = self.accepting.clone();

        inverted
    }

    pub fn invert_in_place(&mut self) {
        *self = self.invert();
    }

    /// Arcs leaving `state` on `input`.
    #[inline(always)]
    pub fn transitions_from(&self, state: StateId, input: Symbol) -> &[SymbolTransition] {
        self.transitions
            .get(&(state, input))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every arc as `(from, input, transition)`, in no particular order.
    pub fn arcs(&self) -> impl Iterator<Item = (StateId, Symbol, &SymbolTransition)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(&(from, input), arcs)| arcs.iter().map(move |t| (from, input, t)))
    }

    #[inline(always)]
    pub fn start(&self) -> Option<StateId> {
        self.start
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

    pub fn input_alphabet(&self) -> &BTreeSet<Symbol> {
        &self.input_alphabet
    }

    pub fn output_alphabet(&self) -> &BTreeSet<Symbol> {
        &self.output_alphabet
    }
}
