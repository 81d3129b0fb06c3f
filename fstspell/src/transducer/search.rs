//! Lazy weighted transduction.
//!
//! The agenda is explored lightest-first, so results come out in
//! non-decreasing weight order. Epsilon-input arcs are followed without
//! consuming input, and a `(output, state, input position)` triple is
//! expanded at most once, which bounds the search even on epsilon loops
//! that do not grow the output.
use std::collections::BinaryHeap;

use hashbrown::HashSet;
use smol_str::SmolStr;

use super::tree_node::TreeNode;
use super::Transducer;
use crate::types::{StateId, Symbol, Weight};

/// One accepted path: its output string and total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Transduction {
    pub output: SmolStr,
    pub weight: Weight,
}

impl Transduction {
    /// Probability-like score, `exp(-weight)`.
    #[inline]
    pub fn score(&self) -> f32 {
        self.weight.score()
    }
}

pub struct Transductions<'t> {
    transducer: &'t Transducer,
    input: Vec<char>,
    original: String,
    agenda: BinaryHeap<TreeNode>,
    seen: HashSet<(String, StateId, usize)>,
    max_weight: Option<Weight>,
}

impl<'t> Transductions<'t> {
    fn new(transducer: &'t Transducer, input: &str) -> Transductions<'t> {
        let mut agenda = BinaryHeap::new();
        if let Some(start) = transducer.start() {
            agenda.push(TreeNode::empty(start));
        }

        Transductions {
            transducer,
            input: input.chars().collect(),
            original: input.to_string(),
            agenda,
            seen: HashSet::new(),
            max_weight: None,
        }
    }

    /// Drops partial paths heavier than `max_weight`.
    pub fn with_max_weight(mut self, max_weight: Option<Weight>) -> Self {
        self.max_weight = max_weight;
        self
    }

    #[inline(always)]
    fn is_under_weight_limit(&self, w: Weight) -> bool {
        match self.max_weight {
            Some(max) => w <= max,
            None => true,
        }
    }

    fn push(&mut self, node: TreeNode) {
        if self.is_under_weight_limit(node.weight()) {
            self.agenda.push(node);
        }
    }

    fn expand(&mut self, node: &TreeNode) {
        let fst = self.transducer;

        if let Some(&ch) = self.input.get(node.input_state) {
            for transition in fst.transitions_from(node.state, Symbol::Char(ch)) {
                self.push(node.update(transition, 1));
            }
        }

        for transition in fst.transitions_from(node.state, Symbol::Epsilon) {
            self.push(node.update(transition, 0));
        }
    }
}

impl<'t> Iterator for Transductions<'t> {
    type Item = Transduction;

    fn next(&mut self) -> Option<Transduction> {
        while let Some(node) = self.agenda.pop() {
            if !self.seen.insert(node.key()) {
                continue;
            }

            self.expand(&node);

            if node.input_state == self.input.len()
                && self.transducer.is_accepting(node.state)
                && node.string != self.original
            {
                return Some(Transduction {
                    output: SmolStr::from(node.string),
                    weight: node.weight,
                });
            }
        }

        None
    }
}

impl Transducer {
    /// All outputs of accepting paths that consume exactly `input`, lightest
    /// first. An output equal to `input` itself is never produced.
    pub fn transduce<'t>(&'t self, input: &str) -> Transductions<'t> {
        log::trace!("transducing {:?}", input);
        Transductions::new(self, input)
    }
}
