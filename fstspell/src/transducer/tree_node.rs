use std::cmp::Ordering;

use super::SymbolTransition;
use crate::types::{StateId, Weight};

/// One partial path on the transduction agenda.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub state: StateId,
    pub input_state: usize,
    pub weight: Weight,
    pub string: String,
}

impl TreeNode {
    #[inline(always)]
    pub fn empty(start: StateId) -> TreeNode {
        TreeNode {
            state: start,
            input_state: 0,
            weight: Weight::ZERO,
            string: String::new(),
        }
    }

    #[inline(always)]
    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// Follows `transition`, advancing the input by `input_increment`.
    #[inline(always)]
    pub fn update(&self, transition: &SymbolTransition, input_increment: usize) -> TreeNode {
        let mut string = String::with_capacity(self.string.len() + 4);
        string.push_str(&self.string);
        transition.symbol().push_to(&mut string);

        TreeNode {
            state: transition.target(),
            input_state: self.input_state + input_increment,
            weight: self.weight + transition.weight(),
            string,
        }
    }

    #[inline(always)]
    pub fn key(&self) -> (String, StateId, usize) {
        (self.string.clone(), self.state, self.input_state)
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &TreeNode) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TreeNode {}

/// Reversed on weight so that a `BinaryHeap` pops the lightest node first.
impl Ord for TreeNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .0
            .total_cmp(&self.weight.0)
            .then_with(|| other.string.cmp(&self.string))
            .then_with(|| other.input_state.cmp(&self.input_state))
            .then_with(|| other.state.cmp(&self.state))
    }
}

impl PartialOrd for TreeNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol;
    use std::collections::BinaryHeap;

    #[test]
    fn heap_pops_lightest_first() {
        let root = TreeNode::empty(StateId(0));
        let heavy = root.update(
            &SymbolTransition::new(StateId(1), Symbol::Char('a'), Weight(2.0)),
            1,
        );
        let light = root.update(
            &SymbolTransition::new(StateId(2), Symbol::Epsilon, Weight(0.5)),
            0,
        );

        assert_eq!(heavy.string, "a");
        assert_eq!(light.string, "");
        assert_eq!(light.input_state, 0);

        let mut heap: BinaryHeap<TreeNode> = vec![heavy, root, light].into_iter().collect();
        assert_eq!(heap.pop().unwrap().weight(), Weight::ZERO);
        assert_eq!(heap.pop().unwrap().weight(), Weight(0.5));
        assert_eq!(heap.pop().unwrap().weight(), Weight(2.0));
    }
}
