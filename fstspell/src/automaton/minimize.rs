//! Minimization by partition refinement.
//!
//! States start in two blocks, accepting and non-accepting. Each pass splits
//! every block by the signature of its states: the `(symbol, block of target)`
//! pairs of their outgoing transitions under the current partition. When a
//! pass splits nothing the blocks are the Myhill-Nerode classes.
use std::collections::{BTreeMap, VecDeque};

use hashbrown::HashMap;
use itertools::Itertools;

use super::{Automaton, AutomatonError};
use crate::types::StateId;

type Signature = Vec<(char, usize)>;

fn block_index(blocks: &[Vec<StateId>]) -> HashMap<StateId, usize> {
    blocks
        .iter()
        .enumerate()
        .flat_map(|(i, block)| block.iter().map(move |s| (*s, i)))
        .collect()
}

impl Automaton {
    fn signature(&self, state: StateId, block_of: &HashMap<StateId, usize>) -> Signature {
        self.transitions_from(state)
            .flat_map(|(sym, targets)| targets.iter().map(move |t| (sym, block_of[t])))
            .sorted()
            .collect()
    }

    fn equivalence_classes(&self) -> Vec<Vec<StateId>> {
        let (accepting, rest): (Vec<StateId>, Vec<StateId>) =
            self.states().partition(|s| self.is_accepting(*s));

        let mut blocks: Vec<Vec<StateId>> = vec![rest, accepting];
        blocks.retain(|b| !b.is_empty());

        let mut passes = 0usize;
        loop {
            passes += 1;
            let block_of = block_index(&blocks);
            let mut refined = Vec::with_capacity(blocks.len());

            for block in blocks.iter() {
                let mut groups: BTreeMap<Signature, Vec<StateId>> = BTreeMap::new();
                for &state in block {
                    groups
                        .entry(self.signature(state, &block_of))
                        .or_default()
                        .push(state);
                }
                refined.extend(groups.into_values());
            }

            // A pass can only split blocks, so an unchanged count is a fixed point.
            let stable = refined.len() == blocks.len();
            blocks = refined;
            if stable {
                break;
            }
        }

        log::trace!("partition stable after {} passes", passes);
        blocks
    }

    /// Collapses equivalent states in place.
    ///
    /// The result accepts the same language with the fewest states; states
    /// are renumbered breadth-first from the start state, which becomes 0.
    /// Minimizing a minimal automaton changes nothing.
    pub fn minimize(&mut self) -> Result<(), AutomatonError> {
        let start = self.start.ok_or(AutomatonError::NoStartState)?;
        if !self.deterministic {
            return Err(AutomatonError::NotDeterministic);
        }

        let before = self.state_count();
        let blocks = self.equivalence_classes();
        let block_of = block_index(&blocks);

        let mut minimized = Automaton::new();
        let mut renumbered: HashMap<usize, StateId> = HashMap::new();
        let mut queue = VecDeque::new();

        let start_block = block_of[&start];
        renumbered.insert(start_block, StateId::ZERO);
        minimized.set_start(StateId::ZERO);
        queue.push_back(start_block);

        while let Some(block) = queue.pop_front() {
            let from = renumbered[&block];
            let representative = blocks[block][0];

            if self.is_accepting(representative) {
                minimized.mark_accepting(from);
            }

            for (sym, targets) in self.transitions_from(representative) {
                for target in targets {
                    let target_block = block_of[target];
                    let to = match renumbered.get(&target_block) {
                        Some(id) => *id,
                        None => {
                            let id = StateId(renumbered.len() as u64);
                            renumbered.insert(target_block, id);
                            queue.push_back(target_block);
                            id
                        }
                    };
                    minimized.add_transition(from, sym, Some(to), false);
                }
            }
        }

        log::debug!(
            "minimized: {} -> {} states",
            before,
            minimized.state_count()
        );

        *self = minimized;
        Ok(())
    }
}
