//! Epsilon-aware composition of a filter transducer with a weighted one.
//!
//! `compose(m1, m2)` feeds every output of `m1` into `m2`. The filter `m1`
//! must be epsilon-free and is treated as unweighted: composed arcs take
//! their weight from `m2`. An `ε:ε` self-loop is added at every filter state
//! so that `m2` can take its input-epsilon arcs while `m1` stays put.
use hashbrown::HashMap;

use super::{SymbolTransition, Transducer, TransducerError};
use crate::types::{StateId, Symbol, Weight};

/// Injective id for the composed state `(a, b)` (Cantor pairing).
///
/// Unlike concatenating decimal digits, distinct pairs such as `(1, 23)`
/// and `(12, 3)` never share an id.
pub fn pair_states(a: StateId, b: StateId) -> Result<StateId, TransducerError> {
    let overflow = || TransducerError::StateOverflow(a, b);

    let sum = a.0.checked_add(b.0).ok_or_else(overflow)?;
    let triangle = sum
        .checked_add(1)
        .and_then(|next| {
            // One of sum, sum + 1 is even.
            if sum % 2 == 0 {
                (sum / 2).checked_mul(next)
            } else {
                sum.checked_mul(next / 2)
            }
        })
        .ok_or_else(overflow)?;

    triangle.checked_add(b.0).map(StateId).ok_or_else(overflow)
}

struct ComposedArc {
    from: StateId,
    input: Symbol,
    to: StateId,
    output: Symbol,
    weight: Weight,
    accepting_from: bool,
    accepting_to: bool,
}

type Index<'a> = HashMap<Symbol, Vec<(StateId, &'a SymbolTransition)>>;

fn compose_arc(
    m1: &Transducer,
    m2: &Transducer,
    by_input: &Index<'_>,
    (s1, input, arc1): (StateId, Symbol, SymbolTransition),
) -> Result<Vec<ComposedArc>, TransducerError> {
    let matches = match by_input.get(&arc1.symbol()) {
        Some(matches) => matches,
        None => return Ok(vec![]),
    };

    matches
        .iter()
        .map(|(s2, arc2)| -> Result<ComposedArc, TransducerError> {
            Ok(ComposedArc {
                from: pair_states(s1, *s2)?,
                input,
                to: pair_states(arc1.target(), arc2.target())?,
                output: arc2.symbol(),
                weight: arc2.weight(),
                accepting_from: m1.is_accepting(s1) && m2.is_accepting(*s2),
                accepting_to: m1.is_accepting(arc1.target()) && m2.is_accepting(arc2.target()),
            })
        })
        .collect()
}

/// Composes `m1` with `m2`. See the module documentation.
pub fn compose(m1: &Transducer, m2: &Transducer) -> Result<Transducer, TransducerError> {
    let start1 = m1.start().ok_or(TransducerError::NoStartState)?;
    let start2 = m2.start().ok_or(TransducerError::NoStartState)?;

    if let Some((state, _, _)) = m1
        .arcs()
        .find(|(_, input, t)| input.is_epsilon() || t.symbol().is_epsilon())
    {
        return Err(TransducerError::EpsilonInFilter { state });
    }

    let mut filter_arcs: Vec<(StateId, Symbol, SymbolTransition)> =
        m1.arcs().map(|(from, input, t)| (from, input, *t)).collect();
    filter_arcs.extend(m1.states().map(|s| {
        (
            s,
            Symbol::Epsilon,
            SymbolTransition::new(s, Symbol::Epsilon, Weight::ZERO),
        )
    }));

    let mut by_input: Index<'_> = HashMap::new();
    for (from, input, t) in m2.arcs() {
        by_input.entry(input).or_default().push((from, t));
    }

    #[cfg(feature = "parallel")]
    let arcs: Vec<Vec<ComposedArc>> = {
        use rayon::prelude::*;
        filter_arcs
            .into_par_iter()
            .map(|arc| compose_arc(m1, m2, &by_input, arc))
            .collect::<Result<_, _>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let arcs: Vec<Vec<ComposedArc>> = filter_arcs
        .into_iter()
        .map(|arc| compose_arc(m1, m2, &by_input, arc))
        .collect::<Result<_, _>>()?;

    let mut composed = Transducer::new();
    let start = pair_states(start1, start2)?;
    composed.set_start(start);
    if m1.is_accepting(start1) && m2.is_accepting(start2) {
        composed.mark_accepting(start);
    }

    for arc in arcs.into_iter().flatten() {
        composed.add_transition(
            arc.from,
            arc.input,
            Some(arc.to),
            Some(arc.output),
            arc.weight,
            arc.accepting_to,
        );
        if arc.accepting_from {
            composed.mark_accepting(arc.from);
        }
    }

    log::debug!(
        "composed {}x{} states into {} states, {} transitions",
        m1.state_count(),
        m2.state_count(),
        composed.state_count(),
        composed.transition_count()
    );

    Ok(composed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Automaton;

    fn c(ch: char) -> Symbol {
        Symbol::Char(ch)
    }

    #[test]
    fn pairing_is_injective() {
        let mut seen = std::collections::HashSet::new();
        for a in 0..60 {
            for b in 0..60 {
                assert!(seen.insert(pair_states(StateId(a), StateId(b)).unwrap()));
            }
        }

        assert_ne!(
            pair_states(StateId(1), StateId(23)).unwrap(),
            pair_states(StateId(12), StateId(3)).unwrap()
        );
        assert_eq!(pair_states(StateId(0), StateId(0)).unwrap(), StateId(0));
        assert!(pair_states(StateId(u64::MAX), StateId(1)).is_err());
    }

    #[test]
    fn digit_concatenation_collisions_stay_distinct() {
        // m1 has states 1 and 12, m2 has states 23 and 3: naive "1"+"23" and
        // "12"+"3" would both be 123.
        let mut m1 = Transducer::new();
        m1.set_start(StateId(1));
        m1.add_transition(StateId(1), c('a'), Some(StateId(12)), None, Weight::ZERO, true);

        let mut m2 = Transducer::new();
        m2.set_start(StateId(23));
        m2.add_transition(StateId(23), c('a'), Some(StateId(3)), Some(c('b')), Weight(1.0), true);
        m2.add_transition(StateId(3), c('a'), Some(StateId(23)), Some(c('c')), Weight(2.0), false);

        let composed = compose(&m1, &m2).unwrap();
        let s_1_23 = pair_states(StateId(1), StateId(23)).unwrap();
        let s_12_3 = pair_states(StateId(12), StateId(3)).unwrap();
        let s_1_3 = pair_states(StateId(1), StateId(3)).unwrap();
        let s_12_23 = pair_states(StateId(12), StateId(23)).unwrap();

        assert_ne!(s_1_23, s_12_3);
        assert_eq!(composed.start(), Some(s_1_23));
        assert_eq!(
            composed.transitions_from(s_1_23, c('a')),
            &[SymbolTransition::new(s_12_3, c('b'), Weight(1.0))]
        );
        assert_eq!(
            composed.transitions_from(s_1_3, c('a')),
            &[SymbolTransition::new(s_12_23, c('c'), Weight(2.0))]
        );
        assert!(composed.is_accepting(s_12_3));
        assert!(!composed.is_accepting(s_12_23));
        assert!(!composed.is_accepting(s_1_23));
    }

    #[test]
    fn filter_with_epsilon_is_rejected() {
        let mut m1 = Transducer::new();
        m1.add_transition(StateId(0), Symbol::Epsilon, None, Some(c('a')), Weight::ZERO, true);
        let m2 = m1.clone();

        assert_eq!(
            compose(&m1, &m2).unwrap_err(),
            TransducerError::EpsilonInFilter { state: StateId(0) }
        );
    }

    #[test]
    fn epsilon_arcs_of_m2_pass_through_filter_self_loops() {
        let m1 = Transducer::from_automaton(&Automaton::from_words(&["ab"]));

        let mut m2 = Transducer::new();
        let q = StateId(0);
        m2.set_start(q);
        m2.mark_accepting(q);
        m2.add_transition(q, c('a'), Some(q), None, Weight(0.1), false);
        m2.add_transition(q, c('b'), Some(q), None, Weight(0.1), false);
        m2.add_transition(q, Symbol::Epsilon, Some(q), Some(c('x')), Weight(3.0), false);
        m2.add_transition(q, c('b'), Some(q), Some(Symbol::Epsilon), Weight(2.0), false);

        let composed = compose(&m1, &m2).unwrap();
        let start = composed.start().unwrap();

        // insertion of 'x' without moving in the lexicon
        assert_eq!(
            composed.transitions_from(start, Symbol::Epsilon),
            &[SymbolTransition::new(start, c('x'), Weight(3.0))]
        );

        // inverted, the insertion consumes 'x' and the deletion restores 'b'
        let corrector = composed.invert();

        let out: Vec<(String, f32)> = corrector
            .transduce("a")
            .map(|t| (t.output.to_string(), t.weight.0))
            .collect();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, "ab");
        assert!((out[0].1 - 2.1).abs() < 1e-5);

        let out: Vec<(String, f32)> = corrector
            .transduce("xab")
            .map(|t| (t.output.to_string(), t.weight.0))
            .collect();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, "ab");
        assert!((out[0].1 - 3.2).abs() < 1e-5);
    }
}
