//! Single-state error model built from a trained [`CostTable`].
//!
//! For every lexicon symbol `c` and typed symbol `m` of the table's
//! universe (epsilon included on either side, but never both) there is a
//! loop `c:m` on state 0 weighted `-ln p(m -> c)`. Composed after a lexicon
//! it produces every misspelling of every word; inverted, it maps a typed
//! string back to lexicon words.
use crate::align::{AlignError, CostTable};
use crate::transducer::Transducer;
use crate::types::{StateId, Symbol};

pub fn error_model(table: &CostTable, smoothing: f64) -> Result<Transducer, AlignError> {
    let mut fst = Transducer::new();
    let state = StateId::ZERO;
    fst.set_start(state);
    fst.mark_accepting(state);

    let symbols: Vec<Symbol> = table.symbols().collect();

    for &typed in &symbols {
        for &intended in &symbols {
            if typed.is_epsilon() && intended.is_epsilon() {
                continue;
            }

            let weight = table.weight(typed, intended, smoothing)?;
            fst.add_transition(state, intended, Some(state), Some(typed), weight, false);
        }
    }

    log::debug!(
        "error model: {} symbols, {} transitions",
        symbols.len(),
        fst.transition_count()
    );

    Ok(fst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Weight;

    fn c(ch: char) -> Symbol {
        Symbol::Char(ch)
    }

    #[test]
    fn one_loop_per_symbol_pair_without_epsilon_epsilon() {
        let table = CostTable::with_universe(vec![c('a'), c('o')]);
        let fst = error_model(&table, 1.0).unwrap();

        assert_eq!(fst.state_count(), 1);
        assert_eq!(fst.transition_count(), 3 * 3 - 1);
        assert!(fst.is_accepting(StateId::ZERO));
        assert!(fst
            .transitions_from(StateId::ZERO, Symbol::Epsilon)
            .iter()
            .all(|t| !t.symbol().is_epsilon()));
    }

    #[test]
    fn weights_follow_typed_to_intended_probabilities() {
        let mut table = CostTable::with_universe(vec![c('a'), c('o')]);
        for _ in 0..7 {
            table.increment(c('a'), c('o'));
        }
        table.increment(c('a'), c('a'));

        let fst = error_model(&table, 1.0).unwrap();

        // row 'a' = [ε:0, a:1, o:7], α = 1 → p(a→o) = 8/11, p(a→a) = 2/11
        let from_o = fst.transitions_from(StateId::ZERO, c('o'));
        let typed_a = from_o.iter().find(|t| t.symbol() == c('a')).unwrap();
        assert!((typed_a.weight().0 - Weight::from_probability(8.0 / 11.0).0).abs() < 1e-6);

        let from_a = fst.transitions_from(StateId::ZERO, c('a'));
        let typed_a = from_a.iter().find(|t| t.symbol() == c('a')).unwrap();
        assert!(typed_a.weight().0 > fst_weight(&fst, c('o'), c('a')));
    }

    fn fst_weight(fst: &Transducer, intended: Symbol, typed: Symbol) -> f32 {
        fst.transitions_from(StateId::ZERO, intended)
            .iter()
            .find(|t| t.symbol() == typed)
            .map(|t| t.weight().0)
            .unwrap()
    }
}
