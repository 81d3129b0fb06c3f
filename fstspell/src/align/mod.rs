//! Weighted edit-distance alignment.
//!
//! [`WeightedAligner`] finds a minimum-cost alignment between two strings
//! under a pluggable [`EditCost`]. With [`UniformCost`] this is plain
//! Levenshtein distance; with [`SmoothedCost`] every edit is charged
//! `1 - p`, where `p` is the Lidstone-smoothed probability of the edit in a
//! [`CostTable`]. Matches are never charged.

pub mod estimator;
pub mod table;

use crate::types::Symbol;

pub use self::estimator::{EditCostEstimator, Estimate, EstimatorConfig, TrainingPair};
pub use self::table::CostTable;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum AlignError {
    /// The cost table has no row for this source symbol
    #[error("Symbol {0:?} is not part of the cost table alphabet")]
    UnknownSymbol(Symbol),
}

/// Cost of rewriting `source` as `target`. Either side may be
/// [`Symbol::Epsilon`]: `(ε, b)` inserts `b`, `(a, ε)` deletes `a`.
pub trait EditCost {
    fn cost(&self, source: Symbol, target: Symbol) -> Result<f64, AlignError>;
}

/// Every edit costs 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformCost;

impl EditCost for UniformCost {
    #[inline(always)]
    fn cost(&self, _source: Symbol, _target: Symbol) -> Result<f64, AlignError> {
        Ok(1.0)
    }
}

/// Edit cost `1 - p(source -> target)` read off a learned [`CostTable`].
#[derive(Debug, Clone, Copy)]
pub struct SmoothedCost<'a> {
    table: &'a CostTable,
    smoothing: f64,
}

impl<'a> SmoothedCost<'a> {
    pub fn new(table: &'a CostTable, smoothing: f64) -> SmoothedCost<'a> {
        SmoothedCost { table, smoothing }
    }
}

impl<'a> EditCost for SmoothedCost<'a> {
    #[inline]
    fn cost(&self, source: Symbol, target: Symbol) -> Result<f64, AlignError> {
        self.table.cost(source, target, self.smoothing)
    }
}

impl<T: EditCost + ?Sized> EditCost for &T {
    #[inline(always)]
    fn cost(&self, source: Symbol, target: Symbol) -> Result<f64, AlignError> {
        (**self).cost(source, target)
    }
}

/// An ordered sequence of aligned `(source, target)` symbol pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment(Vec<(Symbol, Symbol)>);

impl Alignment {
    pub fn pairs(&self) -> &[(Symbol, Symbol)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The source string, rebuilt from the non-empty left symbols.
    pub fn source(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        self.0.iter().for_each(|(s, _)| s.push_to(&mut out));
        out
    }

    /// The target string, rebuilt from the non-empty right symbols.
    pub fn target(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        self.0.iter().for_each(|(_, t)| t.push_to(&mut out));
        out
    }

    /// Number of pairs that are not identity matches.
    pub fn edit_count(&self) -> usize {
        self.0.iter().filter(|(s, t)| s != t).count()
    }
}

impl IntoIterator for Alignment {
    type Item = (Symbol, Symbol);
    type IntoIter = std::vec::IntoIter<(Symbol, Symbol)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Alignment {
    type Item = &'a (Symbol, Symbol);
    type IntoIter = std::slice::Iter<'a, (Symbol, Symbol)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

struct DistanceTable {
    cells: Vec<f64>,
    width: usize,
}

impl DistanceTable {
    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.width + j]
    }

    #[inline(always)]
    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.cells[i * self.width + j] = value;
    }
}

/// Minimum-cost aligner over characters.
#[derive(Debug, Clone)]
pub struct WeightedAligner<C> {
    cost: C,
}

impl<C: EditCost> WeightedAligner<C> {
    pub fn new(cost: C) -> WeightedAligner<C> {
        WeightedAligner { cost }
    }

    /// Total cost of the cheapest alignment of `source` with `target`.
    pub fn distance(&self, source: &str, target: &str) -> Result<f64, AlignError> {
        let s1: Vec<char> = source.chars().collect();
        let s2: Vec<char> = target.chars().collect();
        let table = self.fill(&s1, &s2)?;
        Ok(table.get(s1.len(), s2.len()))
    }

    /// Cheapest alignment of `source` with `target`.
    ///
    /// When several alignments share the minimum cost, substitution is
    /// preferred over insertion, and insertion over deletion.
    ///
    /// An insertion of `target[j]` costs `cost(ε, target[j])` and a deletion
    /// of `source[i]` costs `cost(source[i], ε)`, so the DP charges exactly
    /// the pairs the traceback reports and later counts.
    pub fn align(&self, source: &str, target: &str) -> Result<Alignment, AlignError> {
        let s1: Vec<char> = source.chars().collect();
        let s2: Vec<char> = target.chars().collect();
        let table = self.fill(&s1, &s2)?;

        let (mut i, mut j) = (s1.len(), s2.len());
        let mut pairs = Vec::with_capacity(i.max(j));

        while i > 0 || j > 0 {
            if i == 0 {
                pairs.push((Symbol::Epsilon, Symbol::Char(s2[j - 1])));
                j -= 1;
                continue;
            }

            if j == 0 {
                pairs.push((Symbol::Char(s1[i - 1]), Symbol::Epsilon));
                i -= 1;
                continue;
            }

            let (a, b) = (Symbol::Char(s1[i - 1]), Symbol::Char(s2[j - 1]));
            let here = table.get(i, j);

            if a == b {
                pairs.push((a, b));
                i -= 1;
                j -= 1;
            } else if table.get(i - 1, j - 1) + self.cost.cost(a, b)? == here {
                pairs.push((a, b));
                i -= 1;
                j -= 1;
            } else if table.get(i, j - 1) + self.cost.cost(Symbol::Epsilon, b)? == here {
                pairs.push((Symbol::Epsilon, b));
                j -= 1;
            } else {
                pairs.push((a, Symbol::Epsilon));
                i -= 1;
            }
        }

        pairs.reverse();
        Ok(Alignment(pairs))
    }

    fn fill(&self, s1: &[char], s2: &[char]) -> Result<DistanceTable, AlignError> {
        let width = s2.len() + 1;
        let mut table = DistanceTable {
            cells: vec![0.0; (s1.len() + 1) * width],
            width,
        };

        // The border is unit cost even under a learned model.
        for i in 0..=s1.len() {
            table.set(i, 0, i as f64);
        }
        for j in 0..=s2.len() {
            table.set(0, j, j as f64);
        }

        for i in 1..=s1.len() {
            let a = Symbol::Char(s1[i - 1]);

            for j in 1..=s2.len() {
                let b = Symbol::Char(s2[j - 1]);

                if a == b {
                    table.set(i, j, table.get(i - 1, j - 1));
                    continue;
                }

                let substitution = table.get(i - 1, j - 1) + self.cost.cost(a, b)?;
                let insertion = table.get(i, j - 1) + self.cost.cost(Symbol::Epsilon, b)?;
                let deletion = table.get(i - 1, j) + self.cost.cost(a, Symbol::Epsilon)?;

                let mut best = substitution;
                if insertion < best {
                    best = insertion;
                }
                if deletion < best {
                    best = deletion;
                }

                table.set(i, j, best);
            }
        }

        Ok(table)
    }
}

impl Default for WeightedAligner<UniformCost> {
    fn default() -> Self {
        WeightedAligner::new(UniformCost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(ch: char) -> Symbol {
        Symbol::Char(ch)
    }

    #[test]
    fn levenshtein_known_pairs() {
        let aligner = WeightedAligner::default();

        assert_eq!(aligner.distance("kitten", "sitting").unwrap(), 3.0);
        assert_eq!(aligner.distance("flaw", "lawn").unwrap(), 2.0);
        assert_eq!(aligner.distance("", "abc").unwrap(), 3.0);
        assert_eq!(aligner.distance("abc", "").unwrap(), 3.0);
        assert_eq!(aligner.distance("same", "same").unwrap(), 0.0);
    }

    #[test]
    fn prefers_substitution_on_ties() {
        let aligner = WeightedAligner::default();
        let alignment = aligner.align("wark", "work").unwrap();

        assert_eq!(
            alignment.pairs(),
            &[(c('w'), c('w')), (c('a'), c('o')), (c('r'), c('r')), (c('k'), c('k'))]
        );
        assert_eq!(alignment.edit_count(), 1);
    }

    #[test]
    fn transposition_is_two_edits() {
        let aligner = WeightedAligner::default();
        let alignment = aligner.align("wrok", "work").unwrap();

        assert_eq!(alignment.source(), "wrok");
        assert_eq!(alignment.target(), "work");
        assert_eq!(alignment.edit_count(), 2);
    }

    #[test]
    fn insertions_and_deletions_at_borders() {
        let aligner = WeightedAligner::default();

        let alignment = aligner.align("", "ab").unwrap();
        assert_eq!(
            alignment.pairs(),
            &[(Symbol::Epsilon, c('a')), (Symbol::Epsilon, c('b'))]
        );

        let alignment = aligner.align("ab", "").unwrap();
        assert_eq!(
            alignment.pairs(),
            &[(c('a'), Symbol::Epsilon), (c('b'), Symbol::Epsilon)]
        );

        assert!(aligner.align("", "").unwrap().is_empty());
    }

    #[test]
    fn learned_costs_steer_alignment() {
        let mut table = CostTable::with_universe("abx".chars().map(Symbol::Char));
        for _ in 0..50 {
            table.increment(c('x'), Symbol::Epsilon);
        }

        // Deleting 'x' is now nearly free, substituting it is not.
        let aligner = WeightedAligner::new(SmoothedCost::new(&table, 1.0));
        let alignment = aligner.align("axb", "ab").unwrap();

        assert_eq!(
            alignment.pairs(),
            &[(c('a'), c('a')), (c('x'), Symbol::Epsilon), (c('b'), c('b'))]
        );
        assert!(aligner.distance("axb", "ab").unwrap() < 0.1);
    }

    #[test]
    fn unknown_symbol_fails() {
        let table = CostTable::with_universe("ab".chars().map(Symbol::Char));
        let aligner = WeightedAligner::new(SmoothedCost::new(&table, 1.0));

        assert_eq!(
            aligner.align("zb", "ab"),
            Err(AlignError::UnknownSymbol(c('z')))
        );
    }

    proptest! {
        #[test]
        fn alignment_rebuilds_both_strings(s1 in "[a-e]{0,8}", s2 in "[a-e]{0,8}") {
            let alignment = WeightedAligner::default().align(&s1, &s2).unwrap();
            prop_assert_eq!(alignment.source(), s1);
            prop_assert_eq!(alignment.target(), s2);
        }

        #[test]
        fn uniform_distance_is_levenshtein(s1 in "[a-d]{0,8}", s2 in "[a-d]{0,8}") {
            let distance = WeightedAligner::default().distance(&s1, &s2).unwrap();
            prop_assert_eq!(distance as usize, strsim::levenshtein(&s1, &s2));
        }
    }
}
