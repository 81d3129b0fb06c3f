//! Iterative re-estimation of edit costs from (misspelling, correct) pairs.
//!
//! Every pass aligns the whole corpus with the costs learned in the
//! previous pass and counts the aligned symbol pairs into a fresh table.
//! Training stops at the first pass whose table equals its predecessor.
use serde::{Deserialize, Serialize};

use super::table::CostTable;
use super::{AlignError, EditCost, SmoothedCost, UniformCost, WeightedAligner};
use crate::types::Symbol;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPair {
    pub misspelling: String,
    pub correct: String,
}

impl TrainingPair {
    pub fn new<S: Into<String>, T: Into<String>>(misspelling: S, correct: T) -> TrainingPair {
        TrainingPair {
            misspelling: misspelling.into(),
            correct: correct.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Lidstone smoothing constant added to every count
    pub smoothing: f64,
    /// Re-estimation passes allowed before giving up on a fixed point
    pub max_iterations: usize,
}

impl EstimatorConfig {
    pub const fn default() -> EstimatorConfig {
        EstimatorConfig {
            smoothing: 1.0,
            max_iterations: 50,
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig::default()
    }
}

/// Result of a training run.
#[derive(Clone, Debug)]
pub struct Estimate {
    pub table: CostTable,
    /// Re-estimation passes driven by a learned table
    pub iterations: usize,
    /// `false` if the iteration cap was hit first; `table` is then the last pass
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct EditCostEstimator {
    pairs: Vec<(String, String)>,
    universe: Vec<Symbol>,
    config: EstimatorConfig,
}

impl EditCostEstimator {
    /// Lower-cases the pairs and collects their alphabet.
    pub fn new(pairs: &[TrainingPair], config: EstimatorConfig) -> EditCostEstimator {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|p| (p.misspelling.to_lowercase(), p.correct.to_lowercase()))
            .collect();

        let mut universe: Vec<Symbol> = pairs
            .iter()
            .flat_map(|(a, b)| a.chars().chain(b.chars()))
            .map(Symbol::Char)
            .collect();
        universe.push(Symbol::Epsilon);
        universe.sort();
        universe.dedup();

        EditCostEstimator {
            pairs,
            universe,
            config,
        }
    }

    /// Training alphabet, epsilon included.
    pub fn universe(&self) -> &[Symbol] {
        &self.universe
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// One pass: aligns every pair under `previous` (uniform cost if `None`)
    /// and counts the aligned pairs into a new table.
    pub fn count_edits(&self, previous: Option<&CostTable>) -> Result<CostTable, AlignError> {
        match previous {
            None => self.count_with(UniformCost),
            Some(table) => self.count_with(SmoothedCost::new(table, self.config.smoothing)),
        }
    }

    #[cfg(feature = "parallel")]
    fn count_with<C: EditCost + Sync>(&self, cost: C) -> Result<CostTable, AlignError> {
        use rayon::prelude::*;

        let aligner = WeightedAligner::new(cost);
        let empty = || CostTable::with_universe(self.universe.iter().copied());

        self.pairs
            .par_iter()
            .try_fold(empty, |mut table, (misspelling, correct)| {
                let alignment = aligner.align(misspelling, correct)?;
                table.add_alignment(&alignment);
                Ok(table)
            })
            .try_reduce(empty, |a, b| Ok(a.merge(b)))
    }

    #[cfg(not(feature = "parallel"))]
    fn count_with<C: EditCost>(&self, cost: C) -> Result<CostTable, AlignError> {
        let aligner = WeightedAligner::new(cost);
        let empty = CostTable::with_universe(self.universe.iter().copied());

        self.pairs
            .iter()
            .try_fold(empty, |mut table, (misspelling, correct)| {
                let alignment = aligner.align(misspelling, correct)?;
                table.add_alignment(&alignment);
                Ok(table)
            })
    }

    /// Re-estimates until two consecutive tables are equal or the
    /// iteration cap is reached.
    pub fn estimate(&self) -> Result<Estimate, AlignError> {
        let mut table = self.count_edits(None)?;
        let mut iterations = 0;

        log::debug!(
            "initial pass over {} pairs, alphabet of {} symbols",
            self.pairs.len(),
            self.universe.len()
        );

        loop {
            if iterations >= self.config.max_iterations {
                log::warn!(
                    "edit costs did not converge after {} iterations",
                    iterations
                );
                return Ok(Estimate {
                    table,
                    iterations,
                    converged: false,
                });
            }

            let next = self.count_edits(Some(&table))?;
            iterations += 1;

            if next == table {
                log::debug!("converged after {} iterations", iterations);
                return Ok(Estimate {
                    table: next,
                    iterations,
                    converged: true,
                });
            }

            log::debug!("iteration {}: table changed", iterations);
            table = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(ch: char) -> Symbol {
        Symbol::Char(ch)
    }

    #[test]
    fn identity_corpus_converges_in_one_iteration() {
        let pairs = vec![TrainingPair::new("cat", "cat"); 5];
        let estimate = EditCostEstimator::new(&pairs, EstimatorConfig::default())
            .estimate()
            .unwrap();

        assert!(estimate.converged);
        assert_eq!(estimate.iterations, 1);

        let table = &estimate.table;
        for source in table.symbols() {
            for target in table.symbols() {
                let n = table.count(source, target);
                if source == target && source != Symbol::Epsilon {
                    assert_eq!(n, 5);
                } else {
                    assert_eq!(n, 0, "{:?} -> {:?}", source, target);
                }
            }
        }
    }

    #[test]
    fn universe_is_lowercased_union_plus_epsilon() {
        let pairs = vec![TrainingPair::new("Wark", "work"), TrainingPair::new("ab", "b")];
        let estimator = EditCostEstimator::new(&pairs, EstimatorConfig::default());

        assert_eq!(
            estimator.universe(),
            &[
                Symbol::Epsilon,
                c('a'),
                c('b'),
                c('k'),
                c('o'),
                c('r'),
                c('w')
            ]
        );
    }

    #[test]
    fn learns_frequent_substitution() {
        let mut pairs = vec![TrainingPair::new("wark", "work"); 4];
        pairs.push(TrainingPair::new("walk", "walk"));
        pairs.push(TrainingPair::new("fark", "fork"));

        let estimate = EditCostEstimator::new(&pairs, EstimatorConfig::default())
            .estimate()
            .unwrap();
        assert!(estimate.converged);

        let table = &estimate.table;
        assert_eq!(table.count(c('a'), c('o')), 5);
        assert!(
            table.cost(c('a'), c('o'), 1.0).unwrap() < table.cost(c('a'), c('r'), 1.0).unwrap()
        );
    }

    fn per_pair_tables<C: EditCost>(
        estimator: &EditCostEstimator,
        pairs: &[TrainingPair],
        cost: C,
    ) -> Vec<CostTable> {
        let aligner = WeightedAligner::new(cost);
        pairs
            .iter()
            .map(|p| {
                let mut table = CostTable::with_universe(estimator.universe().iter().copied());
                let alignment = aligner
                    .align(&p.misspelling.to_lowercase(), &p.correct.to_lowercase())
                    .unwrap();
                table.add_alignment(&alignment);
                table
            })
            .collect()
    }

    fn fold_grouped(tables: Vec<CostTable>, split: usize, empty: CostTable) -> CostTable {
        let mut tables = tables;
        let right = tables.split_off(split);
        let left = tables.into_iter().fold(empty.clone(), CostTable::merge);
        let right = right.into_iter().rev().fold(empty, CostTable::merge);
        right.merge(left)
    }

    #[test]
    fn counting_does_not_depend_on_grouping() {
        let pairs = vec![
            TrainingPair::new("wark", "work"),
            TrainingPair::new("Fark", "fork"),
            TrainingPair::new("wrok", "work"),
            TrainingPair::new("forkss", "forks"),
            TrainingPair::new("wlk", "walk"),
        ];
        let estimator = EditCostEstimator::new(&pairs, EstimatorConfig::default());
        let empty = CostTable::with_universe(estimator.universe().iter().copied());

        let sequential = estimator.count_edits(None).unwrap();
        let tables = per_pair_tables(&estimator, &pairs, UniformCost);
        assert_eq!(fold_grouped(tables.clone(), 2, empty.clone()), sequential);
        assert_eq!(fold_grouped(tables, 4, empty.clone()), sequential);

        let learned = estimator.count_edits(Some(&sequential)).unwrap();
        let tables = per_pair_tables(&estimator, &pairs, SmoothedCost::new(&sequential, 1.0));
        assert_eq!(fold_grouped(tables.clone(), 1, empty.clone()), learned);
        assert_eq!(fold_grouped(tables, 3, empty), learned);
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let pairs = vec![TrainingPair::new("wrok", "work"), TrainingPair::new("ab", "ba")];
        let config = EstimatorConfig {
            smoothing: 1.0,
            max_iterations: 0,
        };
        let estimate = EditCostEstimator::new(&pairs, config).estimate().unwrap();

        assert!(!estimate.converged);
        assert_eq!(estimate.iterations, 0);
    }

    #[test]
    fn empty_corpus_converges() {
        let estimate = EditCostEstimator::new(&[], EstimatorConfig::default())
            .estimate()
            .unwrap();

        assert!(estimate.converged);
        assert_eq!(estimate.table.symbols().count(), 1);
    }
}
