//! Character-pair edit counts and the smoothed costs derived from them.
use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::{AlignError, Alignment};
use crate::io::ReadError;
use crate::types::{Symbol, Weight};

/// Counts of aligned `(source, target)` symbol pairs.
///
/// Rows are keyed by the source symbol, columns by the target symbol;
/// [`Symbol::Epsilon`] stands for the empty side of an insertion or a
/// deletion. Serializes as nested JSON objects with `""` for epsilon.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostTable {
    counts: BTreeMap<Symbol, BTreeMap<Symbol, u64>>,
}

impl CostTable {
    /// A zeroed table over `symbols` and epsilon, every row holding every column.
    pub fn with_universe<I>(symbols: I) -> CostTable
    where
        I: IntoIterator<Item = Symbol>,
    {
        let mut universe: Vec<Symbol> = symbols.into_iter().collect();
        universe.push(Symbol::Epsilon);
        universe.sort();
        universe.dedup();

        let row: BTreeMap<Symbol, u64> = universe.iter().map(|s| (*s, 0)).collect();
        let counts = universe.iter().map(|s| (*s, row.clone())).collect();

        CostTable { counts }
    }

    /// Row symbols of the table, epsilon included.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.counts.keys().copied()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.counts.contains_key(&symbol)
    }

    pub fn count(&self, source: Symbol, target: Symbol) -> u64 {
        self.counts
            .get(&source)
            .and_then(|row| row.get(&target))
            .copied()
            .unwrap_or(0)
    }

    pub fn row_total(&self, source: Symbol) -> Option<u64> {
        self.counts.get(&source).map(|row| row.values().sum())
    }

    #[inline]
    pub fn increment(&mut self, source: Symbol, target: Symbol) {
        *self
            .counts
            .entry(source)
            .or_default()
            .entry(target)
            .or_insert(0) += 1;
    }

    pub fn add_alignment(&mut self, alignment: &Alignment) {
        for &(source, target) in alignment {
            self.increment(source, target);
        }
    }

    /// Sums the counts of `other` into `self`.
    pub fn merge(mut self, other: CostTable) -> CostTable {
        for (source, row) in other.counts {
            let into = self.counts.entry(source).or_default();
            for (target, n) in row {
                *into.entry(target).or_insert(0) += n;
            }
        }
        self
    }

    /// Lidstone-smoothed probability of `source -> target`:
    /// `(count + α) / (row total + α · |row|)`.
    pub fn probability(
        &self,
        source: Symbol,
        target: Symbol,
        smoothing: f64,
    ) -> Result<f64, AlignError> {
        let row = self
            .counts
            .get(&source)
            .ok_or(AlignError::UnknownSymbol(source))?;

        let total: u64 = row.values().sum();
        let count = row.get(&target).copied().unwrap_or(0);
        let denominator = total as f64 + smoothing * row.len() as f64;

        if denominator <= 0.0 {
            return Ok(0.0);
        }

        Ok((count as f64 + smoothing) / denominator)
    }

    /// Aligner cost, `1 - p`.
    #[inline]
    pub fn cost(&self, source: Symbol, target: Symbol, smoothing: f64) -> Result<f64, AlignError> {
        self.probability(source, target, smoothing).map(|p| 1.0 - p)
    }

    /// Transducer arc weight, `-ln p`.
    #[inline]
    pub fn weight(
        &self,
        source: Symbol,
        target: Symbol,
        smoothing: f64,
    ) -> Result<Weight, AlignError> {
        self.probability(source, target, smoothing)
            .map(Weight::from_probability)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), ReadError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<CostTable, ReadError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(ch: char) -> Symbol {
        Symbol::Char(ch)
    }

    #[test]
    fn universe_is_square() {
        let table = CostTable::with_universe("ba".chars().map(Symbol::Char));
        let symbols: Vec<Symbol> = table.symbols().collect();

        assert_eq!(symbols, vec![Symbol::Epsilon, c('a'), c('b')]);
        assert_eq!(table.row_total(c('a')), Some(0));
        assert_eq!(table.row_total(c('z')), None);
    }

    #[test]
    fn smoothed_rows_sum_to_one() {
        let mut table = CostTable::with_universe("abc".chars().map(Symbol::Char));
        table.increment(c('a'), c('a'));
        table.increment(c('a'), c('a'));
        table.increment(c('a'), c('b'));
        table.increment(c('a'), Symbol::Epsilon);

        for smoothing in [1.0, 0.05] {
            let sum: f64 = table
                .symbols()
                .map(|t| table.probability(c('a'), t, smoothing).unwrap())
                .sum();
            assert!((sum - 1.0).abs() < 1e-9);
            assert!(table.probability(c('a'), c('c'), smoothing).unwrap() > 0.0);
        }

        // (2 + 1) / (4 + 4)
        assert!((table.probability(c('a'), c('a'), 1.0).unwrap() - 0.375).abs() < 1e-12);
        assert!((table.cost(c('a'), c('a'), 1.0).unwrap() - 0.625).abs() < 1e-12);
    }

    #[test]
    fn merge_sums_counts() {
        let mut left = CostTable::with_universe("ab".chars().map(Symbol::Char));
        let mut right = left.clone();
        left.increment(c('a'), c('b'));
        right.increment(c('a'), c('b'));
        right.increment(Symbol::Epsilon, c('a'));

        let merged = left.merge(right);
        assert_eq!(merged.count(c('a'), c('b')), 2);
        assert_eq!(merged.count(Symbol::Epsilon, c('a')), 1);
    }

    #[test]
    fn json_uses_empty_string_for_epsilon() {
        let mut table = CostTable::with_universe(std::iter::once(c('a')));
        table.increment(c('a'), Symbol::Epsilon);

        let mut buf = Vec::new();
        table.to_writer(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["a"][""], 1);
        assert_eq!(value[""]["a"], 0);
        assert_eq!(CostTable::from_reader(&buf[..]).unwrap(), table);
    }
}
