//! Ranked correction candidate.
use std::cmp::Ordering;
use std::cmp::Ordering::Equal;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::types::Weight;

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Suggestion for a spelling correction
pub struct Suggestion {
    /// the suggested word-form
    pub value: SmolStr,
    /// total weight of the best correction path, `-ln p`
    pub weight: Weight,
}

impl Suggestion {
    pub fn new(value: SmolStr, weight: Weight) -> Suggestion {
        Suggestion { value, weight }
    }

    /// gets the suggested word-form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// gets the penalty weight of the suggestion
    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// probability-like score, higher is better
    pub fn score(&self) -> f32 {
        self.weight.score()
    }
}

impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lightest first, ties broken alphabetically.
impl Ord for Suggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        let x = self.weight.partial_cmp(&other.weight).unwrap_or(Equal);

        if let Equal = x {
            return self.value.cmp(&other.value);
        }

        x
    }
}

impl PartialEq for Suggestion {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.weight == other.weight
    }
}

impl Eq for Suggestion {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_weight_then_value() {
        let mut s = vec![
            Suggestion::new("b".into(), Weight(1.0)),
            Suggestion::new("c".into(), Weight(0.5)),
            Suggestion::new("a".into(), Weight(1.0)),
        ];
        s.sort();

        let values: Vec<&str> = s.iter().map(Suggestion::value).collect();
        assert_eq!(values, vec!["c", "a", "b"]);
        assert!(s[0].score() > s[1].score());
    }

    #[test]
    fn serializes_value_and_weight() {
        let s = Suggestion::new("work".into(), Weight(1.5));
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"value":"work","weight":1.5}"#);
    }
}
