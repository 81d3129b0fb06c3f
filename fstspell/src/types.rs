use std::{
    fmt::Display,
    ops::{Add, AddAssign},
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a state in an [`Automaton`](crate::automaton::Automaton) or
/// [`Transducer`](crate::transducer::Transducer).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
#[serde(transparent)]
pub struct StateId(pub u64);

impl StateId {
    pub const ZERO: Self = StateId(0);

    #[inline(always)]
    pub(crate) fn incr(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StateId {
    fn from(value: u64) -> Self {
        StateId(value)
    }
}

/// Additive path weight. Arcs carry `-ln p`, so lower is more probable.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Weight(pub f32);

impl Weight {
    pub const ZERO: Self = Weight(0.0);
    pub const MAX: Self = Weight(f32::MAX);
    pub const INFINITE: Self = Weight(f32::INFINITY);

    /// Weight of an event with probability `p`.
    #[inline]
    pub fn from_probability(p: f64) -> Self {
        Weight(-(p.ln()) as f32)
    }

    /// Probability-like score of a path with this weight, `exp(-w)`.
    #[inline]
    pub fn score(&self) -> f32 {
        (-self.0).exp()
    }
}

impl Default for Weight {
    fn default() -> Self {
        Weight::ZERO
    }
}

impl Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Weight {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Weight(self.0 + rhs.0)
    }
}

impl AddAssign for Weight {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// A transition label: a single character or the empty symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Epsilon,
    Char(char),
}

impl Symbol {
    #[inline(always)]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    #[inline(always)]
    pub fn as_char(&self) -> Option<char> {
        match self {
            Symbol::Epsilon => None,
            Symbol::Char(c) => Some(*c),
        }
    }

    /// Appends the symbol to `buf`; epsilon appends nothing.
    #[inline(always)]
    pub fn push_to(&self, buf: &mut String) {
        if let Symbol::Char(c) = self {
            buf.push(*c);
        }
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol::Char(c)
    }
}

impl From<Option<char>> for Symbol {
    fn from(c: Option<char>) -> Self {
        c.map(Symbol::Char).unwrap_or(Symbol::Epsilon)
    }
}

impl std::str::FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(Symbol::Epsilon),
            (Some(c), None) => Ok(Symbol::Char(c)),
            _ => Err(format!("symbol must be empty or a single character, got {:?}", s)),
        }
    }
}

/// Epsilon displays as the empty string, matching the persisted form.
impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Epsilon => Ok(()),
            Symbol::Char(c) => write!(f, "{}", c),
        }
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Symbol::Epsilon => serializer.serialize_str(""),
            Symbol::Char(c) => serializer.serialize_str(c.encode_utf8(&mut [0u8; 4])),
        }
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_from_str() {
        assert_eq!("".parse::<Symbol>(), Ok(Symbol::Epsilon));
        assert_eq!("ä".parse::<Symbol>(), Ok(Symbol::Char('ä')));
        assert!("ab".parse::<Symbol>().is_err());
    }

    #[test]
    fn weight_score() {
        assert_eq!(Weight::ZERO.score(), 1.0);
        let w = Weight::from_probability(0.5);
        assert!((w.score() - 0.5).abs() < 1e-6);
        assert!(Weight(1.0) + Weight(2.0) == Weight(3.0));
    }
}
