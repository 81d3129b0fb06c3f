use crate::types::{StateId, Symbol, Weight};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolTransition {
    target: StateId,
    symbol: Symbol,
    weight: Weight,
}

impl SymbolTransition {
    pub fn new(target: StateId, symbol: Symbol, weight: Weight) -> SymbolTransition {
        SymbolTransition {
            target,
            symbol,
            weight,
        }
    }

    #[inline(always)]
    pub fn target(&self) -> StateId {
        self.target
    }

    /// Output symbol of the arc.
    #[inline(always)]
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    #[inline(always)]
    pub fn weight(&self) -> Weight {
        self.weight
    }
}
