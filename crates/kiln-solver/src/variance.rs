//! Variance of a position in a type.
//!
//! Generic parameters carry a *declared* variance; unification and subtyping
//! carry an *ambient* variance describing the position currently being walked:
//!
//! - **Covariant**: `List[Derived]` <: `List[Base]` if `Derived` <: `Base`
//! - **Contravariant**: `Sink[Base]` <: `Sink[Derived]` if `Derived` <: `Base`
//! - **Invariant**: `Cell[Derived]` <: `Cell[Base]` only if `Derived == Base`

use serde::Serialize;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

impl Variance {
    /// Swap covariant and contravariant; invariant is unchanged.
    ///
    /// Used when descending into function parameters.
    pub fn flip(self) -> Self {
        match self {
            Variance::Invariant => Variance::Invariant,
            Variance::Covariant => Variance::Contravariant,
            Variance::Contravariant => Variance::Covariant,
        }
    }

    /// Variance of a type argument whose parameter is declared `declared`,
    /// walked in an `ambient` position.
    ///
    /// A declared-invariant parameter stays invariant. Otherwise an invariant
    /// ambient defers to the declaration, and a variant ambient is kept
    /// (covariant parameter) or flipped (contravariant parameter).
    pub fn compose(declared: Variance, ambient: Variance) -> Self {
        match (declared, ambient) {
            (Variance::Invariant, _) => Variance::Invariant,
            (declared, Variance::Invariant) => declared,
            (Variance::Covariant, ambient) => ambient,
            (Variance::Contravariant, ambient) => ambient.flip(),
        }
    }

    pub fn is_invariant(self) -> bool {
        self == Variance::Invariant
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variance::Invariant => "invariant",
            Variance::Covariant => "covariant",
            Variance::Contravariant => "contravariant",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_swaps_variant_positions() {
        assert_eq!(Variance::Covariant.flip(), Variance::Contravariant);
        assert_eq!(Variance::Contravariant.flip(), Variance::Covariant);
        assert_eq!(Variance::Invariant.flip(), Variance::Invariant);
    }

    #[test]
    fn compose_table() {
        use Variance::*;
        assert_eq!(Variance::compose(Invariant, Covariant), Invariant);
        assert_eq!(Variance::compose(Invariant, Contravariant), Invariant);
        assert_eq!(Variance::compose(Covariant, Invariant), Covariant);
        assert_eq!(Variance::compose(Covariant, Covariant), Covariant);
        assert_eq!(Variance::compose(Covariant, Contravariant), Contravariant);
        assert_eq!(Variance::compose(Contravariant, Invariant), Contravariant);
        assert_eq!(Variance::compose(Contravariant, Covariant), Contravariant);
        assert_eq!(Variance::compose(Contravariant, Contravariant), Covariant);
    }
}
