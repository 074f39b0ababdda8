//! Implicit conversion ranking.
//!
//! Overload resolution prefers the candidate whose parameters accept the
//! arguments with the best conversions. `rank_conversion(from, to)` answers
//! how good the implicit conversion from a value of type `from` to a slot of
//! type `to` is, or `None` when one side is not resolved yet.

use crate::binding::BindingLookup;
use crate::db::TypeDatabase;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::relation::RelationChecker;
use crate::types::{IntrinsicKind, TypeData, TypeFlags, TypeId};
use std::fmt;
use tracing::{trace, warn};

/// Quality of an implicit conversion, worst first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConversionRank {
    /// No implicit conversion exists.
    Incompatible,
    /// Integer narrowing, or float to integer.
    Truncation,
    /// Changes signedness at the same or a smaller width.
    SignedUnsigned,
    /// Float narrowing, or an integer too wide for the float's mantissa.
    PrecisionLoss,
    /// Allowed but not preferred (boxing to `any`, char to integer).
    NonPreferred,
    /// Value-preserving: widening, upcast, `null` to a reference.
    ExactConversion,
    /// The two types are the same.
    IdenticalTypes,
}

impl ConversionRank {
    #[inline]
    pub fn is_compatible(self) -> bool {
        self != Self::Incompatible
    }

    /// Whether the conversion preserves every value.
    #[inline]
    pub fn is_exact(self) -> bool {
        self >= Self::ExactConversion
    }
}

impl fmt::Display for ConversionRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionRank::Incompatible => "incompatible",
            ConversionRank::Truncation => "truncation",
            ConversionRank::SignedUnsigned => "signed/unsigned",
            ConversionRank::PrecisionLoss => "precision loss",
            ConversionRank::NonPreferred => "non-preferred",
            ConversionRank::ExactConversion => "exact",
            ConversionRank::IdenticalTypes => "identical",
        };
        f.write_str(name)
    }
}

/// Mantissa width, i.e. the widest integer a float holds exactly.
fn mantissa_bits(kind: IntrinsicKind) -> u32 {
    match kind {
        IntrinsicKind::Float32 => 24,
        _ => 53,
    }
}

/// Rank a conversion between two primitive kinds.
fn rank_primitive(from: IntrinsicKind, to: IntrinsicKind) -> ConversionRank {
    use ConversionRank::*;

    if from == to {
        return IdenticalTypes;
    }
    let (Some(from_bits), Some(to_bits)) = (from.bits(), to.bits()) else {
        return Incompatible;
    };

    if from.is_integer() && to.is_integer() {
        let from_signed = from.is_signed_integer();
        let to_signed = to.is_signed_integer();
        return if from_signed == to_signed {
            if to_bits >= from_bits { ExactConversion } else { Truncation }
        } else if !from_signed && to_bits > from_bits {
            // uint8 -> int16 keeps every value.
            ExactConversion
        } else if to_bits >= from_bits {
            SignedUnsigned
        } else {
            Truncation
        };
    }
    if from.is_integer() && to.is_float() {
        return if from_bits <= mantissa_bits(to) { ExactConversion } else { PrecisionLoss };
    }
    if from.is_float() && to.is_float() {
        return if to_bits > from_bits { ExactConversion } else { PrecisionLoss };
    }
    if from.is_float() && to.is_integer() {
        return Truncation;
    }
    match (from, to) {
        (IntrinsicKind::Char, to) if to.is_integer() => {
            if to_bits >= 32 { NonPreferred } else { Truncation }
        }
        (from, IntrinsicKind::Char) if from.is_integer() => Truncation,
        _ => Incompatible,
    }
}

/// Flags that leave a conversion undecidable.
const UNDECIDED: TypeFlags = TypeFlags::CONTAINS_PATTERN_VALUE
    .union(TypeFlags::CONTAINS_DEFERRED)
    .union(TypeFlags::CONTAINS_UNKNOWN);

struct ConversionRanker<'a> {
    db: &'a dyn TypeDatabase,
    bindings: &'a dyn BindingLookup,
    depth: DepthCounter,
}

impl<'a> ConversionRanker<'a> {
    fn new(db: &'a dyn TypeDatabase, bindings: &'a dyn BindingLookup) -> Self {
        Self {
            db,
            bindings,
            depth: DepthCounter::with_profile(RecursionProfile::Relation),
        }
    }

    fn resolve(&self, ty: TypeId) -> Option<TypeId> {
        match self.db.lookup(ty) {
            Some(TypeData::PatternValue { env, var }) => {
                self.bindings.resolve_pattern_value(self.db, env, var)
            }
            _ => Some(ty),
        }
    }

    fn rank(&mut self, from: TypeId, to: TypeId) -> Option<ConversionRank> {
        if !self.depth.enter() {
            warn!(from = from.0, to = to.0, "rank_conversion: depth limit exceeded");
            return None;
        }
        let result = self.rank_inner(from, to);
        self.depth.leave();
        result
    }

    fn rank_inner(&mut self, from: TypeId, to: TypeId) -> Option<ConversionRank> {
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;
        if from == to {
            return Some(ConversionRank::IdenticalTypes);
        }
        if from == TypeId::ERROR || to == TypeId::ERROR || from == TypeId::NEVER {
            return Some(ConversionRank::ExactConversion);
        }

        let from_data = self.db.lookup(from)?;
        let to_data = self.db.lookup(to)?;

        // Unions first: every source member must convert, the target picks the best member.
        if let TypeData::Union(members) = from_data {
            let mut worst = ConversionRank::IdenticalTypes;
            for &member in self.db.type_list(members).iter() {
                worst = worst.min(self.rank(member, to)?);
            }
            return Some(worst.min(ConversionRank::ExactConversion));
        }
        if let TypeData::Union(members) = to_data {
            let mut best = ConversionRank::Incompatible;
            for &member in self.db.type_list(members).iter() {
                best = best.max(self.rank(from, member)?);
            }
            return Some(best.min(ConversionRank::ExactConversion));
        }

        if (self.db.flags(from) | self.db.flags(to)).intersects(UNDECIDED) {
            let related = RelationChecker::new(self.db, self.bindings).check_subtype(from, to);
            return if related.is_true() {
                Some(ConversionRank::ExactConversion)
            } else {
                None
            };
        }

        if to == TypeId::ANY {
            return Some(ConversionRank::NonPreferred);
        }
        let rank = match (from_data, to_data) {
            (TypeData::Intrinsic(from_kind), TypeData::Intrinsic(to_kind)) => {
                rank_primitive(from_kind, to_kind)
            }
            (TypeData::Enum(_), TypeData::Intrinsic(kind)) if kind.is_integer() => {
                ConversionRank::NonPreferred
            }
            _ => {
                let related = RelationChecker::new(self.db, self.bindings).check_subtype(from, to);
                if related.is_true() {
                    ConversionRank::ExactConversion
                } else if related.is_unknown() {
                    return None;
                } else {
                    ConversionRank::Incompatible
                }
            }
        };
        Some(rank)
    }
}

/// Rank the implicit conversion of a `from` value into a `to` slot.
///
/// Returns `None` when either side is (or contains) an unbound pattern value
/// or a deferred call type, unless the conversion is already known to be a
/// plain upcast.
pub fn rank_conversion(
    db: &dyn TypeDatabase,
    bindings: &dyn BindingLookup,
    from: TypeId,
    to: TypeId,
) -> Option<ConversionRank> {
    let rank = ConversionRanker::new(db, bindings).rank(from, to);
    trace!(from = from.0, to = to.0, ?rank, "rank_conversion");
    rank
}

#[cfg(test)]
#[path = "../tests/conversion_tests.rs"]
mod conversion_tests;
