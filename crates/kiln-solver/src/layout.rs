//! IR shape description.
//!
//! Code generation needs to know how a value of a type is laid out, not the
//! full type. `ir_shape` classifies a resolved type into an [`IrShape`]; it
//! returns `None` for types that have no layout yet (unbound pattern values,
//! deferred call types, bare pattern variables, `unknown`).

use crate::binding::BindingLookup;
use crate::db::TypeDatabase;
use crate::def::{DefId, DefKind};
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::type_queries::constant_int;
use crate::types::{IntrinsicKind, TypeData, TypeId};
use tracing::warn;

/// Machine-level representation of a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IrShape {
    /// No value (`void`, `never`).
    Void,
    Bool,
    /// Unicode scalar, 32 bits.
    Char,
    Int { bits: u32, signed: bool },
    Float { bits: u32 },
    /// Untraced native pointer or address.
    RawPointer,
    /// Traced pointer to a heap object (class instances, `null`, `any`).
    ObjectRef,
    /// Inline value aggregate of a struct declaration.
    Struct(DefId),
    /// Inline aggregate of `fields` values.
    Tuple { fields: u32 },
    /// Fixed-size inline array.
    NativeArray { length: u64 },
    /// Pointer to code.
    FunctionPointer,
    /// Pointer to a type descriptor.
    TypeInfo,
    /// Value union carrying a discriminator.
    TaggedUnion { members: u32 },
}

impl IrShape {
    /// Whether the collector has to trace values of this shape.
    pub fn is_traced(self) -> bool {
        matches!(self, IrShape::ObjectRef | IrShape::TaggedUnion { .. })
    }

    /// Whether a value of this shape fits in a register.
    pub fn is_scalar(self) -> bool {
        !matches!(
            self,
            IrShape::Struct(_) | IrShape::Tuple { .. } | IrShape::NativeArray { .. } | IrShape::TaggedUnion { .. }
        )
    }
}

fn intrinsic_shape(kind: IntrinsicKind) -> Option<IrShape> {
    let shape = match kind {
        IntrinsicKind::Error | IntrinsicKind::Unknown => return None,
        IntrinsicKind::Never | IntrinsicKind::Void => IrShape::Void,
        IntrinsicKind::Any | IntrinsicKind::Null | IntrinsicKind::String => IrShape::ObjectRef,
        IntrinsicKind::Bool => IrShape::Bool,
        IntrinsicKind::Char => IrShape::Char,
        IntrinsicKind::Float32 | IntrinsicKind::Float64 => IrShape::Float {
            bits: kind.bits().unwrap_or(64),
        },
        _ => IrShape::Int {
            bits: kind.bits().unwrap_or(64),
            signed: kind.is_signed_integer(),
        },
    };
    Some(shape)
}

/// Describe how values of `ty` are represented.
pub fn ir_shape(db: &dyn TypeDatabase, bindings: &dyn BindingLookup, ty: TypeId) -> Option<IrShape> {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Substitution);
    shape_of(db, bindings, ty, &mut depth)
}

fn shape_of(
    db: &dyn TypeDatabase,
    bindings: &dyn BindingLookup,
    ty: TypeId,
    depth: &mut DepthCounter,
) -> Option<IrShape> {
    if !depth.enter() {
        warn!(type_id = ty.0, "ir_shape: depth limit exceeded");
        return None;
    }
    let shape = shape_of_inner(db, bindings, ty, depth);
    depth.leave();
    shape
}

fn shape_of_inner(
    db: &dyn TypeDatabase,
    bindings: &dyn BindingLookup,
    ty: TypeId,
    depth: &mut DepthCounter,
) -> Option<IrShape> {
    match db.lookup(ty)? {
        TypeData::Intrinsic(kind) => intrinsic_shape(kind),
        TypeData::Constant(_) => Some(IrShape::Int {
            bits: 64,
            signed: true,
        }),
        TypeData::Address(_) | TypeData::Pointer(_) => Some(IrShape::RawPointer),
        TypeData::TypeLiteral(_) => Some(IrShape::TypeInfo),
        TypeData::Function { .. } => Some(IrShape::FunctionPointer),
        TypeData::Enum(_) => Some(IrShape::Int {
            bits: 32,
            signed: true,
        }),
        TypeData::NativeArray { length, .. } => {
            let length = constant_int(db, length)?;
            Some(IrShape::NativeArray {
                length: u64::try_from(length).ok()?,
            })
        }
        TypeData::Tuple(elements) => Some(IrShape::Tuple {
            fields: u32::try_from(db.type_list(elements).len()).ok()?,
        }),
        TypeData::Composite { def, .. } => match db.definitions().get_kind(def)? {
            DefKind::Struct => Some(IrShape::Struct(def)),
            DefKind::Enum => Some(IrShape::Int {
                bits: 32,
                signed: true,
            }),
            DefKind::Class | DefKind::Interface | DefKind::Protocol => Some(IrShape::ObjectRef),
        },
        TypeData::Union(members) => {
            let members = db.type_list(members);
            let mut all_refs = true;
            for &member in members.iter() {
                all_refs &= shape_of(db, bindings, member, depth)? == IrShape::ObjectRef;
            }
            if all_refs {
                Some(IrShape::ObjectRef)
            } else {
                Some(IrShape::TaggedUnion {
                    members: u32::try_from(members.len()).ok()?,
                })
            }
        }
        TypeData::PatternValue { env, var } => {
            let value = bindings.resolve_pattern_value(db, env, var)?;
            shape_of(db, bindings, value, depth)
        }
        TypeData::PatternVar(_) | TypeData::ResultOf(_) | TypeData::ParameterOf { .. } => None,
    }
}

#[cfg(test)]
#[path = "../tests/layout_tests.rs"]
mod layout_tests;
