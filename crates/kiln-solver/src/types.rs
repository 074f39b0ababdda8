//! Core type graph data.
//!
//! Types are represented as `TypeData` and interned into lightweight `TypeId`
//! handles by the `TypeInterner`. Interning is structural, so two types with
//! the same shape share one id: id equality is structural equality for fully
//! concrete types and doubles as "same object identity".

use crate::def::DefId;
use bitflags::bitflags;
use kiln_common::interner::Atom;

/// Handle to an interned type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Error recovery type. Related to everything so one failure does not cascade.
    pub const ERROR: TypeId = TypeId(0);
    /// A type that is not known yet.
    pub const UNKNOWN: TypeId = TypeId(1);
    /// Bottom type; also the "no lower bound" sentinel of a substitution.
    pub const NEVER: TypeId = TypeId(2);
    /// Top type; also the "no upper bound" sentinel of a substitution.
    pub const ANY: TypeId = TypeId(3);
    pub const VOID: TypeId = TypeId(4);
    pub const NULL: TypeId = TypeId(5);
    pub const BOOL: TypeId = TypeId(6);
    pub const CHAR: TypeId = TypeId(7);
    pub const INT8: TypeId = TypeId(8);
    pub const INT16: TypeId = TypeId(9);
    pub const INT32: TypeId = TypeId(10);
    pub const INT64: TypeId = TypeId(11);
    pub const UINT8: TypeId = TypeId(12);
    pub const UINT16: TypeId = TypeId(13);
    pub const UINT32: TypeId = TypeId(14);
    pub const UINT64: TypeId = TypeId(15);
    pub const FLOAT32: TypeId = TypeId(16);
    pub const FLOAT64: TypeId = TypeId(17);
    pub const STRING: TypeId = TypeId(18);

    /// First id handed out for non-intrinsic types.
    pub const FIRST_USER: u32 = 19;

    #[inline]
    pub fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

/// Built-in primitive and marker types.
///
/// The discriminant order matches the `TypeId` constants; the interner
/// pre-registers them in this order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Error,
    Unknown,
    Never,
    Any,
    Void,
    Null,
    Bool,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
}

impl IntrinsicKind {
    pub const ALL: [IntrinsicKind; 19] = [
        IntrinsicKind::Error,
        IntrinsicKind::Unknown,
        IntrinsicKind::Never,
        IntrinsicKind::Any,
        IntrinsicKind::Void,
        IntrinsicKind::Null,
        IntrinsicKind::Bool,
        IntrinsicKind::Char,
        IntrinsicKind::Int8,
        IntrinsicKind::Int16,
        IntrinsicKind::Int32,
        IntrinsicKind::Int64,
        IntrinsicKind::UInt8,
        IntrinsicKind::UInt16,
        IntrinsicKind::UInt32,
        IntrinsicKind::UInt64,
        IntrinsicKind::Float32,
        IntrinsicKind::Float64,
        IntrinsicKind::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Error => "error",
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Never => "never",
            IntrinsicKind::Any => "any",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Bool => "bool",
            IntrinsicKind::Char => "char",
            IntrinsicKind::Int8 => "int8",
            IntrinsicKind::Int16 => "int16",
            IntrinsicKind::Int32 => "int32",
            IntrinsicKind::Int64 => "int64",
            IntrinsicKind::UInt8 => "uint8",
            IntrinsicKind::UInt16 => "uint16",
            IntrinsicKind::UInt32 => "uint32",
            IntrinsicKind::UInt64 => "uint64",
            IntrinsicKind::Float32 => "float",
            IntrinsicKind::Float64 => "double",
            IntrinsicKind::String => "string",
        }
    }

    pub fn type_id(self) -> TypeId {
        TypeId(self as u32)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            IntrinsicKind::Int8
                | IntrinsicKind::Int16
                | IntrinsicKind::Int32
                | IntrinsicKind::Int64
                | IntrinsicKind::UInt8
                | IntrinsicKind::UInt16
                | IntrinsicKind::UInt32
                | IntrinsicKind::UInt64
        )
    }

    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            IntrinsicKind::Int8 | IntrinsicKind::Int16 | IntrinsicKind::Int32 | IntrinsicKind::Int64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, IntrinsicKind::Float32 | IntrinsicKind::Float64)
    }

    /// Storage width in bits for value-like primitives.
    pub fn bits(self) -> Option<u32> {
        match self {
            IntrinsicKind::Bool => Some(1),
            IntrinsicKind::Int8 | IntrinsicKind::UInt8 => Some(8),
            IntrinsicKind::Int16 | IntrinsicKind::UInt16 => Some(16),
            IntrinsicKind::Char | IntrinsicKind::Int32 | IntrinsicKind::UInt32 => Some(32),
            IntrinsicKind::Float32 => Some(32),
            IntrinsicKind::Int64 | IntrinsicKind::UInt64 | IntrinsicKind::Float64 => Some(64),
            _ => None,
        }
    }
}

/// Interned list of types (tuple members, union members, generic arguments,
/// function parameters).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

impl TypeListId {
    pub const EMPTY: TypeListId = TypeListId(0);
}

/// Identity of a pattern variable. Two variables with the same name are
/// still distinct.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternVarId(pub u32);

/// Metadata for a pattern variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternVarInfo {
    pub name: Atom,
    /// Generic declaration that introduced the variable, if any.
    pub template: Option<DefId>,
}

/// Identity of a binding environment, referenced by pattern-value nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvId(pub u32);

/// Identity of a call site in a `CallTable`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(pub u32);

/// A type-level constant (native array lengths).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Int(i64),
}

/// The closed set of type shapes.
///
/// Every consumer matches this exhaustively, so adding a variant forces the
/// unifier, the relation engine and the rewriters to handle it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    /// Type-level constant, e.g. the `4` in `NativeArray[int32, 4]`.
    Constant(ConstValue),
    /// Managed address of a value (`Address[T]`).
    Address(TypeId),
    /// Native, unmanaged pointer (`NativePointer[T]`).
    Pointer(TypeId),
    /// Fixed-size in-place array. `length` is a `Constant` or a pattern variable.
    NativeArray { element: TypeId, length: TypeId },
    Tuple(TypeListId),
    /// Normalized union: flattened, deduplicated, sorted, at least two members.
    Union(TypeListId),
    /// Instantiation of a class/struct/interface/protocol declaration.
    Composite { def: DefId, args: TypeListId },
    Function { params: TypeListId, result: TypeId },
    /// The type of a type expression (`TypeLiteral[T]`).
    TypeLiteral(TypeId),
    Enum(DefId),
    /// Placeholder in a generic signature.
    PatternVar(PatternVarId),
    /// "Whatever `var` currently resolves to in environment `env`".
    PatternValue { env: EnvId, var: TypeId },
    /// Deferred result type of an overloaded call.
    ResultOf(CallId),
    /// Deferred type of parameter `index` of an overloaded call.
    ParameterOf { call: CallId, index: u32 },
}

bitflags! {
    /// Structural facts about a type, computed once at intern time.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u8 {
        const CONTAINS_PATTERN_VAR = 1 << 0;
        const CONTAINS_PATTERN_VALUE = 1 << 1;
        const CONTAINS_DEFERRED = 1 << 2;
        const CONTAINS_ERROR = 1 << 3;
        const CONTAINS_UNKNOWN = 1 << 4;

        /// Anything an environment can rewrite.
        const HAS_VARIABLES = Self::CONTAINS_PATTERN_VAR.bits() | Self::CONTAINS_PATTERN_VALUE.bits();
        /// Anything that keeps a type from being singular.
        const UNSETTLED = Self::HAS_VARIABLES.bits()
            | Self::CONTAINS_DEFERRED.bits()
            | Self::CONTAINS_ERROR.bits()
            | Self::CONTAINS_UNKNOWN.bits();
    }
}

impl TypeData {
    /// Flags contributed by this node alone, not counting children.
    pub fn own_flags(&self) -> TypeFlags {
        match self {
            TypeData::Intrinsic(IntrinsicKind::Error) => TypeFlags::CONTAINS_ERROR,
            TypeData::Intrinsic(IntrinsicKind::Unknown) => TypeFlags::CONTAINS_UNKNOWN,
            TypeData::PatternVar(_) => TypeFlags::CONTAINS_PATTERN_VAR,
            TypeData::PatternValue { .. } => TypeFlags::CONTAINS_PATTERN_VALUE,
            TypeData::ResultOf(_) | TypeData::ParameterOf { .. } => TypeFlags::CONTAINS_DEFERRED,
            _ => TypeFlags::empty(),
        }
    }
}
