//! Type interning for structural deduplication.
//!
//! Converts `TypeData` structures into lightweight `TypeId` handles. The
//! interner is the per-analysis-unit arena: every type, type list, pattern
//! variable and declaration of a compilation unit lives here and is freed when
//! the interner drops.
//!
//! Benefits:
//! - O(1) type equality (just compare `TypeId` values)
//! - Each unique structure stored once
//! - `TypeFlags` computed once per structure, so "does this contain a pattern
//!   variable" is a table lookup

use crate::def::DefinitionStore;
use crate::types::*;
use kiln_common::interner::{Atom, Interner};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

const TYPE_LIST_INLINE: usize = 8;

pub(crate) type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

struct TypeEntry {
    data: TypeData,
    flags: TypeFlags,
}

#[derive(Default)]
struct TypeTable {
    map: FxHashMap<TypeData, TypeId>,
    entries: Vec<TypeEntry>,
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }

        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

/// Type interning table.
/// Thread-safe via `RwLock` for concurrent access.
pub struct TypeInterner {
    types: RwLock<TypeTable>,
    type_lists: RwLock<SliceInterner<TypeId>>,
    pattern_vars: RwLock<Vec<PatternVarInfo>>,
    /// Pattern variable names, declaration names, enum members
    pub string_interner: Interner,
    /// Composite and enum declarations
    pub definitions: DefinitionStore,
}

impl TypeInterner {
    /// Create a new type interner with pre-registered intrinsics
    pub fn new() -> Self {
        let mut table = TypeTable::default();
        for kind in IntrinsicKind::ALL {
            let data = TypeData::Intrinsic(kind);
            let id = kind.type_id();
            debug_assert_eq!(id.0 as usize, table.entries.len());
            table.map.insert(data, id);
            table.entries.push(TypeEntry {
                data,
                flags: data.own_flags(),
            });
        }

        let string_interner = Interner::new();
        string_interner.intern_common();

        TypeInterner {
            types: RwLock::new(table),
            type_lists: RwLock::new(SliceInterner::new()),
            pattern_vars: RwLock::new(Vec::new()),
            string_interner,
            definitions: DefinitionStore::new(),
        }
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().unwrap_or_else(PoisonError::into_inner);
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    pub fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        let mut lists = self.type_lists.write().unwrap_or_else(PoisonError::into_inner);
        TypeListId(lists.intern(members))
    }

    /// Intern a type and return its `TypeId`.
    /// If the structure already exists, returns the existing `TypeId`.
    pub fn intern(&self, data: TypeData) -> TypeId {
        if let TypeData::Intrinsic(kind) = data {
            return kind.type_id();
        }

        {
            let table = self.types.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(&id) = table.map.get(&data) {
                return id;
            }
        }

        // Computed outside the write lock: it reads child flags.
        let flags = self.compute_flags(&data);

        let mut table = self.types.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(&id) = table.map.get(&data) {
            return id;
        }

        let Ok(index) = u32::try_from(table.entries.len()) else {
            return TypeId::ERROR;
        };
        let id = TypeId(index);
        table.entries.push(TypeEntry { data, flags });
        table.map.insert(data, id);
        trace!(type_id = id.0, ?data, "TypeInterner::intern");
        id
    }

    /// Look up the `TypeData` for a given `TypeId`
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        let table = self.types.read().unwrap_or_else(PoisonError::into_inner);
        table.entries.get(id.0 as usize).map(|entry| entry.data)
    }

    /// Structural flags of a type; empty for unknown ids.
    pub fn flags(&self, id: TypeId) -> TypeFlags {
        let table = self.types.read().unwrap_or_else(PoisonError::into_inner);
        table
            .entries
            .get(id.0 as usize)
            .map(|entry| entry.flags)
            .unwrap_or_default()
    }

    pub fn register_pattern_var(&self, info: PatternVarInfo) -> PatternVarId {
        let mut vars = self.pattern_vars.write().unwrap_or_else(PoisonError::into_inner);
        let id = PatternVarId(vars.len() as u32);
        vars.push(info);
        id
    }

    pub fn pattern_var_info(&self, id: PatternVarId) -> Option<PatternVarInfo> {
        let vars = self.pattern_vars.read().unwrap_or_else(PoisonError::into_inner);
        vars.get(id.0 as usize).cloned()
    }

    /// Get the number of interned types, intrinsics included
    pub fn len(&self) -> usize {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Check if the interner only has intrinsics
    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    fn compute_flags(&self, data: &TypeData) -> TypeFlags {
        let mut flags = data.own_flags();
        let mut children = TypeListBuffer::new();
        match *data {
            TypeData::Intrinsic(_)
            | TypeData::Constant(_)
            | TypeData::Enum(_)
            | TypeData::PatternVar(_)
            | TypeData::ResultOf(_)
            | TypeData::ParameterOf { .. } => {}
            // The var of a pattern value is a reference into the environment,
            // not a free variable of the proxy node.
            TypeData::PatternValue { .. } => {}
            TypeData::Address(inner) | TypeData::Pointer(inner) | TypeData::TypeLiteral(inner) => {
                children.push(inner);
            }
            TypeData::NativeArray { element, length } => {
                children.push(element);
                children.push(length);
            }
            TypeData::Tuple(list) | TypeData::Union(list) | TypeData::Composite { args: list, .. } => {
                children.extend(self.type_list(list).iter().copied());
            }
            TypeData::Function { params, result } => {
                children.extend(self.type_list(params).iter().copied());
                children.push(result);
            }
        }
        for child in children {
            flags |= self.flags(child);
        }
        flags
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod intern_tests;
