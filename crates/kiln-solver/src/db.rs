//! Type database abstraction for the solver.
//!
//! This trait isolates solver logic from concrete storage. Every solver
//! component takes `&dyn TypeDatabase`; the construction helpers are provided
//! methods so that alternative stores only implement the storage primitives.

use crate::def::{DefId, DefKind, Definition, DefinitionStore, TypeParamInfo};
use crate::intern::TypeInterner;
use crate::types::*;
use crate::variance::Variance;
use kiln_common::interner::Atom;
use std::sync::Arc;

/// Query interface for the solver.
pub trait TypeDatabase {
    fn intern(&self, data: TypeData) -> TypeId;
    fn lookup(&self, id: TypeId) -> Option<TypeData>;
    fn flags(&self, id: TypeId) -> TypeFlags;
    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId;
    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn intern_string(&self, s: &str) -> Atom;
    fn resolve_atom(&self, atom: Atom) -> Arc<str>;
    fn register_pattern_var(&self, info: PatternVarInfo) -> PatternVarId;
    fn pattern_var_info(&self, id: PatternVarId) -> Option<PatternVarInfo>;
    fn definitions(&self) -> &DefinitionStore;

    // =========================================================================
    // Declarations
    // =========================================================================

    fn definition(&self, def: DefId) -> Option<Arc<Definition>> {
        self.definitions().get(def)
    }

    /// Register a class, struct, interface or protocol without parameters or bases.
    fn declare_composite(&self, kind: DefKind, name: &str) -> DefId {
        let name = self.intern_string(name);
        self.definitions().register(Definition::composite(kind, name))
    }

    /// Add a generic parameter to `def` and return its pattern variable.
    fn declare_type_param(&self, def: DefId, name: &str, variance: Variance) -> TypeId {
        let var = self.pattern_var(name, Some(def));
        self.definitions()
            .push_type_param(def, TypeParamInfo { var, variance });
        var
    }

    /// Add a direct supertype to `def`, written in terms of its own parameters.
    fn add_base(&self, def: DefId, base: TypeId) {
        self.definitions().push_base(def, base);
    }

    fn declare_enum(&self, name: &str, members: &[&str]) -> DefId {
        let name = self.intern_string(name);
        let members = members.iter().map(|member| self.intern_string(member)).collect();
        self.definitions()
            .register(Definition::enumeration(name, members))
    }

    /// The declaration instantiated with its own parameters (`List[T]` inside `List`).
    fn self_type(&self, def: DefId) -> TypeId {
        let args = self
            .definition(def)
            .map(|definition| definition.type_params.iter().map(|param| param.var).collect())
            .unwrap_or_default();
        self.composite(def, args)
    }

    // =========================================================================
    // Type construction
    // =========================================================================

    fn composite(&self, def: DefId, args: Vec<TypeId>) -> TypeId {
        let args = self.intern_type_list(args);
        self.intern(TypeData::Composite { def, args })
    }

    fn enum_type(&self, def: DefId) -> TypeId {
        self.intern(TypeData::Enum(def))
    }

    fn address(&self, pointee: TypeId) -> TypeId {
        self.intern(TypeData::Address(pointee))
    }

    fn pointer(&self, pointee: TypeId) -> TypeId {
        self.intern(TypeData::Pointer(pointee))
    }

    fn constant_int(&self, value: i64) -> TypeId {
        self.intern(TypeData::Constant(ConstValue::Int(value)))
    }

    /// Native array whose length is a type: a constant or a pattern variable.
    fn native_array(&self, element: TypeId, length: TypeId) -> TypeId {
        self.intern(TypeData::NativeArray { element, length })
    }

    fn native_array_of(&self, element: TypeId, length: i64) -> TypeId {
        let length = self.constant_int(length);
        self.native_array(element, length)
    }

    fn tuple(&self, elements: Vec<TypeId>) -> TypeId {
        let list = self.intern_type_list(elements);
        self.intern(TypeData::Tuple(list))
    }

    /// Normalized union.
    ///
    /// Nested unions are flattened, `never` members dropped, duplicates removed
    /// and members sorted. `any` absorbs everything; an empty union is `never`
    /// and a single member is returned as is.
    fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: Vec<TypeId> = Vec::with_capacity(members.len());
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Union(list)) => flat.extend(self.type_list(list).iter().copied()),
                _ => flat.push(member),
            }
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        flat.retain(|&member| member != TypeId::NEVER);
        flat.sort_unstable();
        flat.dedup();

        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                let list = self.intern_type_list(flat);
                self.intern(TypeData::Union(list))
            }
        }
    }

    fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union(vec![left, right])
    }

    fn function(&self, params: Vec<TypeId>, result: TypeId) -> TypeId {
        let params = self.intern_type_list(params);
        self.intern(TypeData::Function { params, result })
    }

    fn type_literal(&self, inner: TypeId) -> TypeId {
        self.intern(TypeData::TypeLiteral(inner))
    }

    /// A fresh pattern variable. Every call returns a distinct variable.
    fn pattern_var(&self, name: &str, template: Option<DefId>) -> TypeId {
        let name = self.intern_string(name);
        let id = self.register_pattern_var(PatternVarInfo { name, template });
        self.intern(TypeData::PatternVar(id))
    }

    /// The proxy node for `var` in environment `env`.
    fn pattern_value(&self, env: EnvId, var: TypeId) -> TypeId {
        self.intern(TypeData::PatternValue { env, var })
    }

    fn result_of(&self, call: CallId) -> TypeId {
        self.intern(TypeData::ResultOf(call))
    }

    fn parameter_of(&self, call: CallId, index: u32) -> TypeId {
        self.intern(TypeData::ParameterOf { call, index })
    }
}

impl TypeDatabase for TypeInterner {
    fn intern(&self, data: TypeData) -> TypeId {
        TypeInterner::intern(self, data)
    }

    fn lookup(&self, id: TypeId) -> Option<TypeData> {
        TypeInterner::lookup(self, id)
    }

    fn flags(&self, id: TypeId) -> TypeFlags {
        TypeInterner::flags(self, id)
    }

    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        TypeInterner::intern_type_list(self, members)
    }

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        TypeInterner::type_list(self, id)
    }

    fn intern_string(&self, s: &str) -> Atom {
        TypeInterner::intern_string(self, s)
    }

    fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        TypeInterner::resolve_atom(self, atom)
    }

    fn register_pattern_var(&self, info: PatternVarInfo) -> PatternVarId {
        TypeInterner::register_pattern_var(self, info)
    }

    fn pattern_var_info(&self, id: PatternVarId) -> Option<PatternVarInfo> {
        TypeInterner::pattern_var_info(self, id)
    }

    fn definitions(&self) -> &DefinitionStore {
        &self.definitions
    }
}
