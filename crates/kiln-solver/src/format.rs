//! Type formatting for diagnostics and binding dumps.

use crate::binding::BindingLookup;
use crate::db::TypeDatabase;
use crate::types::{ConstValue, TypeData, TypeId, TypeListId};
use std::cell::Cell;
use std::fmt::Write;

const MAX_FORMAT_DEPTH: u32 = 32;

/// Renders types in source-like syntax.
///
/// | Type | Rendering |
/// |------|-----------|
/// | composite | `Pair[int32, string]` |
/// | address / pointer | `Address[T]`, `NativePointer[T]` |
/// | native array | `NativeArray[int32, 4]` |
/// | tuple | `(int32, bool)` |
/// | union | `int32 or string` |
/// | function | `fn (int32) -> bool` |
/// | unresolved pattern value | `%T` |
pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
    bindings: Option<&'a dyn BindingLookup>,
    depth: Cell<u32>,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        Self {
            db,
            bindings: None,
            depth: Cell::new(0),
        }
    }

    /// Render pattern values as their current value when it is known.
    pub fn with_bindings(mut self, bindings: &'a dyn BindingLookup) -> Self {
        self.bindings = Some(bindings);
        self
    }

    pub fn format(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    fn write_type(&self, out: &mut String, ty: TypeId) {
        if self.depth.get() >= MAX_FORMAT_DEPTH {
            out.push_str("...");
            return;
        }
        self.depth.set(self.depth.get() + 1);
        self.write_data(out, ty);
        self.depth.set(self.depth.get() - 1);
    }

    fn write_data(&self, out: &mut String, ty: TypeId) {
        let Some(data) = self.db.lookup(ty) else {
            let _ = write!(out, "<invalid type {}>", ty.0);
            return;
        };
        match data {
            TypeData::Intrinsic(kind) => out.push_str(kind.name()),
            TypeData::Constant(ConstValue::Int(value)) => {
                let _ = write!(out, "{value}");
            }
            TypeData::Address(inner) => self.write_wrapped(out, "Address", &[inner]),
            TypeData::Pointer(inner) => self.write_wrapped(out, "NativePointer", &[inner]),
            TypeData::TypeLiteral(inner) => self.write_wrapped(out, "TypeLiteral", &[inner]),
            TypeData::NativeArray { element, length } => {
                self.write_wrapped(out, "NativeArray", &[element, length]);
            }
            TypeData::Tuple(elements) => {
                out.push('(');
                self.write_list(out, elements, ", ");
                out.push(')');
            }
            TypeData::Union(members) => self.write_list(out, members, " or "),
            TypeData::Composite { def, args } => {
                let name = self
                    .db
                    .definition(def)
                    .map(|definition| self.db.resolve_atom(definition.name))
                    .unwrap_or_else(|| "<unknown>".into());
                out.push_str(&name);
                if args != TypeListId::EMPTY {
                    out.push('[');
                    self.write_list(out, args, ", ");
                    out.push(']');
                }
            }
            TypeData::Enum(def) => {
                let name = self
                    .db
                    .definition(def)
                    .map(|definition| self.db.resolve_atom(definition.name))
                    .unwrap_or_else(|| "<unknown>".into());
                out.push_str(&name);
            }
            TypeData::Function { params, result } => {
                out.push_str("fn (");
                self.write_list(out, params, ", ");
                out.push_str(") -> ");
                self.write_type(out, result);
            }
            TypeData::PatternVar(id) => {
                let name = self
                    .db
                    .pattern_var_info(id)
                    .map(|info| self.db.resolve_atom(info.name))
                    .unwrap_or_else(|| "?".into());
                out.push_str(&name);
            }
            TypeData::PatternValue { env, var } => {
                let value = self
                    .bindings
                    .and_then(|bindings| bindings.resolve_pattern_value(self.db, env, var));
                match value {
                    Some(value) => self.write_type(out, value),
                    None => {
                        out.push('%');
                        self.write_type(out, var);
                    }
                }
            }
            TypeData::ResultOf(call) => {
                let _ = write!(out, "<result of call #{}>", call.0);
            }
            TypeData::ParameterOf { call, index } => {
                let _ = write!(out, "<parameter {index} of call #{}>", call.0);
            }
        }
    }

    fn write_wrapped(&self, out: &mut String, name: &str, args: &[TypeId]) {
        out.push_str(name);
        out.push('[');
        for (index, &arg) in args.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.write_type(out, arg);
        }
        out.push(']');
    }

    fn write_list(&self, out: &mut String, list: TypeListId, separator: &str) {
        for (index, &ty) in self.db.type_list(list).iter().enumerate() {
            if index > 0 {
                out.push_str(separator);
            }
            self.write_type(out, ty);
        }
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod format_tests;
