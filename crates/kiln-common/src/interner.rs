//! String interner for identifier deduplication.
//!
//! Pattern variable names, declaration names and other identifiers are interned
//! into a shared pool and passed around as `u32` indices (`Atom`). Comparing two
//! names is an integer comparison.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Intrinsic type names.
const COMMON_STRINGS: &[&str] = &[
    "void", "bool", "char", "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32",
    "uint64", "float", "double", "string", "any", "never", "null",
];

#[derive(Default)]
struct InternerState {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

/// String interner that deduplicates strings and returns Atom handles.
///
/// Interior mutability lets the interner live inside a shared type database and
/// be used through `&self`.
///
/// # Example
/// ```
/// use kiln_common::interner::Interner;
/// let interner = Interner::new();
/// let a1 = interner.intern("hello");
/// let a2 = interner.intern("hello");
/// assert_eq!(a1, a2);
/// assert_eq!(&*interner.resolve(a1), "hello");
/// ```
pub struct Interner {
    state: RwLock<InternerState>,
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut state = InternerState {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        let empty: Arc<str> = Arc::from("");
        state.strings.push(empty.clone());
        state.map.insert(empty, Atom::NONE);
        Interner {
            state: RwLock::new(state),
        }
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }

        if let Ok(state) = self.state.read()
            && let Some(&atom) = state.map.get(s)
        {
            return atom;
        }

        let Ok(mut state) = self.state.write() else {
            return Atom::NONE;
        };
        if let Some(&atom) = state.map.get(s) {
            return atom;
        }

        let atom = Atom(state.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        state.strings.push(owned.clone());
        state.map.insert(owned, atom);
        atom
    }

    /// Resolve an Atom back to its string value.
    /// Returns the empty string if the atom is out of bounds.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    /// Try to resolve an Atom, returning None if invalid.
    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let state = self.state.read().ok()?;
        state.strings.get(atom.0 as usize).cloned()
    }

    /// Get the number of interned strings (including the empty string).
    pub fn len(&self) -> usize {
        self.state.read().map(|state| state.strings.len()).unwrap_or(0)
    }

    /// Check if the interner is empty (only has the empty string).
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Pre-intern the intrinsic type names.
    pub fn intern_common(&self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod interner_tests;
