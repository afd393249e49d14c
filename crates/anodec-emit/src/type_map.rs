//! The type-mapping table handed to an emitter.
//!
//! Maps core type ids to backend type handles. The table is seeded with
//! the five scalar mappings; the emitter adds class struct types as it
//! lowers them.

use anodec_ast::{Primitive, TypeId, TypeTable};
use rustc_hash::FxHashMap;

/// `TypeId → T` where `T` is the backend's type handle.
pub struct TypeMap<T> {
    map: FxHashMap<TypeId, T>,
}

impl<T> TypeMap<T> {
    /// An empty, unseeded table.
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    /// A table seeded with the scalar mappings produced by `scalar`.
    pub fn seeded(mut scalar: impl FnMut(Primitive) -> T) -> Self {
        let mut map = FxHashMap::default();
        map.insert(TypeTable::VOID, scalar(Primitive::Void));
        map.insert(TypeTable::BOOL, scalar(Primitive::Bool));
        map.insert(TypeTable::INT32, scalar(Primitive::Int32));
        map.insert(TypeTable::FLOAT, scalar(Primitive::Float));
        map.insert(TypeTable::DOUBLE, scalar(Primitive::Double));
        Self { map }
    }

    pub fn get(&self, ty: TypeId) -> Option<&T> {
        self.map.get(&ty)
    }

    pub fn insert(&mut self, ty: TypeId, value: T) -> Option<T> {
        self.map.insert(ty, value)
    }

    pub fn contains(&self, ty: TypeId) -> bool {
        self.map.contains_key(&ty)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<T> Default for TypeMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
