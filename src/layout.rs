//! Byte sizes of value types.
//!
//! Sizes come from the front end's layout computation (they depend on the
//! target's word size and alignment rules); the engine only looks them up.

use crate::ast::Type;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answers "how many bytes does a value of this type occupy".
pub trait SizeOracle: Send + Sync {
    /// `None` when the size is unknown.
    fn size_of(&self, ty: &Type) -> Option<u64>;
}

/// Sizes keyed by the Go-syntax rendering of each type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutTable {
    sizes: BTreeMap<String, u64>,
}

impl LayoutTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ty: &Type, size: u64) {
        self.sizes.insert(ty.to_string(), size);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, ty: &Type, size: u64) -> Self {
        self.insert(ty, size);
        self
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl SizeOracle for LayoutTable {
    fn size_of(&self, ty: &Type) -> Option<u64> {
        self.sizes.get(&ty.to_string()).copied()
    }
}
