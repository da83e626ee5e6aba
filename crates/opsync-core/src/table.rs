//! Index to name symbol table.

use crate::enumeration::Enumeration;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Opcode names indexed by their position in the enumeration.
///
/// Indices are contiguous from zero. The reverse lookup is built once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    names: Vec<String>,
    indices: HashMap<String, usize>,
}

/// One table row, as serialized.
#[derive(Debug, Serialize)]
pub struct Entry<'a> {
    pub index: usize,
    pub name: &'a str,
}

impl SymbolTable {
    /// Build a table from names in canonical order.
    ///
    /// Names are expected to be unique (as guaranteed by [`Enumeration`]); if a
    /// name repeats, the reverse lookup resolves to its first index.
    pub fn from_names(names: Vec<String>) -> Self {
        let mut indices = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            indices.entry(name.clone()).or_insert(index);
        }
        Self { names, indices }
    }

    /// Name of the opcode at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Index of the opcode called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Rows in index order.
    pub fn iter(&self) -> impl Iterator<Item = Entry<'_>> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| Entry { index, name })
    }
}

impl From<Enumeration> for SymbolTable {
    fn from(enumeration: Enumeration) -> Self {
        Self::from_names(enumeration.into_names())
    }
}

impl Serialize for SymbolTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
