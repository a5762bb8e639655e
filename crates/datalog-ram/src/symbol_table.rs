//! Symbol table: program string constants interned to dense numeric ids
//!
//! One table is shared by reference across every translator of a lowering
//! run; interning goes through an internal lock so that clauses of the same
//! stratum may be translated concurrently. Ids are dense, stable for the
//! lifetime of the table, and assigned in first-intern order, which keeps
//! translation deterministic for a fixed input.

use crate::ir::RamValue;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    ids: HashMap<String, RamValue>,
    strings: Vec<String>,
}

/// Bidirectional string ↔ id interning with content-based deduplication
#[derive(Debug, Default)]
pub struct SymbolTable {
    inner: RwLock<Inner>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Intern a string, returning its id. Repeated interning of equal
    /// content returns the same id.
    pub fn intern(&self, symbol: &str) -> RamValue {
        if let Some(id) = self.lookup(symbol) {
            return id;
        }
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        // A concurrent intern may have won the race between the read above
        // and taking the write lock.
        if let Some(id) = inner.ids.get(symbol) {
            return *id;
        }
        let id = inner.strings.len() as RamValue;
        inner.strings.push(symbol.to_string());
        inner.ids.insert(symbol.to_string(), id);
        id
    }

    /// Id of an already-interned string
    pub fn lookup(&self, symbol: &str) -> Option<RamValue> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.ids.get(symbol).copied()
    }

    /// String content of an id
    pub fn resolve(&self, id: RamValue) -> Option<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        usize::try_from(id)
            .ok()
            .and_then(|index| inner.strings.get(index).cloned())
    }

    /// Number of interned strings
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
