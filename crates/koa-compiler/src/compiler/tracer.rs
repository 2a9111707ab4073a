//! Memory layout for function-local variables.
//!
//! Memory is bump-allocated: each definition takes the next `size` bytes and
//! nothing is ever freed. The table is per function; two functions may both
//! place a variable at offset 0.

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{trace, warn};

/// A lookup for a variable the table has never seen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{id}] definition doesn't exist")]
pub struct EntryError {
    /// The missing variable
    pub id: String,
}

/// Where a variable's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemEntry {
    /// First byte of the value
    pub offset: usize,
    /// Length of the value in bytes
    pub size: usize,
}

/// Allocates memory for a variable when its assignment is compiled.
pub trait MemDefiner {
    /// Reserves `value.len()` bytes for `id` and returns the new entry.
    fn define(&mut self, id: &str, value: &[u8]) -> MemEntry;
}

/// Reads back variable locations.
pub trait MemEntryGetter {
    /// Offset of the entry bound to `id`.
    fn get_offset_of_entry(&self, id: &str) -> Result<usize, EntryError>;

    /// Size of the entry bound to `id`.
    fn get_size_of_entry(&self, id: &str) -> Result<usize, EntryError>;
}

/// Both halves of the tracer.
pub trait MemTracer: MemDefiner + MemEntryGetter {}

impl<T: MemDefiner + MemEntryGetter> MemTracer for T {}

/// Bump-allocated variable table.
#[derive(Debug, Clone, Default)]
pub struct MemEntryTable {
    entry_map: FxHashMap<String, MemEntry>,
    memory_counter: usize,
}

impl MemEntryTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next free offset, equal to the sum of every size handed out.
    pub fn memory_counter(&self) -> usize {
        self.memory_counter
    }

    /// The entry currently bound to `id`.
    pub fn entry(&self, id: &str) -> Option<MemEntry> {
        self.entry_map.get(id).copied()
    }

    fn lookup(&self, id: &str) -> Result<MemEntry, EntryError> {
        self.entry(id).ok_or_else(|| EntryError { id: id.to_string() })
    }
}

impl MemDefiner for MemEntryTable {
    fn define(&mut self, id: &str, value: &[u8]) -> MemEntry {
        let entry = MemEntry {
            offset: self.memory_counter,
            size: value.len(),
        };
        self.memory_counter += entry.size;

        // The old bytes stay allocated; only the name moves.
        if let Some(old) = self.entry_map.insert(id.to_string(), entry) {
            warn!(id, old_offset = old.offset, new_offset = entry.offset, "memory entry redefined");
        } else {
            trace!(id, offset = entry.offset, size = entry.size, "memory entry defined");
        }

        entry
    }
}

impl MemEntryGetter for MemEntryTable {
    fn get_offset_of_entry(&self, id: &str) -> Result<usize, EntryError> {
        self.lookup(id).map(|entry| entry.offset)
    }

    fn get_size_of_entry(&self, id: &str) -> Result<usize, EntryError> {
        self.lookup(id).map(|entry| entry.size)
    }
}
