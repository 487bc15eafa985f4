//! Pattern-local payload registry ("ktable")
//!
//! Captures carry compact 16-bit indices; the ktable resolves them to the
//! payloads the compiler registered: capture names, format strings, lookup
//! maps, and host functions. Index 0 is reserved to mean "no payload"
//! (anonymous groups), so stored entries are 1-based.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::common::errors::ReifyError;
use crate::engine::value::{MapKey, Value};

/// A host function callable from function, fold, and runtime captures
pub type HostFn = Arc<dyn Fn(&[Value]) -> Result<Vec<Value>, ReifyError> + Send + Sync>;

/// One ktable payload
#[derive(Clone)]
pub enum KtableEntry {
    /// Capture names and format strings
    Str(String),
    /// Lookup table for query captures
    Map(IndexMap<MapKey, Value>),
    /// Host function for function, fold, and runtime captures
    Function(HostFn),
}

impl fmt::Debug for KtableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KtableEntry::Str(s) => f.debug_tuple("Str").field(s).finish(),
            KtableEntry::Map(m) => f.debug_tuple("Map").field(&m.len()).finish(),
            KtableEntry::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// The payload registry handed to the processor alongside the capture
/// list. Read-only during traversal.
#[derive(Clone, Debug, Default)]
pub struct Ktable {
    entries: Vec<KtableEntry>,
}

impl Ktable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry, returning its 1-based index
    pub fn push(&mut self, entry: KtableEntry) -> u16 {
        self.entries.push(entry);
        self.entries.len() as u16
    }

    /// Register a name or format string, returning its index
    pub fn push_str(&mut self, s: impl Into<String>) -> u16 {
        self.push(KtableEntry::Str(s.into()))
    }

    /// Register a host function, returning its index
    pub fn push_function(&mut self, f: HostFn) -> u16 {
        self.push(KtableEntry::Function(f))
    }

    /// Register a lookup map, returning its index
    pub fn push_map(&mut self, m: IndexMap<MapKey, Value>) -> u16 {
        self.push(KtableEntry::Map(m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve an index to its entry; index 0 and out-of-range indices are
    /// errors.
    pub fn get(&self, idx: u16) -> Result<&KtableEntry, ReifyError> {
        if idx == 0 {
            return Err(ReifyError::KtableIndex(idx));
        }
        self.entries
            .get(idx as usize - 1)
            .ok_or(ReifyError::KtableIndex(idx))
    }

    /// Resolve an index to a name or format string
    pub fn name(&self, idx: u16) -> Result<&str, ReifyError> {
        match self.get(idx)? {
            KtableEntry::Str(s) => Ok(s),
            _ => Err(ReifyError::KtableType {
                idx,
                expected: "string",
            }),
        }
    }

    /// Resolve an index to a host function
    pub fn function(&self, idx: u16) -> Result<&HostFn, ReifyError> {
        match self.get(idx)? {
            KtableEntry::Function(f) => Ok(f),
            _ => Err(ReifyError::KtableType {
                idx,
                expected: "function",
            }),
        }
    }

    /// Resolve an index to a lookup map
    pub fn map(&self, idx: u16) -> Result<&IndexMap<MapKey, Value>, ReifyError> {
        match self.get(idx)? {
            KtableEntry::Map(m) => Ok(m),
            _ => Err(ReifyError::KtableType {
                idx,
                expected: "table",
            }),
        }
    }

    /// Render an entry for trace output
    pub fn render(&self, idx: u16) -> String {
        match self.get(idx) {
            Ok(KtableEntry::Str(s)) => s.clone(),
            Ok(KtableEntry::Map(_)) => "<table>".to_string(),
            Ok(KtableEntry::Function(_)) => "<function>".to_string(),
            Err(_) => "<absent>".to_string(),
        }
    }
}
