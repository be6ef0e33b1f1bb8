//! String and object reference tables

use std::collections::HashMap;

use crate::amf::value::AmfValue;

/// Strings written in literal form, looked up by value
///
/// The empty string is never entered.
#[derive(Debug, Default)]
pub struct StringTable {
    entries: Vec<String>,
    index: HashMap<String, usize>,
}

impl StringTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `s` if present, otherwise record it and return None
    ///
    /// The empty string is never recorded and never found.
    pub fn lookup_or_insert(&mut self, s: &str) -> Option<usize> {
        if s.is_empty() {
            return None;
        }
        if let Some(&i) = self.index.get(s) {
            return Some(i);
        }
        let i = self.entries.len();
        self.entries.push(s.to_string());
        self.index.insert(s.to_string(), i);
        None
    }

    /// String recorded at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Number of recorded strings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// Composite values written in full, looked up by instance identity
///
/// Entries hold a clone of the value so the instance stays alive, and its
/// address cannot be reused by another allocation, for the life of the
/// session. Raw strings written under a byte-array or XML marker have no
/// instance and are looked up by value instead. Arrays occupy an index
/// but are never found.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    entries: Vec<AmfValue>,
    index: HashMap<usize, usize>,
    texts: HashMap<String, usize>,
}

impl ReferenceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of this instance if present, otherwise record it
    /// and return None
    pub fn lookup_or_insert(&mut self, value: &AmfValue) -> Option<usize> {
        if let Some(id) = value.identity() {
            if let Some(&i) = self.index.get(&id) {
                return Some(i);
            }
            self.index.insert(id, self.entries.len());
        } else if let AmfValue::String(text) = value {
            if let Some(&i) = self.texts.get(text) {
                return Some(i);
            }
            self.texts.insert(text.clone(), self.entries.len());
        }
        self.entries.push(value.clone());
        None
    }

    /// Record a value without looking it up; it can never be found later
    pub fn append(&mut self, value: &AmfValue) -> usize {
        let i = self.entries.len();
        self.entries.push(value.clone());
        i
    }

    /// Number of recorded values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.texts.clear();
    }
}
