use fnv::FnvHashMap;

use crate::error::{GraphError, Result, SequenceKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntry {
    pub name: String,
    pub index: usize,
    pub length: usize,
}

/// Names, 1-based indices, and lengths of the sequences ingested into
/// a graph. Indices follow ingestion order and are never reused.
#[derive(Debug, Clone, Default)]
pub struct SequenceRegistry {
    entries: Vec<SequenceEntry>,
    by_name: FnvHashMap<String, usize>,
}

impl SequenceRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The index the next registered sequence will receive.
    #[inline]
    pub fn next_index(&self) -> usize {
        self.entries.len() + 1
    }

    #[inline]
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registers a sequence under `name`, or `Sequence_<index>` if no
    /// name is given, and returns its index.
    pub fn register(&mut self, name: Option<&str>, length: usize) -> Result<usize> {
        let index = self.next_index();
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Sequence_{}", index),
        };
        if self.by_name.contains_key(&name) {
            return Err(GraphError::DuplicateName(name));
        }
        self.by_name.insert(name.clone(), index);
        self.entries.push(SequenceEntry {
            name,
            index,
            length,
        });
        Ok(index)
    }

    pub fn get(&self, index: usize) -> Option<&SequenceEntry> {
        if index == 0 {
            return None;
        }
        self.entries.get(index - 1)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Resolves a key to a registered index.
    pub fn resolve(&self, key: &SequenceKey) -> Result<usize> {
        let index = match key {
            SequenceKey::Index(ix) => self.get(*ix).map(|e| e.index),
            SequenceKey::Name(name) => self.index_of(name),
        };
        index.ok_or_else(|| GraphError::NotFound(key.clone()))
    }

    pub fn length(&self, index: usize) -> Result<usize> {
        self.get(index)
            .map(|e| e.length)
            .ok_or(GraphError::NotFound(SequenceKey::Index(index)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|e| e.length)
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SequenceEntry> {
        self.entries.iter()
    }
}
