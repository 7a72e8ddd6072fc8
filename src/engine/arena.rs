use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stable identifier handed out by an [`EntryArena`]. Never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry-{:04}", self.0)
    }
}

/// Identity-stable collection of household entries addressed by [`EntryId`].
///
/// Iteration follows id order, which is also insertion order since ids are monotonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryArena<T> {
    next_id: u64,
    entries: BTreeMap<EntryId, T>,
}

impl<T> Default for EntryArena<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: BTreeMap::new(),
        }
    }
}

impl<T> EntryArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, value);
        id
    }

    pub fn get(&self, id: EntryId) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub fn remove(&mut self, id: EntryId) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &T)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }
}

impl<T> FromIterator<T> for EntryArena<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arena = Self::default();
        for value in iter {
            arena.insert(value);
        }
        arena
    }
}
