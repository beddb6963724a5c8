//! Undo journals for staged transactions.
//!
//! A store opens a journal with [`Transactional::begin`]. Each write made
//! while it is open records what it overwrote, so [`Transactional::rollback`]
//! restores exactly the entries that changed and [`Transactional::commit`]
//! simply drops the record. Untouched state is never copied.

use std::collections::BTreeMap;
use std::ops::Deref;

/// State that can stage writes and later keep or discard them.
pub trait Transactional {
    /// Start recording undo information. Discards any journal already open.
    fn begin(&mut self);

    /// Keep every write since [`begin`](Self::begin) and stop recording.
    fn commit(&mut self);

    /// Undo every write since [`begin`](Self::begin) and stop recording.
    /// Without an open journal this does nothing.
    fn rollback(&mut self);
}

/// An ordered map that journals the prior value of every key it overwrites.
#[derive(Debug, Clone)]
pub struct JournaledMap<K, V> {
    entries: BTreeMap<K, V>,
    /// Prior value per write, oldest first; `None` while no journal is open.
    undo: Option<Vec<(K, Option<V>)>>,
}

impl<K, V> Default for JournaledMap<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            undo: None,
        }
    }
}

impl<K: Ord + Clone, V: Clone> JournaledMap<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let prior = self.entries.insert(key.clone(), value);
        if let Some(undo) = self.undo.as_mut() {
            undo.push((key, prior.clone()));
        }
        prior
    }

    /// Mutable access to an existing entry. The entry is journaled whether
    /// or not the caller ends up writing through it.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        if let Some(undo) = self.undo.as_mut() {
            let prior = self.entries.get(key)?.clone();
            undo.push((key.clone(), Some(prior)));
        }
        self.entries.get_mut(key)
    }

    /// Number of writes the open journal would undo.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.undo.as_ref().map_or(0, Vec::len)
    }
}

impl<K: Ord + Clone, V: Clone> Transactional for JournaledMap<K, V> {
    fn begin(&mut self) {
        self.undo = Some(Vec::new());
    }

    fn commit(&mut self) {
        self.undo = None;
    }

    fn rollback(&mut self) {
        let Some(undo) = self.undo.take() else {
            return;
        };
        for (key, prior) in undo.into_iter().rev() {
            match prior {
                Some(value) => {
                    self.entries.insert(key, value);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }
}

/// An append-only log that truncates back to its length at
/// [`Transactional::begin`] on rollback.
#[derive(Debug, Clone)]
pub struct JournaledLog<T> {
    records: Vec<T>,
    mark: Option<usize>,
}

impl<T> Default for JournaledLog<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            mark: None,
        }
    }
}

impl<T> JournaledLog<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: T) {
        self.records.push(record);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.records
    }
}

impl<T> Transactional for JournaledLog<T> {
    fn begin(&mut self) {
        self.mark = Some(self.records.len());
    }

    fn commit(&mut self) {
        self.mark = None;
    }

    fn rollback(&mut self) {
        if let Some(mark) = self.mark.take() {
            self.records.truncate(mark);
        }
    }
}

/// A small value saved whole at [`Transactional::begin`].
///
/// Used for scalars and wiring slots. Reads go through [`Deref`]; writes
/// through [`set`](Self::set) or [`get_mut`](Self::get_mut).
#[derive(Debug, Clone, Default)]
pub struct Checkpoint<T> {
    value: T,
    saved: Option<T>,
}

impl<T> Deref for Checkpoint<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Clone> Checkpoint<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { value, saved: None }
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
    }
}

impl<T: Clone> Transactional for Checkpoint<T> {
    fn begin(&mut self) {
        self.saved = Some(self.value.clone());
    }

    fn commit(&mut self) {
        self.saved = None;
    }

    fn rollback(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.value = saved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_rollback_restores_touched_entries() {
        let mut map = JournaledMap::new();
        map.insert(1, "one");
        map.insert(2, "two");

        map.begin();
        map.insert(3, "three");
        map.insert(1, "uno");
        *map.get_mut(&2).unwrap() = "dos";
        map.insert(1, "eins");
        assert_eq!(map.pending_writes(), 4);
        map.rollback();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.get(&2), Some(&"two"));
        assert!(!map.contains_key(&3));
        assert_eq!(map.pending_writes(), 0);
    }

    #[test]
    fn map_commit_keeps_writes() {
        let mut map = JournaledMap::new();
        map.begin();
        map.insert("a", 1);
        map.commit();
        map.rollback();
        assert_eq!(map.get(&"a"), Some(&1));
    }

    #[test]
    fn map_writes_outside_a_journal_are_not_recorded() {
        let mut map = JournaledMap::new();
        map.insert(1, 1);
        assert!(map.get_mut(&9).is_none());
        assert_eq!(map.pending_writes(), 0);
        map.rollback();
        assert_eq!(map.get(&1), Some(&1));
    }

    #[test]
    fn log_rollback_truncates_to_mark() {
        let mut log = JournaledLog::new();
        log.push('a');
        log.begin();
        log.push('b');
        log.push('c');
        log.rollback();
        assert_eq!(log.as_slice(), &['a']);

        log.begin();
        log.push('d');
        log.commit();
        assert_eq!(log.as_slice(), &['a', 'd']);
    }

    #[test]
    fn checkpoint_restores_saved_value() {
        let mut fee = Checkpoint::new(5_u8);
        fee.begin();
        fee.set(8);
        *fee.get_mut() += 1;
        fee.rollback();
        assert_eq!(*fee, 5);

        fee.begin();
        fee.set(7);
        fee.commit();
        assert_eq!(*fee, 7);
    }
}
