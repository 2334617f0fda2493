//! Count tables: per-key occurrence counts plus the stream position where each key was
//! first observed, and the nested (outer -> inner) variant used by the date statistic.
//!
//! Memory grows with the number of distinct keys, never with the number of records.

use ahash::RandomState;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Where in the stream an observation happened: the record's global line index and the
/// index of the key within that record. Earlier positions order first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u64,
    pub slot: u32,
}

impl Position {
    pub fn new(line: u64, slot: u32) -> Self {
        Self { line, slot }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tally {
    pub count: u64,
    pub first_seen: Position,
}

/// Mapping from key to a count >= 1 and its first-seen position.
#[derive(Clone, Debug)]
pub struct CountTable<K> {
    entries: HashMap<K, Tally, RandomState>,
    total: u64,
    // One past the latest line observed by any route; `observe` stamps from here.
    next_line: u64,
}

impl<K> Default for CountTable<K> {
    fn default() -> Self {
        Self { entries: HashMap::with_hasher(RandomState::new()), total: 0, next_line: 0 }
    }
}

impl<K: Eq + Hash> CountTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence, stamped after every position this table has seen so far
    /// (including those from `observe_at` and `merge`).
    pub fn observe<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let at = Position::new(self.next_line, 0);
        self.observe_at(key, at);
    }

    /// Count one occurrence at an explicit stream position.
    /// Only allocates an owned key the first time it is seen.
    pub fn observe_at<Q>(&mut self, key: &Q, at: Position)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.total += 1;
        self.next_line = self.next_line.max(at.line.saturating_add(1));
        if let Some(t) = self.entries.get_mut(key) {
            t.count += 1;
            if at < t.first_seen { t.first_seen = at; }
            return;
        }
        self.entries.insert(key.to_owned(), Tally { count: 1, first_seen: at });
    }

    pub fn get<Q>(&self, key: &Q) -> Option<Tally>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).copied()
    }

    pub fn count<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|t| t.count).unwrap_or(0)
    }

    /// Sum of every key's count.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Tally)> {
        self.entries.iter()
    }

    /// Element-wise sum of counts; first-seen becomes the earlier of the two positions.
    pub fn merge(&mut self, other: CountTable<K>) {
        self.total += other.total;
        self.next_line = self.next_line.max(other.next_line);
        for (k, t) in other.entries {
            match self.entries.get_mut(&k) {
                Some(mine) => {
                    mine.count += t.count;
                    mine.first_seen = mine.first_seen.min(t.first_seen);
                }
                None => {
                    self.entries.insert(k, t);
                }
            }
        }
    }
}

/// Outer key -> count table over inner keys.
#[derive(Clone, Debug)]
pub struct NestedCountTable<O, I> {
    inner: HashMap<O, CountTable<I>, RandomState>,
}

impl<O, I> Default for NestedCountTable<O, I> {
    fn default() -> Self {
        Self { inner: HashMap::with_hasher(RandomState::new()) }
    }
}

impl<O: Eq + Hash + Clone, I: Eq + Hash> NestedCountTable<O, I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_nested<Q>(&mut self, outer: &O, inner: &Q, at: Position)
    where
        I: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = I> + ?Sized,
    {
        if let Some(table) = self.inner.get_mut(outer) {
            table.observe_at(inner, at);
            return;
        }
        let mut table = CountTable::new();
        table.observe_at(inner, at);
        self.inner.insert(outer.clone(), table);
    }

    pub fn get(&self, outer: &O) -> Option<&CountTable<I>> {
        self.inner.get(outer)
    }

    /// Sum of the nested counts under `outer` (0 when absent).
    pub fn total_for(&self, outer: &O) -> u64 {
        self.inner.get(outer).map(|t| t.total()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn merge(&mut self, other: NestedCountTable<O, I>) {
        for (outer, table) in other.inner {
            match self.inner.get_mut(&outer) {
                Some(mine) => mine.merge(table),
                None => {
                    self.inner.insert(outer, table);
                }
            }
        }
    }
}
