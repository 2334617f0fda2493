//! Top-K selection over frozen count tables.
//!
//! Ranking order: higher count first; among equal counts the key observed earlier in the
//! stream ranks higher. Selection keeps a min-heap of at most `k` candidates, so a scan
//! costs O(distinct * log k) and never sorts the whole table.

use crate::error::RankError;
use crate::tally::{CountTable, NestedCountTable, Position};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt::Display;
use std::hash::Hash;

/// One selected key with its count and first-seen position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ranked<K> {
    pub key: K,
    pub count: u64,
    pub first_seen: Position,
}

/// Heap entry borrowing the key. `Greater` means "ranks higher".
struct Candidate<'a, K> {
    key: &'a K,
    count: u64,
    first_seen: Position,
}

impl<K> PartialEq for Candidate<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.first_seen == other.first_seen
    }
}

impl<K> Eq for Candidate<'_, K> {}

impl<K> Ord for Candidate<'_, K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.first_seen.cmp(&self.first_seen))
    }
}

impl<K> PartialOrd for Candidate<'_, K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The `k` highest-ranked keys, best first. Returns fewer when the table is smaller.
pub fn top_k<K: Eq + Hash + Clone>(table: &CountTable<K>, k: usize) -> Vec<Ranked<K>> {
    if k == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<Reverse<Candidate<'_, K>>> = BinaryHeap::with_capacity(k + 1);
    for (key, t) in table.iter() {
        let cand = Candidate { key, count: t.count, first_seen: t.first_seen };
        if heap.len() < k {
            heap.push(Reverse(cand));
            continue;
        }
        // Only displace the current weakest when strictly better.
        if let Some(Reverse(weakest)) = heap.peek() {
            if cand > *weakest {
                heap.pop();
                heap.push(Reverse(cand));
            }
        }
    }
    // Ascending by Reverse == descending by rank.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(c)| Ranked { key: c.key.clone(), count: c.count, first_seen: c.first_seen })
        .collect()
}

/// Like [`top_k`] but an empty table is an error when `k > 0`.
pub fn top_k_non_empty<K: Eq + Hash + Clone>(
    table: &CountTable<K>,
    k: usize,
) -> Result<Vec<Ranked<K>>, RankError> {
    if k > 0 && table.is_empty() {
        return Err(RankError::EmptyInput { k });
    }
    Ok(top_k(table, k))
}

/// The single best inner key recorded under `outer`.
pub fn top_one<O, I>(nested: &NestedCountTable<O, I>, outer: &O) -> Result<Ranked<I>, RankError>
where
    O: Eq + Hash + Clone + Display,
    I: Eq + Hash + Clone,
{
    nested
        .get(outer)
        .and_then(|table| top_k(table, 1).into_iter().next())
        .ok_or_else(|| RankError::NoAuthorForDate { date: outer.to_string() })
}
