//! # Key Index
//!
//! Maps a join key to the positions of every record carrying it. Built once
//! per input collection, it replaces a linear scan per lookup.
//!
//! ## Invariant: Duplicates Preserved
//!
//! Records sharing a key all stay in the key's position list, in arrival
//! order. A lookup returns exactly the records a full scan would have
//! matched, so the index changes cost, never result shape.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Multi-valued index from key to record positions.
#[derive(Debug, Clone)]
pub struct KeyedIndex<K> {
    positions: HashMap<K, Vec<usize>>,
    records: usize,
}

impl<K: Eq + Hash> KeyedIndex<K> {
    /// Indexes `records` by `key`.
    pub fn build<T>(records: &[T], key: impl Fn(&T) -> K) -> Self {
        let mut positions: HashMap<K, Vec<usize>> = HashMap::new();
        for (position, record) in records.iter().enumerate() {
            positions.entry(key(record)).or_default().push(position);
        }
        Self {
            positions,
            records: records.len(),
        }
    }

    /// Positions of every record with this key, in arrival order.
    pub fn get<Q>(&self, key: &Q) -> &[usize]
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.positions.get(key).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indexed records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_kept_in_order() {
        let records = ["b", "a", "b", "c", "b"];
        let index = KeyedIndex::build(&records, |r| r.to_string());

        assert_eq!(index.get("b"), &[0, 2, 4]);
        assert_eq!(index.get("a"), &[1]);
        assert!(index.get("z").is_empty());
        assert_eq!(index.key_count(), 3);
        assert_eq!(index.record_count(), 5);
    }

    #[test]
    fn test_lookup_matches_linear_scan() {
        let records: Vec<u32> = vec![5, 1, 5, 5, 2, 9, 1];
        let index = KeyedIndex::build(&records, |r| *r);

        for key in 0..10u32 {
            let scanned: Vec<usize> = records
                .iter()
                .enumerate()
                .filter(|(_, r)| **r == key)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(index.get(&key), scanned.as_slice());
        }
    }
}
