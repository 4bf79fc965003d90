//! In-memory reference implementation of the ordered-store contract.
//!
//! Backed by `BTreeSet<Vec<u8>>` per series, so member ordering is exactly
//! the lexicographic byte order the contract requires. Used by the test
//! suites and by embedded callers that do not bring their own store.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use crate::bounds::{LexBound, LexRange};
use crate::traits::{Limit, SeriesStore};

/// BTreeMap-backed store satisfying [`SeriesStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    series: BTreeMap<String, BTreeSet<Vec<u8>>>,
    maps: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one field from a hash destination (test observability).
    pub fn map_get(&self, key: &str, field: &str) -> Option<&str> {
        self.maps.get(key)?.get(field).map(String::as_str)
    }

    /// True if the series key currently exists (has at least one member).
    pub fn series_exists(&self, key: &str) -> bool {
        self.series.contains_key(key)
    }

    fn range_bounds(range: &LexRange) -> (Bound<Vec<u8>>, Bound<Vec<u8>>) {
        let min = match &range.min {
            LexBound::Unbounded => Bound::Unbounded,
            LexBound::Included(b) => Bound::Included(b.clone()),
            LexBound::Excluded(b) => Bound::Excluded(b.clone()),
        };
        let max = match &range.max {
            LexBound::Unbounded => Bound::Unbounded,
            LexBound::Included(b) => Bound::Included(b.clone()),
            LexBound::Excluded(b) => Bound::Excluded(b.clone()),
        };
        (min, max)
    }

    fn matching<'a>(
        set: &'a BTreeSet<Vec<u8>>,
        range: &LexRange,
    ) -> Box<dyn Iterator<Item = &'a Vec<u8>> + 'a> {
        // BTreeSet::range panics on inverted bounds; the contract says an
        // inverted range simply matches nothing.
        if range.is_empty_range() {
            return Box::new(std::iter::empty());
        }
        Box::new(set.range::<Vec<u8>, _>(Self::range_bounds(range)))
    }

    fn paginate(members: Vec<Vec<u8>>, limit: Option<Limit>) -> Vec<Vec<u8>> {
        match limit {
            Some(l) => l.apply(members),
            None => members,
        }
    }
}

impl SeriesStore for MemoryStore {
    fn insert(&mut self, key: &str, member: &[u8]) -> bool {
        self.series
            .entry(key.to_string())
            .or_default()
            .insert(member.to_vec())
    }

    fn remove(&mut self, key: &str, members: &[Vec<u8>]) -> usize {
        let Some(set) = self.series.get_mut(key) else {
            return 0;
        };
        let removed = members.iter().filter(|m| set.remove(*m)).count();
        if set.is_empty() {
            self.series.remove(key);
        }
        removed
    }

    fn card(&self, key: &str) -> usize {
        self.series.get(key).map_or(0, BTreeSet::len)
    }

    fn scan(&self, key: &str, range: &LexRange, limit: Option<Limit>) -> Vec<Vec<u8>> {
        let Some(set) = self.series.get(key) else {
            return Vec::new();
        };
        let members: Vec<Vec<u8>> = Self::matching(set, range).cloned().collect();
        Self::paginate(members, limit)
    }

    fn scan_rev(&self, key: &str, range: &LexRange, limit: Option<Limit>) -> Vec<Vec<u8>> {
        let Some(set) = self.series.get(key) else {
            return Vec::new();
        };
        let mut members: Vec<Vec<u8>> = Self::matching(set, range).cloned().collect();
        members.reverse();
        Self::paginate(members, limit)
    }

    fn count(&self, key: &str, range: &LexRange) -> usize {
        self.series
            .get(key)
            .map_or(0, |set| Self::matching(set, range).count())
    }

    fn remove_range(&mut self, key: &str, range: &LexRange) -> usize {
        let Some(set) = self.series.get_mut(key) else {
            return 0;
        };
        let doomed: Vec<Vec<u8>> = Self::matching(set, range).cloned().collect();
        for m in &doomed {
            set.remove(m);
        }
        if set.is_empty() {
            self.series.remove(key);
        }
        doomed.len()
    }

    fn map_put(&mut self, key: &str, field: &str, value: &str) {
        self.maps
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    fn map_len(&self, key: &str) -> usize {
        self.maps.get(key).map_or(0, BTreeMap::len)
    }
}
