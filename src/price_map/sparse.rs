//! Hash-indexed strategy for arbitrary prices.
//!
//! ## Design
//!
//! - `lookup`: price key to slot, for live entries only
//! - `free`: stack of erased slots; the most recently erased one is reused
//!   first by the next new key
//! - `vacant`: one bit per stored slot, set while the slot sits on `free`
//!
//! A reused slot is overwritten in place, so storage only grows when no
//! erased slot is available and its size tracks the peak number of live keys.

use bit_vec::BitVec;
use rustc_hash::FxHashMap;

use super::{PriceMap, Probe, SlotIndex};
use crate::error::Result;
use crate::sequence::StableVec;

/// Hashable identity of a price.
///
/// Two prices are the same key when their bit patterns match, after `-0.0`
/// is folded into `+0.0`. A NaN key only matches the identical NaN pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceKey(u64);

impl PriceKey {
    #[inline]
    pub fn new(price: f64) -> Self {
        // 0.0 == -0.0
        if price == 0.0 {
            Self(0)
        } else {
            Self(price.to_bits())
        }
    }

    /// The price this key stands for
    #[inline]
    pub fn price(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl From<f64> for PriceKey {
    fn from(price: f64) -> Self {
        Self::new(price)
    }
}

/// Strategy state for [`SparsePriceMap`](super::SparsePriceMap).
#[derive(Debug, Clone, Default)]
pub struct SparseIndex {
    lookup: FxHashMap<PriceKey, usize>,
    free: Vec<usize>,
    vacant: BitVec,
}

impl SparseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the key table for `capacity` live prices
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lookup: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            free: Vec::new(),
            vacant: BitVec::with_capacity(capacity),
        }
    }

    /// Erased slots waiting to be reused
    #[inline]
    pub fn free_slot_count(&self) -> usize {
        self.free.len()
    }
}

impl<T> SlotIndex<T> for SparseIndex {
    fn probe(&self, price: f64, slot_count: usize) -> Result<Probe> {
        if let Some(&slot) = self.lookup.get(&PriceKey::new(price)) {
            return Ok(Probe::Occupied(slot));
        }
        Ok(Probe::Vacant(self.free.last().copied().unwrap_or(slot_count)))
    }

    fn commit(&mut self, price: f64, slot: usize) {
        if self.free.last() == Some(&slot) {
            self.free.pop();
            self.vacant.set(slot, false);
        } else {
            debug_assert_eq!(slot, self.vacant.len());
            self.vacant.push(false);
        }
        self.lookup.insert(PriceKey::new(price), slot);
    }

    #[inline]
    fn locate(&self, price: f64) -> Option<usize> {
        self.lookup.get(&PriceKey::new(price)).copied()
    }

    fn release(&mut self, slot: usize, price: f64) {
        if self.lookup.remove(&PriceKey::new(price)).is_some() {
            self.free.push(slot);
            self.vacant.set(slot, true);
        }
    }

    #[inline]
    fn is_live(&self, slot: usize) -> bool {
        self.vacant.get(slot) == Some(false)
    }

    #[inline]
    fn live_count(&self) -> usize {
        self.lookup.len()
    }

    fn clear(&mut self, slot_count: usize) {
        self.lookup.clear();
        self.free.clear();
        // Reversed so the lowest slot is handed out first
        self.free.extend((0..slot_count).rev());
        self.vacant.set_all();
    }
}

impl<T> PriceMap<T, SparseIndex> {
    pub fn new() -> Self {
        Self {
            slots: StableVec::new(),
            index: SparseIndex::new(),
        }
    }

    /// Empty map with room for `capacity` entries before any allocation
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: StableVec::with_capacity(capacity),
            index: SparseIndex::with_capacity(capacity),
        }
    }

    /// Erased slots the next inserts will overwrite
    #[inline]
    pub fn free_slot_count(&self) -> usize {
        self.index.free_slot_count()
    }
}

impl<T> Default for PriceMap<T, SparseIndex> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<(f64, T)> for PriceMap<T, SparseIndex> {
    /// Keeps the first value seen for a repeated price
    fn extend<It: IntoIterator<Item = (f64, T)>>(&mut self, iter: It) {
        for (price, value) in iter {
            // Sparse probing cannot fail
            let _ = self.insert(price, value);
        }
    }
}

impl<T> FromIterator<(f64, T)> for PriceMap<T, SparseIndex> {
    fn from_iter<It: IntoIterator<Item = (f64, T)>>(iter: It) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity(iter.size_hint().0);
        map.extend(iter);
        map
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
