//! Price-keyed map built on [`StableVec`].
//!
//! ## Architecture
//!
//! `PriceMap<T, I>` keeps every entry in a [`StableVec`] of [`Slot`]s so a
//! value never moves once stored. The strategy `I` translates a price into a
//! slot index and tracks which slots are live:
//!
//! - [`SparseIndex`]: any price. Hash lookup on the price's bit pattern, erased
//!   slots go on a reuse stack and are overwritten by the next new key.
//! - [`DenseIndex`]: a bounded, tick-aligned ladder. The slot index is
//!   `round((price - min_price) / tick_size)`, no hashing at all.
//!
//! Entries are never physically removed. Erasing only marks the slot as not
//! live; iteration skips such slots.
//!
//! ## Performance
//!
//! | Operation | Sparse | Dense |
//! |-----------|--------|-------|
//! | insert / find / erase | O(1) average | O(1) |
//! | iteration | O(slots) | O(touched levels) |
//! | memory | peak live keys | one slot per level up to the highest touched |
//!
//! ## Example
//!
//! ```
//! use stable_price_map::{DensePriceMap, LadderConfig, SparsePriceMap};
//!
//! let mut bids: SparsePriceMap<u64> = SparsePriceMap::new();
//! bids.insert(100.25, 500).unwrap();
//! assert_eq!(bids.get(100.25), Some(&500));
//!
//! let config = LadderConfig::symmetric(100.0, 10.0, 0.01);
//! let mut ladder: DensePriceMap<u64> = DensePriceMap::new(config).unwrap();
//! ladder.insert(100.50, 7).unwrap();
//! assert!(ladder.insert(100.503, 8).is_err());
//! ```

mod dense;
mod iter;
mod sparse;

use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::sequence::StableVec;

pub use dense::{DenseIndex, LadderConfig, TICK_EPSILON};
pub use iter::{Iter, IterMut, Keys, Slots, Values, ValuesMut};
pub use sparse::{PriceKey, SparseIndex};

/// Map over arbitrary prices
pub type SparsePriceMap<T> = PriceMap<T, SparseIndex>;

/// Map over a bounded tick ladder
pub type DensePriceMap<T> = PriceMap<T, DenseIndex>;

/// One stored entry. Whether it is live is tracked by the strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T> {
    /// Price the slot was last written for
    pub price: f64,

    /// Stored value
    pub value: T,
}

/// Where a price lands in the slot storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The price already owns this live slot
    Occupied(usize),

    /// The price is absent and would be written to this slot. After
    /// [`SlotIndex::backfill`] the slot is either an existing index to
    /// overwrite or exactly `slots.len()`.
    Vacant(usize),
}

/// Price to slot mapping strategy behind a [`PriceMap`].
///
/// A new entry is written in three steps so a failure leaves no trace:
/// [`probe`](Self::probe) picks the slot without side effects,
/// [`backfill`](Self::backfill) makes the slot index addressable, and after
/// the value is stored [`commit`](Self::commit) marks the slot live.
pub trait SlotIndex<T> {
    /// Resolve `price` for a write or a checked read.
    ///
    /// # Errors
    ///
    /// Strategies with a bounded key space report `OutOfRange` here.
    fn probe(&self, price: f64, slot_count: usize) -> Result<Probe>;

    /// Grow `slots` so that index `slot` is at most `slots.len()`.
    fn backfill(&mut self, _slot: usize, _slots: &mut StableVec<Slot<T>>) {}

    /// Record that `slot` now holds a live entry for `price`.
    fn commit(&mut self, price: f64, slot: usize);

    /// Live slot for `price`. Unmappable prices are simply absent.
    fn locate(&self, price: f64) -> Option<usize>;

    /// Mark `slot`, currently live for `price`, as no longer live.
    fn release(&mut self, slot: usize, price: f64);

    fn is_live(&self, slot: usize) -> bool;

    /// Number of live entries
    fn live_count(&self) -> usize;

    /// Mark every one of the `slot_count` stored slots as not live.
    fn clear(&mut self, slot_count: usize);
}

/// Associative container from `f64` price to `T` with stable value addresses.
#[derive(Clone)]
pub struct PriceMap<T, I> {
    /// Entry storage; slots are overwritten, never removed
    slots: StableVec<Slot<T>>,

    /// Key mapping and occupancy
    index: I,
}

impl<T, I: SlotIndex<T>> PriceMap<T, I> {
    /// Wrap a strategy with empty storage
    pub fn with_index(index: I) -> Self {
        Self {
            slots: StableVec::new(),
            index,
        }
    }

    /// The indexing strategy
    #[inline]
    pub fn strategy(&self) -> &I {
        &self.index
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    /// Number of live entries
    #[inline]
    pub fn len(&self) -> usize {
        self.index.live_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots in the underlying storage, live or not
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert `value` at `price` unless a live entry already exists.
    ///
    /// # Returns
    ///
    /// The value stored at `price` and whether this call created it. On a
    /// duplicate the existing value is returned untouched and `value` is
    /// dropped.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when the strategy cannot map `price`.
    pub fn insert(&mut self, price: f64, value: T) -> Result<(&mut T, bool)> {
        self.emplace(price, || value)
    }

    /// Like [`insert`](Self::insert), but `make` only runs when a new entry
    /// is created.
    ///
    /// # Example
    ///
    /// ```
    /// use stable_price_map::SparsePriceMap;
    ///
    /// let mut book: SparsePriceMap<Vec<u64>> = SparsePriceMap::new();
    /// let (orders, created) = book.emplace(99.5, || Vec::with_capacity(16)).unwrap();
    /// orders.push(42);
    /// assert!(created);
    ///
    /// let (orders, created) = book.emplace(99.5, || unreachable!()).unwrap();
    /// assert!(!created);
    /// assert_eq!(*orders, vec![42]);
    /// ```
    pub fn emplace<F>(&mut self, price: f64, make: F) -> Result<(&mut T, bool)>
    where
        F: FnOnce() -> T,
    {
        match self.index.probe(price, self.slots.len())? {
            Probe::Occupied(slot) => Ok((&mut self.slots[slot].value, false)),
            Probe::Vacant(slot) => {
                let value = make();
                self.index.backfill(slot, &mut self.slots);
                self.store(slot, Slot { price, value });
                self.index.commit(price, slot);
                Ok((&mut self.slots[slot].value, true))
            }
        }
    }

    /// Subscript access: the value at `price`, created with `T::default()`
    /// when absent.
    pub fn get_or_default(&mut self, price: f64) -> Result<&mut T>
    where
        T: Default,
    {
        self.emplace(price, T::default).map(|(value, _)| value)
    }

    fn store(&mut self, slot: usize, entry: Slot<T>) {
        if slot == self.slots.len() {
            self.slots.push(entry);
        } else {
            // Drops whatever the dead slot still held
            self.slots[slot] = entry;
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Checked access.
    ///
    /// # Errors
    ///
    /// * `OutOfRange` - the strategy cannot map `price` at all
    /// * `KeyNotFound` - no live entry at `price`
    pub fn at(&self, price: f64) -> Result<&T> {
        match self.index.probe(price, self.slots.len())? {
            Probe::Occupied(slot) => Ok(&self.slots[slot].value),
            Probe::Vacant(_) => Err(Error::KeyNotFound { price }),
        }
    }

    /// Mutable checked access, see [`at`](Self::at)
    pub fn at_mut(&mut self, price: f64) -> Result<&mut T> {
        match self.index.probe(price, self.slots.len())? {
            Probe::Occupied(slot) => Ok(&mut self.slots[slot].value),
            Probe::Vacant(_) => Err(Error::KeyNotFound { price }),
        }
    }

    #[inline]
    pub fn get(&self, price: f64) -> Option<&T> {
        let slot = self.index.locate(price)?;
        Some(&self.slots[slot].value)
    }

    #[inline]
    pub fn get_mut(&mut self, price: f64) -> Option<&mut T> {
        let slot = self.index.locate(price)?;
        Some(&mut self.slots[slot].value)
    }

    /// Slot holding the live entry for `price`; `None` is the end position.
    #[inline]
    pub fn find(&self, price: f64) -> Option<usize> {
        self.index.locate(price)
    }

    #[inline]
    pub fn contains(&self, price: f64) -> bool {
        self.index.locate(price).is_some()
    }

    /// 1 if `price` has a live entry, else 0
    #[inline]
    pub fn count(&self, price: f64) -> usize {
        usize::from(self.contains(price))
    }

    /// The live entry at `slot`
    pub fn entry_at(&self, slot: usize) -> Option<(f64, &T)> {
        if !self.index.is_live(slot) {
            return None;
        }
        let entry = self.slots.get(slot)?;
        Some((entry.price, &entry.value))
    }

    /// First live slot at or after `slot`
    pub fn next_live(&self, slot: usize) -> Option<usize> {
        (slot..self.slots.len()).find(|&s| self.index.is_live(s))
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Erase the entry at `price`.
    ///
    /// # Returns
    ///
    /// 1 if an entry was removed, 0 otherwise. The slot keeps its storage.
    pub fn remove(&mut self, price: f64) -> usize {
        match self.index.locate(price) {
            Some(slot) => {
                self.release(slot);
                1
            }
            None => 0,
        }
    }

    /// Erase the live entry at `slot` and return the next live slot after
    /// it (`None` is the end position). A slot that is not live is left
    /// alone.
    ///
    /// # Example
    ///
    /// ```
    /// use stable_price_map::SparsePriceMap;
    ///
    /// let mut map: SparsePriceMap<u32> = [(1.0, 10), (2.0, 20), (3.0, 30)].into_iter().collect();
    /// let slot = map.find(2.0).unwrap();
    /// let next = map.remove_slot(slot);
    /// assert_eq!(next, map.find(3.0));
    /// assert!(!map.contains(2.0));
    /// ```
    pub fn remove_slot(&mut self, slot: usize) -> Option<usize> {
        if self.index.is_live(slot) {
            self.release(slot);
        }
        self.next_live(slot.saturating_add(1))
    }

    fn release(&mut self, slot: usize) {
        let price = self.slots[slot].price;
        self.index.release(slot, price);
    }

    /// Mark every entry as not live. Storage is kept for reuse.
    pub fn clear(&mut self) {
        self.index.clear(self.slots.len());
        debug!(slots = self.slots.len(), "price map cleared");
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Live `(price, &value)` pairs in ascending slot order
    pub fn iter(&self) -> Iter<'_, T, I> {
        Iter::new(self.slots())
    }

    /// Live `(price, &mut value)` pairs in ascending slot order
    pub fn iter_mut(&mut self) -> IterMut<'_, T, I> {
        IterMut::new(self.slots.iter_mut(), &self.index)
    }

    /// Live `(slot, price, &value)` triples in ascending slot order
    pub fn slots(&self) -> Slots<'_, T, I> {
        Slots::new(self.slots.iter(), &self.index)
    }

    pub fn keys(&self) -> Keys<'_, T, I> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, T, I> {
        Values::new(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, T, I> {
        ValuesMut::new(self.iter_mut())
    }
}

impl<T, I, J> PartialEq<PriceMap<T, J>> for PriceMap<T, I>
where
    T: PartialEq,
    I: SlotIndex<T>,
    J: SlotIndex<T>,
{
    /// Same set of `(price, value)` pairs, regardless of slot order.
    ///
    /// Each side's keys are looked up in the other, since a dense map
    /// matches prices within the tick tolerance while a sparse map matches
    /// exact bits.
    fn eq(&self, other: &PriceMap<T, J>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(price, value)| other.get(price) == Some(value))
            && other
                .iter()
                .all(|(price, value)| self.get(price) == Some(value))
    }
}

impl<T: fmt::Debug, I: SlotIndex<T>> fmt::Debug for PriceMap<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, T, I: SlotIndex<T>> IntoIterator for &'a PriceMap<T, I> {
    type Item = (f64, &'a T);
    type IntoIter = Iter<'a, T, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, I: SlotIndex<T>> IntoIterator for &'a mut PriceMap<T, I> {
    type Item = (f64, &'a mut T);
    type IntoIter = IterMut<'a, T, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
