//! Iterators over the live entries of a [`PriceMap`](super::PriceMap).
//!
//! Entries come out in ascending slot order, not price order. The price is
//! handed out by value and the value by reference, so callers can never
//! rewrite a key in place.

use std::iter::{Enumerate, FusedIterator};

use super::{Slot, SlotIndex};
use crate::sequence::{self, DEFAULT_CHUNK_SIZE};

type SlotIter<'a, T> = sequence::Iter<'a, Slot<T>, DEFAULT_CHUNK_SIZE>;
type SlotIterMut<'a, T> = sequence::IterMut<'a, Slot<T>, DEFAULT_CHUNK_SIZE>;

/// Live `(slot, price, &value)` triples.
pub struct Slots<'a, T, I> {
    inner: Enumerate<SlotIter<'a, T>>,
    index: &'a I,
    /// Live entries not yet yielded
    remaining: usize,
}

impl<'a, T, I: SlotIndex<T>> Slots<'a, T, I> {
    pub(super) fn new(slots: SlotIter<'a, T>, index: &'a I) -> Self {
        Self {
            inner: slots.enumerate(),
            index,
            remaining: index.live_count(),
        }
    }
}

impl<'a, T, I: SlotIndex<T>> Iterator for Slots<'a, T, I> {
    type Item = (usize, f64, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let (slot, entry) = self.inner.next()?;
            if self.index.is_live(slot) {
                self.remaining -= 1;
                return Some((slot, entry.price, &entry.value));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, I: SlotIndex<T>> DoubleEndedIterator for Slots<'_, T, I> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let (slot, entry) = self.inner.next_back()?;
            if self.index.is_live(slot) {
                self.remaining -= 1;
                return Some((slot, entry.price, &entry.value));
            }
        }
        None
    }
}

impl<T, I: SlotIndex<T>> ExactSizeIterator for Slots<'_, T, I> {}

impl<T, I: SlotIndex<T>> FusedIterator for Slots<'_, T, I> {}

/// Live `(price, &value)` pairs.
pub struct Iter<'a, T, I> {
    inner: Slots<'a, T, I>,
}

impl<'a, T, I: SlotIndex<T>> Iter<'a, T, I> {
    pub(super) fn new(inner: Slots<'a, T, I>) -> Self {
        Self { inner }
    }
}

impl<'a, T, I: SlotIndex<T>> Iterator for Iter<'a, T, I> {
    type Item = (f64, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, price, value)| (price, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, I: SlotIndex<T>> DoubleEndedIterator for Iter<'_, T, I> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, price, value)| (price, value))
    }
}

impl<T, I: SlotIndex<T>> ExactSizeIterator for Iter<'_, T, I> {}

impl<T, I: SlotIndex<T>> FusedIterator for Iter<'_, T, I> {}

/// Live `(price, &mut value)` pairs.
pub struct IterMut<'a, T, I> {
    inner: Enumerate<SlotIterMut<'a, T>>,
    index: &'a I,
    remaining: usize,
}

impl<'a, T, I: SlotIndex<T>> IterMut<'a, T, I> {
    pub(super) fn new(slots: SlotIterMut<'a, T>, index: &'a I) -> Self {
        Self {
            inner: slots.enumerate(),
            index,
            remaining: index.live_count(),
        }
    }
}

impl<'a, T, I: SlotIndex<T>> Iterator for IterMut<'a, T, I> {
    type Item = (f64, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let (slot, entry) = self.inner.next()?;
            if self.index.is_live(slot) {
                self.remaining -= 1;
                return Some((entry.price, &mut entry.value));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, I: SlotIndex<T>> ExactSizeIterator for IterMut<'_, T, I> {}

impl<T, I: SlotIndex<T>> FusedIterator for IterMut<'_, T, I> {}

/// Live prices.
pub struct Keys<'a, T, I> {
    inner: Iter<'a, T, I>,
}

impl<'a, T, I: SlotIndex<T>> Keys<'a, T, I> {
    pub(super) fn new(inner: Iter<'a, T, I>) -> Self {
        Self { inner }
    }
}

impl<T, I: SlotIndex<T>> Iterator for Keys<'_, T, I> {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        self.inner.next().map(|(price, _)| price)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, I: SlotIndex<T>> ExactSizeIterator for Keys<'_, T, I> {}

/// Live values.
pub struct Values<'a, T, I> {
    inner: Iter<'a, T, I>,
}

impl<'a, T, I: SlotIndex<T>> Values<'a, T, I> {
    pub(super) fn new(inner: Iter<'a, T, I>) -> Self {
        Self { inner }
    }
}

impl<'a, T, I: SlotIndex<T>> Iterator for Values<'a, T, I> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(_, value)| value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, I: SlotIndex<T>> ExactSizeIterator for Values<'_, T, I> {}

/// Live values, mutably.
pub struct ValuesMut<'a, T, I> {
    inner: IterMut<'a, T, I>,
}

impl<'a, T, I: SlotIndex<T>> ValuesMut<'a, T, I> {
    pub(super) fn new(inner: IterMut<'a, T, I>) -> Self {
        Self { inner }
    }
}

impl<'a, T, I: SlotIndex<T>> Iterator for ValuesMut<'a, T, I> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        self.inner.next().map(|(_, value)| value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, I: SlotIndex<T>> ExactSizeIterator for ValuesMut<'_, T, I> {}

// ============================================================================
// Unit Tests
// ============================================================================
