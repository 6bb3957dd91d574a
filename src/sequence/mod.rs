//! Growth-stable chunked sequence.
//!
//! ## Architecture
//!
//! `StableVec` stores elements in fixed-size chunks held by a chunk
//! directory:
//!
//! ```text
//! directory: [ chunk0 ][ chunk1 ][ chunk2 ]
//!               |          |          |
//!               v          v          v
//!            N slots    N slots    N slots (last may be partial)
//! ```
//!
//! - **Append** fills the tail chunk and allocates a new one when it is full.
//!   Existing chunks are never resized or moved, so an element keeps its
//!   address for as long as the container lives.
//! - **Index** `i` splits into `(i >> log2(N), i & (N - 1))`. `N` must be a
//!   power of two; this is checked at compile time.
//! - Every chunk before the tail is full. Chunks allocated by `reserve` stay
//!   empty until appends reach them.
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | push | O(1) amortized |
//! | index / get / at | O(1) |
//! | reserve(n) | O(n / N) |
//! | clone | O(len) |
//!
//! ## Example
//!
//! ```
//! use stable_price_map::StableVec;
//!
//! let mut v: StableVec<u64, 4> = StableVec::new();
//! v.push(10);
//! let first = &v[0] as *const u64;
//!
//! for i in 0..100 {
//!     v.push(i);
//! }
//!
//! // The first element has not moved
//! assert_eq!(first, &v[0] as *const u64);
//! assert_eq!(v.capacity(), 104);
//! ```

mod chunk;
mod iter;

use std::fmt;
use std::ops::{Index, IndexMut};

use tracing::trace;

use crate::error::{OutOfRange, Result};
use chunk::Chunk;

pub use iter::{IntoIter, Iter, IterMut};

/// Chunk size used when none is given
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// A vector whose elements never move once pushed.
///
/// `N` is the number of slots per chunk and must be a non-zero power of two.
#[derive(Clone)]
pub struct StableVec<T, const N: usize = DEFAULT_CHUNK_SIZE> {
    /// Chunk directory, each chunk owning its own slot block
    chunks: Vec<Chunk<T, N>>,

    /// Number of constructed elements across all chunks
    len: usize,
}

impl<T, const N: usize> StableVec<T, N> {
    /// log2(N), rejected at compile time unless N is a power of two
    const SHIFT: u32 = {
        assert!(N.is_power_of_two(), "chunk size must be a non-zero power of two");
        N.trailing_zeros()
    };

    const MASK: usize = N - 1;

    /// Create an empty sequence. No chunk is allocated until the first push.
    pub fn new() -> Self {
        let _ = Self::SHIFT;
        Self {
            chunks: Vec::new(),
            len: 0,
        }
    }

    /// Create an empty sequence with at least `capacity` slots allocated
    ///
    /// # Example
    ///
    /// ```
    /// use stable_price_map::StableVec;
    ///
    /// let v: StableVec<u8, 8> = StableVec::with_capacity(20);
    /// assert_eq!(v.capacity(), 24);
    /// assert!(v.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let mut v = Self::new();
        v.reserve(capacity);
        v
    }

    /// Create a sequence holding `count` clones of `value`
    pub fn from_elem(count: usize, value: T) -> Self
    where
        T: Clone,
    {
        let mut v = Self::with_capacity(count);
        for _ in 0..count {
            v.push(value.clone());
        }
        v
    }

    #[inline]
    fn split(index: usize) -> (usize, usize) {
        (index >> Self::SHIFT, index & Self::MASK)
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    /// Slots per chunk
    #[inline]
    pub const fn chunk_size(&self) -> usize {
        N
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated slots: `chunk_count() * N`
    #[inline]
    pub fn capacity(&self) -> usize {
        self.chunks.len() * N
    }

    /// Number of allocated chunks, including reserved empty ones
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Allocate chunks until `capacity() >= capacity`. Never shrinks.
    pub fn reserve(&mut self, capacity: usize) {
        while self.capacity() < capacity {
            self.add_chunk();
        }
    }

    fn add_chunk(&mut self) {
        self.chunks.push(Chunk::new());
        trace!(chunks = self.chunks.len(), chunk_size = N, "allocated chunk");
    }

    // ========================================================================
    // Append
    // ========================================================================

    /// Append `value` and return a reference to its slot.
    ///
    /// Allocates a new chunk when the tail chunk is full. Elements already
    /// stored are never touched.
    pub fn push(&mut self, value: T) -> &mut T {
        let (chunk, _) = Self::split(self.len);
        if chunk == self.chunks.len() {
            self.add_chunk();
        }

        let offset = self.chunks[chunk]
            .try_push(value)
            .ok()
            .expect("chunks before the tail are full");
        self.len += 1;

        &mut self.chunks[chunk].as_mut_slice()[offset]
    }

    /// Append the value produced by `make`, constructed directly for its slot.
    #[inline]
    pub fn push_with<F>(&mut self, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.push(make())
    }

    /// Append `T::default()`
    #[inline]
    pub fn push_default(&mut self) -> &mut T
    where
        T: Default,
    {
        self.push(T::default())
    }

    // ========================================================================
    // Element Access
    // ========================================================================

    /// Element at `index`, or `None` past the end
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        let (chunk, offset) = Self::split(index);
        self.chunks.get(chunk)?.as_slice().get(offset)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let (chunk, offset) = Self::split(index);
        self.chunks.get_mut(chunk)?.as_mut_slice().get_mut(offset)
    }

    /// Bounds-checked access
    ///
    /// # Errors
    ///
    /// `OutOfRange::Index` when `index >= len()`.
    ///
    /// # Example
    ///
    /// ```
    /// use stable_price_map::{Error, OutOfRange, StableVec};
    ///
    /// let v: StableVec<i32> = StableVec::from([1, 2, 3]);
    /// assert_eq!(v.at(2), Ok(&3));
    /// assert_eq!(
    ///     v.at(3),
    ///     Err(Error::OutOfRange(OutOfRange::Index { index: 3, len: 3 }))
    /// );
    /// ```
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.get(index)
            .ok_or_else(|| OutOfRange::Index { index, len }.into())
    }

    /// Mutable bounds-checked access
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.get_mut(index)
            .ok_or_else(|| OutOfRange::Index { index, len }.into())
    }

    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    #[inline]
    pub fn first_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut T> {
        let last = self.len.checked_sub(1)?;
        self.get_mut(last)
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Iterate by position; each step re-derives the chunk and offset.
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter::new(self)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T, N> {
        IterMut::new(self.chunks.iter_mut(), self.len)
    }

    /// One slice per allocated chunk, in order. Reserved chunks show up empty.
    pub fn chunks(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.chunks.iter().map(Chunk::as_slice)
    }

    /// Exchange contents with `other` without touching any element
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

impl<T, const N: usize> Default for StableVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Index<usize> for StableVec<T, N> {
    type Output = T;

    /// Unchecked-style access: panics if `index >= len()`.
    #[inline]
    fn index(&self, index: usize) -> &T {
        let (chunk, offset) = Self::split(index);
        &self.chunks[chunk].as_slice()[offset]
    }
}

impl<T, const N: usize> IndexMut<usize> for StableVec<T, N> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let (chunk, offset) = Self::split(index);
        &mut self.chunks[chunk].as_mut_slice()[offset]
    }
}

impl<T: PartialEq<U>, U, const N: usize, const M: usize> PartialEq<StableVec<U, M>>
    for StableVec<T, N>
{
    /// Element-wise, independent of chunk size and reserved capacity
    fn eq(&self, other: &StableVec<U, M>) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, const N: usize> Eq for StableVec<T, N> {}

impl<T: fmt::Debug, const N: usize> fmt::Debug for StableVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, const N: usize> Extend<T> for StableVec<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T: Copy + 'a, const N: usize> Extend<&'a T> for StableVec<T, N> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const N: usize> FromIterator<T> for StableVec<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Self::new();
        v.extend(iter);
        v
    }
}

impl<T, const N: usize> From<Vec<T>> for StableVec<T, N> {
    fn from(values: Vec<T>) -> Self {
        let mut v = Self::with_capacity(values.len());
        v.extend(values);
        v
    }
}

impl<T, const N: usize, const K: usize> From<[T; K]> for StableVec<T, N> {
    fn from(values: [T; K]) -> Self {
        let mut v = Self::with_capacity(K);
        v.extend(values);
        v
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a StableVec<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut StableVec<T, N> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, const N: usize> IntoIterator for StableVec<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.chunks.into_iter(), self.len)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
