//! Fixed-capacity slot block backing [`StableVec`](super::StableVec).
//!
//! ## Design
//!
//! A `Chunk` owns one heap block of exactly `N` slots and tracks how many of
//! them are constructed. It never grows past `N`, so the block is never
//! reallocated and every constructed slot keeps its address until the chunk
//! is dropped. Dropping a chunk drops its constructed slots only.
//!
//! ```text
//! [ v0 | v1 | v2 | .. | v(len-1) | uninit .. uninit ]
//!   <------- len ------------->   <--- N - len --->
//! ```

use std::slice;

/// One block of `N` element slots.
#[derive(Debug)]
pub(crate) struct Chunk<T, const N: usize> {
    /// Capacity is reserved up front and never exceeded
    slots: Vec<T>,
}

impl<T, const N: usize> Chunk<T, N> {
    /// Allocate an empty chunk with room for `N` slots.
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::with_capacity(N),
        }
    }

    /// Number of constructed slots
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when every slot is constructed
    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.slots.len() == N
    }

    /// Construct `value` in the next free slot.
    ///
    /// # Returns
    ///
    /// * `Ok(offset)` - slot offset the value now lives at
    /// * `Err(value)` - the chunk is full; the value is handed back untouched
    #[inline]
    pub(crate) fn try_push(&mut self, value: T) -> Result<usize, T> {
        if self.is_full() {
            return Err(value);
        }
        let offset = self.slots.len();
        // len < N <= capacity: no reallocation
        self.slots.push(value);
        Ok(offset)
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        &self.slots
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots
    }
}

impl<T: Clone, const N: usize> Clone for Chunk<T, N> {
    /// Deep copy that keeps the full `N` slot reservation.
    fn clone(&self) -> Self {
        let mut slots = Vec::with_capacity(N);
        slots.extend_from_slice(&self.slots);
        Self { slots }
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut Chunk<T, N> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter_mut()
    }
}

impl<T, const N: usize> IntoIterator for Chunk<T, N> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_new() {
        let chunk: Chunk<u32, 8> = Chunk::new();
        assert_eq!(chunk.len(), 0);
        assert!(!chunk.is_full());
        assert!(chunk.as_slice().is_empty());
    }

    #[test]
    fn test_chunk_fill_and_reject() {
        let mut chunk: Chunk<u32, 4> = Chunk::new();

        for i in 0..4 {
            assert_eq!(chunk.try_push(i * 10), Ok(i as usize));
        }
        assert!(chunk.is_full());

        // Full chunk hands the value back
        assert_eq!(chunk.try_push(99), Err(99));
        assert_eq!(chunk.as_slice(), &[0, 10, 20, 30]);
    }

    #[test]
    fn test_chunk_never_reallocates() {
        let mut chunk: Chunk<String, 16> = Chunk::new();
        chunk.try_push("first".to_string()).unwrap();
        let base = chunk.as_slice().as_ptr();

        for i in 1..16 {
            chunk.try_push(i.to_string()).unwrap();
        }

        assert_eq!(chunk.as_slice().as_ptr(), base);
        assert_eq!(chunk.as_slice()[0], "first");
    }

    #[test]
    fn test_chunk_clone_keeps_reservation() {
        let mut chunk: Chunk<u64, 8> = Chunk::new();
        chunk.try_push(1).unwrap();
        chunk.try_push(2).unwrap();

        let mut copy = chunk.clone();
        assert_eq!(copy.as_slice(), chunk.as_slice());

        let base = copy.as_slice().as_ptr();
        for i in 3..=8 {
            copy.try_push(i).unwrap();
        }
        assert!(copy.is_full());
        assert_eq!(copy.as_slice().as_ptr(), base);

        // Original untouched
        assert_eq!(chunk.len(), 2);
    }

    #[test]
    fn test_chunk_iter_mut() {
        let mut chunk: Chunk<i32, 4> = Chunk::new();
        chunk.try_push(1).unwrap();
        chunk.try_push(2).unwrap();

        for v in &mut chunk {
            *v *= 3;
        }
        assert_eq!(chunk.as_mut_slice(), &mut [3, 6]);
        assert_eq!(chunk.into_iter().collect::<Vec<_>>(), vec![3, 6]);
    }
}
