//! Iterators over [`StableVec`].
//!
//! [`Iter`] is a `(container, position)` pair: every step re-derives the
//! chunk and offset from the logical index, and `nth` jumps in O(1).
//! [`IterMut`] and [`IntoIter`] walk the chunk directory instead, since
//! exclusive access cannot be re-derived from a shared position.

use std::iter::{FusedIterator, Flatten};
use std::slice;
use std::vec;

use super::chunk::Chunk;
use super::StableVec;

/// Shared iterator, positioned by logical index.
pub struct Iter<'a, T, const N: usize> {
    vec: &'a StableVec<T, N>,
    front: usize,
    back: usize,
}

impl<'a, T, const N: usize> Iter<'a, T, N> {
    pub(super) fn new(vec: &'a StableVec<T, N>) -> Self {
        Self {
            vec,
            front: 0,
            back: vec.len(),
        }
    }

    /// Logical index of the next element `next()` would yield
    #[inline]
    pub fn position(&self) -> usize {
        self.front
    }
}

impl<T, const N: usize> Clone for Iter<'_, T, N> {
    fn clone(&self) -> Self {
        Self {
            vec: self.vec,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let item = &self.vec[self.front];
        self.front += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<&'a T> {
        if n >= self.back - self.front {
            self.front = self.back;
            return None;
        }
        self.front += n;
        self.next()
    }

    #[inline]
    fn count(self) -> usize {
        self.back - self.front
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T, const N: usize> DoubleEndedIterator for Iter<'a, T, N> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(&self.vec[self.back])
    }

    fn nth_back(&mut self, n: usize) -> Option<&'a T> {
        if n >= self.back - self.front {
            self.back = self.front;
            return None;
        }
        self.back -= n;
        self.next_back()
    }
}

impl<T, const N: usize> ExactSizeIterator for Iter<'_, T, N> {}

impl<T, const N: usize> FusedIterator for Iter<'_, T, N> {}

/// Mutable iterator over all elements in order.
pub struct IterMut<'a, T, const N: usize> {
    inner: Flatten<slice::IterMut<'a, Chunk<T, N>>>,
    remaining: usize,
}

impl<'a, T, const N: usize> IterMut<'a, T, N> {
    pub(super) fn new(chunks: slice::IterMut<'a, Chunk<T, N>>, len: usize) -> Self {
        Self {
            inner: chunks.flatten(),
            remaining: len,
        }
    }
}

impl<'a, T, const N: usize> Iterator for IterMut<'a, T, N> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        let item = self.inner.next()?;
        self.remaining -= 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, const N: usize> DoubleEndedIterator for IterMut<'a, T, N> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut T> {
        let item = self.inner.next_back()?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T, const N: usize> ExactSizeIterator for IterMut<'_, T, N> {}

impl<T, const N: usize> FusedIterator for IterMut<'_, T, N> {}

/// Owning iterator.
pub struct IntoIter<T, const N: usize> {
    inner: Flatten<vec::IntoIter<Chunk<T, N>>>,
    remaining: usize,
}

impl<T, const N: usize> IntoIter<T, N> {
    pub(super) fn new(chunks: vec::IntoIter<Chunk<T, N>>, len: usize) -> Self {
        Self {
            inner: chunks.flatten(),
            remaining: len,
        }
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        let item = self.inner.next()?;
        self.remaining -= 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        let item = self.inner.next_back()?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::StableVec;

    #[test]
    fn test_iter_empty() {
        let mut v: StableVec<i32, 8> = StableVec::new();
        assert_eq!(v.iter().next(), None);
        assert_eq!(v.iter().len(), 0);
        assert_eq!(v.iter_mut().next(), None);
        assert_eq!(v.into_iter().next(), None);
    }

    #[test]
    fn test_iter_in_order_across_chunks() {
        let v: StableVec<usize, 2> = (0..7).collect();
        let seen: Vec<usize> = v.iter().copied().collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 6]);

        let mut i = 0;
        for value in &v {
            assert_eq!(*value, i);
            i += 1;
        }
        assert_eq!(i, 7);
    }

    #[test]
    fn test_iter_random_access() {
        let v: StableVec<i32, 4> = StableVec::from([0, 1, 2, 3, 4]);

        let mut it = v.iter();
        assert_eq!(it.nth(3), Some(&3));
        assert_eq!(it.position(), 4);
        assert_eq!(it.next(), Some(&4));
        assert_eq!(it.next(), None);

        let mut it = v.iter();
        assert_eq!(it.nth(10), None);
        assert_eq!(it.next(), None);

        assert_eq!(v.iter().last(), Some(&4));
        assert_eq!(v.iter().count(), 5);
        assert_eq!(v.iter().skip(2).next(), Some(&2));
    }

    #[test]
    fn test_iter_double_ended() {
        let v: StableVec<i32, 2> = StableVec::from([0, 1, 2, 3, 4]);
        let rev: Vec<i32> = v.iter().rev().copied().collect();
        assert_eq!(rev, vec![4, 3, 2, 1, 0]);

        let mut it = v.iter();
        assert_eq!(it.next(), Some(&0));
        assert_eq!(it.next_back(), Some(&4));
        assert_eq!(it.nth_back(1), Some(&2));
        assert_eq!(it.len(), 1);
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn test_iter_sum_matches_vec() {
        let v: StableVec<i64, 16> = StableVec::from_elem(1000, 1);
        assert_eq!(v.iter().sum::<i64>(), 1000);
    }

    #[test]
    fn test_iter_mut_updates_all() {
        let mut v: StableVec<i32, 2> = StableVec::from([1, 2, 3, 4, 5]);
        for value in v.iter_mut() {
            *value *= 10;
        }
        assert_eq!(v, StableVec::<i32, 2>::from([10, 20, 30, 40, 50]));

        let mut it = v.iter_mut();
        assert_eq!(it.len(), 5);
        *it.next_back().unwrap() = 0;
        assert_eq!(it.len(), 4);
        assert_eq!(v[4], 0);
    }

    #[test]
    fn test_iter_mut_skips_reserved_chunks() {
        let mut v: StableVec<i32, 4> = StableVec::with_capacity(64);
        v.extend([1, 2, 3]);
        assert_eq!(v.iter_mut().count(), 3);
        assert_eq!(v.iter_mut().rev().map(|x| *x).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn test_into_iter_owned() {
        let v: StableVec<String, 2> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let mut it = v.into_iter();
        assert_eq!(it.len(), 3);
        assert_eq!(it.next_back().as_deref(), Some("c"));
        assert_eq!(it.collect::<Vec<_>>(), vec!["a".to_string(), "b".to_string()]);
    }
}
