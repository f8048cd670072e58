use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use num_traits::{AsPrimitive, PrimInt, ToPrimitive, WrappingAdd};

use crate::error::{Error, Result};

// Sequence — the flat, one-dimensional source a strided view reads through
//
// A strided view never touches memory directly. It computes a linear offset
// and asks its backing sequence for the element there. Three sequences ship
// with the crate:
//
//   BufferView<'a, T>      a borrowed window over someone else's slice
//   SharedBuffer<T>        a window over a reference-counted Arc<[T]>
//   IntegerProgression<T>  `first + i`, computed on demand, no memory at all
//
// All of them are immutable values. Slicing hands back a narrower sequence of
// the same kind and leaves the receiver alone.

/// The capability set every backing sequence provides.
pub trait Sequence: Clone {
    /// Element type, returned by value.
    type Item: Copy;

    /// Number of elements.
    fn size(&self) -> usize;

    /// The element at `i`, for `0 <= i < size()`.
    ///
    /// This is the hot path and does not report errors. An out-of-range `i`
    /// panics for buffer-backed sequences and produces an unspecified value
    /// for progressions.
    fn at(&self, i: usize) -> Self::Item;

    /// The sub-sequence spanning the inclusive range `first..=last`.
    ///
    /// Both bounds are absolute (already normalized) with
    /// `first <= last < size()`.
    fn slice(&self, first: usize, last: usize) -> Self;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Checked [`Sequence::at`].
    fn try_at(&self, i: usize) -> Result<Self::Item> {
        if i < self.size() {
            Ok(self.at(i))
        } else {
            Err(Error::IndexOutOfRange {
                index: i as isize,
                length: self.size(),
            })
        }
    }

    fn iter(&self) -> SeqIter<'_, Self> {
        SeqIter {
            seq: self,
            front: 0,
            back: self.size(),
        }
    }
}

/// Iterator over the elements of any [`Sequence`].
pub struct SeqIter<'a, S> {
    seq: &'a S,
    front: usize,
    back: usize,
}

impl<S: Sequence> Iterator for SeqIter<'_, S> {
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        if self.front == self.back {
            return None;
        }
        let item = self.seq.at(self.front);
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<S: Sequence> DoubleEndedIterator for SeqIter<'_, S> {
    fn next_back(&mut self) -> Option<S::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.seq.at(self.back))
    }
}

impl<S: Sequence> ExactSizeIterator for SeqIter<'_, S> {}

impl<S: Sequence> FusedIterator for SeqIter<'_, S> {}

// BufferView

/// A non-owning window over contiguous memory owned elsewhere.
pub struct BufferView<'a, T> {
    data: &'a [T],
}

impl<'a, T> BufferView<'a, T> {
    pub fn new(data: &'a [T]) -> Self {
        BufferView { data }
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }
}

// Manual Clone/Copy: a borrowed window is copyable whatever T is.
impl<T> Clone for BufferView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BufferView<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for BufferView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BufferView").field(&self.data).finish()
    }
}

impl<T: Copy> Sequence for BufferView<'_, T> {
    type Item = T;

    #[inline]
    fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn at(&self, i: usize) -> T {
        self.data[i]
    }

    fn slice(&self, first: usize, last: usize) -> Self {
        BufferView {
            data: &self.data[first..=last],
        }
    }
}

impl<'a, T> From<&'a [T]> for BufferView<'a, T> {
    fn from(data: &'a [T]) -> Self {
        BufferView::new(data)
    }
}

impl<'a, T> From<&'a Vec<T>> for BufferView<'a, T> {
    fn from(data: &'a Vec<T>) -> Self {
        BufferView::new(data.as_slice())
    }
}

impl<'a, T, const K: usize> From<&'a [T; K]> for BufferView<'a, T> {
    fn from(data: &'a [T; K]) -> Self {
        BufferView::new(data.as_slice())
    }
}

// SharedBuffer

/// A window over a heap buffer whose ownership is shared by reference count.
///
/// Every view sliced out of an owning array holds one of these, so the buffer
/// lives exactly as long as its longest holder.
pub struct SharedBuffer<T> {
    data: Arc<[T]>,
    start: usize,
    len: usize,
}

impl<T> SharedBuffer<T> {
    pub fn from_vec(data: Vec<T>) -> Self {
        let len = data.len();
        SharedBuffer {
            data: data.into(),
            start: 0,
            len,
        }
    }

    /// The elements covered by this window.
    pub fn as_slice(&self) -> &[T] {
        &self.data[self.start..self.start + self.len]
    }

    /// Borrow this window as a plain [`BufferView`].
    pub fn as_view(&self) -> BufferView<'_, T> {
        BufferView::new(self.as_slice())
    }

    /// How many windows currently keep the buffer alive.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }

    /// Mutable access to element `i` of this window, only if no other window
    /// shares the buffer.
    pub(crate) fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        if i >= self.len {
            return None;
        }
        let at = self.start + i;
        Arc::get_mut(&mut self.data).and_then(|data| data.get_mut(at))
    }
}

// Manual Clone: Arc::clone is cheap (just increment refcount).
impl<T> Clone for SharedBuffer<T> {
    fn clone(&self) -> Self {
        SharedBuffer {
            data: Arc::clone(&self.data),
            start: self.start,
            len: self.len,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("start", &self.start)
            .field("len", &self.len)
            .field("holders", &self.strong_count())
            .finish()
    }
}

impl<T: Copy> Sequence for SharedBuffer<T> {
    type Item = T;

    #[inline]
    fn size(&self) -> usize {
        self.len
    }

    #[inline]
    fn at(&self, i: usize) -> T {
        self.data[self.start + i]
    }

    fn slice(&self, first: usize, last: usize) -> Self {
        debug_assert!(first <= last && last < self.len);
        SharedBuffer {
            data: Arc::clone(&self.data),
            start: self.start + first,
            len: last - first + 1,
        }
    }
}

// IntegerProgression
//
// Elements are computed with wrapping addition in T. For every i < len the
// true value first + i lies in [first, last], so the wrapped sum equals it
// even when i itself does not fit in T (i32::MIN..=i32::MAX has 2^32
// elements).

/// The arithmetic progression `first, first + 1, ..., first + len - 1`.
///
/// Nothing is stored; `at(i)` is `first + i`. A view over a progression
/// addresses and slices exactly like a view over a real buffer, which makes it
/// handy for generating coordinate grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerProgression<T> {
    first: T,
    len: usize,
}

impl<T> IntegerProgression<T>
where
    T: PrimInt + WrappingAdd + AsPrimitive<usize>,
    usize: AsPrimitive<T>,
{
    /// `len` elements starting at `first`. The caller keeps
    /// `first + len - 1` within `T`.
    pub fn new(first: T, len: usize) -> Self {
        IntegerProgression { first, len }
    }

    /// The progression covering `first..=last`.
    ///
    /// Fails with `InvalidRange` when `last < first`, and with
    /// `LengthOverflow` when the element count does not fit in `usize`.
    pub fn between(first: T, last: T) -> Result<Self> {
        if last < first {
            return Err(Error::InvalidRange {
                first: saturating_isize(first),
                last: saturating_isize(last),
            });
        }
        let len = span(first, last)
            .and_then(|s| s.checked_add(1))
            .ok_or(Error::LengthOverflow)?;
        Ok(IntegerProgression { first, len })
    }

    pub fn first(&self) -> T {
        self.first
    }

    pub fn last(&self) -> T {
        self.offset(self.len.saturating_sub(1))
    }

    #[inline]
    fn offset(&self, i: usize) -> T {
        self.first.wrapping_add(&AsPrimitive::<T>::as_(i))
    }
}

/// `last - first` for `first <= last`, without overflowing `T`.
fn span<T: PrimInt>(first: T, last: T) -> Option<usize> {
    if first >= T::zero() || last < T::zero() {
        // Same sign, so the difference fits in T.
        (last - first).to_usize()
    } else {
        // first < 0 <= last: count [first, -1] and [0, last] separately.
        let below = (T::zero() - (first + T::one())).to_usize()?;
        last.to_usize()?.checked_add(below)?.checked_add(1)
    }
}

/// `v` for an error report, clamped to the `isize` range.
fn saturating_isize<T: PrimInt>(v: T) -> isize {
    v.to_isize()
        .unwrap_or(if v < T::zero() { isize::MIN } else { isize::MAX })
}

impl<T> Sequence for IntegerProgression<T>
where
    T: PrimInt + WrappingAdd + AsPrimitive<usize>,
    usize: AsPrimitive<T>,
{
    type Item = T;

    #[inline]
    fn size(&self) -> usize {
        self.len
    }

    #[inline]
    fn at(&self, i: usize) -> T {
        self.offset(i)
    }

    fn slice(&self, first: usize, last: usize) -> Self {
        IntegerProgression {
            first: self.offset(first),
            len: last - first + 1,
        }
    }
}

/// `0, 1, ..., len - 1`.
///
/// A negative `len` is `NegativeLength`; one that does not fit in `usize` is
/// `LengthOverflow`.
pub fn iota<T>(len: T) -> Result<IntegerProgression<T>>
where
    T: PrimInt + WrappingAdd + AsPrimitive<usize>,
    usize: AsPrimitive<T>,
{
    if len < T::zero() {
        return Err(Error::NegativeLength {
            len: saturating_isize(len),
        });
    }
    let len = len.to_usize().ok_or(Error::LengthOverflow)?;
    Ok(IntegerProgression::new(T::zero(), len))
}

/// `first, first + 1, ..., last`.
pub fn progression<T>(first: T, last: T) -> Result<IntegerProgression<T>>
where
    T: PrimInt + WrappingAdd + AsPrimitive<usize>,
    usize: AsPrimitive<T>,
{
    IntegerProgression::between(first, last)
}
