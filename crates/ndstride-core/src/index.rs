use std::ops::Sub;

use crate::error::{Error, Result};

// Index normalization
//
// Every index or slice bound a caller hands us may be end-relative:
//
//    0,  1,  2, ...   count from the front
//   -1, -2, -3, ...   count from the back (-1 is the last element)
//   End, End - k      the last element, and the element k before it
//
// `normalize` folds all of these into an absolute offset in `[0, length)`.
// Ranges are INCLUSIVE on both ends: `[1, 2]` covers two elements and
// `[-2, -1]` covers the last two. Every extent derived while slicing depends
// on that `+ 1`.

/// Map a possibly negative index onto an absolute offset within `length`.
///
/// Non-negative indices pass through unchanged; negative ones count back from
/// the end, so `-1` is `length - 1` and `-length` is `0`. Nothing is checked:
/// an index outside `-length..length` yields a meaningless offset.
#[inline]
pub fn normalize(index: isize, length: usize) -> usize {
    if index >= 0 {
        index as usize
    } else {
        length.wrapping_sub(index.unsigned_abs())
    }
}

/// Checked [`normalize`]: the result must land in `[0, length)`.
pub fn try_normalize(index: isize, length: usize) -> Result<usize> {
    let absolute = if index >= 0 {
        Some(index as usize)
    } else {
        length.checked_sub(index.unsigned_abs())
    };
    match absolute {
        Some(i) if i < length => Ok(i),
        _ => Err(Error::IndexOutOfRange { index, length }),
    }
}

/// Number of elements in the inclusive range `first..=last`.
#[inline]
pub fn range_length(first: isize, last: isize, length: usize) -> usize {
    normalize(last, length) - normalize(first, length) + 1
}

/// Checked [`range_length`]. Both bounds must be in range and ordered.
pub fn try_range_length(first: isize, last: isize, length: usize) -> Result<usize> {
    let (first, last) = try_bounds(first, last, length)?;
    Ok(last - first + 1)
}

/// Normalize both bounds of an inclusive range.
pub(crate) fn try_bounds(first: isize, last: isize, length: usize) -> Result<(usize, usize)> {
    let first = try_normalize(first, length)?;
    let last = try_normalize(last, length)?;
    if first > last {
        return Err(Error::InvalidRange {
            first: first as isize,
            last: last as isize,
        });
    }
    Ok((first, last))
}

/// A caller-supplied, possibly end-relative index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Index(isize);

impl Index {
    pub const fn new(index: isize) -> Self {
        Index(index)
    }

    /// The raw signed value, before normalization.
    pub const fn get(self) -> isize {
        self.0
    }

    #[inline]
    pub fn normalize(self, length: usize) -> usize {
        normalize(self.0, length)
    }

    pub fn try_normalize(self, length: usize) -> Result<usize> {
        try_normalize(self.0, length)
    }
}

/// The end sentinel: the last element of whatever axis it is applied to.
///
/// `End - k` is the element `k` before the last one:
///
/// ```
/// use ndstride_core::index::{End, Index};
/// assert_eq!(Index::from(End).normalize(5), 4);
/// assert_eq!((End - 1).normalize(5), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct End;

impl Sub<usize> for End {
    type Output = Index;

    fn sub(self, k: usize) -> Index {
        Index(-1 - k as isize)
    }
}

impl From<End> for Index {
    fn from(_: End) -> Self {
        Index(-1)
    }
}

impl From<isize> for Index {
    fn from(i: isize) -> Self {
        Index(i)
    }
}

impl From<i32> for Index {
    fn from(i: i32) -> Self {
        Index(i as isize)
    }
}

impl From<i64> for Index {
    fn from(i: i64) -> Self {
        Index(i as isize)
    }
}

impl From<usize> for Index {
    fn from(i: usize) -> Self {
        Index(i as isize)
    }
}

impl From<u32> for Index {
    fn from(i: u32) -> Self {
        Index(i as isize)
    }
}
