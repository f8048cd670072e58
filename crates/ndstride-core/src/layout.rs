use crate::error::{Error, Result};
use crate::index::{normalize, try_normalize};
use crate::section::Section;

// Layout — shape + strides + offset, with the rank fixed at compile time
//
// The Layout decouples the *logical* shape of a view from where its elements
// live in the backing sequence. Sub-ranging and single-index projection are
// "free" because they only produce a new Layout and a narrower window.
//
// KEY CONCEPTS:
//
// 1. **Strides**: how many backing elements to skip to move one step along
//    each axis. A row-major [3,4] view has strides [4,1]: row 1 starts at
//    backing offset 4, and element (1,2) lives at 1*4 + 2*1 = 6.
//
// 2. **Offset**: backing index of element (0, ..., 0). Positive strides keep
//    it at 0 after every slice; a negative stride places element 0 after the
//    start of the window, and the offset records where.
//
// 3. **Sections**: slicing takes one section per axis. A range section keeps
//    its axis with extent `last - first + 1`; a point section drops the axis.
//    Output strides are the original strides of the kept axes, unchanged.
//
// 4. **Extent**: the smallest and largest backing offsets any valid
//    multi-index reaches. A layout is only valid over a sequence whose size
//    exceeds the largest one.

/// Layout describes how an `N`-dimensional view maps onto a flat sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout<const N: usize> {
    shape: [usize; N],
    strides: [isize; N],
    offset: usize,
}

/// Row-major (C-order) strides for `shape`: the last axis is contiguous.
///
/// For shape [2, 3, 4], strides are [12, 4, 1].
pub fn row_major_strides<const N: usize>(shape: &[usize; N]) -> [isize; N] {
    let mut strides = [0isize; N];
    if let Some(last) = strides.last_mut() {
        *last = 1;
    }
    for i in (0..N.saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1] as isize;
    }
    strides
}

/// Total element count of `shape`, rejecting zero extents and overflow.
pub fn checked_elem_count<const N: usize>(shape: &[usize; N]) -> Result<usize> {
    let invalid = || Error::InvalidShape {
        shape: shape.to_vec(),
    };
    if shape.contains(&0) {
        return Err(invalid());
    }
    let count = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(invalid)?;
    if count > isize::MAX as usize {
        return Err(invalid());
    }
    Ok(count)
}

/// Smallest and largest offsets reachable from `offset`, or `None` if
/// either leaves `isize`. Extents must not exceed `isize::MAX`.
fn checked_extent<const N: usize>(
    shape: &[usize; N],
    strides: &[isize; N],
    offset: isize,
) -> Option<(isize, isize)> {
    let mut lo = offset;
    let mut hi = offset;
    for (&d, &s) in shape.iter().zip(strides.iter()) {
        let span = (d as isize - 1).checked_mul(s)?;
        lo = lo.checked_add(span.min(0))?;
        hi = hi.checked_add(span.max(0))?;
    }
    Some((lo, hi))
}

fn stride_overflow<const N: usize>(shape: &[usize; N], strides: &[isize; N]) -> Error {
    Error::StrideOverflow {
        shape: shape.to_vec(),
        strides: strides.to_vec(),
    }
}

impl<const N: usize> Layout<N> {
    /// A row-major layout for `shape`, starting at offset 0.
    pub fn contiguous(shape: [usize; N]) -> Result<Self> {
        checked_elem_count(&shape)?;
        Ok(Self::row_major(shape))
    }

    /// Row-major layout for a shape that has already been validated.
    pub(crate) fn row_major(shape: [usize; N]) -> Self {
        Layout {
            shape,
            strides: row_major_strides(&shape),
            offset: 0,
        }
    }

    /// Explicit strides, with the offset chosen so the smallest reachable
    /// backing offset is 0.
    ///
    /// Strides whose reachable offsets leave `isize` are `StrideOverflow`.
    pub fn with_strides(shape: [usize; N], strides: [isize; N]) -> Result<Self> {
        checked_elem_count(&shape)?;
        let overflow = || stride_overflow(&shape, &strides);
        let (lo, _) = checked_extent(&shape, &strides, 0).ok_or_else(overflow)?;
        let offset = lo.checked_neg().ok_or_else(overflow)?;
        checked_extent(&shape, &strides, offset).ok_or_else(overflow)?;
        Ok(Layout {
            shape,
            strides,
            offset: offset as usize,
        })
    }

    /// Explicit strides and offset.
    pub fn new(shape: [usize; N], strides: [isize; N], offset: usize) -> Result<Self> {
        checked_elem_count(&shape)?;
        isize::try_from(offset)
            .ok()
            .and_then(|start| checked_extent(&shape, &strides, start))
            .ok_or_else(|| stride_overflow(&shape, &strides))?;
        Ok(Layout {
            shape,
            strides,
            offset,
        })
    }

    pub fn shape(&self) -> &[usize; N] {
        &self.shape
    }

    pub fn strides(&self) -> &[isize; N] {
        &self.strides
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn rank(&self) -> usize {
        N
    }

    pub fn elem_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether strides are the default row-major strides and offset is 0.
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0 && self.strides == row_major_strides(&self.shape)
    }

    /// Smallest and largest backing offsets reachable from this layout.
    ///
    /// Every constructor has checked that both fit in `isize`, and so does
    /// any partial sum of per-axis steps, which keeps the unchecked index
    /// arithmetic below in range.
    pub fn extent(&self) -> (isize, isize) {
        let mut lo = self.offset as isize;
        let mut hi = lo;
        for (&d, &s) in self.shape.iter().zip(self.strides.iter()) {
            let span = (d as isize - 1) * s;
            lo += span.min(0);
            hi += span.max(0);
        }
        (lo, hi)
    }

    /// Check that every reachable offset is a valid index into a sequence of
    /// `size` elements.
    pub fn validate(&self, size: usize) -> Result<()> {
        let (lo, hi) = self.extent();
        if lo < 0 || hi as usize >= size {
            return Err(Error::ViewOutOfBounds { lo, hi, size });
        }
        Ok(())
    }

    /// Backing offset of an absolute multi-index:
    /// `offset + sum(index[i] * stride[i])`.
    #[inline]
    pub fn flat_index(&self, index: [usize; N]) -> usize {
        let mut flat = self.offset as isize;
        for i in 0..N {
            flat += index[i] as isize * self.strides[i];
        }
        flat as usize
    }

    /// Backing offset of a possibly end-relative multi-index. Unchecked.
    #[inline]
    pub fn resolve(&self, index: [isize; N]) -> usize {
        let mut flat = self.offset as isize;
        for i in 0..N {
            flat += normalize(index[i], self.shape[i]) as isize * self.strides[i];
        }
        flat as usize
    }

    /// Checked [`Layout::resolve`]: every axis must normalize into range.
    pub fn try_resolve(&self, index: [isize; N]) -> Result<usize> {
        let mut absolute = [0usize; N];
        for i in 0..N {
            absolute[i] = try_normalize(index[i], self.shape[i])?;
        }
        Ok(self.flat_index(absolute))
    }

    /// The slicing engine.
    ///
    /// Returns the layout of the sectioned view relative to its new window,
    /// and that window as inclusive backing offsets `(first, last)` in the
    /// current sequence.
    ///
    /// Example: [3,4] row-major, sections ([1,2], [0,3])
    /// → shape [2,4], strides [4,1], window 4..=11
    pub fn section<const M: usize>(
        &self,
        sections: &[Section; N],
    ) -> Result<(Layout<M>, usize, usize)> {
        let kept = sections.iter().filter(|s| s.is_range()).count();
        if kept != M {
            return Err(Error::RankMismatch {
                expected: M,
                got: kept,
            });
        }

        let mut shape = [0usize; M];
        let mut strides = [0isize; M];
        let mut start = self.offset as isize;
        let mut lo = start;
        let mut hi = start;
        let mut axis_out = 0;
        for (axis, section) in sections.iter().enumerate() {
            let (first, last) = section.bounds(self.shape[axis])?;
            let stride = self.strides[axis];
            let a = first as isize * stride;
            let b = last as isize * stride;
            start += a;
            lo += a.min(b);
            hi += a.max(b);
            if section.is_range() {
                shape[axis_out] = last - first + 1;
                strides[axis_out] = stride;
                axis_out += 1;
            }
        }

        let layout = Layout {
            shape,
            strides,
            offset: (start - lo) as usize,
        };
        Ok((layout, lo as usize, hi as usize))
    }

    /// Every absolute multi-index of this layout, in row-major logical order.
    pub fn indices(&self) -> Indices<N> {
        Indices::new(self.shape)
    }

    /// Backing offsets of every element, in row-major logical order.
    pub fn strided_indices(&self) -> StridedIter<N> {
        StridedIter {
            layout: *self,
            indices: self.indices(),
        }
    }
}

// Indices — walks multi-indices right-most axis first
//
// For a [2,3] shape it yields [0,0], [0,1], [0,2], [1,0], [1,1], [1,2].
// A rank-0 shape has exactly one (empty) multi-index.

/// Iterator over all multi-indices of a shape, in row-major order.
#[derive(Debug, Clone)]
pub struct Indices<const N: usize> {
    current: [usize; N],
    dims: [usize; N],
    remaining: usize,
    started: bool,
}

impl<const N: usize> Indices<N> {
    pub fn new(dims: [usize; N]) -> Self {
        Indices {
            current: [0; N],
            dims,
            remaining: dims.iter().product(),
            started: false,
        }
    }

    /// Advance the multi-dimensional index by one (rightmost dimension first).
    fn advance(&mut self) {
        for i in (0..N).rev() {
            self.current[i] += 1;
            if self.current[i] < self.dims[i] {
                return;
            }
            self.current[i] = 0;
        }
    }
}

impl<const N: usize> Iterator for Indices<N> {
    type Item = [usize; N];

    fn next(&mut self) -> Option<[usize; N]> {
        if self.remaining == 0 {
            return None;
        }
        if self.started {
            self.advance();
        }
        self.started = true;
        self.remaining -= 1;
        Some(self.current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const N: usize> ExactSizeIterator for Indices<N> {}

/// Iterator that yields backing offsets for each element of a Layout.
///
/// For a contiguous layout this just counts 0, 1, 2, ...; for a sliced or
/// explicitly strided one it jumps around following the strides.
#[derive(Debug, Clone)]
pub struct StridedIter<const N: usize> {
    layout: Layout<N>,
    indices: Indices<N>,
}

impl<const N: usize> Iterator for StridedIter<N> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.indices.next().map(|i| self.layout.flat_index(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<const N: usize> ExactSizeIterator for StridedIter<N> {}
