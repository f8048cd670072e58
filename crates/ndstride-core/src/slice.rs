use log::trace;

use crate::error::Result;
use crate::index::Index;
use crate::layout::{Layout, StridedIter};
use crate::section::Section;
use crate::sequence::{BufferView, Sequence};

// NdSlice — the strided view
//
// An NdSlice is a backing sequence plus a Layout. It owns nothing beyond
// what its sequence owns: over a BufferView it borrows, over a SharedBuffer
// it holds one reference count, over an IntegerProgression it holds two
// integers. Copying a view is cheap and every operation on it is pure.
//
// Two things happen on a view:
//
//   view.get([i0, ..., iN-1])   one element, no allocation
//   view.slice(s![...])         a new view, no allocation
//
// The rank N is part of the type, so passing the wrong number of indices is a
// compile error. Slicing chooses its output rank M through the type as well;
// the number of range sections must match it.

/// An `N`-dimensional strided view over a backing [`Sequence`].
#[derive(Debug, Clone, Copy)]
pub struct NdSlice<S, const N: usize> {
    data: S,
    layout: Layout<N>,
}

impl<S: Sequence, const N: usize> NdSlice<S, N> {
    /// A row-major view of `shape` over `data`.
    ///
    /// Fails with `InvalidShape` for a zero extent and `ViewOutOfBounds`
    /// when `data` holds fewer than `product(shape)` elements.
    pub fn new(data: S, shape: [usize; N]) -> Result<Self> {
        Self::from_layout(data, Layout::contiguous(shape)?)
    }

    /// A view with explicit (possibly negative) strides.
    pub fn with_strides(data: S, shape: [usize; N], strides: [isize; N]) -> Result<Self> {
        Self::from_layout(data, Layout::with_strides(shape, strides)?)
    }

    pub fn from_layout(data: S, layout: Layout<N>) -> Result<Self> {
        layout.validate(data.size())?;
        trace!(
            "view shape={:?} strides={:?} over {} elements",
            layout.shape(),
            layout.strides(),
            data.size()
        );
        Ok(NdSlice { data, layout })
    }

    /// Assemble a view whose layout is already known to fit `data`.
    pub(crate) fn from_parts(data: S, layout: Layout<N>) -> Self {
        debug_assert!(layout.validate(data.size()).is_ok());
        NdSlice { data, layout }
    }

    pub(crate) fn data_mut(&mut self) -> &mut S {
        &mut self.data
    }

    /// The backing sequence, narrowed to this view's window.
    pub fn data(&self) -> &S {
        &self.data
    }

    pub fn layout(&self) -> &Layout<N> {
        &self.layout
    }

    pub fn shape(&self) -> &[usize; N] {
        self.layout.shape()
    }

    pub fn strides(&self) -> &[isize; N] {
        self.layout.strides()
    }

    pub fn offset(&self) -> usize {
        self.layout.offset()
    }

    pub fn rank(&self) -> usize {
        N
    }

    pub fn elem_count(&self) -> usize {
        self.layout.elem_count()
    }

    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// The element at a multi-index; negative indices count from the end.
    ///
    /// Indices outside an axis are not reported (under the `checked` feature
    /// they panic with an `IndexOutOfRange` message).
    #[inline]
    pub fn get(&self, index: [isize; N]) -> S::Item {
        if cfg!(feature = "checked") {
            if let Err(e) = self.layout.try_resolve(index) {
                panic!("{e}");
            }
        }
        self.data.at(self.layout.resolve(index))
    }

    /// [`NdSlice::get`] for any index type, including [`End`](crate::End).
    #[inline]
    pub fn at<I: Into<Index>>(&self, index: [I; N]) -> S::Item {
        self.get(index.map(|i| Into::<Index>::into(i).get()))
    }

    /// Checked [`NdSlice::get`].
    pub fn try_get(&self, index: [isize; N]) -> Result<S::Item> {
        let flat = self.layout.try_resolve(index)?;
        self.data.try_at(flat)
    }

    /// Slice with one section per axis.
    ///
    /// Range sections keep their axis (with extent `last - first + 1`),
    /// point sections drop it, so `M` must equal the number of ranges. The
    /// result shares this view's backing sequence.
    pub fn slice<const M: usize>(&self, sections: [Section; N]) -> Result<NdSlice<S, M>> {
        let (layout, first, last) = self.layout.section::<M>(&sections)?;
        trace!(
            "slice shape={:?} -> shape={:?} window={}..={}",
            self.layout.shape(),
            layout.shape(),
            first,
            last
        );
        Ok(NdSlice {
            data: self.data.slice(first, last),
            layout,
        })
    }

    /// Elements in row-major logical order.
    pub fn iter(&self) -> Elements<'_, S, N> {
        Elements {
            data: &self.data,
            offsets: self.layout.strided_indices(),
        }
    }

    pub fn to_vec(&self) -> Vec<S::Item> {
        self.iter().collect()
    }
}

/// A row-major view of `shape` over a borrowed slice.
pub fn reshape<T: Copy, const N: usize>(
    data: &[T],
    shape: [usize; N],
) -> Result<NdSlice<BufferView<'_, T>, N>> {
    NdSlice::new(BufferView::new(data), shape)
}

/// Iterator over the elements of an [`NdSlice`].
pub struct Elements<'a, S, const N: usize> {
    data: &'a S,
    offsets: StridedIter<N>,
}

impl<S: Sequence, const N: usize> Iterator for Elements<'_, S, N> {
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        self.offsets.next().map(|i| self.data.at(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl<S: Sequence, const N: usize> ExactSizeIterator for Elements<'_, S, N> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::index::End;
    use crate::s;
    use crate::sequence::{iota, IntegerProgression};

    // Over an iota, every element *is* its backing offset.
    fn grid() -> NdSlice<IntegerProgression<usize>, 2> {
        NdSlice::new(iota(12usize).unwrap(), [3, 4]).unwrap()
    }

    #[test]
    fn test_default_strides() {
        let view = grid();
        assert_eq!(view.shape(), &[3, 4]);
        assert_eq!(view.strides(), &[4, 1]);
        assert!(view.is_contiguous());
    }

    #[test]
    fn test_get_addresses_offset() {
        let view = grid();
        assert_eq!(view.get([1, 2]), 6);
        assert_eq!(view.get([-1, -1]), 11);
        assert_eq!(view.at([Index::from(End), End - 3]), 8);
    }

    #[test]
    fn test_try_get() {
        let view = grid();
        assert_eq!(view.try_get([2, 3]), Ok(11));
        assert_eq!(
            view.try_get([3, 0]),
            Err(Error::IndexOutOfRange {
                index: 3,
                length: 3
            })
        );
    }

    #[test]
    fn test_slice_range_rows() {
        let view = grid();
        let rows: NdSlice<_, 2> = view.slice(s![[1, 2], [0, 3]]).unwrap();
        assert_eq!(rows.shape(), &[2, 4]);
        assert_eq!(rows.strides(), &[4, 1]);
        assert_eq!(rows.data().first(), 4);
        assert_eq!(rows.get([0, 0]), 4);
        assert_eq!(rows.get([1, 3]), 11);
    }

    #[test]
    fn test_slice_point_drops_axis() {
        let view = grid();
        let row: NdSlice<_, 1> = view.slice(s![1, [0, 3]]).unwrap();
        assert_eq!(row.shape(), &[4]);
        assert_eq!(row.strides(), &[1]);
        assert_eq!(row.data().first(), 4);
        assert_eq!(row.to_vec(), vec![4, 5, 6, 7]);

        // A two-element section with equal bounds is still a range.
        let thin: NdSlice<_, 2> = view.slice(s![[1, 1], [0, 3]]).unwrap();
        assert_eq!(thin.shape(), &[1, 4]);
    }

    #[test]
    fn test_slice_column() {
        let view = grid();
        let col = view.slice::<1>(s![.., End]).unwrap();
        assert_eq!(col.shape(), &[3]);
        assert_eq!(col.strides(), &[4]);
        assert_eq!(col.to_vec(), vec![3, 7, 11]);
    }

    #[test]
    fn test_slice_to_scalar() {
        let view = grid();
        let one = view.slice::<0>(s![2, 1]).unwrap();
        assert_eq!(one.elem_count(), 1);
        assert_eq!(one.get([]), 9);
    }

    #[test]
    fn test_slice_of_slice() {
        let view = grid();
        let inner = view.slice::<2>(s![[1, 2], [1, 3]]).unwrap();
        let corner = inner.slice::<1>(s![-1, [1, -1]]).unwrap();
        assert_eq!(corner.to_vec(), vec![10, 11]);
    }

    #[test]
    fn test_full_slice_is_identity() {
        let view = grid();
        let same = view.slice::<2>(s![.., ..]).unwrap();
        assert_eq!(same.shape(), view.shape());
        assert_eq!(same.to_vec(), view.to_vec());
    }

    #[test]
    fn test_slice_errors() {
        let view = grid();
        assert!(matches!(
            view.slice::<2>(s![[2, 1], ..]),
            Err(Error::InvalidRange { first: 2, last: 1 })
        ));
        assert!(matches!(
            view.slice::<1>(s![.., ..]),
            Err(Error::RankMismatch {
                expected: 1,
                got: 2
            })
        ));
        assert!(matches!(
            view.slice::<1>(s![3, ..]),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            NdSlice::new(iota(12usize).unwrap(), [3, 0]),
            Err(Error::InvalidShape { .. })
        ));
        assert!(matches!(
            NdSlice::new(iota(11usize).unwrap(), [3, 4]),
            Err(Error::ViewOutOfBounds { .. })
        ));
        assert!(matches!(
            NdSlice::with_strides(iota(9usize).unwrap(), [3, 3], [isize::MIN, 1]),
            Err(Error::StrideOverflow { .. })
        ));
    }

    #[test]
    fn test_reshape_borrowed() {
        let data = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let m = reshape(&data, [2, 3]).unwrap();
        assert_eq!(m.get([1, 0]), 4.0);
        // A view may cover only a prefix of its buffer.
        let v = reshape(&data, [2, 2]).unwrap();
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_reversed_view() {
        let data = [1, 2, 3, 4];
        let rev = NdSlice::with_strides(BufferView::from(&data), [4], [-1]).unwrap();
        assert_eq!(rev.to_vec(), vec![4, 3, 2, 1]);
        assert_eq!(rev.get([0]), 4);
        let head = rev.slice::<1>(s![[0, 1]]).unwrap();
        assert_eq!(head.to_vec(), vec![4, 3]);
        assert_eq!(head.data().as_slice(), &[3, 4]);
    }

    #[cfg(feature = "checked")]
    #[test]
    #[should_panic(expected = "index 3 out of range for axis of length 3")]
    fn test_checked_get_out_of_range() {
        let _ = grid().get([3, 0]);
    }

    #[cfg(feature = "checked")]
    #[test]
    #[should_panic(expected = "out of range")]
    fn test_checked_negative_index_out_of_range() {
        let _ = grid().at([0isize, -5]);
    }

    #[test]
    fn test_transposed_view() {
        let data: Vec<i32> = (0..6).collect();
        let t = NdSlice::with_strides(BufferView::from(&data), [3, 2], [1, 3]).unwrap();
        assert_eq!(t.to_vec(), vec![0, 3, 1, 4, 2, 5]);
        let row = t.slice::<1>(s![1, ..]).unwrap();
        assert_eq!(row.to_vec(), vec![1, 4]);
    }
}
