use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::index::Index;
use crate::layout::{checked_elem_count, Indices, Layout};
use crate::section::Section;
use crate::sequence::{BufferView, Sequence, SharedBuffer};
use crate::slice::{Elements, NdSlice};

// NdArray — a strided view that owns (a share of) its buffer
//
// An NdArray allocates `product(shape)` elements once, at construction, into
// an Arc<[T]>. The array and every array sliced from it hold a clone of that
// Arc through their SharedBuffer window, so the buffer is freed when the last
// of them is dropped. There are no back-pointers: slices point down at the
// buffer, never at the array they came from.
//
// Elements are written through `get_mut`, which only succeeds while this
// array is the buffer's sole holder.

/// An owning `N`-dimensional array with shared, reference-counted storage.
pub struct NdArray<T, const N: usize> {
    view: NdSlice<SharedBuffer<T>, N>,
}

// Manual Clone: sharing the buffer needs no `T: Clone`.
impl<T, const N: usize> Clone for NdArray<T, N> {
    fn clone(&self) -> Self {
        NdArray {
            view: self.view.clone(),
        }
    }
}

impl<T: Copy + fmt::Debug, const N: usize> fmt::Debug for NdArray<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NdArray")
            .field("shape", self.view.shape())
            .field("strides", self.view.strides())
            .field("buffer", self.view.data())
            .finish()
    }
}

impl<T: Copy, const N: usize> NdArray<T, N> {
    /// Allocate `product(shape)` elements, each `T::default()`.
    pub fn new(shape: [usize; N]) -> Result<Self>
    where
        T: Default,
    {
        Self::from_elem(shape, T::default())
    }

    /// Allocate `product(shape)` copies of `value`.
    pub fn from_elem(shape: [usize; N], value: T) -> Result<Self> {
        let count = checked_elem_count(&shape)?;
        Self::from_vec(vec![value; count], shape)
    }

    /// Take ownership of `data`, laid out row-major as `shape`.
    pub fn from_vec(data: Vec<T>, shape: [usize; N]) -> Result<Self> {
        let expected = checked_elem_count(&shape)?;
        if data.len() != expected {
            return Err(Error::ElementCountMismatch {
                shape: shape.to_vec(),
                expected,
                got: data.len(),
            });
        }
        Ok(Self::from_contiguous(data, shape))
    }

    /// Fill a new array by calling `f` with every multi-index, row-major.
    pub fn from_fn(shape: [usize; N], f: impl FnMut([usize; N]) -> T) -> Result<Self> {
        checked_elem_count(&shape)?;
        let data = Indices::new(shape).map(f).collect();
        Ok(Self::from_contiguous(data, shape))
    }

    /// `data.len()` must already equal `product(shape)` for a valid shape.
    pub(crate) fn from_contiguous(data: Vec<T>, shape: [usize; N]) -> Self {
        debug!(
            "allocating buffer of {} elements for shape={:?}",
            data.len(),
            shape
        );
        let layout = Layout::row_major(shape);
        NdArray {
            view: NdSlice::from_parts(SharedBuffer::from_vec(data), layout),
        }
    }

    /// The strided view over this array's shared buffer.
    pub fn view(&self) -> &NdSlice<SharedBuffer<T>, N> {
        &self.view
    }

    pub fn into_view(self) -> NdSlice<SharedBuffer<T>, N> {
        self.view
    }

    /// A borrowed view of the same elements, one lifetime instead of one
    /// reference count.
    pub fn as_view(&self) -> NdSlice<BufferView<'_, T>, N> {
        NdSlice::from_parts(self.view.data().as_view(), *self.view.layout())
    }

    pub fn shape(&self) -> &[usize; N] {
        self.view.shape()
    }

    pub fn strides(&self) -> &[isize; N] {
        self.view.strides()
    }

    pub fn rank(&self) -> usize {
        N
    }

    pub fn elem_count(&self) -> usize {
        self.view.elem_count()
    }

    #[inline]
    pub fn get(&self, index: [isize; N]) -> T {
        self.view.get(index)
    }

    #[inline]
    pub fn at<I: Into<Index>>(&self, index: [I; N]) -> T {
        self.view.at(index)
    }

    pub fn try_get(&self, index: [isize; N]) -> Result<T> {
        self.view.try_get(index)
    }

    /// Mutable access to one element, only while no other array or view
    /// shares the buffer. Out-of-range indices also yield `None`.
    pub fn get_mut(&mut self, index: [isize; N]) -> Option<&mut T> {
        let flat = self.view.layout().try_resolve(index).ok()?;
        self.view.data_mut().get_mut(flat)
    }

    /// Same contract as [`NdSlice::slice`]; the result keeps the buffer alive.
    pub fn slice<const M: usize>(&self, sections: [Section; N]) -> Result<NdArray<T, M>> {
        Ok(NdArray {
            view: self.view.slice(sections)?,
        })
    }

    pub fn iter(&self) -> Elements<'_, SharedBuffer<T>, N> {
        self.view.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.view.to_vec()
    }

    /// Number of arrays and views currently keeping the buffer alive.
    pub fn buffer_holders(&self) -> usize {
        self.view.data().strong_count()
    }
}

impl<S: Sequence, const N: usize> NdSlice<S, N> {
    /// Copy this view's elements into a freshly allocated row-major array.
    pub fn to_array(&self) -> NdArray<S::Item, N> {
        NdArray::from_contiguous(self.to_vec(), *self.shape())
    }
}

impl<T: Copy, const N: usize> From<NdSlice<SharedBuffer<T>, N>> for NdArray<T, N> {
    fn from(view: NdSlice<SharedBuffer<T>, N>) -> Self {
        NdArray { view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s;

    #[test]
    fn test_new_is_default_initialized() {
        let a = NdArray::<i32, 2>::new([2, 3]).unwrap();
        assert_eq!(a.shape(), &[2, 3]);
        assert_eq!(a.strides(), &[3, 1]);
        assert_eq!(a.to_vec(), vec![0; 6]);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(matches!(
            NdArray::from_vec(vec![1, 2, 3], [2, 2]),
            Err(Error::ElementCountMismatch {
                expected: 4,
                got: 3,
                ..
            })
        ));
        assert!(matches!(
            NdArray::<u8, 2>::new([0, 2]),
            Err(Error::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_from_fn_row_major() {
        let a = NdArray::from_fn([2, 3], |[i, j]| 10 * i + j).unwrap();
        assert_eq!(a.to_vec(), vec![0, 1, 2, 10, 11, 12]);
        assert_eq!(a.get([1, -1]), 12);
    }

    #[test]
    fn test_slice_tail() {
        let a = NdArray::from_vec(vec![0, 1, 2, 3, 4], [5]).unwrap();
        let tail: NdArray<_, 1> = a.slice(s![[-2, -1]]).unwrap();
        assert_eq!(tail.shape(), &[2]);
        assert_eq!(tail.to_vec(), vec![3, 4]);
    }

    #[test]
    fn test_slice_outlives_array() {
        let a = NdArray::from_fn([3, 3], |[i, j]| (i * 3 + j) as f64).unwrap();
        let row = a.slice::<1>(s![1, ..]).unwrap();
        assert_eq!(a.buffer_holders(), 2);
        drop(a);
        assert_eq!(row.buffer_holders(), 1);
        assert_eq!(row.to_vec(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_get_mut_needs_unique_buffer() {
        let mut a = NdArray::<i64, 2>::new([2, 2]).unwrap();
        *a.get_mut([1, 0]).unwrap() = 5;
        assert_eq!(a.get([1, 0]), 5);
        assert!(a.get_mut([2, 0]).is_none());

        let shared = a.clone();
        assert!(a.get_mut([0, 0]).is_none());
        drop(shared);
        assert!(a.get_mut([0, 0]).is_some());
    }

    #[test]
    fn test_get_mut_through_slice() {
        let a = NdArray::from_vec(vec![1, 2, 3, 4, 5, 6], [2, 3]).unwrap();
        let mut col = a.slice::<1>(s![.., 2]).unwrap();
        drop(a);
        *col.get_mut([1]).unwrap() = 60;
        assert_eq!(col.to_vec(), vec![3, 60]);
    }

    #[test]
    fn test_as_view_and_to_array() {
        let a = NdArray::from_vec(vec![1, 2, 3, 4], [2, 2]).unwrap();
        let borrowed = a.as_view();
        assert_eq!(borrowed.get([1, 1]), 4);
        assert_eq!(a.buffer_holders(), 1);

        let col = borrowed.slice::<1>(s![.., 0]).unwrap();
        let copy = col.to_array();
        assert_eq!(copy.to_vec(), vec![1, 3]);
        assert!(copy.view().is_contiguous());
    }

    #[test]
    fn test_view_round_trip() {
        let a = NdArray::from_vec(vec![1, 2, 3, 4, 5, 6], [2, 3]).unwrap();
        let view = a.clone().into_view();
        assert_eq!(a.buffer_holders(), 2);

        // Any view over a shared buffer is itself an array.
        let row: NdArray<_, 1> = NdArray::from(view.slice::<1>(s![-1, ..]).unwrap());
        drop(view);
        assert_eq!(row.to_vec(), vec![4, 5, 6]);
        assert_eq!(row.buffer_holders(), 2);

        drop(a);
        let mut row = row;
        *row.get_mut([0]).unwrap() = 40;
        assert_eq!(row.to_vec(), vec![40, 5, 6]);
    }

    #[test]
    fn test_concurrent_reads() {
        let a = NdArray::from_fn([4, 4], |[i, j]| (i * 4 + j) as u32).unwrap();
        std::thread::scope(|scope| {
            for r in 0..4 {
                let row = a.slice::<1>(s![r, ..]).unwrap();
                scope.spawn(move || {
                    let sum: u32 = row.iter().sum();
                    assert_eq!(sum, 4 * (4 * r as u32) + 6);
                });
            }
        });
    }
}
