use std::ops::{RangeFull, RangeInclusive};

use crate::error::Result;
use crate::index::{self, End, Index};

/// A per-axis slicing argument.
///
/// A `Point` picks one index and drops the axis from the result; a `Range`
/// keeps the axis, narrowed to the inclusive bounds `first..=last`.
///
/// Conversions mirror how sections are usually written:
///
/// | written as | section |
/// |------------|---------|
/// | `2`, `End`, `[2]` | `Point(2)` |
/// | `[1, 3]`, `(1, End)`, `1..=3` | `Range(1, 3)` |
/// | `..` | `Range(0, End)` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Point(Index),
    Range(Index, Index),
}

impl Section {
    pub fn point(index: impl Into<Index>) -> Self {
        Section::Point(index.into())
    }

    pub fn range(first: impl Into<Index>, last: impl Into<Index>) -> Self {
        Section::Range(first.into(), last.into())
    }

    /// The whole axis.
    pub fn full() -> Self {
        Section::Range(Index::new(0), Index::from(End))
    }

    /// Whether this section keeps its axis.
    pub fn is_range(&self) -> bool {
        matches!(self, Section::Range(..))
    }

    /// Absolute inclusive bounds of this section on an axis of `length`
    /// elements. A point has `first == last`.
    pub fn bounds(&self, length: usize) -> Result<(usize, usize)> {
        match *self {
            Section::Point(i) => {
                let i = i.try_normalize(length)?;
                Ok((i, i))
            }
            Section::Range(first, last) => index::try_bounds(first.get(), last.get(), length),
        }
    }
}

impl From<Index> for Section {
    fn from(i: Index) -> Self {
        Section::Point(i)
    }
}

impl From<End> for Section {
    fn from(e: End) -> Self {
        Section::point(e)
    }
}

impl From<isize> for Section {
    fn from(i: isize) -> Self {
        Section::point(i)
    }
}

impl From<i32> for Section {
    fn from(i: i32) -> Self {
        Section::point(i)
    }
}

impl From<usize> for Section {
    fn from(i: usize) -> Self {
        Section::point(i)
    }
}

impl<I: Into<Index>> From<[I; 1]> for Section {
    fn from([i]: [I; 1]) -> Self {
        Section::point(i)
    }
}

impl<I: Into<Index>> From<[I; 2]> for Section {
    fn from([first, last]: [I; 2]) -> Self {
        Section::range(first, last)
    }
}

impl<A: Into<Index>, B: Into<Index>> From<(A, B)> for Section {
    fn from((first, last): (A, B)) -> Self {
        Section::range(first, last)
    }
}

impl<I: Into<Index>> From<RangeInclusive<I>> for Section {
    fn from(r: RangeInclusive<I>) -> Self {
        let (first, last) = r.into_inner();
        Section::range(first, last)
    }
}

impl From<RangeFull> for Section {
    fn from(_: RangeFull) -> Self {
        Section::full()
    }
}

/// Build a `[Section; N]` from per-axis arguments.
///
/// ```
/// use ndstride_core::{s, End, Section};
/// let sections = s![1, [0, 3], .., (1, End)];
/// assert_eq!(sections[0], Section::point(1));
/// assert_eq!(sections[1], Section::range(0, 3));
/// assert!(sections[2].is_range());
/// ```
#[macro_export]
macro_rules! s {
    ($($section:expr),+ $(,)?) => {
        [$($crate::Section::from($section)),+]
    };
}
