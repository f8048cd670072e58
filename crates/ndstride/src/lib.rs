//! # ndstride
//!
//! Compile-time-rank strided views over flat buffers and integer
//! progressions, with zero-copy slicing and lazy elementwise arithmetic.
//!
//! This is the top-level facade crate that re-exports everything you need.
//!
//! ## Usage
//!
//! ```rust
//! use ndstride::prelude::*;
//!
//! let a = NdArray::from_vec(vec![1, 2, 3, 4], [2, 2])?;
//! let b = NdArray::from_vec(vec![10, 20, 30, 40], [2, 2])?;
//! assert_eq!((&a + &b).get([1, 0]), 33);
//!
//! let row: NdArray<i32, 1> = a.slice(s![-1, ..])?;
//! assert_eq!(row.to_vec(), vec![3, 4]);
//! # Ok::<(), ndstride::Error>(())
//! ```
//!
//! ## Features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `checked` | `get`/`at` validate indices and expression operand shapes, panicking on violation |

/// Re-export core types.
pub use ndstride_core::{
    eval, iota, kernel, normalize, progression, range_length, reshape, row_major_strides, s,
    try_normalize, BinaryExpr, BinaryOp, BufferView, End, Error, Index, IntegerProgression,
    Layout, NdAccess, NdArray, NdSlice, Result, Section, Sequence, SharedBuffer, UnaryExpr,
    UnaryOp,
};

/// Re-export the core modules for less common items.
pub use ndstride_core::{array, error, expr, index, layout, section, sequence, slice};

/// Prelude: import this for the most common types.
pub mod prelude {
    pub use crate::{
        iota, reshape, s, BufferView, End, NdAccess, NdArray, NdSlice, Section, Sequence,
    };
}
