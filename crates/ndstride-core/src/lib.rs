//! # ndstride-core
//!
//! Strided views with a compile-time rank, owning arrays and lazy elementwise
//! expressions.
//!
//! This crate provides:
//! - [`Sequence`] — the flat source a view reads through: [`BufferView`],
//!   [`SharedBuffer`], [`IntegerProgression`]
//! - [`Layout`] — shape + strides + offset, and the slicing engine
//! - [`NdSlice`] — a strided view, sliced with [`s!`] sections
//! - [`NdArray`] — a strided view that shares ownership of its buffer
//! - [`NdAccess`] — the call contract, and the [`BinaryExpr`] /
//!   [`UnaryExpr`] nodes that `+ - * / %` build over it
// - index: negative / end-relative index normalization, End marker
// - section: per-axis slicing arguments
// - error: the crate-wide Error enum

pub mod array;
pub mod error;
pub mod expr;
pub mod index;
pub mod layout;
pub mod section;
pub mod sequence;
pub mod slice;

pub use array::NdArray;
pub use error::{Error, Result};
pub use expr::{eval, kernel, BinaryExpr, BinaryOp, NdAccess, UnaryExpr, UnaryOp};
pub use index::{normalize, range_length, try_normalize, End, Index};
pub use layout::{row_major_strides, Layout};
pub use section::Section;
pub use sequence::{iota, progression, BufferView, IntegerProgression, Sequence, SharedBuffer};
pub use slice::{reshape, NdSlice};
