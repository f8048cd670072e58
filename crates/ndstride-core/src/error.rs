/// All errors that can occur within ndstride.
///
/// Construction and slicing report these eagerly. The element-access path
/// (`get`, `at`, `Sequence::at`) never returns them; the `try_*` accessors and
/// the `checked` feature are how an out-of-range access gets reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A shape with a zero extent, or one whose element count overflows.
    #[error("invalid shape {shape:?}: every extent must be at least 1")]
    InvalidShape { shape: Vec<usize> },

    /// Element count mismatch when creating an array from a vec.
    #[error("element count mismatch: shape {shape:?} requires {expected} elements, got {got}")]
    ElementCountMismatch {
        shape: Vec<usize>,
        expected: usize,
        got: usize,
    },

    /// A layout reaches backing offsets outside its sequence.
    #[error("view out of bounds: offsets {lo}..={hi} exceed a sequence of {size} elements")]
    ViewOutOfBounds { lo: isize, hi: isize, size: usize },

    /// An index that does not normalize into `[0, length)`.
    #[error("index {index} out of range for axis of length {length}")]
    IndexOutOfRange { index: isize, length: usize },

    /// A range whose first bound is past its last.
    #[error("invalid range: first {first} is past last {last}")]
    InvalidRange { first: isize, last: isize },

    /// A progression given a negative element count.
    #[error("invalid length {len}: a sequence length cannot be negative")]
    NegativeLength { len: isize },

    /// A progression with more elements than `usize` can count.
    #[error("sequence length overflows usize")]
    LengthOverflow,

    /// Strides whose reachable offsets do not fit in `isize`.
    #[error("strides {strides:?} overflow for shape {shape:?}")]
    StrideOverflow {
        shape: Vec<usize>,
        strides: Vec<isize>,
    },

    /// Slicing would produce a different rank than the one requested.
    #[error("rank mismatch: expected rank {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },

    /// Operands of an expression disagree in shape.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
}

/// Convenience Result type used throughout ndstride.
pub type Result<T> = std::result::Result<T, Error>;
