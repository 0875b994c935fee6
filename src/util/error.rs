//! Error types for detpost.

use crate::tensor::TensorLayout;
use thiserror::Error;

/// Result alias for detpost operations.
pub type DetpostResult<T> = std::result::Result<T, DetpostError>;

/// Errors that can occur while post-processing detector output.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetpostError {
    /// The label table does not have one entry per class slot.
    #[error("label table has {got} entries but the tensor layout declares {expected} classes")]
    LabelCountMismatch { expected: usize, got: usize },
    /// The tensor layout cannot describe a valid row.
    #[error("invalid tensor layout: {num_rows} rows x {num_classes} classes")]
    InvalidLayout { num_rows: usize, num_classes: usize },
    /// The backing buffer holds fewer values than the layout requires.
    #[error("tensor buffer too small: needed {needed} values, got {got}")]
    TensorTooSmall { needed: usize, got: usize },
    /// The backing buffer holds more values than the layout accounts for.
    #[error("tensor buffer length {got} inconsistent with layout ({needed} values)")]
    LengthMismatch { needed: usize, got: usize },
    /// The tensor shape differs from the one a detector was built for.
    #[error("tensor layout {got:?} does not match expected {expected:?}")]
    LayoutMismatch {
        expected: TensorLayout,
        got: TensorLayout,
    },
    /// A single row of a nested tensor does not match the row stride.
    #[error("tensor row {row} has {got} values, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },
    /// A selected class index has no label.
    #[error("class index {index} out of range for {len} labels")]
    ClassIndexOutOfRange { index: usize, len: usize },
    /// A configuration value is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// Label text contains an empty name.
    #[error("empty label name on line {line}")]
    EmptyLabel { line: usize },
}
