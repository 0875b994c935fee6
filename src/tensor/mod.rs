//! Read-only access to raw detector output.
//!
//! Detection heads emit one fixed-width record per candidate:
//! `[cx, cy, w, h, objectness, class_prob_0, ..., class_prob_{n-1}]`.
//! Runtimes hand that data over in different shapes, so the decoder reads it
//! through [`TensorSource`], a "value at row r, column c" capability. Every
//! source validates its buffer against a [`TensorLayout`] on construction,
//! which lets the decoder read without bounds failures afterwards.

use crate::util::{DetpostError, DetpostResult};

/// Column holding the box center x.
pub const COL_CX: usize = 0;
/// Column holding the box center y.
pub const COL_CY: usize = 1;
/// Column holding the box width.
pub const COL_W: usize = 2;
/// Column holding the box height.
pub const COL_H: usize = 3;
/// Column holding the objectness score.
pub const COL_OBJECTNESS: usize = 4;
/// First class-probability column.
pub const COL_FIRST_CLASS: usize = 5;

/// Shape of a detection tensor: `num_rows` records of `5 + num_classes` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TensorLayout {
    /// Number of candidate rows.
    pub num_rows: usize,
    /// Number of class-probability slots per row.
    pub num_classes: usize,
}

impl TensorLayout {
    /// Creates a layout, rejecting class-less rows and sizes that overflow.
    pub fn new(num_rows: usize, num_classes: usize) -> DetpostResult<Self> {
        let layout = Self {
            num_rows,
            num_classes,
        };
        layout.required_len()?;
        Ok(layout)
    }

    /// YOLOv5 at 640x640 input with the 80 COCO classes.
    pub fn yolov5_coco() -> Self {
        Self {
            num_rows: 25_200,
            num_classes: 80,
        }
    }

    /// Values per row, `5 + num_classes`.
    pub fn row_stride(&self) -> usize {
        COL_FIRST_CLASS + self.num_classes
    }

    /// Total number of values the layout addresses.
    pub fn required_len(&self) -> DetpostResult<usize> {
        let invalid = DetpostError::InvalidLayout {
            num_rows: self.num_rows,
            num_classes: self.num_classes,
        };
        if self.num_classes == 0 {
            return Err(invalid);
        }
        let stride = COL_FIRST_CLASS
            .checked_add(self.num_classes)
            .ok_or(invalid.clone())?;
        self.num_rows.checked_mul(stride).ok_or(invalid)
    }
}

/// Random access to a validated detection tensor.
///
/// Implementations must return a value for every `row < layout().num_rows`
/// and `col < layout().row_stride()`.
pub trait TensorSource {
    /// Shape the source was validated against.
    fn layout(&self) -> TensorLayout;

    /// Returns the value at `(row, col)`.
    fn value(&self, row: usize, col: usize) -> f32;
}

impl<T: TensorSource + ?Sized> TensorSource for &T {
    fn layout(&self) -> TensorLayout {
        (**self).layout()
    }

    fn value(&self, row: usize, col: usize) -> f32 {
        (**self).value(row, col)
    }
}

/// Borrowed row-major tensor backed by one flat buffer.
///
/// This is the shape most runtimes return when asked for the raw output
/// data, e.g. a `[1, rows, 5 + classes]` tensor read as `&[f32]`.
#[derive(Copy, Clone, Debug)]
pub struct FlatTensor<'a> {
    data: &'a [f32],
    layout: TensorLayout,
}

impl<'a> FlatTensor<'a> {
    /// Wraps `data`, which must hold exactly `layout.required_len()` values.
    pub fn new(data: &'a [f32], layout: TensorLayout) -> DetpostResult<Self> {
        let needed = layout.required_len()?;
        check_len(needed, data.len())?;
        Ok(Self { data, layout })
    }

    /// Wraps `data`, deriving the row count from its length.
    ///
    /// A buffer that ends partway through a row is reported as too small
    /// for the next whole row.
    pub fn infer_rows(data: &'a [f32], num_classes: usize) -> DetpostResult<Self> {
        let stride = TensorLayout {
            num_rows: 1,
            num_classes,
        }
        .required_len()?;
        if data.len() % stride != 0 {
            return Err(DetpostError::TensorTooSmall {
                needed: (data.len() / stride + 1) * stride,
                got: data.len(),
            });
        }
        Self::new(data, TensorLayout::new(data.len() / stride, num_classes)?)
    }

    /// Returns the backing buffer.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the contiguous record for `row`.
    pub fn row(&self, row: usize) -> Option<&'a [f32]> {
        if row >= self.layout.num_rows {
            return None;
        }
        let stride = self.layout.row_stride();
        let start = row * stride;
        self.data.get(start..start + stride)
    }
}

impl TensorSource for FlatTensor<'_> {
    fn layout(&self) -> TensorLayout {
        self.layout
    }

    #[inline]
    fn value(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.layout.row_stride() + col]
    }
}

/// Tensor stored as one buffer per row, e.g. the inner rows of a
/// `[1][rows][cols]` array.
#[derive(Copy, Clone, Debug)]
pub struct NestedTensor<'a, R> {
    rows: &'a [R],
    layout: TensorLayout,
}

impl<'a, R: AsRef<[f32]>> NestedTensor<'a, R> {
    /// Wraps `rows`; every row must hold exactly `5 + num_classes` values.
    pub fn new(rows: &'a [R], num_classes: usize) -> DetpostResult<Self> {
        let layout = TensorLayout::new(rows.len(), num_classes)?;
        let expected = layout.row_stride();
        for (row, values) in rows.iter().enumerate() {
            let got = values.as_ref().len();
            if got != expected {
                return Err(DetpostError::RowLengthMismatch { row, expected, got });
            }
        }
        Ok(Self { rows, layout })
    }
}

impl<R: AsRef<[f32]>> TensorSource for NestedTensor<'_, R> {
    fn layout(&self) -> TensorLayout {
        self.layout
    }

    #[inline]
    fn value(&self, row: usize, col: usize) -> f32 {
        self.rows[row].as_ref()[col]
    }
}

/// Column-major tensor: the buffer holds `row_stride` planes of `num_rows`
/// values each, as emitted by heads exported with a `[1, cols, rows]` shape.
#[derive(Copy, Clone, Debug)]
pub struct TransposedTensor<'a> {
    data: &'a [f32],
    layout: TensorLayout,
}

impl<'a> TransposedTensor<'a> {
    /// Wraps `data`, which must hold exactly `layout.required_len()` values.
    pub fn new(data: &'a [f32], layout: TensorLayout) -> DetpostResult<Self> {
        let needed = layout.required_len()?;
        check_len(needed, data.len())?;
        Ok(Self { data, layout })
    }
}

impl TensorSource for TransposedTensor<'_> {
    fn layout(&self) -> TensorLayout {
        self.layout
    }

    #[inline]
    fn value(&self, row: usize, col: usize) -> f32 {
        self.data[col * self.layout.num_rows + row]
    }
}

fn check_len(needed: usize, got: usize) -> DetpostResult<()> {
    if got < needed {
        return Err(DetpostError::TensorTooSmall { needed, got });
    }
    if got > needed {
        return Err(DetpostError::LengthMismatch { needed, got });
    }
    Ok(())
}
