//! Detection records and their ranking and pruning.
//!
//! Includes confidence ordering and greedy IoU non-maximum suppression.

pub mod nms;
pub(crate) mod order;

use crate::geometry::Rect;
use crate::mapping::CoordParams;

/// One labeled box produced by the decoder.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Class name resolved from `class_id`.
    pub label: String,
    /// Index of the winning class-probability slot.
    pub class_id: usize,
    /// Objectness score of the source row. Class probability only picks the
    /// label and is not folded in.
    pub confidence: f32,
    /// Bounding box, in model space straight out of the decoder.
    pub bbox: Rect,
}

impl Detection {
    /// Returns the detection with its box moved through `params`.
    pub fn mapped(self, params: &CoordParams) -> Detection {
        Detection {
            bbox: params.map_rect(&self.bbox),
            ..self
        }
    }
}
