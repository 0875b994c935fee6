//! Tensor rows to labeled model-space detections.
//!
//! A row becomes a detection when its objectness is strictly greater than the
//! confidence threshold. The label is the class slot with the highest
//! probability, the first slot winning exact ties, and the reported
//! confidence is the objectness alone. Rows are visited in order and no
//! reordering happens here.

use crate::candidate::Detection;
use crate::geometry::Rect;
use crate::labels::LabelTable;
use crate::tensor::{
    TensorLayout, TensorSource, COL_CX, COL_CY, COL_FIRST_CLASS, COL_H, COL_OBJECTNESS, COL_W,
};
use crate::trace::{enter_stage, stage_output};
use crate::util::{DetpostError, DetpostResult};

#[cfg(feature = "rayon")]
pub mod rayon;

/// Decodes every qualifying row of `source`, in row order.
///
/// Fails before reading any row when `labels` does not have exactly one
/// entry per class slot or the threshold is NaN.
pub fn decode<S: TensorSource + ?Sized>(
    source: &S,
    labels: &LabelTable,
    confidence_threshold: f32,
) -> DetpostResult<Vec<Detection>> {
    let layout = source.layout();
    check_inputs(layout, labels, confidence_threshold)?;

    let _stage = enter_stage("decode", layout.num_rows);

    let mut out = Vec::new();
    for row in 0..layout.num_rows {
        if let Some(det) = decode_row(source, layout, row, labels, confidence_threshold)? {
            out.push(det);
        }
    }

    stage_output("decode", out.len());
    Ok(out)
}

pub(crate) fn check_inputs(
    layout: TensorLayout,
    labels: &LabelTable,
    confidence_threshold: f32,
) -> DetpostResult<()> {
    labels.check_matches(layout.num_classes)?;
    if confidence_threshold.is_nan() {
        return Err(DetpostError::InvalidConfig("confidence threshold is NaN"));
    }
    Ok(())
}

/// Decodes a single row, returning `None` when it falls below threshold.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub(crate) fn decode_row<S: TensorSource + ?Sized>(
    source: &S,
    layout: TensorLayout,
    row: usize,
    labels: &LabelTable,
    confidence_threshold: f32,
) -> DetpostResult<Option<Detection>> {
    let objectness = source.value(row, COL_OBJECTNESS);
    // Written as a negated `>` so NaN scores are dropped too.
    if !(objectness > confidence_threshold) {
        return Ok(None);
    }

    let bbox = Rect::from_center(
        source.value(row, COL_CX),
        source.value(row, COL_CY),
        source.value(row, COL_W),
        source.value(row, COL_H),
    );
    let (class_id, _) = select_class(source, row, layout.num_classes);
    let label = labels.resolve(class_id)?;

    Ok(Some(Detection {
        label: label.to_owned(),
        class_id,
        confidence: objectness,
        bbox,
    }))
}

/// Returns the index and value of the highest class probability in `row`.
///
/// The scan is seeded with slot 0 and only moves on a strictly greater
/// value, so the lowest index wins ties and all-negative (logit) rows still
/// select their true maximum.
pub fn select_class<S: TensorSource + ?Sized>(
    source: &S,
    row: usize,
    num_classes: usize,
) -> (usize, f32) {
    let mut best_idx = 0usize;
    let mut best = source.value(row, COL_FIRST_CLASS);
    for class_id in 1..num_classes {
        let prob = source.value(row, COL_FIRST_CLASS + class_id);
        if prob > best {
            best = prob;
            best_idx = class_id;
        }
    }
    (best_idx, best)
}
