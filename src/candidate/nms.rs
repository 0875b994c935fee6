//! Greedy IoU non-maximum suppression.

use crate::candidate::order::sort_detections_desc;
use crate::candidate::Detection;
use crate::geometry::iou;
use crate::trace::{enter_stage, stage_output, trace_note};

/// Which detections are allowed to suppress each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SuppressionMode {
    /// Any two boxes compete regardless of class.
    #[default]
    ClassAgnostic,
    /// Only boxes sharing a `class_id` compete.
    PerClass,
}

impl SuppressionMode {
    fn competes(self, a: &Detection, b: &Detection) -> bool {
        match self {
            SuppressionMode::ClassAgnostic => true,
            SuppressionMode::PerClass => a.class_id == b.class_id,
        }
    }
}

/// Suppression configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NmsParams {
    /// Maximum number of detections to return.
    pub limit: usize,
    /// Boxes overlapping a kept box by strictly more than this are dropped.
    pub iou_threshold: f32,
    /// Class interaction policy.
    pub mode: SuppressionMode,
}

/// Applies greedy non-maximum suppression.
///
/// Detections are ranked by descending confidence (stable, so equal scores
/// keep their input order). Walking that ranking, each surviving detection is
/// kept and every later detection that overlaps it with an IoU above
/// `params.iou_threshold` is deactivated. Boxes that do not overlap at all
/// never suppress each other, whatever the threshold. The walk stops once `params.limit`
/// detections are kept or no undecided detection remains. The result is in
/// descending confidence order.
///
/// Cost is O(n²) IoU evaluations in the worst case, so callers feeding dense
/// heads with a low confidence threshold should cap `n` first (see
/// `DetectConfig::max_candidates`).
pub fn nms(mut detections: Vec<Detection>, params: NmsParams) -> Vec<Detection> {
    if params.limit == 0 {
        trace_note!("nms limit is zero, dropping {} detections", detections.len());
        return Vec::new();
    }
    if detections.is_empty() {
        return Vec::new();
    }

    let _stage = enter_stage("nms", detections.len());

    sort_detections_desc(&mut detections);
    let n = detections.len();
    let mut active = vec![true; n];
    let mut keep = vec![false; n];
    let mut kept = 0usize;
    // Active detections not yet visited by the outer walk.
    let mut undecided = n;

    for i in 0..n {
        if !active[i] {
            continue;
        }
        keep[i] = true;
        kept += 1;
        undecided -= 1;
        if kept == params.limit {
            break;
        }

        let anchor = &detections[i];
        for j in (i + 1)..n {
            if !active[j] || !params.mode.competes(anchor, &detections[j]) {
                continue;
            }
            let overlap = iou(&anchor.bbox, &detections[j].bbox);
            if overlap > 0.0 && overlap > params.iou_threshold {
                active[j] = false;
                undecided -= 1;
            }
        }
        if undecided == 0 {
            break;
        }
    }

    let out: Vec<Detection> = detections
        .into_iter()
        .zip(keep)
        .filter_map(|(det, keep)| keep.then_some(det))
        .collect();
    stage_output("nms", out.len());
    out
}
