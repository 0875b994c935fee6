//! Confidence ordering for detections.

use crate::candidate::Detection;
use std::cmp::Ordering;

fn detection_cmp_desc(a: &Detection, b: &Detection) -> Ordering {
    b.confidence.total_cmp(&a.confidence)
}

/// Sorts by descending confidence; equal scores keep their input order.
pub(crate) fn sort_detections_desc(detections: &mut [Detection]) {
    // `sort_by` is stable, which is what keeps ties deterministic.
    detections.sort_by(detection_cmp_desc);
}

/// Keeps the `max` highest-confidence detections, in descending order.
pub(crate) fn keep_top(detections: &mut Vec<Detection>, max: usize) {
    sort_detections_desc(detections);
    detections.truncate(max);
}

#[cfg(test)]
mod tests {
    use super::{keep_top, sort_detections_desc};
    use crate::candidate::Detection;
    use crate::geometry::Rect;

    fn det(class_id: usize, confidence: f32) -> Detection {
        Detection {
            label: format!("c{class_id}"),
            class_id,
            confidence,
            bbox: Rect::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut dets = vec![det(0, 0.5), det(1, 0.9), det(2, 0.5), det(3, 0.7)];
        sort_detections_desc(&mut dets);
        let order: Vec<_> = dets.iter().map(|d| d.class_id).collect();
        assert_eq!(order, [1, 3, 0, 2]);
    }

    #[test]
    fn keep_top_truncates_after_sorting() {
        let mut dets = vec![det(0, 0.1), det(1, 0.9), det(2, 0.4)];
        keep_top(&mut dets, 2);
        let order: Vec<_> = dets.iter().map(|d| d.class_id).collect();
        assert_eq!(order, [1, 2]);
    }
}
