//! Axis-aligned rectangles and overlap measures.
//!
//! `Rect` stores edges rather than origin and size so that boxes decoded from
//! a network can be carried without normalization. Nothing enforces
//! `right >= left` or `bottom >= top`; inverted or zero-sized rectangles have a
//! non-positive area and never overlap anything under [`iou`].

/// Axis-aligned rectangle given by its four edges.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Left edge (minimum x for a well-formed rectangle).
    pub left: f32,
    /// Top edge (minimum y for a well-formed rectangle).
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl Rect {
    /// Creates a rectangle from its edges.
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle from a center point and full extents.
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Self {
            left: cx - half_w,
            top: cy - half_h,
            right: cx + half_w,
            bottom: cy + half_h,
        }
    }

    /// Signed width; negative for inverted rectangles.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Signed height; negative for inverted rectangles.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Returns the center point as `(x, y)`.
    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Signed area `width * height`; may be zero or negative.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Area of the overlap with `other`, clamped at zero per axis.
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let inter_w = (self.right.min(other.right) - self.left.max(other.left)).max(0.0);
        let inter_h = (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0.0);
        inter_w * inter_h
    }
}

/// Intersection-over-union of two rectangles.
///
/// Returns 0 when either rectangle has a non-positive area, so degenerate
/// boxes never suppress or get suppressed. The ratio is formed in `f64`, so
/// any finite edges give a result in `[0, 1]`; infinite edges give NaN.
pub fn iou(a: &Rect, b: &Rect) -> f32 {
    if a.area() <= 0.0 || b.area() <= 0.0 {
        return 0.0;
    }

    let inter = span_overlap(a.left, a.right, b.left, b.right)
        * span_overlap(a.top, a.bottom, b.top, b.bottom);
    let union = wide_area(a) + wide_area(b) - inter;
    (inter / union) as f32
}

fn wide_area(r: &Rect) -> f64 {
    (f64::from(r.right) - f64::from(r.left)) * (f64::from(r.bottom) - f64::from(r.top))
}

fn span_overlap(a_lo: f32, a_hi: f32, b_lo: f32, b_hi: f32) -> f64 {
    (f64::from(a_hi.min(b_hi)) - f64::from(a_lo.max(b_lo))).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::{iou, Rect};

    #[test]
    fn from_center_spans_half_extents() {
        let rect = Rect::from_center(10.0, 20.0, 4.0, 6.0);
        assert_eq!(rect, Rect::new(8.0, 17.0, 12.0, 23.0));
        assert_eq!(rect.center(), (10.0, 20.0));
        assert!((rect.area() - 24.0).abs() < 1e-6);
    }

    #[test]
    fn identical_rects_have_unit_iou() {
        let rect = Rect::new(0.0, 0.0, 2.0, 3.0);
        assert!((iou(&rect, &rect) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn half_overlap_matches_hand_computation() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(1.0, 0.0, 3.0, 2.0);
        // intersection 2, union 6
        assert!((iou(&a, &b) - 1.0 / 3.0).abs() < 1e-6);
        assert!((iou(&b, &a) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn intersection_area_clamps_each_axis() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        assert_eq!(a.intersection_area(&Rect::new(2.0, 1.0, 6.0, 3.0)), 4.0);
        assert_eq!(a.intersection_area(&Rect::new(5.0, 1.0, 6.0, 3.0)), 0.0);
    }

    #[test]
    fn huge_finite_rects_stay_comparable() {
        let huge = Rect::from_center(0.0, 0.0, 3.0e38, 3.0e38);
        assert!(huge.area().is_infinite());
        assert!((iou(&huge, &huge) - 1.0).abs() < 1e-6);

        let right_half = Rect::new(0.0, huge.top, huge.right, huge.bottom);
        assert!((iou(&huge, &right_half) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn disjoint_and_touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let touching = Rect::new(1.0, 0.0, 2.0, 1.0);
        let far = Rect::new(5.0, 5.0, 6.0, 6.0);
        assert_eq!(iou(&a, &touching), 0.0);
        assert_eq!(iou(&a, &far), 0.0);
    }

    #[test]
    fn degenerate_rects_never_overlap() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        let zero_width = Rect::new(1.0, 1.0, 1.0, 3.0);
        let inverted = Rect::new(3.0, 3.0, 1.0, 1.0);
        assert_eq!(iou(&a, &zero_width), 0.0);
        assert_eq!(iou(&zero_width, &a), 0.0);
        assert_eq!(iou(&zero_width, &zero_width), 0.0);

        let half_inverted = Rect::new(3.0, 1.0, 1.0, 3.0);
        assert!(half_inverted.area() < 0.0);
        assert_eq!(iou(&a, &half_inverted), 0.0);

        // Flipped on both axes the signed area is positive, but the clamped
        // intersection is still empty.
        assert!(inverted.area() > 0.0);
        assert_eq!(iou(&a, &inverted), 0.0);
        assert_eq!(iou(&inverted, &inverted), 0.0);
    }
}
