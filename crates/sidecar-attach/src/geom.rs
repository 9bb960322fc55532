// Geometry primitives in the host windowing space (origin bottom-left, y grows upward).

/// An axis-aligned rectangle. `y` is the bottom edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// Construct a rectangle from origin and size.
    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y
    }
    #[inline]
    pub fn top(&self) -> f64 {
        self.y + self.h
    }
    #[inline]
    pub fn cx(&self) -> f64 {
        self.x + self.w / 2.0
    }
    #[inline]
    pub fn cy(&self) -> f64 {
        self.y + self.h / 2.0
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.left() && px <= self.right() && py >= self.bottom() && py <= self.top()
    }

    /// Area of the intersection with `other`; zero when disjoint.
    #[inline]
    pub fn intersection_area(&self, other: &Self) -> f64 {
        overlap_1d(self.left(), self.right(), other.left(), other.right())
            * overlap_1d(self.bottom(), self.top(), other.bottom(), other.top())
    }

    /// Convert a top-left-origin frame (accessibility space) into this space,
    /// flipping against a reference height.
    #[inline]
    pub fn flip_from_top_left(ax_x: f64, ax_y: f64, w: f64, h: f64, ref_height: f64) -> Self {
        Self {
            x: ax_x,
            y: ref_height - ax_y - h,
            w,
            h,
        }
    }
}

#[inline]
pub fn overlap_1d(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    let l = a1.max(b1);
    let r = a2.min(b2);
    (r - l).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_and_center() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 20.0);
        assert_eq!(r.top(), 60.0);
        assert_eq!(r.cx(), 25.0);
        assert_eq!(r.cy(), 40.0);
    }

    #[test]
    fn point_containment_is_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_point(0.0, 0.0));
        assert!(r.contains_point(10.0, 10.0));
        assert!(!r.contains_point(-0.1, 0.0));
        assert!(!r.contains_point(0.0, 10.1));
    }

    #[test]
    fn intersection_area_partial_and_disjoint() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersection_area(&b), 2500.0);
        let c = Rect::new(200.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection_area(&c), 0.0);
        // Touching edges share no area.
        let d = Rect::new(100.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection_area(&d), 0.0);
    }

    #[test]
    fn flip_uses_reference_height() {
        // A 600px tall window 100px below the top of a 1080px display.
        let r = Rect::flip_from_top_left(40.0, 100.0, 800.0, 600.0, 1080.0);
        assert_eq!(r, Rect::new(40.0, 380.0, 800.0, 600.0));
    }
}
