/// Axis-aligned rectangles in world units.
///
/// Screen space: x grows right, y grows down, origin at the top-left
/// corner of the visible 800x600 playfield.
///
/// Positions are `f32` so fractional gravity accumulates exactly;
/// snapping (`set_bottom`, `set_right`, ...) writes exact edge values,
/// which is what makes "touching but not overlapping" stable.

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline] pub fn left(&self) -> f32 { self.x }
    #[inline] pub fn right(&self) -> f32 { self.x + self.w }
    #[inline] pub fn top(&self) -> f32 { self.y }
    #[inline] pub fn bottom(&self) -> f32 { self.y + self.h }
    #[inline] pub fn center_x(&self) -> f32 { self.x + self.w / 2.0 }
    #[inline] pub fn center_y(&self) -> f32 { self.y + self.h / 2.0 }

    #[inline] pub fn set_left(&mut self, v: f32) { self.x = v; }
    #[inline] pub fn set_right(&mut self, v: f32) { self.x = v - self.w; }
    #[inline] pub fn set_top(&mut self, v: f32) { self.y = v; }
    #[inline] pub fn set_bottom(&mut self, v: f32) { self.y = v - self.h; }
    #[inline] pub fn set_center_x(&mut self, v: f32) { self.x = v - self.w / 2.0; }
    #[inline] pub fn set_center_y(&mut self, v: f32) { self.y = v - self.h / 2.0; }

    /// Translate in place.
    #[inline]
    pub fn shift(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Positive area? Level data must satisfy this.
    pub fn is_valid(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    /// Non-zero-area overlap test. Shared edges do not count.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        intersects(self, other)
    }
}

/// Standard AABB test with strict inequalities.
///
/// `a.left < b.right && a.right > b.left && a.top < b.bottom && a.bottom > b.top`
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right()
        && a.right() > b.left()
        && a.top() < b.bottom()
        && a.bottom() > b.top()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(&a, &b));
        assert!(intersects(&b, &a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let floor = Rect::new(0.0, 100.0, 50.0, 20.0);
        let standing = Rect::new(10.0, 65.0, 20.0, 35.0); // bottom == 100
        assert_eq!(standing.bottom(), floor.top());
        assert!(!intersects(&standing, &floor));

        let wall = Rect::new(30.0, 0.0, 10.0, 200.0);
        let against = Rect::new(10.0, 50.0, 20.0, 35.0); // right == 30
        assert!(!intersects(&against, &wall));
    }

    #[test]
    fn contained_rect_intersects() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 5.0, 5.0);
        assert!(outer.intersects(&inner));
    }

    #[test]
    fn edge_setters_snap_exactly() {
        let mut r = Rect::new(3.3, 7.7, 20.0, 35.0);
        r.set_bottom(100.0);
        assert_eq!(r.bottom(), 100.0);
        r.set_right(250.0);
        assert_eq!(r.right(), 250.0);
        r.set_center_x(60.0);
        assert_eq!(r.center_x(), 60.0);
    }

    #[test]
    fn validity_requires_positive_extent() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!Rect::new(0.0, 0.0, 4.0, -1.0).is_valid());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn rect() -> impl Strategy<Value = Rect> {
            (-500i32..500, -500i32..500, 1i32..200, 1i32..200)
                .prop_map(|(x, y, w, h)| Rect::new(x as f32, y as f32, w as f32, h as f32))
        }

        proptest! {
            #[test]
            fn intersection_is_symmetric(a in rect(), b in rect()) {
                prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
            }

            #[test]
            fn edge_adjacent_rects_never_intersect(a in rect(), h in 1i32..200, w in 1i32..200) {
                let right_of = Rect::new(a.right(), a.y, w as f32, h as f32);
                let below = Rect::new(a.x, a.bottom(), w as f32, h as f32);
                prop_assert!(!intersects(&a, &right_of));
                prop_assert!(!intersects(&a, &below));
            }
        }
    }
}
