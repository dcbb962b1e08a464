// Copyright 2026 the Curvekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding boxes.

use crate::{Point, Vec2};

/// An axis-aligned box over 2D points.
///
/// Unlike a general rectangle, a bounding box may be [empty], the identity
/// of [`union`]. The empty box contains nothing, overlaps nothing and has
/// zero area. A non-empty box always has `min <= max` componentwise; a box
/// around a single point (or a horizontal or vertical segment) is not empty,
/// it merely has zero area.
///
/// The distance bounds are what make pruning sound: if
/// [`lower_bound_of_distance`] exceeds a threshold, nothing inside the box
/// is within that threshold of the point; if [`upper_bound_of_distance`]
/// is within the threshold, everything inside the box is.
///
/// [empty]: BoundingBox::EMPTY
/// [`union`]: BoundingBox::union
/// [`lower_bound_of_distance`]: BoundingBox::lower_bound_of_distance
/// [`upper_bound_of_distance`]: BoundingBox::upper_bound_of_distance
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// The minimum corner.
    pub min: Point,
    /// The maximum corner.
    pub max: Point,
}

impl BoundingBox {
    /// The empty box.
    pub const EMPTY: BoundingBox = BoundingBox {
        min: Point::new(f64::INFINITY, f64::INFINITY),
        max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    /// A new box from its corners.
    ///
    /// The caller is responsible for `min <= max`; use
    /// [`from_points`](Self::from_points) for arbitrary corners.
    #[inline]
    pub const fn new(min: Point, max: Point) -> BoundingBox {
        BoundingBox { min, max }
    }

    /// The smallest box containing two points.
    #[inline]
    pub fn from_points(p0: impl Into<Point>, p1: impl Into<Point>) -> BoundingBox {
        let p0 = p0.into();
        let p1 = p1.into();
        BoundingBox {
            min: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            max: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }

    /// The smallest box containing every point of an iterator.
    ///
    /// Empty when the iterator is.
    pub fn from_points_iter(points: impl IntoIterator<Item = Point>) -> BoundingBox {
        points
            .into_iter()
            .fold(BoundingBox::EMPTY, |bbox, p| bbox.union_pt(p))
    }

    /// Is this the empty box?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// The size of the box as a vector; zero for the empty box.
    #[inline]
    pub fn size(&self) -> Vec2 {
        if self.is_empty() {
            Vec2::ZERO
        } else {
            self.max - self.min
        }
    }

    /// The center of the box.
    ///
    /// Not meaningful for the empty box.
    #[inline]
    pub fn center(&self) -> Point {
        self.min.midpoint(self.max)
    }

    /// The area of the box; zero for the empty box and for degenerate boxes.
    #[inline]
    pub fn area(&self) -> f64 {
        let size = self.size();
        size.x * size.y
    }

    /// The smallest box enclosing both boxes.
    #[inline]
    #[must_use]
    pub fn union(&self, other: BoundingBox) -> BoundingBox {
        BoundingBox {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// The smallest box enclosing this box and a point.
    #[inline]
    #[must_use]
    pub fn union_pt(&self, pt: Point) -> BoundingBox {
        BoundingBox {
            min: Point::new(self.min.x.min(pt.x), self.min.y.min(pt.y)),
            max: Point::new(self.max.x.max(pt.x), self.max.y.max(pt.y)),
        }
    }

    /// The intersection of two boxes.
    ///
    /// Returns [`EMPTY`](Self::EMPTY) when they do not overlap. Boxes that
    /// only touch intersect in a zero-area box.
    #[inline]
    #[must_use]
    pub fn intersection(&self, other: BoundingBox) -> BoundingBox {
        let result = BoundingBox {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if result.is_empty() {
            BoundingBox::EMPTY
        } else {
            result
        }
    }

    /// Does the box contain the point? The boundary counts as inside.
    #[inline]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.min.x && pt.x <= self.max.x && pt.y >= self.min.y && pt.y <= self.max.y
    }

    /// Do the boxes share at least one point?
    #[inline]
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grow the box by `amount` on every side.
    ///
    /// The empty box stays empty.
    #[inline]
    #[must_use]
    pub fn inflate(&self, amount: f64) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        let delta = Vec2::new(amount, amount);
        BoundingBox {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// The distance from `pt` to the nearest point of the box.
    ///
    /// Zero when the point is inside; infinite for the empty box.
    #[inline]
    pub fn lower_bound_of_distance(&self, pt: Point) -> f64 {
        if self.is_empty() {
            return f64::INFINITY;
        }
        let dx = (self.min.x - pt.x).max(0.0).max(pt.x - self.max.x);
        let dy = (self.min.y - pt.y).max(0.0).max(pt.y - self.max.y);
        dx.hypot(dy)
    }

    /// The distance from `pt` to the farthest corner of the box.
    ///
    /// Every point of the box is at most this far away. Infinite for the
    /// empty box.
    #[inline]
    pub fn upper_bound_of_distance(&self, pt: Point) -> f64 {
        if self.is_empty() {
            return f64::INFINITY;
        }
        let dx = (pt.x - self.min.x).abs().max((pt.x - self.max.x).abs());
        let dy = (pt.y - self.min.y).abs().max((pt.y - self.max.y).abs());
        dx.hypot(dy)
    }
}

impl Default for BoundingBox {
    #[inline]
    fn default() -> BoundingBox {
        BoundingBox::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use crate::{BoundingBox, Point};

    fn unit() -> BoundingBox {
        BoundingBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0))
    }

    #[test]
    fn empty_box_identities() {
        let b = unit();
        assert!(BoundingBox::EMPTY.is_empty());
        assert!(!b.is_empty());
        assert_eq!(BoundingBox::EMPTY.union(b), b);
        assert_eq!(b.union(BoundingBox::EMPTY), b);
        assert_eq!(BoundingBox::EMPTY.area(), 0.0);
        assert!(!BoundingBox::EMPTY.contains(Point::ZERO));
        assert!(!BoundingBox::EMPTY.overlaps(&b));
        assert!(BoundingBox::from_points_iter([]).is_empty());
    }

    #[test]
    fn union_and_intersection() {
        let a = unit();
        let b = BoundingBox::from_points((2.0, 0.5), (0.5, 2.0));
        assert_eq!(b.min, Point::new(0.5, 0.5));
        assert_eq!(
            a.union(b),
            BoundingBox::new(Point::new(0.0, 0.0), Point::new(2.0, 2.0))
        );
        assert_eq!(
            a.intersection(b),
            BoundingBox::new(Point::new(0.5, 0.5), Point::new(1.0, 1.0))
        );
        assert_eq!(a.intersection(b).area(), 0.25);

        let far = BoundingBox::from_points((3.0, 3.0), (4.0, 4.0));
        assert!(a.intersection(far).is_empty());
        assert!(!a.overlaps(&far));
    }

    #[test]
    fn touching_boxes() {
        let a = BoundingBox::from_points((0.0, 0.0), (1.0, 0.0));
        let b = BoundingBox::from_points((1.0, 0.0), (1.0, 1.0));
        assert!(a.overlaps(&b));
        let shared = a.intersection(b);
        assert!(!shared.is_empty());
        assert_eq!(shared.area(), 0.0);
        assert_eq!(shared.min, Point::new(1.0, 0.0));
        assert_eq!(shared.max, Point::new(1.0, 0.0));
    }

    #[test]
    fn contains_boundary() {
        let b = unit();
        assert!(b.contains(Point::new(0.0, 0.5)));
        assert!(b.contains(Point::new(1.0, 1.0)));
        assert!(!b.contains(Point::new(1.0 + 1e-12, 1.0)));
    }

    #[test]
    fn distance_bounds() {
        let b = unit();
        let inside = Point::new(0.5, 0.5);
        assert_eq!(b.lower_bound_of_distance(inside), 0.0);
        assert!((b.upper_bound_of_distance(inside) - 0.5f64.hypot(0.5)).abs() < 1e-15);

        let outside = Point::new(4.0, 5.0);
        assert_eq!(b.lower_bound_of_distance(outside), 5.0);
        assert_eq!(b.upper_bound_of_distance(outside), 4.0f64.hypot(5.0));

        let beside = Point::new(-2.0, 0.5);
        assert_eq!(b.lower_bound_of_distance(beside), 2.0);
        assert!(BoundingBox::EMPTY.lower_bound_of_distance(inside).is_infinite());
    }

    #[test]
    fn inflate_box() {
        let b = unit().inflate(0.5);
        assert_eq!(b.min, Point::new(-0.5, -0.5));
        assert_eq!(b.max, Point::new(1.5, 1.5));
        assert!(BoundingBox::EMPTY.inflate(1.0).is_empty());
    }
}
