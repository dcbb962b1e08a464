// Copyright 2026 the Curvekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connected sequences of curves.

use core::cmp::Ordering;
use core::fmt;
use core::ptr;
use std::sync::OnceLock;

use crate::common::solve_cubic;
use crate::{
    Affine, BoundingBox, Bvh, ComponentError, Curve, Line, ParamCurve, ParamCurveArclen,
    ParamCurveExtrema, Point,
};

/// A position on a path component: a segment and a parameter on it.
///
/// Ordered by segment, then by parameter.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexedLocation {
    /// The index of the segment.
    pub segment_index: usize,
    /// The parameter on that segment, in `[0, 1]`.
    pub t: f64,
}

impl IndexedLocation {
    /// Create a new location.
    #[inline]
    pub fn new(segment_index: usize, t: f64) -> IndexedLocation {
        IndexedLocation { segment_index, t }
    }

    /// A total order, for sorting: by segment, then by [`f64::total_cmp`]
    /// on the parameter.
    pub fn total_cmp(&self, other: &IndexedLocation) -> Ordering {
        self.segment_index
            .cmp(&other.segment_index)
            .then(self.t.total_cmp(&other.t))
    }
}

/// A point where two path components meet, as a location on each.
///
/// For self-intersections both locations are on the same component and
/// `location1.segment_index < location2.segment_index`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathIntersection {
    /// The location on the first component.
    pub location1: IndexedLocation,
    /// The location on the second component.
    pub location2: IndexedLocation,
}

impl PathIntersection {
    /// Create a new intersection record.
    #[inline]
    pub fn new(location1: IndexedLocation, location2: IndexedLocation) -> PathIntersection {
        PathIntersection {
            location1,
            location2,
        }
    }

    /// The same intersection seen from the other component.
    #[inline]
    #[must_use]
    pub fn swapped(self) -> PathIntersection {
        PathIntersection {
            location1: self.location2,
            location2: self.location1,
        }
    }

    fn total_cmp(&self, other: &PathIntersection) -> Ordering {
        self.location1
            .total_cmp(&other.location1)
            .then(self.location2.total_cmp(&other.location2))
    }
}

/// How a winding number decides whether a point is inside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillRule {
    /// Inside when the winding number is not zero.
    #[default]
    NonZero,
    /// Inside when the winding number is odd.
    EvenOdd,
}

impl FillRule {
    /// Is a point with this winding number inside?
    #[inline]
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }
}

/// A drawing command, for handing a component to a renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathEl {
    /// Start a new subpath at the given point.
    MoveTo(Point),
    /// A line from the current point.
    LineTo(Point),
    /// A quadratic Bézier from the current point.
    QuadTo(Point, Point),
    /// A cubic Bézier from the current point.
    CurveTo(Point, Point, Point),
    /// Close the subpath.
    ClosePath,
}

/// An ordered, non-empty chain of curves, each starting where the previous
/// one ends.
///
/// The component is *closed* when the last curve ends exactly on the start
/// of the first. Queries are answered with the help of a [`Bvh`] over the
/// curves' bounding boxes, built on first use.
///
/// # Joints
///
/// Where segment `k` ends and segment `k + 1` starts, the same point is both
/// `(k, 1.0)` and `(k + 1, 0.0)`. Intersection results always use the first
/// form: a location with `t == 0` is reported only on the first segment of
/// an open component, which has no predecessor.
#[derive(Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<Vec<Point>>", into = "Vec<Vec<Point>>")
)]
pub struct PathComponent {
    curves: Vec<Curve>,
    bvh: OnceLock<Bvh>,
}

impl PathComponent {
    /// Create a component from its curves.
    ///
    /// # Panics
    ///
    /// If `curves` is empty. Use [`try_new`](Self::try_new) for curves that
    /// come from outside the program.
    pub fn new(curves: Vec<Curve>) -> PathComponent {
        assert!(!curves.is_empty(), "a path component needs at least one curve");
        PathComponent {
            curves,
            bvh: OnceLock::new(),
        }
    }

    /// Create a component from its curves.
    ///
    /// # Errors
    ///
    /// [`ComponentError::Empty`] if `curves` is empty.
    pub fn try_new(curves: Vec<Curve>) -> Result<PathComponent, ComponentError> {
        if curves.is_empty() {
            return Err(ComponentError::Empty);
        }
        Ok(PathComponent::new(curves))
    }

    /// The control points of every curve, in order.
    ///
    /// This is the inverse of the `TryFrom<Vec<Vec<Point>>>` conversion.
    pub fn to_control_points(&self) -> Vec<Vec<Point>> {
        self.curves
            .iter()
            .map(|curve| curve.control_points().to_vec())
            .collect()
    }

    /// The curves.
    #[inline]
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// The curve at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    #[inline]
    pub fn curve(&self, index: usize) -> &Curve {
        &self.curves[index]
    }

    /// The number of curves; never zero.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// The start of the first curve.
    #[inline]
    pub fn start_point(&self) -> Point {
        self.curves[0].start()
    }

    /// The end of the last curve.
    #[inline]
    pub fn end_point(&self) -> Point {
        self.curves[self.curves.len() - 1].end()
    }

    /// Does the last curve end exactly where the first one starts?
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.start_point() == self.end_point()
    }

    /// The hierarchy over the curves' bounding boxes, built on first use.
    ///
    /// Leaf indices are curve indices.
    pub fn bvh(&self) -> &Bvh {
        self.bvh.get_or_init(|| {
            let boxes: Vec<BoundingBox> =
                self.curves.iter().map(|curve| curve.bounding_box()).collect();
            Bvh::new(&boxes)
        })
    }

    /// The smallest box containing every curve.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bvh().bounding_box()
    }

    /// The total arc length.
    pub fn length(&self, accuracy: f64) -> f64 {
        let accuracy = accuracy / self.curves.len() as f64;
        self.curves.iter().map(|curve| curve.arclen(accuracy)).sum()
    }

    /// The point at `location`.
    ///
    /// # Panics
    ///
    /// If the segment index is out of bounds.
    pub fn point_at(&self, location: IndexedLocation) -> Point {
        self.curves[location.segment_index].eval(location.t)
    }

    /// The component as drawing commands.
    ///
    /// A closed component ends with [`PathEl::ClosePath`].
    pub fn path_elements(&self) -> Vec<PathEl> {
        let mut elements = Vec::with_capacity(self.curves.len() + 2);
        elements.push(PathEl::MoveTo(self.start_point()));
        elements.extend(self.curves.iter().map(|curve| match *curve {
            Curve::Line(l) => PathEl::LineTo(l.p1),
            Curve::Quad(q) => PathEl::QuadTo(q.p1, q.p2),
            Curve::Cubic(c) => PathEl::CurveTo(c.p1, c.p2, c.p3),
        }));
        if self.is_closed() {
            elements.push(PathEl::ClosePath);
        }
        elements
    }

    /// Is `location` the redundant form of a joint?
    fn is_joint_start(&self, location: IndexedLocation) -> bool {
        location.t == 0.0 && (location.segment_index > 0 || self.is_closed())
    }

    /// Where this component meets `other`.
    ///
    /// Curves are considered to meet where they come within `threshold` of
    /// each other. Hits on joints are reported once, per the joint rule in
    /// the type documentation. The result is sorted by location.
    ///
    /// # Panics
    ///
    /// If `other` is `self`; use
    /// [`self_intersections`](Self::self_intersections) instead.
    pub fn intersections(&self, other: &PathComponent, threshold: f64) -> Vec<PathIntersection> {
        assert!(
            !ptr::eq(self, other),
            "use self_intersections to intersect a component with itself"
        );
        let mut result = Vec::new();
        self.bvh().enumerate_intersections(other.bvh(), |i, j| {
            for hit in self.curves[i].intersections(&other.curves[j], threshold) {
                let location1 = IndexedLocation::new(i, hit.t1);
                let location2 = IndexedLocation::new(j, hit.t2);
                if self.is_joint_start(location1) || other.is_joint_start(location2) {
                    continue;
                }
                result.push(PathIntersection::new(location1, location2));
            }
        });
        result.sort_by(PathIntersection::total_cmp);
        result
    }

    /// Where this component crosses or touches itself.
    ///
    /// Each hit is reported once, with the lower segment index first.
    /// Segments are never intersected with themselves, so a loop inside a
    /// single cubic is not reported. Joints between consecutive segments
    /// are not intersections.
    pub fn self_intersections(&self, threshold: f64) -> Vec<PathIntersection> {
        self.self_intersections_impl(threshold, true)
    }

    fn self_intersections_impl(
        &self,
        threshold: f64,
        skip_touching_neighbors: bool,
    ) -> Vec<PathIntersection> {
        let n = self.curves.len();
        let closed = self.is_closed();
        let mut result = Vec::new();
        self.bvh().enumerate_self_intersections(|i, j| {
            // `j` follows `i`, or `i` (the first segment) follows `j` (the last).
            let neighbors = if j == i + 1 {
                Some((i, j))
            } else if closed && i == 0 && j == n - 1 {
                Some((j, i))
            } else {
                None
            };
            if let Some((prev, next)) = neighbors {
                if skip_touching_neighbors && self.touch_only_at_joint(prev, next) {
                    return;
                }
            }
            for hit in self.curves[i].intersections(&self.curves[j], threshold) {
                let location1 = IndexedLocation::new(i, hit.t1);
                let location2 = IndexedLocation::new(j, hit.t2);
                if self.is_joint_start(location1) || self.is_joint_start(location2) {
                    continue;
                }
                result.push(PathIntersection::new(location1, location2));
            }
        });
        result.sort_by(PathIntersection::total_cmp);
        result
    }

    /// Do consecutive segments `prev` and `next` meet only at their joint?
    ///
    /// True when their boxes share exactly the joint point and no control
    /// point of `next` past its start lies in the box of `prev`.
    fn touch_only_at_joint(&self, prev: usize, next: usize) -> bool {
        let bvh = self.bvh();
        let prev_box = bvh.leaf_bounding_box(prev);
        let shared = prev_box.intersection(bvh.leaf_bounding_box(next));
        let joint = self.curves[prev].end();
        if shared.is_empty() || shared.min != joint || shared.max != joint {
            return false;
        }
        self.curves[next]
            .control_points()
            .iter()
            .skip(1)
            .all(|&p| !prev_box.contains(p))
    }

    /// Is some point of the component within `distance` of `point`?
    pub fn is_within_distance(&self, point: Point, distance: f64) -> bool {
        let mut found = false;
        self.bvh().visit(|node, _| {
            if found {
                return false;
            }
            let bbox = node.bounding_box();
            if bbox.lower_bound_of_distance(point) > distance {
                return false;
            }
            if bbox.upper_bound_of_distance(point) <= distance {
                found = true;
                return false;
            }
            if let Some(index) = node.leaf_index() {
                let (_, nearest) = self.curves[index].project(point);
                found = nearest.distance(point) <= distance;
                return false;
            }
            true
        });
        found
    }

    /// Offset every curve by `distance` along its normal.
    ///
    /// Consecutive offset curves are joined at the midpoint of the gap
    /// between them, and a closed component yields a closed one. Returns
    /// `None` only if no curve has an offset, which happens when every
    /// curve is degenerate.
    pub fn offset(&self, distance: f64) -> Option<PathComponent> {
        let mut curves: Vec<Curve> = self
            .curves
            .iter()
            .flat_map(|curve| curve.offset(distance))
            .collect();
        if curves.is_empty() {
            return None;
        }
        for i in 1..curves.len() {
            stitch(&mut curves, i - 1, i);
        }
        if self.is_closed() {
            let last = curves.len() - 1;
            stitch(&mut curves, last, 0);
        }
        Some(PathComponent::new(curves))
    }

    /// The winding number of the component around `point`.
    ///
    /// Counter-clockwise turns (in a y-up frame) count `+1`. An open
    /// component is treated as closed by a line from its end back to its
    /// start.
    ///
    /// Each y-monotone piece crossing the leftward ray counts by its
    /// vertical direction, which gives the same total as intersecting the
    /// ray with every curve and summing the signs of the normals there.
    pub fn winding_count(&self, point: Point) -> i32 {
        let mut winding = 0;
        self.bvh().visit(|node, _| {
            let bbox = node.bounding_box();
            // Only curves reaching the left of the point at its height can cross the ray.
            if point.y < bbox.min.y || point.y > bbox.max.y || point.x < bbox.min.x {
                return false;
            }
            if let Some(index) = node.leaf_index() {
                winding += curve_winding(&self.curves[index], point);
            }
            true
        });
        if !self.is_closed() {
            let closing = Curve::Line(Line::new(self.end_point(), self.start_point()));
            winding += curve_winding(&closing, point);
        }
        winding
    }

    /// Is `point` inside the component under `rule`?
    pub fn contains(&self, point: Point, rule: FillRule) -> bool {
        rule.is_inside(self.winding_count(point))
    }

    /// The same component traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> PathComponent {
        PathComponent::new(self.curves.iter().rev().map(Curve::reversed).collect())
    }

    /// The component with `affine` applied to every curve.
    #[must_use]
    pub fn transformed(&self, affine: Affine) -> PathComponent {
        PathComponent::new(
            self.curves
                .iter()
                .map(|curve| curve.transformed(affine))
                .collect(),
        )
    }
}

/// Move the end of `curves[a]` and the start of `curves[b]` to their midpoint.
fn stitch(curves: &mut [Curve], a: usize, b: usize) {
    let mid = curves[a].end().midpoint(curves[b].start());
    curves[a] = curves[a].with_end(mid);
    curves[b] = curves[b].with_start(mid);
}

/// The signed number of times `curve` crosses the ray from `point` toward
/// decreasing x.
fn curve_winding(curve: &Curve, point: Point) -> i32 {
    curve
        .extrema_ranges()
        .into_iter()
        .map(|range| {
            // Pieces must meet the neighboring curves exactly for the
            // half-open rule to count shared vertices once.
            let mut piece = curve.subsegment(range.clone());
            if range.start == 0.0 {
                piece = piece.with_start(curve.start());
            }
            if range.end == 1.0 {
                piece = piece.with_end(curve.end());
            }
            monotone_winding(&piece, point)
        })
        .sum()
}

/// Winding contribution of a piece that is monotone in y.
///
/// The piece covers the half-open interval `[min_y, max_y)`, so where two
/// pieces meet at the height of the point exactly one of them counts.
/// Downward pieces count `+1`, upward ones `-1`.
fn monotone_winding(piece: &Curve, point: Point) -> i32 {
    let start = piece.start();
    let end = piece.end();
    let sign = if end.y > start.y {
        if point.y < start.y || point.y >= end.y {
            return 0;
        }
        -1
    } else if end.y < start.y {
        if point.y < end.y || point.y >= start.y {
            return 0;
        }
        1
    } else {
        return 0;
    };

    let controls = piece.control_points();
    let (min_x, max_x) = controls
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.x), hi.max(p.x))
        });
    if point.x < min_x {
        return 0;
    }
    if point.x >= max_x {
        return sign;
    }

    let t = crossing_parameter(piece, point.y);
    if point.x >= piece.eval(t).x {
        sign
    } else {
        0
    }
}

/// The parameter at which a y-monotone piece reaches height `y`.
fn crossing_parameter(piece: &Curve, y: f64) -> f64 {
    let (c0, c1, c2, c3) = match *piece {
        Curve::Line(l) => (l.p0.y - y, l.p1.y - l.p0.y, 0.0, 0.0),
        Curve::Quad(q) => (
            q.p0.y - y,
            2.0 * (q.p1.y - q.p0.y),
            q.p2.y - 2.0 * q.p1.y + q.p0.y,
            0.0,
        ),
        Curve::Cubic(c) => (
            c.p0.y - y,
            3.0 * (c.p1.y - c.p0.y),
            3.0 * (c.p2.y - 2.0 * c.p1.y + c.p0.y),
            c.p3.y - 3.0 * c.p2.y + 3.0 * c.p1.y - c.p0.y,
        ),
    };
    solve_cubic(c0, c1, c2, c3)
        .into_iter()
        .find(|t| (-1e-9..=1.0 + 1e-9).contains(t))
        .map_or_else(
            // Lost to rounding; fall back to the chord.
            || (y - piece.start().y) / (piece.end().y - piece.start().y),
            |t| t,
        )
        .clamp(0.0, 1.0)
}

impl fmt::Debug for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathComponent")
            .field("curves", &self.curves)
            .finish_non_exhaustive()
    }
}

impl PartialEq for PathComponent {
    fn eq(&self, other: &PathComponent) -> bool {
        self.curves == other.curves
    }
}

impl TryFrom<Vec<Vec<Point>>> for PathComponent {
    type Error = ComponentError;

    fn try_from(control_points: Vec<Vec<Point>>) -> Result<PathComponent, ComponentError> {
        let curves = control_points
            .iter()
            .map(|points| Curve::from_control_points(points))
            .collect::<Result<Vec<_>, _>>()?;
        PathComponent::try_new(curves)
    }
}

impl From<PathComponent> for Vec<Vec<Point>> {
    fn from(component: PathComponent) -> Vec<Vec<Point>> {
        component.to_control_points()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Affine, Bvh, ComponentError, CubicBez, Curve, CurveError, FillRule, IndexedLocation,
        Line, ParamCurve, PathComponent, PathEl, PathIntersection, Point,
    };

    const THRESHOLD: f64 = 1e-6;

    fn polygon(points: &[(f64, f64)]) -> PathComponent {
        let n = points.len();
        PathComponent::new(
            (0..n)
                .map(|i| Curve::Line(Line::new(points[i], points[(i + 1) % n])))
                .collect(),
        )
    }

    fn unit_square() -> PathComponent {
        polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    fn circle() -> PathComponent {
        const K: f64 = 0.552_284_749_830_793_4;
        PathComponent::new(vec![
            Curve::Cubic(CubicBez::new((1.0, 0.0), (1.0, K), (K, 1.0), (0.0, 1.0))),
            Curve::Cubic(CubicBez::new((0.0, 1.0), (-K, 1.0), (-1.0, K), (-1.0, 0.0))),
            Curve::Cubic(CubicBez::new((-1.0, 0.0), (-1.0, -K), (-K, -1.0), (0.0, -1.0))),
            Curve::Cubic(CubicBez::new((0.0, -1.0), (K, -1.0), (1.0, -K), (1.0, 0.0))),
        ])
    }

    fn assert_no_joint_starts(component: &PathComponent, hits: &[PathIntersection]) {
        for hit in hits {
            for location in [hit.location1, hit.location2] {
                let has_predecessor = location.segment_index > 0 || component.is_closed();
                assert!(
                    !(has_predecessor && location.t == 0.0),
                    "joint reported at its start form: {hit:?}"
                );
            }
        }
    }

    #[test]
    fn square_winding() {
        let square = unit_square();
        assert!(square.is_closed());
        let centroid = Point::new(0.5, 0.5);
        assert_eq!(square.winding_count(centroid), 1);
        assert!(square.contains(centroid, FillRule::NonZero));
        assert!(square.contains(centroid, FillRule::EvenOdd));

        for outside in [(5.0, 5.0), (-0.5, 0.5), (1.5, 0.5), (0.5, -3.0)] {
            assert_eq!(square.winding_count(outside.into()), 0, "{outside:?}");
            assert!(!square.contains(outside.into(), FillRule::NonZero));
        }

        assert_eq!(square.reversed().winding_count(centroid), -1);
        assert!(square.reversed().contains(centroid, FillRule::NonZero));
    }

    #[test]
    fn winding_through_vertices() {
        // The ray from the center passes exactly through the left and right corners.
        let diamond = polygon(&[(0.0, -1.0), (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0)]);
        assert_eq!(diamond.winding_count(Point::ZERO), 1);
        assert_eq!(diamond.winding_count(Point::new(2.0, 0.0)), 0);
        assert_eq!(diamond.winding_count(Point::new(-2.0, 0.0)), 0);
    }

    #[test]
    fn winding_of_curved_and_nested_shapes() {
        let circle = circle();
        assert!(circle.is_closed());
        assert_eq!(circle.winding_count(Point::ZERO), 1);
        assert_eq!(circle.winding_count(Point::new(0.7, 0.0)), 1);
        assert_eq!(circle.winding_count(Point::new(0.0, 0.99)), 1);
        assert_eq!(circle.winding_count(Point::new(0.9, 0.9)), 0);
        assert_eq!(circle.winding_count(Point::new(-1.5, 0.0)), 0);

        let doubled = PathComponent::new(
            circle
                .curves()
                .iter()
                .chain(circle.curves())
                .copied()
                .collect(),
        );
        assert_eq!(doubled.winding_count(Point::ZERO), 2);
        assert!(doubled.contains(Point::ZERO, FillRule::NonZero));
        assert!(!doubled.contains(Point::ZERO, FillRule::EvenOdd));
    }

    #[test]
    fn open_component_closes_implicitly() {
        let open = PathComponent::new(vec![
            Curve::Line(Line::new((0.0, 0.0), (1.0, 0.0))),
            Curve::Line(Line::new((1.0, 0.0), (1.0, 1.0))),
            Curve::Line(Line::new((1.0, 1.0), (0.0, 1.0))),
        ]);
        assert!(!open.is_closed());
        assert_eq!(open.winding_count(Point::new(0.5, 0.5)), 1);
        assert_eq!(open.winding_count(Point::new(-0.5, 0.5)), 0);
    }

    #[test]
    fn crossing_squares() {
        let a = unit_square();
        let b = a.transformed(Affine::translate((0.5, 0.5)));
        let ab = a.intersections(&b, THRESHOLD);
        let ba = b.intersections(&a, THRESHOLD);
        assert_eq!(ab.len(), 2, "{ab:?}");
        assert_eq!(ba.len(), 2, "{ba:?}");
        assert_eq!(
            ab,
            vec![
                PathIntersection::new(IndexedLocation::new(1, 0.5), IndexedLocation::new(0, 0.5)),
                PathIntersection::new(IndexedLocation::new(2, 0.5), IndexedLocation::new(3, 0.5)),
            ]
        );
        // Same points, seen from the other side.
        let mut swapped: Vec<_> = ba.iter().map(|hit| hit.swapped()).collect();
        swapped.sort_by(|x, y| x.location1.total_cmp(&y.location1));
        for (x, y) in ab.iter().zip(&swapped) {
            assert!(a.point_at(x.location1).distance(a.point_at(y.location1)) < 1e-12);
            assert!(b.point_at(x.location2).distance(b.point_at(y.location2)) < 1e-12);
        }
    }

    #[test]
    fn joint_hit_reported_once() {
        let vee = PathComponent::new(vec![
            Curve::Line(Line::new((0.0, 0.0), (1.0, 1.0))),
            Curve::Line(Line::new((1.0, 1.0), (2.0, 0.0))),
        ]);
        let post = PathComponent::new(vec![Curve::Line(Line::new((1.0, -1.0), (1.0, 2.0)))]);
        let hits = vee.intersections(&post, THRESHOLD);
        assert_eq!(hits.len(), 1, "{hits:?}");
        assert_eq!(hits[0].location1, IndexedLocation::new(0, 1.0));
        assert!((hits[0].location2.t - 2.0 / 3.0).abs() < 1e-12);

        // The open start of a component is a real location.
        let stub = PathComponent::new(vec![Curve::Line(Line::new((0.0, 0.0), (-1.0, 0.0)))]);
        let hits = stub.intersections(&vee, THRESHOLD);
        assert_eq!(
            hits,
            vec![PathIntersection::new(
                IndexedLocation::new(0, 0.0),
                IndexedLocation::new(0, 0.0)
            )]
        );
    }

    #[test]
    #[should_panic(expected = "use self_intersections")]
    fn intersecting_with_itself_panics() {
        let square = unit_square();
        let _hits = square.intersections(&square, THRESHOLD);
    }

    #[test]
    fn simple_shapes_do_not_self_intersect() {
        for shape in [unit_square(), circle()] {
            assert!(shape.self_intersections(THRESHOLD).is_empty());
            assert!(shape.self_intersections_impl(THRESHOLD, false).is_empty());
        }
    }

    #[test]
    fn bowtie_crosses_once() {
        let bowtie = polygon(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        for shortcut in [true, false] {
            let hits = bowtie.self_intersections_impl(THRESHOLD, shortcut);
            assert_eq!(
                hits,
                vec![PathIntersection::new(
                    IndexedLocation::new(0, 0.5),
                    IndexedLocation::new(2, 0.5)
                )]
            );
            assert_no_joint_starts(&bowtie, &hits);
        }
    }

    #[test]
    fn neighbors_touching_at_joint() {
        // Two cubics that share only their connecting endpoint.
        let s_curve = PathComponent::new(vec![
            Curve::Cubic(CubicBez::new((0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0))),
            Curve::Cubic(CubicBez::new((1.0, 0.0), (1.0, -1.0), (2.0, -1.0), (2.0, 0.0))),
        ]);
        assert!(s_curve.touch_only_at_joint(0, 1));
        assert!(s_curve.self_intersections_impl(THRESHOLD, true).is_empty());
        assert!(s_curve.self_intersections_impl(THRESHOLD, false).is_empty());
    }

    #[test]
    fn neighbors_sharing_an_edge_of_their_boxes() {
        // The boxes meet along a strip of the line, and the cubic swings
        // back to cross the line away from the joint.
        let hook = PathComponent::new(vec![
            Curve::Line(Line::new((0.0, 0.0), (2.0, 0.0))),
            Curve::Cubic(CubicBez::new((2.0, 0.0), (4.0, 2.0), (0.0, 2.0), (1.0, -2.0))),
        ]);
        assert!(!hook.touch_only_at_joint(0, 1));
        let with_shortcut = hook.self_intersections_impl(THRESHOLD, true);
        let without_shortcut = hook.self_intersections_impl(THRESHOLD, false);
        assert_eq!(with_shortcut, without_shortcut);
        assert_eq!(with_shortcut.len(), 1, "{with_shortcut:?}");
        let hit = with_shortcut[0];
        assert_eq!(hit.location1.segment_index, 0);
        assert_eq!(hit.location2.segment_index, 1);
        // y(t) = 6t(1 - t) - 2t³ vanishes where t² + 3t - 3 = 0.
        let t = (21.0_f64.sqrt() - 3.0) / 2.0;
        assert!((hit.location2.t - t).abs() < 1e-6, "{hit:?}");
        let p1 = hook.point_at(hit.location1);
        let p2 = hook.point_at(hit.location2);
        assert!(p1.distance(p2) < 1e-6);
        assert!((p1.x - 0.927).abs() < 1e-3, "{p1:?}");
    }

    #[test]
    fn figure_eight_revisits_a_vertex() {
        // Passes through the origin twice.
        let eight = polygon(&[
            (0.0, 0.0),
            (1.0, 1.0),
            (1.0, -1.0),
            (0.0, 0.0),
            (-1.0, 1.0),
            (-1.0, -1.0),
        ]);
        let hits = eight.self_intersections(THRESHOLD);
        assert_no_joint_starts(&eight, &hits);
        assert_eq!(
            hits,
            vec![PathIntersection::new(
                IndexedLocation::new(2, 1.0),
                IndexedLocation::new(5, 1.0)
            )]
        );
    }

    #[test]
    fn distance_queries() {
        let square = unit_square();
        assert!(square.is_within_distance(Point::new(0.5, -0.1), 0.2));
        assert!(!square.is_within_distance(Point::new(0.5, -0.1), 0.05));
        assert!(!square.is_within_distance(Point::new(0.5, 0.5), 0.4));
        assert!(square.is_within_distance(Point::new(0.5, 0.5), 0.5));
        assert!(square.is_within_distance(Point::new(0.5, 0.5), 0.75));
        assert!(!square.is_within_distance(Point::new(10.0, 10.0), 1.0));

        let circle = circle();
        assert!(circle.is_within_distance(Point::new(1.05, 0.0), 0.06));
        assert!(!circle.is_within_distance(Point::ZERO, 0.9));
    }

    #[test]
    fn offset_keeps_closure() {
        for shape in [unit_square(), circle()] {
            let offset = shape.offset(0.1).unwrap();
            assert!(offset.is_closed());
            assert_eq!(offset.start_point(), offset.end_point());
            for pair in offset.curves().windows(2) {
                assert_eq!(pair[0].end(), pair[1].start());
            }
        }
        // Counter-clockwise, so a positive offset moves inward.
        let shrunk = circle().offset(0.1).unwrap();
        for curve in shrunk.curves() {
            assert!((curve.eval(0.5).distance(Point::ZERO) - 0.9).abs() < 1e-3);
        }
    }

    #[test]
    fn offset_of_open_line() {
        let line = PathComponent::new(vec![Curve::Line(Line::new((0.0, 0.0), (2.0, 0.0)))]);
        let offset = line.offset(0.5).unwrap();
        assert_eq!(
            offset.curves(),
            &[Curve::Line(Line::new((0.0, 0.5), (2.0, 0.5)))]
        );
        let dot = PathComponent::new(vec![Curve::Line(Line::new((1.0, 1.0), (1.0, 1.0)))]);
        assert!(dot.offset(1.0).is_none());
    }

    #[test]
    fn construction() {
        assert_eq!(PathComponent::try_new(vec![]), Err(ComponentError::Empty));
        let points = vec![
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            vec![Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 0.0)],
        ];
        let component = PathComponent::try_from(points.clone()).unwrap();
        assert_eq!(component.len(), 2);
        assert!(component.is_closed());
        assert_eq!(component.to_control_points(), points);

        let bad = vec![vec![Point::new(0.0, 0.0)]];
        assert_eq!(
            PathComponent::try_from(bad),
            Err(ComponentError::Curve(CurveError::UnsupportedArity(1)))
        );
        assert_eq!(
            PathComponent::try_from(Vec::<Vec<Point>>::new()),
            Err(ComponentError::Empty)
        );
    }

    #[test]
    #[should_panic(expected = "at least one curve")]
    fn empty_component_panics() {
        let _component = PathComponent::new(vec![]);
    }

    #[test]
    fn accessors() {
        let square = unit_square();
        assert_eq!(square.len(), 4);
        assert!((square.length(1e-9) - 4.0).abs() < 1e-12);
        assert_eq!(square.point_at(IndexedLocation::new(1, 0.5)), Point::new(1.0, 0.5));
        let bbox = square.bounding_box();
        assert_eq!(bbox.min, Point::ZERO);
        assert_eq!(bbox.max, Point::new(1.0, 1.0));
        assert_eq!(
            square.path_elements(),
            vec![
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::LineTo(Point::new(1.0, 0.0)),
                PathEl::LineTo(Point::new(1.0, 1.0)),
                PathEl::LineTo(Point::new(0.0, 1.0)),
                PathEl::LineTo(Point::new(0.0, 0.0)),
                PathEl::ClosePath,
            ]
        );
        let moved = square.transformed(Affine::scale(2.0));
        assert_eq!(moved.bounding_box().max, Point::new(2.0, 2.0));
        assert_eq!(moved.curve(0).end(), Point::new(2.0, 0.0));
    }

    #[test]
    fn bvh_is_built_once_across_threads() {
        let circle = circle();
        let first = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| circle.bvh() as *const Bvh as usize))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert!(first.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(first[0], circle.bvh() as *const Bvh as usize);
        assert_eq!(circle.bvh().len(), 4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_as_control_points() {
        let square = unit_square();
        let json = serde_json::to_string(&square).unwrap();
        assert!(json.starts_with("[[{"));
        let back: PathComponent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, square);
        assert!(serde_json::from_str::<PathComponent>("[]").is_err());
    }
}
