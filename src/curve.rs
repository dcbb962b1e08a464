// Copyright 2026 the Curvekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The closed set of curve kinds a path is built from.

use core::ops::{Mul, Range};

use arrayvec::ArrayVec;
use smallvec::SmallVec;
use tracing::debug;

use crate::common::{in_unit_interval, polish_cubic_root, snap_unit, solve_cubic, PARAM_SNAP};
use crate::curve_intersections::intersect_curves;
use crate::offset::offset_curve;
use crate::{
    Affine, CubicBez, CurveError, CurveIntersection, DegenerateGeometry, Line, Nearest,
    ParamCurve, ParamCurveArclen, ParamCurveDeriv, ParamCurveExtrema, ParamCurveNearest, Point,
    QuadBez, Vec2, DEFAULT_ACCURACY, MAX_EXTREMA,
};

/// A segment of a path: a line, a quadratic Bézier, or a cubic Bézier.
///
/// Equality is structural, by control points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Curve {
    /// A line segment.
    Line(Line),
    /// A quadratic Bézier segment.
    Quad(QuadBez),
    /// A cubic Bézier segment.
    Cubic(CubicBez),
}

/// The kind of a [`Curve`], without its geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurveKind {
    /// A line segment.
    Line,
    /// A quadratic Bézier segment.
    Quad,
    /// A cubic Bézier segment.
    Cubic,
}

impl CurveKind {
    /// The number of control points a curve of this kind has.
    pub fn arity(self) -> usize {
        match self {
            CurveKind::Line => 2,
            CurveKind::Quad => 3,
            CurveKind::Cubic => 4,
        }
    }
}

/// An intersection of a [`Curve`] with an infinite-precision line segment.
///
/// Returned by [`Curve::intersect_line`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineIntersection {
    /// The parameter on the line.
    pub line_t: f64,
    /// The parameter on the curve.
    pub segment_t: f64,
}

impl LineIntersection {
    #[inline]
    fn new(line_t: f64, segment_t: f64) -> LineIntersection {
        LineIntersection { line_t, segment_t }
    }
}

impl Curve {
    /// Rebuild a curve from its control points.
    ///
    /// Two points make a line, three a quadratic and four a cubic.
    ///
    /// # Errors
    ///
    /// [`CurveError::UnsupportedArity`] for any other number of points.
    pub fn from_control_points(points: &[Point]) -> Result<Curve, CurveError> {
        match *points {
            [p0, p1] => Ok(Curve::Line(Line::new(p0, p1))),
            [p0, p1, p2] => Ok(Curve::Quad(QuadBez::new(p0, p1, p2))),
            [p0, p1, p2, p3] => Ok(Curve::Cubic(CubicBez::new(p0, p1, p2, p3))),
            _ => Err(CurveError::UnsupportedArity(points.len())),
        }
    }

    /// The control points, start point first.
    pub fn control_points(&self) -> ArrayVec<Point, 4> {
        let mut result = ArrayVec::new();
        match *self {
            Curve::Line(l) => result.extend([l.p0, l.p1]),
            Curve::Quad(q) => result.extend([q.p0, q.p1, q.p2]),
            Curve::Cubic(c) => result.extend([c.p0, c.p1, c.p2, c.p3]),
        }
        result
    }

    /// The kind of this curve.
    #[inline]
    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::Line(_) => CurveKind::Line,
            Curve::Quad(_) => CurveKind::Quad,
            Curve::Cubic(_) => CurveKind::Cubic,
        }
    }

    /// Do all control points coincide?
    pub fn is_degenerate(&self) -> bool {
        let points = self.control_points();
        points.iter().all(|&p| p == points[0])
    }

    /// The first derivative at `t`.
    pub fn derivative(&self, t: f64) -> Vec2 {
        match *self {
            Curve::Line(l) => l.p1 - l.p0,
            Curve::Quad(q) => q.deriv().eval(t).to_vec2(),
            Curve::Cubic(c) => c.deriv().eval(t).to_vec2(),
        }
    }

    /// The unit normal at `t`, or why it is undefined.
    ///
    /// The normal is the unit tangent turned by +90°, so it points to the
    /// left of the direction of travel in a y-up frame.
    ///
    /// # Errors
    ///
    /// [`DegenerateGeometry::ZeroDerivative`] where the derivative vanishes.
    pub fn try_normal(&self, t: f64) -> Result<Vec2, DegenerateGeometry> {
        let d = self.derivative(t);
        if d.hypot2() > 0.0 && d.is_finite() {
            Ok(d.normalize().turn_90())
        } else {
            Err(DegenerateGeometry::ZeroDerivative { t })
        }
    }

    /// The unit normal at `t`.
    ///
    /// Where the derivative vanishes, the direction the curve leaves the
    /// point in is used instead, and then the chord. A curve whose control
    /// points all coincide has no normal and yields [`Vec2::ZERO`].
    pub fn normal(&self, t: f64) -> Vec2 {
        match self.try_normal(t) {
            Ok(n) => n,
            Err(err) => {
                debug!(%err, curve = ?self, "falling back to a limiting tangent for the normal");
                let tangent = self.limiting_tangent(t);
                if tangent.hypot2() > 0.0 {
                    tangent.normalize().turn_90()
                } else {
                    debug!(curve = ?self, "{}", DegenerateGeometry::ZeroLength);
                    Vec2::ZERO
                }
            }
        }
    }

    /// The tangent direction at a point where the derivative vanishes.
    fn limiting_tangent(&self, t: f64) -> Vec2 {
        let second = match *self {
            Curve::Line(_) => Vec2::ZERO,
            Curve::Quad(q) => 2.0 * ((q.p2 - q.p1) - (q.p1 - q.p0)),
            Curve::Cubic(c) => c.deriv2(t),
        };
        if second.hypot2() > 0.0 {
            // Approaching from the left at the end of the curve.
            if t < 1.0 {
                second
            } else {
                -second
            }
        } else {
            self.end() - self.start()
        }
    }

    /// The arc length, to [`DEFAULT_ACCURACY`].
    pub fn length(&self) -> f64 {
        self.arclen(DEFAULT_ACCURACY)
    }

    /// The parameter and position of the point on the curve nearest to `point`.
    pub fn project(&self, point: Point) -> (f64, Point) {
        let nearest = self.nearest(point, DEFAULT_ACCURACY);
        (nearest.t, self.eval(nearest.t))
    }

    /// Intersections with another curve, sorted by the parameter on `self`.
    ///
    /// See [`intersect_curves`](crate::curve_intersections::intersect_curves).
    pub fn intersections(&self, other: &Curve, threshold: f64) -> Vec<CurveIntersection> {
        intersect_curves(self, other, threshold)
    }

    /// Intersections with a line segment, sorted by the parameter on `self`.
    ///
    /// The roots are found exactly, by solving for the points of the curve
    /// with zero signed distance from the line. Parameters within
    /// [`PARAM_SNAP`] of an endpoint are snapped onto it. A curve lying
    /// entirely on the line reports only its start.
    pub fn intersect_line(&self, line: Line) -> ArrayVec<LineIntersection, 3> {
        let mut result: ArrayVec<LineIntersection, 3> = ArrayVec::new();
        let dir = line.p1 - line.p0;
        let len2 = dir.hypot2();
        if len2 == 0.0 {
            return result;
        }
        let n = dir.turn_90();
        let (c0, c1, c2, c3) = match *self {
            Curve::Line(l) => (n.dot(l.p0 - line.p0), n.dot(l.p1 - l.p0), 0.0, 0.0),
            Curve::Quad(q) => (
                n.dot(q.p0 - line.p0),
                2.0 * n.dot(q.p1 - q.p0),
                n.dot((q.p2 - q.p1) - (q.p1 - q.p0)),
                0.0,
            ),
            Curve::Cubic(c) => {
                let d1 = c.p1 - c.p0;
                let d2 = (c.p2 - c.p1) - d1;
                let d3 = (c.p3 - c.p2) - 2.0 * (c.p2 - c.p1) + d1;
                (
                    n.dot(c.p0 - line.p0),
                    3.0 * n.dot(d1),
                    3.0 * n.dot(d2),
                    n.dot(d3),
                )
            }
        };
        for root in solve_cubic(c0, c1, c2, c3) {
            let t = polish_cubic_root(c0, c1, c2, c3, root);
            if !in_unit_interval(t) {
                continue;
            }
            let t = snap_unit(t);
            let line_t = (self.eval(t) - line.p0).dot(dir) / len2;
            if !in_unit_interval(line_t) {
                continue;
            }
            if result
                .iter()
                .any(|hit| (hit.segment_t - t).abs() <= PARAM_SNAP)
            {
                continue;
            }
            result.push(LineIntersection::new(snap_unit(line_t), t));
        }
        result.sort_by(|a, b| a.segment_t.total_cmp(&b.segment_t));
        result
    }

    /// Curves approximating the parallel curve at `distance` along the normal.
    ///
    /// See [`offset_curve`].
    pub fn offset(&self, distance: f64) -> SmallVec<[Curve; 4]> {
        offset_curve(self, distance)
    }

    /// The same curve traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Curve {
        match *self {
            Curve::Line(l) => Curve::Line(l.reversed()),
            Curve::Quad(q) => Curve::Quad(q.reversed()),
            Curve::Cubic(c) => Curve::Cubic(c.reversed()),
        }
    }

    /// The curve with `affine` applied to every control point.
    #[must_use]
    pub fn transformed(&self, affine: Affine) -> Curve {
        affine * *self
    }

    /// The curve with its start point moved; the other control points stay.
    #[must_use]
    pub(crate) fn with_start(&self, p: Point) -> Curve {
        match *self {
            Curve::Line(l) => Curve::Line(Line::new(p, l.p1)),
            Curve::Quad(q) => Curve::Quad(QuadBez::new(p, q.p1, q.p2)),
            Curve::Cubic(c) => Curve::Cubic(CubicBez::new(p, c.p1, c.p2, c.p3)),
        }
    }

    /// The curve with its end point moved; the other control points stay.
    #[must_use]
    pub(crate) fn with_end(&self, p: Point) -> Curve {
        match *self {
            Curve::Line(l) => Curve::Line(Line::new(l.p0, p)),
            Curve::Quad(q) => Curve::Quad(QuadBez::new(q.p0, q.p1, p)),
            Curve::Cubic(c) => Curve::Cubic(CubicBez::new(c.p0, c.p1, c.p2, p)),
        }
    }

    /// Is every control point finite?
    pub fn is_finite(&self) -> bool {
        self.control_points().iter().all(|p| p.is_finite())
    }
}

impl From<Line> for Curve {
    #[inline]
    fn from(line: Line) -> Curve {
        Curve::Line(line)
    }
}

impl From<QuadBez> for Curve {
    #[inline]
    fn from(quad: QuadBez) -> Curve {
        Curve::Quad(quad)
    }
}

impl From<CubicBez> for Curve {
    #[inline]
    fn from(cubic: CubicBez) -> Curve {
        Curve::Cubic(cubic)
    }
}

impl ParamCurve for Curve {
    fn eval(&self, t: f64) -> Point {
        match *self {
            Curve::Line(line) => line.eval(t),
            Curve::Quad(quad) => quad.eval(t),
            Curve::Cubic(cubic) => cubic.eval(t),
        }
    }

    fn subsegment(&self, range: Range<f64>) -> Curve {
        match *self {
            Curve::Line(line) => Curve::Line(line.subsegment(range)),
            Curve::Quad(quad) => Curve::Quad(quad.subsegment(range)),
            Curve::Cubic(cubic) => Curve::Cubic(cubic.subsegment(range)),
        }
    }

    fn subdivide(&self) -> (Curve, Curve) {
        match *self {
            Curve::Line(line) => {
                let (a, b) = line.subdivide();
                (Curve::Line(a), Curve::Line(b))
            }
            Curve::Quad(quad) => {
                let (a, b) = quad.subdivide();
                (Curve::Quad(a), Curve::Quad(b))
            }
            Curve::Cubic(cubic) => {
                let (a, b) = cubic.subdivide();
                (Curve::Cubic(a), Curve::Cubic(b))
            }
        }
    }

    fn start(&self) -> Point {
        match *self {
            Curve::Line(line) => line.p0,
            Curve::Quad(quad) => quad.p0,
            Curve::Cubic(cubic) => cubic.p0,
        }
    }

    fn end(&self) -> Point {
        match *self {
            Curve::Line(line) => line.p1,
            Curve::Quad(quad) => quad.p2,
            Curve::Cubic(cubic) => cubic.p3,
        }
    }
}

impl ParamCurveArclen for Curve {
    fn arclen(&self, accuracy: f64) -> f64 {
        match *self {
            Curve::Line(line) => line.arclen(accuracy),
            Curve::Quad(quad) => quad.arclen(accuracy),
            Curve::Cubic(cubic) => cubic.arclen(accuracy),
        }
    }
}

impl ParamCurveNearest for Curve {
    fn nearest(&self, p: Point, accuracy: f64) -> Nearest {
        match *self {
            Curve::Line(line) => line.nearest(p, accuracy),
            Curve::Quad(quad) => quad.nearest(p, accuracy),
            Curve::Cubic(cubic) => cubic.nearest(p, accuracy),
        }
    }
}

impl ParamCurveExtrema for Curve {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        match *self {
            Curve::Line(line) => line.extrema(),
            Curve::Quad(quad) => quad.extrema(),
            Curve::Cubic(cubic) => cubic.extrema(),
        }
    }
}

impl Mul<Curve> for Affine {
    type Output = Curve;

    fn mul(self, curve: Curve) -> Curve {
        match curve {
            Curve::Line(line) => Curve::Line(self * line),
            Curve::Quad(quad) => Curve::Quad(self * quad),
            Curve::Cubic(cubic) => Curve::Cubic(self * cubic),
        }
    }
}
