// Copyright 2026 the Curvekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offset curves.
//!
//! The offset of a Bézier is not a Bézier of the same degree, so quadratic
//! and cubic segments are first cut into pieces that turn by only a small
//! angle, and each piece is offset on its own. An offset piece that strays
//! from the source by more than a small fraction of the distance is split
//! again. The pieces are returned in order; consecutive pieces meet up to
//! rounding.

use smallvec::SmallVec;
use tracing::debug;

use crate::{CubicBez, Curve, Line, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, QuadBez};

/// Pieces whose end normals differ by more than this (as a cosine, 30°)
/// are subdivided further.
const SIMPLE_COS: f64 = 0.866_025_403_784_438_6;

/// How many times a monotone piece may be halved.
const MAX_DEPTH: usize = 8;

/// Largest allowed deviation of an offset piece from the true offset, as a
/// fraction of the distance.
const RELATIVE_TOLERANCE: f64 = 1e-3;

/// Where an offset piece is compared against the source curve.
const ERROR_SAMPLES: [f64; 5] = [0.2, 0.35, 0.5, 0.65, 0.8];

/// Approximate the curve offset by `distance` along its normal.
///
/// The normal is [`Curve::normal`], so a positive distance moves to the
/// left of the direction of travel (y-up). A line is translated exactly.
/// A curve whose control points all coincide has no offset and yields no
/// curves.
pub fn offset_curve(curve: &Curve, distance: f64) -> SmallVec<[Curve; 4]> {
    let mut result = SmallVec::new();
    if curve.is_degenerate() {
        debug!(?curve, "skipping offset of a zero-length curve");
        return result;
    }
    if distance == 0.0 {
        result.push(*curve);
        return result;
    }
    match *curve {
        Curve::Line(line) => result.push(Curve::Line(offset_line(line, distance))),
        _ => {
            for range in curve.extrema_ranges() {
                push_simple(curve.subsegment(range), distance, 0, &mut result);
            }
        }
    }
    result
}

fn offset_line(line: Line, distance: f64) -> Line {
    let shift = distance * Curve::Line(line).normal(0.0);
    Line::new(line.p0 + shift, line.p1 + shift)
}

fn push_simple(piece: Curve, distance: f64, depth: usize, out: &mut SmallVec<[Curve; 4]>) {
    let n0 = piece.normal(0.0);
    let n1 = piece.normal(1.0);
    if n0.dot(n1) >= SIMPLE_COS || depth == MAX_DEPTH {
        let offset = offset_simple(piece, distance);
        let error = offset_error(&piece, &offset, distance);
        let tolerance = RELATIVE_TOLERANCE * distance.abs();
        if error <= tolerance || depth == MAX_DEPTH {
            if error > tolerance {
                debug!(error, distance, "offset piece above tolerance at the depth limit");
            }
            out.push(offset);
            return;
        }
    }
    let (left, right) = piece.subdivide();
    push_simple(left, distance, depth + 1, out);
    push_simple(right, distance, depth + 1, out);
}

/// The largest amount by which sampled points of `offset` miss lying
/// `|distance|` away from `source`.
fn offset_error(source: &Curve, offset: &Curve, distance: f64) -> f64 {
    ERROR_SAMPLES
        .iter()
        .map(|&t| {
            let p = offset.eval(t);
            let (_, nearest) = source.project(p);
            (p.distance(nearest) - distance.abs()).abs()
        })
        .fold(0.0, f64::max)
}

fn offset_simple(piece: Curve, distance: f64) -> Curve {
    match piece {
        Curve::Line(line) => Curve::Line(offset_line(line, distance)),
        Curve::Quad(q) => Curve::Quad(offset_quad(q, distance)),
        Curve::Cubic(c) => Curve::Cubic(offset_cubic(c, distance)),
    }
}

fn offset_quad(q: QuadBez, distance: f64) -> QuadBez {
    let curve = Curve::Quad(q);
    let p0 = q.p0 + distance * curve.normal(0.0);
    let p2 = q.p2 + distance * curve.normal(1.0);
    let start_tangent = Line::new(p0, p0 + (q.p1 - q.p0));
    let end_tangent = Line::new(p2, p2 + (q.p2 - q.p1));
    let p1 = start_tangent
        .crossing_point(end_tangent)
        .unwrap_or_else(|| q.p1 + distance * curve.normal(0.5));
    QuadBez::new(p0, p1, p2)
}

fn offset_cubic(c: CubicBez, distance: f64) -> CubicBez {
    let curve = Curve::Cubic(c);
    let p0 = c.p0 + distance * curve.normal(0.0);
    let p3 = c.p3 + distance * curve.normal(1.0);
    let k0 = handle_scale(&c, 0.0, distance);
    let k1 = handle_scale(&c, 1.0, distance);
    CubicBez::new(p0, p0 + k0 * (c.p1 - c.p0), p3 + k1 * (c.p2 - c.p3), p3)
}

/// How much a handle shrinks or grows when its end is offset: the ratio of
/// the offset radius of curvature to the original one.
fn handle_scale(c: &CubicBez, t: f64, distance: f64) -> f64 {
    let d1 = c.deriv().eval(t).to_vec2();
    let speed = d1.hypot();
    if speed == 0.0 {
        return 1.0;
    }
    let curvature = d1.cross(c.deriv2(t)) / (speed * speed * speed);
    let k = 1.0 - distance * curvature;
    if k < 0.0 {
        debug!(t, distance, curvature, "offset past the center of curvature");
        0.0
    } else {
        k
    }
}

#[cfg(test)]
mod tests {
    use crate::{CubicBez, Curve, Line, ParamCurve, Point, QuadBez};

    use super::offset_curve;

    #[test]
    fn line_is_translated_along_normal() {
        let line = Line::new((1.0, 1.0), (4.0, 5.0));
        let d = 2.0;
        let result = offset_curve(&Curve::Line(line), d);
        assert_eq!(result.len(), 1);
        let Curve::Line(moved) = result[0] else {
            panic!("line offset should be a line");
        };
        // Unit direction (0.6, 0.8), unit normal (-0.8, 0.6).
        let expected0 = Point::new(1.0 - 0.8 * d, 1.0 + 0.6 * d);
        let expected1 = Point::new(4.0 - 0.8 * d, 5.0 + 0.6 * d);
        assert!(moved.p0.distance(expected0) < 1e-12);
        assert!(moved.p1.distance(expected1) < 1e-12);
    }

    #[test]
    fn quarter_circle_offset_inward() {
        const K: f64 = 0.552_284_749_830_793_4;
        let arc = Curve::Cubic(CubicBez::new((1.0, 0.0), (1.0, K), (K, 1.0), (0.0, 1.0)));
        let pieces = offset_curve(&arc, 0.1);
        assert!(pieces.len() >= 3, "{pieces:?}");
        for piece in &pieces {
            for i in 0..=10 {
                let r = piece.eval(f64::from(i) / 10.0).distance(Point::ZERO);
                assert!((r - 0.9).abs() < 1e-3, "radius {r}");
            }
        }
        for pair in pieces.windows(2) {
            assert!(pair[0].end().distance(pair[1].start()) < 1e-9);
        }
        assert!(pieces[0].start().distance(Point::new(0.9, 0.0)) < 1e-12);
        assert!(pieces[pieces.len() - 1].end().distance(Point::new(0.0, 0.9)) < 1e-12);
    }

    #[test]
    fn offset_stays_at_distance() {
        const K: f64 = 0.552_284_749_830_793_4;
        let arc = Curve::Cubic(CubicBez::new((1.0, 0.0), (1.0, K), (K, 1.0), (0.0, 1.0)));
        let arch = Curve::Quad(QuadBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 0.0)));
        for d in [0.1, -0.1, 0.3, -0.5] {
            let pieces = offset_curve(&arc, d);
            for piece in &pieces {
                for i in 0..=20 {
                    let p = piece.eval(f64::from(i) / 20.0);
                    // The source arc is itself within 3e-4 of the unit circle.
                    let r = p.distance(Point::ZERO);
                    assert!((r - (1.0 - d)).abs() < 1e-3, "d {d}: radius {r}");
                    let (_, nearest) = arc.project(p);
                    let error = (p.distance(nearest) - d.abs()).abs();
                    assert!(error < 3e-3 * d.abs(), "d {d}: error {error}");
                }
            }
            // The arch bends with radius 0.5 at its apex.
            if d <= -0.5 {
                continue;
            }
            for piece in &offset_curve(&arch, d) {
                for i in 0..=20 {
                    let p = piece.eval(f64::from(i) / 20.0);
                    let (_, nearest) = arch.project(p);
                    let error = (p.distance(nearest) - d.abs()).abs();
                    assert!(error < 3e-3 * d.abs(), "d {d}: error {error}");
                }
            }
        }
    }

    #[test]
    fn quad_offset_endpoints() {
        let q = Curve::Quad(QuadBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 0.0)));
        let pieces = offset_curve(&q, -0.5);
        let first = pieces[0];
        let last = pieces[pieces.len() - 1];
        let expected_start = Point::ZERO - 0.5 * q.normal(0.0);
        let expected_end = Point::new(2.0, 0.0) - 0.5 * q.normal(1.0);
        assert!(first.start().distance(expected_start) < 1e-12);
        assert!(last.end().distance(expected_end) < 1e-12);
        for pair in pieces.windows(2) {
            assert!(pair[0].end().distance(pair[1].start()) < 1e-9);
        }
    }

    #[test]
    fn straight_quad_offset() {
        let q = Curve::Quad(QuadBez::new((0.0, 0.0), (1.0, 0.0), (2.0, 0.0)));
        let pieces = offset_curve(&q, 1.0);
        assert_eq!(pieces.len(), 1);
        assert_eq!(
            pieces[0],
            Curve::Quad(QuadBez::new((0.0, 1.0), (1.0, 1.0), (2.0, 1.0)))
        );
    }

    #[test]
    fn degenerate_and_zero_offsets() {
        let dot = Curve::Line(Line::new((1.0, 1.0), (1.0, 1.0)));
        assert!(offset_curve(&dot, 1.0).is_empty());
        let c = Curve::Cubic(CubicBez::new((0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0)));
        assert_eq!(offset_curve(&c, 0.0).as_slice(), &[c]);
    }
}
