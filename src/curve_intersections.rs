// Copyright 2026 the Curvekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersections between pairs of curves.
//!
//! Lines are intersected in closed form, a line and a Bézier through exact
//! root solving, and two Béziers by recursive subdivision followed by
//! Newton refinement. Every reported parameter is snapped with
//! [`snap_unit`], so hits on segment endpoints are exactly `0.0` or `1.0`.

use core::ops::Range;

use tracing::trace;

use crate::common::{in_unit_interval, snap_unit, PARAM_SNAP};
use crate::{Curve, Line, ParamCurve, ParamCurveExtrema, Point};

/// A threshold suitable for curves measured in units of about one.
pub const DEFAULT_INTERSECTION_THRESHOLD: f64 = 1e-6;

/// Subdivision stops at this depth even if the pieces are still large.
const MAX_DEPTH: usize = 40;

/// Overlapping curves produce a candidate for every piece of the overlap;
/// stop collecting after this many.
const MAX_CANDIDATES: usize = 512;

/// The finest resolution subdivision aims for, relative to the size of the
/// curves, when the caller's threshold is smaller.
const RELATIVE_RESOLUTION: f64 = 1e-10;

/// A point where two curves meet, as a parameter on each.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveIntersection {
    /// The parameter on the first curve.
    pub t1: f64,
    /// The parameter on the second curve.
    pub t2: f64,
}

impl CurveIntersection {
    /// Create a new intersection record.
    #[inline]
    pub fn new(t1: f64, t2: f64) -> CurveIntersection {
        CurveIntersection { t1, t2 }
    }

    /// The same intersection seen from the other curve.
    #[inline]
    #[must_use]
    pub fn swapped(self) -> CurveIntersection {
        CurveIntersection {
            t1: self.t2,
            t2: self.t1,
        }
    }
}

/// Find where two curves meet, sorted by the parameter on `a`.
///
/// Béziers are reported where they come within `threshold` of each other;
/// lines are intersected exactly. Collinear overlapping lines report the
/// endpoints of the overlap. Coincident endpoints are always reported
/// exactly, and no other hit within the subdivision resolution of such
/// a shared endpoint is reported alongside it.
pub fn intersect_curves(a: &Curve, b: &Curve, threshold: f64) -> Vec<CurveIntersection> {
    let mut result = match (a, b) {
        (Curve::Line(la), Curve::Line(lb)) => intersect_lines(*la, *lb),
        (Curve::Line(line), _) => b
            .intersect_line(*line)
            .iter()
            .map(|hit| CurveIntersection::new(hit.line_t, hit.segment_t))
            .collect(),
        (_, Curve::Line(line)) => a
            .intersect_line(*line)
            .iter()
            .map(|hit| CurveIntersection::new(hit.segment_t, hit.line_t))
            .collect(),
        _ => intersect_beziers(a, b, threshold),
    };
    result.sort_by(|x, y| x.t1.total_cmp(&y.t1).then(x.t2.total_cmp(&y.t2)));
    result
}

fn intersect_lines(a: Line, b: Line) -> Vec<CurveIntersection> {
    let mut result = Vec::new();
    let da = a.p1 - a.p0;
    let db = b.p1 - b.p0;
    if da.hypot2() == 0.0 || db.hypot2() == 0.0 {
        return result;
    }
    let w = b.p0 - a.p0;
    let denom = da.cross(db);
    if denom != 0.0 {
        let t1 = w.cross(db) / denom;
        let t2 = w.cross(da) / denom;
        if in_unit_interval(t1) && in_unit_interval(t2) {
            result.push(CurveIntersection::new(snap_unit(t1), snap_unit(t2)));
        }
        return result;
    }
    if w.cross(da).abs() > f64::EPSILON * da.hypot2().max(w.hypot2()) {
        // Parallel but not collinear.
        return result;
    }
    let on_a = |p: Point| (p - a.p0).dot(da) / da.hypot2();
    let on_b = |p: Point| (p - b.p0).dot(db) / db.hypot2();
    let mut push = |t1: f64, t2: f64| {
        if in_unit_interval(t1) && in_unit_interval(t2) {
            let hit = CurveIntersection::new(snap_unit(t1), snap_unit(t2));
            if !result.iter().any(|h| same_params(*h, hit)) {
                result.push(hit);
            }
        }
    };
    push(on_a(b.p0), 0.0);
    push(on_a(b.p1), 1.0);
    push(0.0, on_b(a.p0));
    push(1.0, on_b(a.p1));
    result
}

/// A pair of subdivided pieces that ended up close together.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    t1: f64,
    t2: f64,
    distance: f64,
}

struct Subdivision<'a> {
    a: &'a Curve,
    b: &'a Curve,
    resolution: f64,
    candidates: Vec<Candidate>,
}

impl Subdivision<'_> {
    fn recurse(
        &mut self,
        a: Curve,
        a_range: Range<f64>,
        b: Curve,
        b_range: Range<f64>,
        depth: usize,
    ) {
        if self.candidates.len() >= MAX_CANDIDATES {
            return;
        }
        let a_box = a.bounding_box();
        let b_box = b.bounding_box();
        if !a_box.inflate(self.resolution).overlaps(&b_box) {
            return;
        }
        let a_size = a_box.size();
        let b_size = b_box.size();
        let small = a_size.x.max(a_size.y) <= self.resolution
            && b_size.x.max(b_size.y) <= self.resolution;
        if small || depth == MAX_DEPTH {
            if !small {
                trace!(depth, "curve intersection subdivision hit its depth limit");
            }
            let t1 = 0.5 * (a_range.start + a_range.end);
            let t2 = 0.5 * (b_range.start + b_range.end);
            let distance = self.a.eval(t1).distance(self.b.eval(t2));
            self.candidates.push(Candidate { t1, t2, distance });
            if self.candidates.len() == MAX_CANDIDATES {
                trace!("curve intersection candidates capped; the curves likely overlap");
            }
            return;
        }
        let (a0, a1) = a.subdivide();
        let (b0, b1) = b.subdivide();
        let am = 0.5 * (a_range.start + a_range.end);
        let bm = 0.5 * (b_range.start + b_range.end);
        self.recurse(a0, a_range.start..am, b0, b_range.start..bm, depth + 1);
        self.recurse(a0, a_range.start..am, b1, bm..b_range.end, depth + 1);
        self.recurse(a1, am..a_range.end, b0, b_range.start..bm, depth + 1);
        self.recurse(a1, am..a_range.end, b1, bm..b_range.end, depth + 1);
    }
}

fn intersect_beziers(a: &Curve, b: &Curve, threshold: f64) -> Vec<CurveIntersection> {
    let mut result = Vec::new();

    // Shared endpoints are taken verbatim.
    let mut shared: Vec<(CurveIntersection, Point)> = Vec::new();
    for (ta, pa) in [(0.0, a.start()), (1.0, a.end())] {
        for (tb, pb) in [(0.0, b.start()), (1.0, b.end())] {
            if pa == pb {
                shared.push((CurveIntersection::new(ta, tb), pa));
            }
        }
    }
    result.extend(shared.iter().map(|(hit, _)| *hit));

    let a_box = a.bounding_box();
    let b_box = b.bounding_box();
    let extent = a_box.union(b_box).size();
    let resolution = threshold
        .max(RELATIVE_RESOLUTION * extent.x.max(extent.y))
        .max(f64::MIN_POSITIVE);

    let mut subdivision = Subdivision {
        a,
        b,
        resolution,
        candidates: Vec::new(),
    };
    subdivision.recurse(*a, 0.0..1.0, *b, 0.0..1.0, 0);

    // Candidates next to a shared endpoint are that endpoint seen at the
    // subdivision resolution.
    let near_shared = |t1: f64, t2: f64| {
        let radius = 4.0 * resolution;
        shared.iter().any(|(_, p)| {
            a.eval(t1).distance(*p) <= radius && b.eval(t2).distance(*p) <= radius
        })
    };

    let mut clusters: Vec<Candidate> = Vec::new();
    for candidate in subdivision.candidates {
        if near_shared(candidate.t1, candidate.t2) {
            continue;
        }
        let pa = a.eval(candidate.t1);
        let pb = b.eval(candidate.t2);
        let existing = clusters.iter_mut().find(|c| {
            a.eval(c.t1).distance(pa) <= 2.0 * resolution
                && b.eval(c.t2).distance(pb) <= 2.0 * resolution
        });
        match existing {
            Some(cluster) => {
                if candidate.distance < cluster.distance {
                    *cluster = candidate;
                }
            }
            None => clusters.push(candidate),
        }
    }

    for cluster in clusters {
        let (t1, t2) = match refine(a, b, cluster.t1, cluster.t2) {
            Some(refined) => refined,
            None if cluster.distance <= 2.0 * resolution => (cluster.t1, cluster.t2),
            None => continue,
        };
        let hit = CurveIntersection::new(snap_unit(t1), snap_unit(t2));
        if near_shared(hit.t1, hit.t2) || result.iter().any(|h| same_params(*h, hit)) {
            continue;
        }
        result.push(hit);
    }
    result
}

/// Newton iteration on `a(t1) - b(t2) = 0`.
///
/// Returns `None` near tangency or when the iteration leaves the curves.
fn refine(a: &Curve, b: &Curve, mut t1: f64, mut t2: f64) -> Option<(f64, f64)> {
    const SLOP: f64 = 1e-3;
    for _ in 0..8 {
        let f = a.eval(t1) - b.eval(t2);
        if f.hypot2() == 0.0 {
            break;
        }
        let da = a.derivative(t1);
        let db = b.derivative(t2);
        let det = da.cross(db);
        if det.abs() <= 1e-12 * da.hypot() * db.hypot() || !det.is_finite() {
            return None;
        }
        t1 -= f.cross(db) / det;
        t2 -= f.cross(da) / det;
        if !(-SLOP..=1.0 + SLOP).contains(&t1) || !(-SLOP..=1.0 + SLOP).contains(&t2) {
            return None;
        }
    }
    let t1 = t1.clamp(0.0, 1.0);
    let t2 = t2.clamp(0.0, 1.0);
    let da = a.derivative(t1).hypot();
    let db = b.derivative(t2).hypot();
    // Converged if the residual is within a few parameter snaps of travel.
    let tolerance = PARAM_SNAP * da.max(db).max(1.0);
    (a.eval(t1).distance(b.eval(t2)) <= tolerance).then_some((t1, t2))
}

fn same_params(a: CurveIntersection, b: CurveIntersection) -> bool {
    (a.t1 - b.t1).abs() <= PARAM_SNAP && (a.t2 - b.t2).abs() <= PARAM_SNAP
}
