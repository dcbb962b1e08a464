// Copyright 2026 the Curvekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Common mathematical operations.

use arrayvec::ArrayVec;

/// Parameters closer than this to 0 or 1 are treated as lying exactly on
/// the segment endpoint.
///
/// Joint de-duplication compares parameters against 0 and 1 exactly, so every
/// solver that produces segment parameters runs its results through
/// [`snap_unit`].
pub const PARAM_SNAP: f64 = 1e-9;

/// Snap a curve parameter to exactly 0 or 1 when it is within
/// [`PARAM_SNAP`] of either, and clamp it into the unit interval.
#[inline]
pub fn snap_unit(t: f64) -> f64 {
    if t < PARAM_SNAP {
        0.0
    } else if t > 1.0 - PARAM_SNAP {
        1.0
    } else {
        t
    }
}

/// Is `t` inside the unit interval, allowing [`PARAM_SNAP`] of slop on
/// either side?
#[inline]
pub(crate) fn in_unit_interval(t: f64) -> bool {
    (-PARAM_SNAP..=1.0 + PARAM_SNAP).contains(&t)
}

/// Find real roots of a quadratic equation.
///
/// Returns values of x for which c0 + c1 x + c2 x² = 0, in ascending order.
///
/// A nearly linear equation is solved as linear. If every coefficient is
/// zero, every x is a solution, and a single `0.0` is returned.
pub fn solve_quadratic(c0: f64, c1: f64, c2: f64) -> ArrayVec<f64, 2> {
    let mut result = ArrayVec::new();
    let sc0 = c0 * c2.recip();
    let sc1 = c1 * c2.recip();
    if !sc0.is_finite() || !sc1.is_finite() {
        let root = -c0 / c1;
        if root.is_finite() {
            result.push(root);
        } else if c0 == 0.0 && c1 == 0.0 {
            result.push(0.0);
        }
        return result;
    }
    let disc = sc1 * sc1 - 4.0 * sc0;
    let root1 = if !disc.is_finite() {
        // sc1² overflowed; the large root is close to -sc1.
        -sc1
    } else if disc < 0.0 {
        return result;
    } else if disc == 0.0 {
        result.push(-0.5 * sc1);
        return result;
    } else {
        // Avoid cancellation by picking the sign that adds magnitudes.
        -0.5 * (sc1 + disc.sqrt().copysign(sc1))
    };
    let root2 = sc0 / root1;
    if root2.is_finite() {
        result.push(root1.min(root2));
        result.push(root1.max(root2));
    } else {
        result.push(root1);
    }
    result
}

/// Find real roots of a cubic equation.
///
/// Returns values of x for which c0 + c1 x + c2 x² + c3 x³ = 0. When `c3`
/// is zero (or small enough that scaling by it overflows) the quadratic is
/// solved instead.
///
/// This follows Jim Blinn's "How to Solve a Cubic Equation" as presented at
/// <https://momentsingraphics.de/CubicRoots.html>.
pub fn solve_cubic(c0: f64, c1: f64, c2: f64, c3: f64) -> ArrayVec<f64, 3> {
    const ONE_THIRD: f64 = 1.0 / 3.0;
    let mut result = ArrayVec::new();
    let c3_recip = c3.recip();
    let a2 = c2 * (ONE_THIRD * c3_recip);
    let a1 = c1 * (ONE_THIRD * c3_recip);
    let a0 = c0 * c3_recip;
    if !(a0.is_finite() && a1.is_finite() && a2.is_finite()) {
        result.extend(solve_quadratic(c0, c1, c2));
        return result;
    }
    let delta0 = (-a2).mul_add(a2, a1);
    let delta1 = (-a1).mul_add(a2, a0);
    let delta2 = a2 * a0 - a1 * a1;
    let discriminant = 4.0 * delta0 * delta2 - delta1 * delta1;
    let depressed = (-2.0 * a2).mul_add(delta0, delta1);
    if discriminant < 0.0 {
        let sq = (-0.25 * discriminant).sqrt();
        let r = -0.5 * depressed;
        let t = (r + sq).cbrt() + (r - sq).cbrt();
        result.push(t - a2);
    } else if discriminant == 0.0 {
        let t = (-delta0).sqrt().copysign(depressed);
        result.push(t - a2);
        result.push(-2.0 * t - a2);
    } else {
        let theta = discriminant.sqrt().atan2(-depressed) * ONE_THIRD;
        let (sin, cos) = theta.sin_cos();
        let ss3 = sin * 3.0_f64.sqrt();
        let scale = 2.0 * (-delta0).sqrt();
        result.push(scale.mul_add(cos, -a2));
        result.push(scale.mul_add(0.5 * (-cos + ss3), -a2));
        result.push(scale.mul_add(0.5 * (-cos - ss3), -a2));
    }
    result
}

/// Polish a root of c0 + c1 x + c2 x² + c3 x³ with a couple of Newton steps.
///
/// The closed-form cubic solution loses a few bits near multiple roots;
/// the polish brings simple roots back to full precision.
pub(crate) fn polish_cubic_root(c0: f64, c1: f64, c2: f64, c3: f64, mut x: f64) -> f64 {
    for _ in 0..2 {
        let f = ((c3 * x + c2) * x + c1) * x + c0;
        let df = (3.0 * c3 * x + 2.0 * c2) * x + c1;
        if df == 0.0 {
            break;
        }
        let next = x - f / df;
        if !next.is_finite() {
            break;
        }
        x = next;
    }
    x
}
