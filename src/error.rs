// Copyright 2026 the Curvekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use thiserror::Error;

/// An error building a single curve.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CurveError {
    /// A curve is built from 2, 3 or 4 control points.
    #[error("unsupported number of control points: {0} (expected 2, 3 or 4)")]
    UnsupportedArity(usize),
}

/// An error building a [`PathComponent`](crate::PathComponent).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ComponentError {
    /// The curve sequence was empty.
    #[error("a path component needs at least one curve")]
    Empty,
    /// One of the curves could not be reconstructed.
    #[error(transparent)]
    Curve(#[from] CurveError),
}

/// A geometric quantity is undefined at the requested place.
///
/// These are not failures of well-formed input; they arise at cusps and
/// from collapsed control points. The infallible variants of the affected
/// operations fall back to a nearby well-defined value instead.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum DegenerateGeometry {
    /// The derivative vanishes, so the tangent and normal are undefined.
    #[error("derivative vanishes at t = {t}")]
    ZeroDerivative {
        /// The curve parameter.
        t: f64,
    },
    /// Every control point coincides.
    #[error("curve has zero length")]
    ZeroLength,
}
