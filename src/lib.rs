// Copyright 2026 the Curvekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersection, containment and offsetting of 2D Bézier paths.
//!
//! The curvekit library works on paths built from lines, quadratic Béziers
//! and cubic Béziers. A [`PathComponent`] is a connected chain of such
//! [`Curve`]s, and a [`Path`] is a list of components. Each component keeps
//! a bounding volume hierarchy ([`Bvh`]) over its segments, built on first
//! use, which prunes the work of intersection, winding and distance queries.
//!
//! # Examples
//!
//! Two overlapping squares:
//! ```
//! use curvekit::{Curve, FillRule, Line, PathComponent, Point, DEFAULT_INTERSECTION_THRESHOLD};
//!
//! fn square(min: f64, max: f64) -> PathComponent {
//!     let corners = [(min, min), (max, min), (max, max), (min, max)];
//!     PathComponent::new(
//!         (0..4)
//!             .map(|i| Curve::Line(Line::new(corners[i], corners[(i + 1) % 4])))
//!             .collect(),
//!     )
//! }
//!
//! let a = square(0.0, 2.0);
//! let b = square(1.0, 3.0);
//! assert!(a.contains(Point::new(0.5, 0.5), FillRule::NonZero));
//! assert!(!a.contains(Point::new(2.5, 2.5), FillRule::NonZero));
//!
//! let hits = a.intersections(&b, DEFAULT_INTERSECTION_THRESHOLD);
//! assert_eq!(hits.len(), 2);
//! for hit in hits {
//!     let p = a.point_at(hit.location1);
//!     assert!(p.distance(b.point_at(hit.location2)) < 1e-9);
//! }
//! ```
//!
//! Building a curve from control points and cutting it with a line:
//! ```
//! use curvekit::{Curve, Line, Point};
//!
//! let points = [(0.0, 0.0), (1.0, 2.0), (2.0, 0.0)].map(Point::from);
//! let arch = Curve::from_control_points(&points).unwrap();
//! let hits = arch.intersect_line(Line::new((-1.0, 0.5), (3.0, 0.5)));
//! assert_eq!(hits.len(), 2);
//! assert!(hits[0].segment_t < hits[1].segment_t);
//! ```
//!
//! # Features
//!
//! The `serde` feature derives serialization for the value types. A
//! [`PathComponent`] serializes as a list of control point lists.

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod affine;
mod bounding_box;
mod bvh;
pub mod common;
mod cubicbez;
mod curve;
pub mod curve_intersections;
mod error;
mod line;
pub mod offset;
mod param_curve;
mod path;
mod path_component;
mod point;
mod quadbez;
mod vec2;

pub use crate::affine::*;
pub use crate::bounding_box::*;
pub use crate::bvh::*;
pub use crate::cubicbez::*;
pub use crate::curve::*;
pub use crate::curve_intersections::{CurveIntersection, DEFAULT_INTERSECTION_THRESHOLD};
pub use crate::error::*;
pub use crate::line::*;
pub use crate::param_curve::*;
pub use crate::path::*;
pub use crate::path_component::*;
pub use crate::point::*;
pub use crate::quadbez::*;
pub use crate::vec2::*;
