// Copyright 2026 the Curvekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paths made of several components.

use core::ptr;

use crate::{
    Affine, BoundingBox, FillRule, IndexedLocation, PathComponent, PathEl, PathIntersection, Point,
};

/// A location on a [`Path`]: a component, a segment of it, and a parameter.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathLocation {
    /// The index of the component.
    pub component_index: usize,
    /// The index of the segment within the component.
    pub segment_index: usize,
    /// The parameter on the segment.
    pub t: f64,
}

impl PathLocation {
    /// Qualify a component location with the component's index.
    #[inline]
    pub fn new(component_index: usize, location: IndexedLocation) -> PathLocation {
        PathLocation {
            component_index,
            segment_index: location.segment_index,
            t: location.t,
        }
    }

    /// The location within its component.
    #[inline]
    pub fn indexed_location(&self) -> IndexedLocation {
        IndexedLocation::new(self.segment_index, self.t)
    }
}

/// A point where two paths meet, or where a path meets itself.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathPairIntersection {
    /// The location on the first path.
    pub location1: PathLocation,
    /// The location on the second path.
    pub location2: PathLocation,
}

impl PathPairIntersection {
    fn new(component1: usize, component2: usize, hit: PathIntersection) -> PathPairIntersection {
        PathPairIntersection {
            location1: PathLocation::new(component1, hit.location1),
            location2: PathLocation::new(component2, hit.location2),
        }
    }
}

/// A sequence of path components, possibly empty.
///
/// Containment sums the winding numbers of all components, which is where
/// the even-odd rule becomes interesting: a component nested inside another
/// with the same orientation is a hole under [`FillRule::EvenOdd`] but not
/// under [`FillRule::NonZero`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    components: Vec<PathComponent>,
}

impl Path {
    /// An empty path.
    #[inline]
    pub fn new() -> Path {
        Path::default()
    }

    /// A path from its components.
    #[inline]
    pub fn from_components(components: Vec<PathComponent>) -> Path {
        Path { components }
    }

    /// Append a component.
    pub fn push(&mut self, component: PathComponent) {
        self.components.push(component);
    }

    /// The components.
    #[inline]
    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    /// The number of components.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Does the path have no components?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The smallest box containing every component; empty for an empty path.
    pub fn bounding_box(&self) -> BoundingBox {
        self.components
            .iter()
            .fold(BoundingBox::EMPTY, |bbox, c| bbox.union(c.bounding_box()))
    }

    /// The sum of the components' winding numbers around `point`.
    pub fn winding_count(&self, point: Point) -> i32 {
        self.components
            .iter()
            .map(|component| component.winding_count(point))
            .sum()
    }

    /// Is `point` inside the path under `rule`?
    pub fn contains(&self, point: Point, rule: FillRule) -> bool {
        rule.is_inside(self.winding_count(point))
    }

    /// Where this path meets `other`, component by component.
    ///
    /// # Panics
    ///
    /// If `other` is `self`; use
    /// [`self_intersections`](Self::self_intersections) instead.
    pub fn intersections(&self, other: &Path, threshold: f64) -> Vec<PathPairIntersection> {
        assert!(
            !ptr::eq(self, other),
            "use self_intersections to intersect a path with itself"
        );
        let mut result = Vec::new();
        for (i, a) in self.components.iter().enumerate() {
            for (j, b) in other.components.iter().enumerate() {
                result.extend(
                    a.intersections(b, threshold)
                        .into_iter()
                        .map(|hit| PathPairIntersection::new(i, j, hit)),
                );
            }
        }
        result
    }

    /// Where the path meets itself: each component against every later one,
    /// then each component against itself.
    pub fn self_intersections(&self, threshold: f64) -> Vec<PathPairIntersection> {
        let mut result = Vec::new();
        for (i, a) in self.components.iter().enumerate() {
            for (j, b) in self.components.iter().enumerate().skip(i + 1) {
                result.extend(
                    a.intersections(b, threshold)
                        .into_iter()
                        .map(|hit| PathPairIntersection::new(i, j, hit)),
                );
            }
        }
        for (i, component) in self.components.iter().enumerate() {
            result.extend(
                component
                    .self_intersections(threshold)
                    .into_iter()
                    .map(|hit| PathPairIntersection::new(i, i, hit)),
            );
        }
        result
    }

    /// Is some point of the path within `distance` of `point`?
    pub fn is_within_distance(&self, point: Point, distance: f64) -> bool {
        self.components
            .iter()
            .any(|component| component.is_within_distance(point, distance))
    }

    /// Offset every component; components without an offset are dropped.
    #[must_use]
    pub fn offset(&self, distance: f64) -> Path {
        self.components
            .iter()
            .filter_map(|component| component.offset(distance))
            .collect()
    }

    /// Every component traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Path {
        self.components.iter().map(PathComponent::reversed).collect()
    }

    /// The path with `affine` applied to every component.
    #[must_use]
    pub fn transformed(&self, affine: Affine) -> Path {
        self.components
            .iter()
            .map(|component| component.transformed(affine))
            .collect()
    }

    /// The drawing commands of every component, one subpath each.
    pub fn path_elements(&self) -> Vec<PathEl> {
        self.components
            .iter()
            .flat_map(PathComponent::path_elements)
            .collect()
    }
}

impl FromIterator<PathComponent> for Path {
    fn from_iter<T: IntoIterator<Item = PathComponent>>(iter: T) -> Path {
        Path {
            components: iter.into_iter().collect(),
        }
    }
}

impl From<PathComponent> for Path {
    fn from(component: PathComponent) -> Path {
        Path {
            components: vec![component],
        }
    }
}
