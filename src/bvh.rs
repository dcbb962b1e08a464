// Copyright 2026 the Curvekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A bounding-volume hierarchy over a sequence of boxes.

use core::ptr;

use tracing::trace;

use crate::BoundingBox;

/// A binary tree of bounding boxes over an ordered sequence of boxes.
///
/// Every leaf refers to exactly one box of the sequence, by its index, and
/// every internal node's box is the union of its children's. The tree is
/// built once and never changes; to add boxes, build a new one.
///
/// The hierarchy knows nothing about what the boxes bound: it reports
/// indices, and callers map them back to their own data.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    /// The root is the first node.
    nodes: Vec<BvhNode>,
    leaf_boxes: Vec<BoundingBox>,
}

/// A node of a [`Bvh`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BvhNode {
    bounding_box: BoundingBox,
    kind: BvhNodeKind,
}

/// Whether a [`BvhNode`] is a leaf or has children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BvhNodeKind {
    /// A leaf, holding the index of one of the original boxes.
    Leaf(usize),
    /// An internal node, holding the node indices of its children.
    Internal {
        /// The left child.
        left: usize,
        /// The right child.
        right: usize,
    },
}

impl BvhNode {
    /// The box of this node: the original box for a leaf, the union of the
    /// children for an internal node.
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// What kind of node this is.
    #[inline]
    pub fn kind(&self) -> BvhNodeKind {
        self.kind
    }

    /// The index of the original box, if this is a leaf.
    #[inline]
    pub fn leaf_index(&self) -> Option<usize> {
        match self.kind {
            BvhNodeKind::Leaf(index) => Some(index),
            BvhNodeKind::Internal { .. } => None,
        }
    }
}

impl Bvh {
    /// Build a hierarchy over `boxes`.
    ///
    /// Nodes are split at the median of the box centers along the longest
    /// axis of the node's box.
    pub fn new(boxes: &[BoundingBox]) -> Bvh {
        let mut bvh = Bvh {
            nodes: Vec::with_capacity(boxes.len().saturating_mul(2)),
            leaf_boxes: boxes.to_vec(),
        };
        if !boxes.is_empty() {
            let mut indices: Vec<usize> = (0..boxes.len()).collect();
            bvh.build(&mut indices);
        }
        trace!(leaves = boxes.len(), nodes = bvh.nodes.len(), "built bvh");
        bvh
    }

    fn build(&mut self, indices: &mut [usize]) -> usize {
        let node_index = self.nodes.len();
        if let [index] = *indices {
            self.nodes.push(BvhNode {
                bounding_box: self.leaf_boxes[index],
                kind: BvhNodeKind::Leaf(index),
            });
            return node_index;
        }

        let bounding_box = indices
            .iter()
            .fold(BoundingBox::EMPTY, |bbox, &i| bbox.union(self.leaf_boxes[i]));
        // Reserve the slot; the children are filled in below.
        self.nodes.push(BvhNode {
            bounding_box,
            kind: BvhNodeKind::Internal { left: 0, right: 0 },
        });

        let size = bounding_box.size();
        let boxes = &self.leaf_boxes;
        if size.x >= size.y {
            indices.sort_by(|&a, &b| boxes[a].center().x.total_cmp(&boxes[b].center().x));
        } else {
            indices.sort_by(|&a, &b| boxes[a].center().y.total_cmp(&boxes[b].center().y));
        }

        let mid = indices.len() / 2;
        let (low, high) = indices.split_at_mut(mid);
        let left = self.build(low);
        let right = self.build(high);
        self.nodes[node_index].kind = BvhNodeKind::Internal { left, right };
        node_index
    }

    /// The number of boxes (leaves).
    #[inline]
    pub fn len(&self) -> usize {
        self.leaf_boxes.len()
    }

    /// Is the hierarchy empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leaf_boxes.is_empty()
    }

    /// The box around everything; [`BoundingBox::EMPTY`] when empty.
    pub fn bounding_box(&self) -> BoundingBox {
        self.nodes
            .first()
            .map_or(BoundingBox::EMPTY, |root| root.bounding_box)
    }

    /// The original box at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    #[inline]
    pub fn leaf_bounding_box(&self, index: usize) -> BoundingBox {
        self.leaf_boxes[index]
    }

    /// Walk the tree depth first, left child before right.
    ///
    /// `f` receives each node and its depth (the root is at depth 0); when it
    /// returns `false` the node's children are skipped.
    pub fn visit(&self, mut f: impl FnMut(&BvhNode, usize) -> bool) {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack = vec![(0, 0)];
        while let Some((node_index, depth)) = stack.pop() {
            let node = &self.nodes[node_index];
            if !f(node, depth) {
                continue;
            }
            if let BvhNodeKind::Internal { left, right } = node.kind {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
    }

    /// Call `f(i, j)` for every pair of a leaf `i` of `self` and a leaf `j`
    /// of `other` whose boxes overlap.
    ///
    /// If `other` is `self`, this is
    /// [`enumerate_self_intersections`](Self::enumerate_self_intersections).
    pub fn enumerate_intersections(&self, other: &Bvh, mut f: impl FnMut(usize, usize)) {
        if ptr::eq(self, other) {
            self.enumerate_self_intersections(f);
            return;
        }
        if self.nodes.is_empty() || other.nodes.is_empty() {
            return;
        }
        self.descend_pair(0, other, 0, &mut f);
    }

    /// Call `f(i, j)` once for every pair of distinct leaves whose boxes
    /// overlap, with `i < j`.
    pub fn enumerate_self_intersections(&self, mut f: impl FnMut(usize, usize)) {
        if self.nodes.is_empty() {
            return;
        }
        self.descend_self(0, &mut f);
    }

    fn descend_pair(&self, a: usize, other: &Bvh, b: usize, f: &mut impl FnMut(usize, usize)) {
        let node_a = &self.nodes[a];
        let node_b = &other.nodes[b];
        if !node_a.bounding_box.overlaps(&node_b.bounding_box) {
            return;
        }
        match (node_a.kind, node_b.kind) {
            (BvhNodeKind::Leaf(i), BvhNodeKind::Leaf(j)) => f(i, j),
            (BvhNodeKind::Leaf(_), BvhNodeKind::Internal { left, right }) => {
                self.descend_pair(a, other, left, f);
                self.descend_pair(a, other, right, f);
            }
            (BvhNodeKind::Internal { left, right }, BvhNodeKind::Leaf(_)) => {
                self.descend_pair(left, other, b, f);
                self.descend_pair(right, other, b, f);
            }
            (
                BvhNodeKind::Internal { left, right },
                BvhNodeKind::Internal {
                    left: other_left,
                    right: other_right,
                },
            ) => {
                // Open the larger node first.
                if node_a.bounding_box.area() >= node_b.bounding_box.area() {
                    self.descend_pair(left, other, b, f);
                    self.descend_pair(right, other, b, f);
                } else {
                    self.descend_pair(a, other, other_left, f);
                    self.descend_pair(a, other, other_right, f);
                }
            }
        }
    }

    fn descend_self(&self, node: usize, f: &mut impl FnMut(usize, usize)) {
        if let BvhNodeKind::Internal { left, right } = self.nodes[node].kind {
            self.descend_self(left, f);
            self.descend_self(right, f);
            // The two subtrees hold disjoint leaves, so each pair comes up once.
            self.descend_pair(left, self, right, &mut |i, j| f(i.min(j), i.max(j)));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{BoundingBox, Bvh, BvhNodeKind, Point};

    fn random_boxes(rng: &mut StdRng, n: usize) -> Vec<BoundingBox> {
        (0..n)
            .map(|_| {
                let x = rng.random_range(0.0..100.0);
                let y = rng.random_range(0.0..100.0);
                let w = rng.random_range(0.0..12.0);
                let h = rng.random_range(0.0..12.0);
                BoundingBox::from_points((x, y), (x + w, y + h))
            })
            .collect()
    }

    fn brute_force(a: &[BoundingBox], b: &[BoundingBox]) -> BTreeSet<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        for (i, box_a) in a.iter().enumerate() {
            for (j, box_b) in b.iter().enumerate() {
                if box_a.overlaps(box_b) {
                    pairs.insert((i, j));
                }
            }
        }
        pairs
    }

    #[test]
    fn empty_hierarchy() {
        let bvh = Bvh::new(&[]);
        assert!(bvh.is_empty());
        assert!(bvh.bounding_box().is_empty());
        let mut visited = 0;
        bvh.visit(|_, _| {
            visited += 1;
            true
        });
        assert_eq!(visited, 0);
        bvh.enumerate_self_intersections(|_, _| panic!("no pairs in an empty tree"));
        let other = Bvh::new(&[BoundingBox::from_points((0.0, 0.0), (1.0, 1.0))]);
        bvh.enumerate_intersections(&other, |_, _| panic!("no pairs with an empty tree"));
    }

    #[test]
    fn single_leaf_never_pairs_with_itself() {
        let bvh = Bvh::new(&[BoundingBox::from_points((0.0, 0.0), (1.0, 1.0))]);
        assert_eq!(bvh.len(), 1);
        bvh.enumerate_self_intersections(|i, j| panic!("unexpected pair ({i}, {j})"));
        bvh.enumerate_intersections(&bvh, |i, j| panic!("unexpected pair ({i}, {j})"));
    }

    #[test]
    fn node_boxes_contain_children() {
        let mut rng = StdRng::seed_from_u64(1);
        let boxes = random_boxes(&mut rng, 57);
        let bvh = Bvh::new(&boxes);
        let mut leaves = Vec::new();
        bvh.visit(|node, _| {
            match node.kind() {
                BvhNodeKind::Leaf(index) => {
                    assert_eq!(node.bounding_box(), boxes[index]);
                    assert_eq!(node.leaf_index(), Some(index));
                    leaves.push(index);
                }
                BvhNodeKind::Internal { left, right } => {
                    let outer = node.bounding_box();
                    for child in [left, right] {
                        let inner = bvh.nodes[child].bounding_box();
                        assert_eq!(outer.union(inner), outer);
                    }
                }
            }
            true
        });
        leaves.sort_unstable();
        assert_eq!(leaves, (0..boxes.len()).collect::<Vec<_>>());
        assert_eq!(
            bvh.bounding_box(),
            boxes
                .iter()
                .fold(BoundingBox::EMPTY, |acc, b| acc.union(*b))
        );
    }

    #[test]
    fn visit_is_depth_first_and_prunes() {
        let boxes: Vec<_> = (0..4)
            .map(|i| {
                let x = f64::from(i) * 10.0;
                BoundingBox::from_points((x, 0.0), (x + 1.0, 1.0))
            })
            .collect();
        let bvh = Bvh::new(&boxes);
        let mut order = Vec::new();
        bvh.visit(|node, _| {
            if let Some(index) = node.leaf_index() {
                order.push(index);
            }
            true
        });
        assert_eq!(order, vec![0, 1, 2, 3]);

        // Only descend toward the point; a single leaf should be reached.
        let target = Point::new(20.5, 0.5);
        let mut reached = Vec::new();
        let mut max_depth = 0;
        bvh.visit(|node, depth| {
            max_depth = max_depth.max(depth);
            if !node.bounding_box().contains(target) {
                return false;
            }
            if let Some(index) = node.leaf_index() {
                reached.push(index);
            }
            true
        });
        assert_eq!(reached, vec![2]);
        assert_eq!(max_depth, 2);
    }

    #[test]
    fn self_intersections_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in [2, 3, 10, 64, 200] {
            let boxes = random_boxes(&mut rng, n);
            let bvh = Bvh::new(&boxes);
            let mut found = BTreeSet::new();
            bvh.enumerate_self_intersections(|i, j| {
                assert!(i < j, "pair ({i}, {j}) out of order");
                assert!(found.insert((i, j)), "pair ({i}, {j}) reported twice");
            });
            let expected: BTreeSet<_> = brute_force(&boxes, &boxes)
                .into_iter()
                .filter(|(i, j)| i < j)
                .collect();
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn cross_intersections_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        for (n, m) in [(1, 1), (5, 40), (80, 33)] {
            let a = random_boxes(&mut rng, n);
            let b = random_boxes(&mut rng, m);
            let bvh_a = Bvh::new(&a);
            let bvh_b = Bvh::new(&b);
            let mut found = BTreeSet::new();
            bvh_a.enumerate_intersections(&bvh_b, |i, j| {
                assert!(found.insert((i, j)), "pair ({i}, {j}) reported twice");
            });
            assert_eq!(found, brute_force(&a, &b));
        }
    }

    #[test]
    fn touching_boxes_overlap() {
        let boxes = [
            BoundingBox::from_points((0.0, 0.0), (1.0, 1.0)),
            BoundingBox::from_points((1.0, 1.0), (2.0, 2.0)),
            BoundingBox::from_points((5.0, 5.0), (6.0, 6.0)),
        ];
        let bvh = Bvh::new(&boxes);
        let mut pairs = Vec::new();
        bvh.enumerate_self_intersections(|i, j| pairs.push((i, j)));
        assert_eq!(pairs, vec![(0, 1)]);
        assert_eq!(bvh.leaf_bounding_box(2), boxes[2]);
    }
}
