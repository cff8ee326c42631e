//! kd-tree scene graph.
//!
//! The builder splits on the longest axis of the node's bounding box at the
//! mean of the primitive midpoints. Primitives whose midpoints cannot be
//! separated end up shared between both sides; once either side would keep
//! half or more of the other, splitting stops and the node becomes a leaf.
//! That overlap rule is what terminates the recursion on pathological
//! geometry.

use std::collections::HashSet;
use std::sync::Arc;

use helios_math::{Aabb, Ray, Vec3};

use crate::graph::{GraphStats, SceneGraph};
use crate::primitive::{Hit, Primitive};

/// Fraction of primitives shared between both sides of a split at which the
/// builder gives up and emits a leaf.
const OVERLAP_LIMIT: f32 = 0.5;

/// A node in the kd-tree. Interior nodes carry only their bounds and
/// children; leaves carry the primitive lists.
#[derive(Debug)]
pub enum KdNode {
    Leaf {
        bounds: Aabb,
        primitives: Vec<Arc<Primitive>>,
        depth: usize,
    },
    Interior {
        bounds: Aabb,
        left: Box<KdNode>,
        right: Box<KdNode>,
        depth: usize,
    },
}

impl KdNode {
    pub fn bounds(&self) -> Aabb {
        match self {
            KdNode::Leaf { bounds, .. } => *bounds,
            KdNode::Interior { bounds, .. } => *bounds,
        }
    }

    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        self.bounds().intersect(ray)?;

        match self {
            KdNode::Leaf { primitives, .. } => nearest_of(primitives, ray),
            KdNode::Interior { left, right, .. } => {
                match (left.intersect(ray), right.intersect(ray)) {
                    (Some(a), Some(b)) => Some(if a.distance < b.distance { a } else { b }),
                    (hit, None) | (None, hit) => hit,
                }
            }
        }
    }

    fn intersect_within(&self, ray: &Ray, max_distance: f32) -> Option<Hit<'_>> {
        self.bounds().intersect(ray)?;

        match self {
            KdNode::Leaf { primitives, .. } => {
                for primitive in primitives {
                    if primitive.bounding_box().intersect(ray).is_none() {
                        continue;
                    }
                    if let Some(hit) = primitive.intersect(ray) {
                        if hit.distance < max_distance {
                            return Some(hit);
                        }
                    }
                }
                None
            }
            KdNode::Interior { left, right, .. } => left
                .intersect_within(ray, max_distance)
                .or_else(|| right.intersect_within(ray, max_distance)),
        }
    }

    fn collect_stats(&self, stats: &mut GraphStats) {
        stats.nodes += 1;
        match self {
            KdNode::Leaf {
                primitives, depth, ..
            } => {
                stats.leaves += 1;
                stats.primitives += primitives.len();
                stats.max_depth = stats.max_depth.max(*depth);
            }
            KdNode::Interior { left, right, .. } => {
                left.collect_stats(stats);
                right.collect_stats(stats);
            }
        }
    }
}

/// Nearest hit over a leaf's primitive list, pre-filtering each primitive
/// through its bounding box.
fn nearest_of<'a>(primitives: &'a [Arc<Primitive>], ray: &Ray) -> Option<Hit<'a>> {
    let mut nearest: Option<Hit> = None;

    for primitive in primitives {
        if primitive.bounding_box().intersect(ray).is_none() {
            continue;
        }
        if let Some(hit) = primitive.intersect(ray) {
            if nearest.as_ref().map_or(true, |n| hit.distance < n.distance) {
                nearest = Some(hit);
            }
        }
    }

    nearest
}

/// A scene graph backed by a kd-tree.
#[derive(Debug)]
pub struct KdTree {
    root: KdNode,
}

impl KdTree {
    pub fn root(&self) -> &KdNode {
        &self.root
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        self.root.collect_stats(&mut stats);
        stats
    }
}

impl SceneGraph for KdTree {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        self.root.intersect(ray)
    }

    fn intersect_within(&self, ray: &Ray, max_distance: f32) -> Option<Hit<'_>> {
        self.root.intersect_within(ray, max_distance)
    }

    fn bounds(&self) -> Aabb {
        self.root.bounds()
    }
}

/// Accumulates primitives, then builds the tree in one pass.
#[derive(Default)]
pub struct KdTreeBuilder {
    primitives: Vec<Arc<Primitive>>,
}

impl KdTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, primitive: impl Into<Primitive>) {
        self.primitives.push(Arc::new(primitive.into()));
    }

    pub fn add_shared(&mut self, primitive: Arc<Primitive>) {
        self.primitives.push(primitive);
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn build(self) -> KdTree {
        let tree = KdTree {
            root: build_node(self.primitives, 0),
        };
        let stats = tree.stats();
        log::debug!(
            "built kd-tree: {} nodes, {} leaves, max depth {}, {} primitives",
            stats.nodes,
            stats.leaves,
            stats.max_depth,
            stats.primitives
        );
        tree
    }
}

fn build_node(primitives: Vec<Arc<Primitive>>, depth: usize) -> KdNode {
    if primitives.is_empty() {
        return KdNode::Leaf {
            bounds: Aabb::EMPTY,
            primitives,
            depth,
        };
    }
    if primitives.len() == 1 {
        return KdNode::Leaf {
            bounds: primitives[0].bounding_box(),
            primitives,
            depth,
        };
    }

    // Bounding box of the node and the mean of the primitive midpoints
    let mut bounds = Aabb::EMPTY;
    let mut origin = Vec3::ZERO;
    for primitive in &primitives {
        bounds = bounds.union(&primitive.bounding_box());
        origin += primitive.midpoint() / primitives.len() as f32;
    }

    let axis = bounds.longest_axis();
    let (mut left, mut right): (Vec<_>, Vec<_>) = primitives
        .iter()
        .cloned()
        .partition(|primitive| primitive.midpoint()[axis] < origin[axis]);

    // Mirror the non-empty side when the split put everything on one side
    if left.is_empty() {
        left = right.clone();
    }
    if right.is_empty() {
        right = left.clone();
    }

    let left_identities: HashSet<*const Primitive> =
        left.iter().map(Arc::as_ptr).collect();
    let shared = right
        .iter()
        .filter(|primitive| left_identities.contains(&Arc::as_ptr(primitive)))
        .count() as f32;

    if shared / left.len() as f32 >= OVERLAP_LIMIT || shared / right.len() as f32 >= OVERLAP_LIMIT
    {
        return KdNode::Leaf {
            bounds,
            primitives,
            depth,
        };
    }

    KdNode::Interior {
        bounds,
        left: Box::new(build_node(left, depth + 1)),
        right: Box::new(build_node(right, depth + 1)),
        depth,
    }
}
