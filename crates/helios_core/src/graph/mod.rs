//! Scene graphs: containers for primitives that answer ray queries.

mod kdtree;
mod vector;

pub use kdtree::{KdNode, KdTree, KdTreeBuilder};
pub use vector::{VectorGraph, VectorGraphBuilder};

use helios_math::{Aabb, Ray};

use crate::primitive::Hit;

/// An immutable container of primitives that can answer intersection
/// queries. Built once by a builder, then shared read-only across workers.
pub trait SceneGraph: Send + Sync {
    /// Nearest intersection of the ray with the contained geometry.
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>>;

    /// First intersection strictly closer than `max_distance`, if any.
    ///
    /// Unlike [`SceneGraph::intersect`] this may return any qualifying hit,
    /// not the nearest one; it exists for occlusion queries that only care
    /// whether something is in the way.
    fn intersect_within(&self, ray: &Ray, max_distance: f32) -> Option<Hit<'_>>;

    /// Bounding box of all contained geometry.
    fn bounds(&self) -> Aabb;
}

/// Build statistics, reported at debug level after construction.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub leaves: usize,
    pub max_depth: usize,
    pub primitives: usize,
}
