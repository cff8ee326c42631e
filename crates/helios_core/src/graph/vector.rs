//! Linear scene graph: a brute-force scan over the primitive list.
//!
//! Slower than the kd-tree on anything non-trivial, but its answers are
//! obviously correct, which makes it the oracle the kd-tree is tested
//! against.

use std::sync::Arc;

use helios_math::{Aabb, Ray};

use crate::graph::SceneGraph;
use crate::primitive::{Hit, Primitive};

/// A scene graph that tests every primitive in turn.
#[derive(Debug)]
pub struct VectorGraph {
    primitives: Vec<Arc<Primitive>>,
    bounds: Aabb,
}

impl SceneGraph for VectorGraph {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        self.bounds.intersect(ray)?;

        let mut nearest: Option<Hit> = None;
        for primitive in &self.primitives {
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

    fn intersect_within(&self, ray: &Ray, max_distance: f32) -> Option<Hit<'_>> {
        self.bounds.intersect(ray)?;

        for primitive in &self.primitives {
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

    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Accumulates primitives and their combined bounds.
pub struct VectorGraphBuilder {
    primitives: Vec<Arc<Primitive>>,
    bounds: Aabb,
}

impl Default for VectorGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorGraphBuilder {
    pub fn new() -> Self {
        Self {
            primitives: Vec::new(),
            bounds: Aabb::EMPTY,
        }
    }

    pub fn add(&mut self, primitive: impl Into<Primitive>) {
        let primitive = primitive.into();
        self.bounds = self.bounds.union(&primitive.bounding_box());
        self.primitives.push(Arc::new(primitive));
    }

    pub fn build(self) -> VectorGraph {
        VectorGraph {
            primitives: self.primitives,
            bounds: self.bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::primitive::Sphere;
    use helios_math::Vec3;

    #[test]
    fn test_nearest_of_several() {
        let mut builder = VectorGraphBuilder::new();
        for z in [-5.0, -10.0, -2.0_f32] {
            builder.add(Sphere::new(
                Vec3::new(0.0, 0.0, z),
                0.5,
                Arc::new(Material::fallback()),
            ));
        }
        let graph = builder.build();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = graph.intersect(&ray).unwrap();
        assert!((hit.distance - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_empty_graph_misses() {
        let graph = VectorGraphBuilder::new().build();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(graph.intersect(&ray).is_none());
        assert!(graph.intersect_within(&ray, f32::INFINITY).is_none());
    }

    #[test]
    fn test_intersect_within_bound() {
        let mut builder = VectorGraphBuilder::new();
        builder.add(Sphere::new(
            Vec3::new(0.0, 0.0, -5.0),
            0.5,
            Arc::new(Material::fallback()),
        ));
        let graph = builder.build();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(graph.intersect_within(&ray, 5.0).is_some());
        assert!(graph.intersect_within(&ray, 1.0).is_none());
    }
}
