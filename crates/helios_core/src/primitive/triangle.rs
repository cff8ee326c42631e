//! Triangle primitive.
//!
//! Intersection is plane-then-barycentric: solve the plane equation for t,
//! then express the hit point in the triangle's edge basis via the dot
//! product Gram matrix.

use std::sync::Arc;

use helios_math::{Aabb, Ray, Vec3};

use crate::material::Material;
use crate::primitive::Surface;

/// A ray parallel to the triangle's plane within this tolerance misses.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Barycentric coordinates may undershoot zero by this much and still count
/// as inside, closing the triangle on its negative-u/negative-v edges.
const BARYCENTRIC_TOLERANCE: f32 = 1e-6;

/// A triangle, stored as its first vertex and the two edge vectors to the
/// remaining vertices.
#[derive(Debug, Clone)]
pub struct Triangle {
    origin: Vec3,
    u: Vec3,
    v: Vec3,
    /// Pre-computed unit geometric normal, `normalize(u x v)`
    normal: Vec3,
    /// Pre-computed bounding box
    bounds: Aabb,
    material: Arc<Material>,
}

impl Triangle {
    /// Create a triangle from its first vertex and two edge vectors.
    pub fn new(origin: Vec3, u: Vec3, v: Vec3, material: Arc<Material>) -> Self {
        let bounds = Aabb::EMPTY
            .grow(origin)
            .grow(origin + u)
            .grow(origin + v);

        Self {
            origin,
            u,
            v,
            normal: u.cross(v).normalize(),
            bounds,
            material,
        }
    }

    /// Create a triangle from three vertices.
    pub fn from_vertices(a: Vec3, b: Vec3, c: Vec3, material: Arc<Material>) -> Self {
        Self::new(a, b - a, c - a, material)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn midpoint(&self) -> Vec3 {
        self.bounds.centroid()
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bounds
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Surface> {
        let n = self.u.cross(self.v);

        // Angle of the ray relative to the plane
        let d = n.dot(ray.direction);
        if d.abs() < PARALLEL_EPSILON {
            return None;
        }

        // Solve t for P = O + tD on the plane
        let t = (self.origin - ray.origin).dot(n) / d;
        if t < 0.0 {
            return None;
        }

        let position = ray.at(t);

        // Barycentric coordinates of the hit point via the Gram matrix
        let w = position - self.origin;
        let d00 = self.u.dot(self.u);
        let d01 = self.u.dot(self.v);
        let d11 = self.v.dot(self.v);
        let d20 = w.dot(self.u);
        let d21 = w.dot(self.v);
        let inv_denom = 1.0 / (d00 * d11 - d01 * d01);

        let a = (d11 * d20 - d01 * d21) * inv_denom;
        let b = (d00 * d21 - d01 * d20) * inv_denom;

        // On the plane but outside the triangle
        if a < -BARYCENTRIC_TOLERANCE || b < -BARYCENTRIC_TOLERANCE || a + b > 1.0 {
            return None;
        }

        Some(Surface {
            distance: t,
            position,
            normal: self.normal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Triangle {
        Triangle::from_vertices(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            Arc::new(Material::fallback()),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let surface = triangle().intersect(&ray).unwrap();

        assert!((surface.distance - 1.0).abs() < 1e-5);
        assert!((surface.position.z - (-1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        // Ray pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(triangle().intersect(&ray).is_none());

        // Ray into the plane but outside the triangle
        let ray = Ray::new(Vec3::new(5.0, 5.0, 0.0), Vec3::NEG_Z);
        assert!(triangle().intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_parallel_ray_misses_cleanly() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.5), Vec3::X);
        assert!(triangle().intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_normal_is_precomputed_geometric_normal() {
        let ray = Ray::new(Vec3::new(0.2, -0.3, 0.0), Vec3::NEG_Z);
        let surface = triangle().intersect(&ray).unwrap();

        // Counter-clockwise winding in the XY plane faces +Z
        assert!((surface.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_triangle_closed_on_negative_edges() {
        // A hit exactly on the first vertex has a = b = 0
        let ray = Ray::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::NEG_Z);
        assert!(triangle().intersect(&ray).is_some());
    }

    #[test]
    fn test_triangle_bounding_box() {
        let bounds = triangle().bounding_box();
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, -1.0));
    }
}
