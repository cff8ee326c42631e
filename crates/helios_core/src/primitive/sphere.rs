//! Sphere primitive.

use std::sync::Arc;

use helios_math::{Aabb, Ray, Vec3};

use crate::material::Material;
use crate::primitive::Surface;

/// A sphere with a center and a radius.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    bounds: Aabb,
    material: Arc<Material>,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        Self {
            center,
            radius,
            bounds: Aabb::from_points(center - Vec3::splat(radius), center + Vec3::splat(radius)),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bounds
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Quadratic intersection using the half-b shortcut. Takes the smaller
    /// positive root, falling back to the larger one when the ray starts
    /// inside the sphere.
    pub fn intersect(&self, ray: &Ray) -> Option<Surface> {
        let v = self.center - ray.origin;
        let b = v.dot(ray.direction);
        let discriminant = b * b - v.dot(v) + self.radius * self.radius;

        if discriminant < 0.0 {
            return None;
        }

        let d = discriminant.sqrt();
        let t_far = b + d;
        if t_far < 0.0 {
            return None;
        }

        let t_near = b - d;
        let distance = if t_near > 0.0 { t_near } else { t_far };
        let position = ray.at(distance);

        Some(Surface {
            distance,
            position,
            normal: (position - self.center).normalize(),
        })
    }
}
