//! Geometric primitives and ray intersection records.
//!
//! Primitives are a tagged variant rather than trait objects: dispatch is a
//! `match` per shape kind, and new shapes extend the enum.

mod cuboid;
mod sphere;
mod triangle;

pub use cuboid::Cuboid;
pub use sphere::Sphere;
pub use triangle::Triangle;

use std::sync::Arc;

use helios_math::{Aabb, Ray, Vec3};

use crate::material::Material;

/// Geometric surface data produced by a shape intersection, before it is
/// tied back to the primitive that produced it.
#[derive(Debug, Copy, Clone)]
pub struct Surface {
    pub distance: f32,
    pub position: Vec3,
    pub normal: Vec3,
}

/// Record of a successful ray/primitive intersection.
///
/// The primitive reference is a borrow into the scene; a hit is scratch data
/// scoped to the intersection call and never outlives the scene.
#[derive(Debug, Copy, Clone)]
pub struct Hit<'a> {
    /// The primitive that was hit
    pub primitive: &'a Primitive,
    /// Distance along the ray
    pub distance: f32,
    /// World-space intersection point
    pub position: Vec3,
    /// Unit surface normal, outward for closed shapes
    pub normal: Vec3,
    /// Recursion depth of the ray that produced this hit
    pub depth: u32,
}

/// A geometric object with an intersection function and a material.
#[derive(Debug, Clone)]
pub enum Primitive {
    Triangle(Triangle),
    Sphere(Sphere),
    Cuboid(Cuboid),
}

impl Primitive {
    /// Intersect a ray with this primitive, returning the nearest surface
    /// point in front of the ray if one exists.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let surface = match self {
            Primitive::Triangle(triangle) => triangle.intersect(ray),
            Primitive::Sphere(sphere) => sphere.intersect(ray),
            Primitive::Cuboid(cuboid) => cuboid.intersect(ray),
        }?;

        Some(Hit {
            primitive: self,
            distance: surface.distance,
            position: surface.position,
            normal: surface.normal,
            depth: 0,
        })
    }

    /// The axis-aligned bounding box of the primitive. Contains every point
    /// the primitive can return from [`Primitive::intersect`].
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Triangle(triangle) => triangle.bounding_box(),
            Primitive::Sphere(sphere) => sphere.bounding_box(),
            Primitive::Cuboid(cuboid) => cuboid.bounding_box(),
        }
    }

    /// Representative center point, used by the kd-tree builder to
    /// partition primitives.
    pub fn midpoint(&self) -> Vec3 {
        match self {
            Primitive::Triangle(triangle) => triangle.midpoint(),
            Primitive::Sphere(sphere) => sphere.center(),
            Primitive::Cuboid(cuboid) => cuboid.midpoint(),
        }
    }

    /// The material of the primitive.
    pub fn material(&self) -> &Arc<Material> {
        match self {
            Primitive::Triangle(triangle) => triangle.material(),
            Primitive::Sphere(sphere) => sphere.material(),
            Primitive::Cuboid(cuboid) => cuboid.material(),
        }
    }
}

impl From<Triangle> for Primitive {
    fn from(triangle: Triangle) -> Self {
        Primitive::Triangle(triangle)
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl From<Cuboid> for Primitive {
    fn from(cuboid: Cuboid) -> Self {
        Primitive::Cuboid(cuboid)
    }
}
