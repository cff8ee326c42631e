//! Helios Core - scene model for the ray tracer.
//!
//! This crate provides:
//!
//! - **Materials**: shared, immutable Wavefront MTL material records
//! - **Primitives**: triangle, sphere and box shapes with ray intersection
//! - **Scene graphs**: a kd-tree and a linear fallback behind one interface
//! - **Loading**: Wavefront OBJ/MTL parsing into primitives
//!
//! # Example
//!
//! ```ignore
//! use helios_core::graph::KdTreeBuilder;
//! use helios_core::obj::load_obj;
//! use helios_core::Scene;
//!
//! let mut builder = KdTreeBuilder::new();
//! for primitive in load_obj("scene.obj")? {
//!     builder.add(primitive);
//! }
//! let scene = Scene::new(Box::new(builder.build()), vec![]);
//! ```

pub mod graph;
pub mod material;
pub mod obj;
pub mod primitive;
pub mod scene;

// Re-export commonly used types
pub use graph::SceneGraph;
pub use material::Material;
pub use primitive::{Hit, Primitive};
pub use scene::Scene;
