//! Surface material properties, following the Wavefront MTL model.

use helios_math::Vec3;

/// A surface material as described by a Wavefront MTL file.
///
/// Materials are shared: many primitives may reference the same material
/// through an `Arc`, and a material is never mutated once the scene has been
/// built.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Diffuse reflectivity (`Kd`)
    pub diffuse: Vec3,
    /// Ambient reflectivity (`Ka`)
    pub ambient: Vec3,
    /// Specular reflectivity (`Ks`)
    pub specular: Vec3,
    /// Transmission filter (`Tf`), tinting light passing through
    pub transmission_filter: Vec3,
    /// Specular exponent (`Ns`)
    pub shininess: f32,
    /// Index of refraction (`Ni`), >= 1
    pub optical_density: f32,
    /// 0 = opaque, 1 = fully transparent (`d` / `Tr`)
    pub transparency: f32,
    /// Illumination model selector (`illum`, 0..=9)
    pub illumination: u32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Vec3::ZERO,
            ambient: Vec3::ZERO,
            specular: Vec3::ZERO,
            transmission_filter: Vec3::ONE,
            shininess: 0.0,
            optical_density: 1.0,
            transparency: 0.0,
            illumination: 1,
        }
    }
}

impl Material {
    /// The material substituted when a face references an undefined name.
    pub fn fallback() -> Self {
        Self {
            diffuse: Vec3::splat(0.5),
            ambient: Vec3::ZERO,
            specular: Vec3::splat(0.5),
            shininess: 96.7,
            illumination: 2,
            ..Self::default()
        }
    }

    /// Create a flat-shaded material (`illum 0`) with the given colour.
    /// Mostly useful for tests and debug scenes.
    pub fn flat(diffuse: Vec3) -> Self {
        Self {
            diffuse,
            illumination: 0,
            ..Self::default()
        }
    }
}
