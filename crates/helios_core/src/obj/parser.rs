//! Line-by-line parsing of OBJ and MTL text.

use std::collections::HashMap;
use std::sync::Arc;

use helios_math::Vec3;
use thiserror::Error;

use crate::material::Material;
use crate::primitive::{Primitive, Triangle};

/// Materials by name, as declared by `newmtl`.
pub type MaterialMap = HashMap<String, Arc<Material>>;

/// Errors produced while parsing OBJ/MTL text.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },
}

impl ParseError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Parse OBJ text into triangles.
///
/// `load_mtllib` is invoked for every `mtllib` directive with the referenced
/// file name; returning `None` skips the library (the caller decides whether
/// that is fatal). Faces with more than three vertices are fan-triangulated
/// from their first vertex.
pub fn parse_obj<F>(content: &str, mut load_mtllib: F) -> Result<Vec<Primitive>, ParseError>
where
    F: FnMut(&str) -> Option<MaterialMap>,
{
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut materials = MaterialMap::new();
    let mut current = Arc::new(Material::fallback());
    let mut primitives = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let mut tokens = text.split_whitespace();
        let keyword = tokens.next().unwrap();

        match keyword {
            "v" => vertices.push(parse_vec3(&mut tokens, line)?),
            "mtllib" => {
                let name = tokens
                    .next()
                    .ok_or_else(|| ParseError::syntax(line, "mtllib without a file name"))?;
                if let Some(library) = load_mtllib(name) {
                    materials.extend(library);
                }
            }
            "usemtl" => {
                let name = tokens
                    .next()
                    .ok_or_else(|| ParseError::syntax(line, "usemtl without a material name"))?;
                current = match materials.get(name) {
                    Some(material) => Arc::clone(material),
                    None => {
                        log::warn!("material '{name}' not defined, taking default");
                        Arc::new(Material::fallback())
                    }
                };
            }
            "f" => {
                let corners = parse_face(&mut tokens, &vertices, line)?;
                if corners.len() < 3 {
                    log::warn!("line {line}: face with fewer than 3 vertices, ignoring");
                    continue;
                }
                // Fan triangulation from the first vertex
                for i in 1..corners.len() - 1 {
                    primitives.push(Primitive::Triangle(Triangle::from_vertices(
                        corners[0],
                        corners[i],
                        corners[i + 1],
                        Arc::clone(&current),
                    )));
                }
            }
            // Texture coordinates and normal data are skipped: normals are
            // recomputed from the geometry.
            "vt" | "vn" | "s" | "o" | "g" => {}
            _ => {}
        }
    }

    Ok(primitives)
}

/// Parse MTL text into a material map.
pub fn parse_mtl(content: &str) -> Result<MaterialMap, ParseError> {
    let mut materials = MaterialMap::new();
    let mut current: Option<(String, Material)> = None;

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let mut tokens = text.split_whitespace();
        let keyword = tokens.next().unwrap();

        if keyword == "newmtl" {
            let name = tokens
                .next()
                .ok_or_else(|| ParseError::syntax(line, "newmtl without a material name"))?;
            if let Some((name, material)) = current.take() {
                // The first definition of a name wins
                materials.entry(name).or_insert_with(|| Arc::new(material));
            }
            current = Some((name.to_string(), Material::default()));
            continue;
        }

        let material = match current.as_mut() {
            Some((_, material)) => material,
            // Directives before the first newmtl have nothing to apply to
            None => {
                return Err(ParseError::syntax(
                    line,
                    format!("'{keyword}' before the first newmtl"),
                ))
            }
        };

        match keyword {
            "Kd" => material.diffuse = parse_vec3(&mut tokens, line)?,
            "Ka" => material.ambient = parse_vec3(&mut tokens, line)?,
            "Ks" => material.specular = parse_vec3(&mut tokens, line)?,
            "Tf" => material.transmission_filter = parse_vec3(&mut tokens, line)?,
            "Ns" => material.shininess = parse_f32(&mut tokens, line)?,
            "Ni" => material.optical_density = parse_f32(&mut tokens, line)?,
            "d" | "Tr" => material.transparency = parse_f32(&mut tokens, line)?,
            "illum" => {
                let token = tokens
                    .next()
                    .ok_or_else(|| ParseError::syntax(line, "illum without a value"))?;
                material.illumination =
                    token.parse().map_err(|_| ParseError::InvalidNumber {
                        line,
                        token: token.to_string(),
                    })?;
            }
            _ => {}
        }
    }

    if let Some((name, material)) = current {
        materials.entry(name).or_insert_with(|| Arc::new(material));
    }

    Ok(materials)
}

fn parse_f32<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<f32, ParseError> {
    let token = tokens
        .next()
        .ok_or_else(|| ParseError::syntax(line, "missing numeric component"))?;
    token.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

fn parse_vec3<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec3, ParseError> {
    let x = parse_f32(tokens, line)?;
    let y = parse_f32(tokens, line)?;
    let z = parse_f32(tokens, line)?;
    Ok(Vec3::new(x, y, z))
}

/// Resolve the vertex references of a face directive. Only the leading
/// vertex index of each `v/vt/vn` group is used.
fn parse_face<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    vertices: &[Vec3],
    line: usize,
) -> Result<Vec<Vec3>, ParseError> {
    let mut corners = Vec::new();

    for group in tokens {
        let token = group.split('/').next().unwrap_or(group);
        let index: usize = token.parse().map_err(|_| ParseError::InvalidNumber {
            line,
            token: token.to_string(),
        })?;

        // OBJ indices are 1-based
        let vertex = index
            .checked_sub(1)
            .and_then(|i| vertices.get(i))
            .ok_or_else(|| {
                ParseError::syntax(line, format!("vertex index {index} out of range"))
            })?;
        corners.push(*vertex);
    }

    Ok(corners)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_library(_: &str) -> Option<MaterialMap> {
        None
    }

    #[test]
    fn test_parse_single_triangle() {
        let content = "\
# a triangle
v -1.0 -1.0 -5.0
v 1.0 -1.0 -5.0
v 0.0 1.0 -5.0
f 1 2 3
";
        let primitives = parse_obj(content, no_library).unwrap();
        assert_eq!(primitives.len(), 1);

        let bounds = primitives[0].bounding_box();
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, -5.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, -5.0));
    }

    #[test]
    fn test_parse_face_with_texture_and_normal_indices() {
        let content = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1/1/1 2/2/2 3/3/3
";
        assert_eq!(parse_obj(content, no_library).unwrap().len(), 1);

        let content = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1//1 2//2 3//3
";
        assert_eq!(parse_obj(content, no_library).unwrap().len(), 1);
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let content = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";
        let primitives = parse_obj(content, no_library).unwrap();
        assert_eq!(primitives.len(), 2);
    }

    #[test]
    fn test_out_of_range_index_reports_line() {
        let content = "v 0 0 0\nf 1 2 3\n";
        match parse_obj(content, no_library) {
            Err(ParseError::Syntax { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_vertex_reports_token() {
        let content = "v 0 zero 0\n";
        match parse_obj(content, no_library) {
            Err(ParseError::InvalidNumber { line, token }) => {
                assert_eq!(line, 1);
                assert_eq!(token, "zero");
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
    }

    #[test]
    fn test_undefined_usemtl_falls_back_to_default() {
        let content = "\
v 0 0 0
v 1 0 0
v 0 1 0
usemtl missing
f 1 2 3
";
        let primitives = parse_obj(content, no_library).unwrap();
        assert_eq!(*primitives[0].material().as_ref(), Material::fallback());
    }

    #[test]
    fn test_mtllib_materials_are_applied() {
        let mtl = "\
newmtl red
Kd 1.0 0.0 0.0
illum 2
";
        let content = "\
mtllib scene.mtl
v 0 0 0
v 1 0 0
v 0 1 0
usemtl red
f 1 2 3
";
        let primitives = parse_obj(content, |name| {
            assert_eq!(name, "scene.mtl");
            Some(parse_mtl(mtl).unwrap())
        })
        .unwrap();

        assert_eq!(primitives[0].material().diffuse, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(primitives[0].material().illumination, 2);
    }

    #[test]
    fn test_parse_mtl_fields() {
        let content = "\
# glass-ish
newmtl glass
Kd 0.1 0.1 0.1
Ka 0.0 0.0 0.0
Ks 0.9 0.9 0.9
Tf 0.8 0.9 1.0
Ns 250
Ni 1.5
Tr 0.7
illum 6

newmtl wall
Kd 0.6 0.2 0.2
map_Kd bricks.png
";
        let materials = parse_mtl(content).unwrap();
        assert_eq!(materials.len(), 2);

        let glass = &materials["glass"];
        assert_eq!(glass.specular, Vec3::splat(0.9));
        assert_eq!(glass.transmission_filter, Vec3::new(0.8, 0.9, 1.0));
        assert_eq!(glass.shininess, 250.0);
        assert_eq!(glass.optical_density, 1.5);
        assert_eq!(glass.transparency, 0.7);
        assert_eq!(glass.illumination, 6);

        // Unknown directives (map_Kd) are ignored
        let wall = &materials["wall"];
        assert_eq!(wall.diffuse, Vec3::new(0.6, 0.2, 0.2));
        assert_eq!(wall.illumination, 1);
    }

    #[test]
    fn test_mtl_directive_before_newmtl_is_an_error() {
        let content = "Kd 1 0 0\n";
        assert!(matches!(
            parse_mtl(content),
            Err(ParseError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn test_shared_material_identity() {
        let content = "\
mtllib scene.mtl
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
usemtl red
f 1 2 3
f 2 4 3
";
        let mut library = MaterialMap::new();
        library.insert(
            "red".to_string(),
            Arc::new(Material::flat(Vec3::new(1.0, 0.0, 0.0))),
        );
        let primitives = parse_obj(content, |_| Some(library.clone())).unwrap();

        assert_eq!(primitives.len(), 2);
        assert!(Arc::ptr_eq(
            primitives[0].material(),
            primitives[1].material()
        ));
    }
}
