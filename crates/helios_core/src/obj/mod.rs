//! Wavefront OBJ/MTL scene loading.
//!
//! The parser is line-oriented and intentionally small: it honours the
//! directives the renderer consumes (`v`, `f`, `usemtl`, `mtllib`; `newmtl`,
//! `Kd`, `Ka`, `Ks`, `Tf`, `Ns`, `Ni`, `d`/`Tr`, `illum`) and ignores the
//! rest. Vertex normals are always recomputed from the geometry, so `vn`
//! data is skipped.

mod parser;

pub use parser::{parse_mtl, parse_obj, MaterialMap, ParseError};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::primitive::Primitive;

/// Errors that can occur while loading a scene from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load an OBJ file and return the triangles it describes.
///
/// `mtllib` references are resolved relative to the OBJ file's directory. A
/// missing material library is logged and skipped (faces fall back to the
/// default material); a malformed one is an error.
pub fn load_obj<P: AsRef<Path>>(path: P) -> LoadResult<Vec<Primitive>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut library_error = None;
    let primitives = parse_obj(&content, |name| {
        let mtl_path = dir.join(name);
        match fs::read_to_string(&mtl_path) {
            Ok(mtl) => match parse_mtl(&mtl) {
                Ok(materials) => Some(materials),
                Err(source) => {
                    library_error = Some(LoadError::Parse {
                        path: mtl_path,
                        source,
                    });
                    None
                }
            },
            Err(error) => {
                log::warn!(
                    "material library {} not found, using defaults: {}",
                    mtl_path.display(),
                    error
                );
                None
            }
        }
    })
    .map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(error) = library_error {
        return Err(error);
    }

    log::debug!(
        "loaded {} primitives from {}",
        primitives.len(),
        path.display()
    );
    Ok(primitives)
}

/// Load a material library from disk.
pub fn load_materials<P: AsRef<Path>>(path: P) -> LoadResult<MaterialMap> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mtl(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
