//! Wavefront OBJ loading.
//!
//! Parsing is delegated to `tobj`. Every model in the file is flattened into
//! one non-indexed triangle soup.

use crate::mesh::{Mesh, face_normal};
use glam::Vec3;
use std::path::Path;
use tracing::{debug, info};

/// Errors raised while loading a mesh resource.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("OBJ parsing error: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("mesh resource {locator} contains no triangles")]
    Empty { locator: String },
    #[error("invalid mesh: {0}")]
    Mesh(#[from] crate::mesh::MeshError),
    #[error("mesh loader stopped before reporting a result")]
    Interrupted,
}

/// Source of triangle meshes, addressed by path.
pub trait MeshLoader: Send + 'static {
    fn load(&self, path: &Path) -> Result<Mesh, LoadError>;
}

/// Loads `.obj` files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjLoader;

impl MeshLoader for ObjLoader {
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    fn load(&self, path: &Path) -> Result<Mesh, LoadError> {
        debug!("Loading OBJ mesh from: {}", path.display());
        let (models, _materials) = tobj::load_obj(path, &load_options())?;
        models_to_mesh(&models, &path.display().to_string())
    }
}

/// Parse an in-memory OBJ document. Material libraries are ignored.
pub fn load_obj_from_buffer(buffer: &[u8]) -> Result<Mesh, LoadError> {
    let (models, _materials) = tobj::load_obj_buf(
        &mut std::io::Cursor::new(buffer),
        &load_options(),
        |_material_path| Err(tobj::LoadError::MaterialParseError),
    )?;
    models_to_mesh(&models, "<buffer>")
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

fn models_to_mesh(models: &[tobj::Model], locator: &str) -> Result<Mesh, LoadError> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();

    for model in models {
        let mesh = &model.mesh;
        let vec3_at = |data: &[f32], idx: u32| {
            let i = idx as usize * 3;
            Vec3::new(data[i], data[i + 1], data[i + 2])
        };

        let has_normals = mesh.normals.len() == mesh.positions.len();
        for face in mesh.indices.chunks_exact(3) {
            let corners = [
                vec3_at(&mesh.positions, face[0]),
                vec3_at(&mesh.positions, face[1]),
                vec3_at(&mesh.positions, face[2]),
            ];
            positions.extend_from_slice(&corners);

            if has_normals {
                normals.extend(face.iter().map(|&idx| vec3_at(&mesh.normals, idx)));
            } else {
                let n = face_normal(corners[0], corners[1], corners[2]);
                normals.extend_from_slice(&[n, n, n]);
            }
        }

        debug!(
            "Model '{}': {} faces (file normals: {})",
            model.name,
            mesh.indices.len() / 3,
            has_normals
        );
    }

    if positions.is_empty() {
        return Err(LoadError::Empty {
            locator: locator.to_string(),
        });
    }

    let mesh = Mesh::with_normals(positions, normals)?;
    info!(
        "Loaded {} faces from {} model(s) in {}",
        mesh.face_count(),
        models.len(),
        locator
    );
    Ok(mesh)
}
