//! Non-indexed triangle meshes.
//!
//! Every three consecutive vertices form one independent face. There is no
//! vertex sharing between faces, so per-face attributes can be written
//! straight into per-vertex streams.

use glam::Vec3;

/// Validation failures when assembling a [`Mesh`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("position buffer has {len} floats, which is not a whole number of vec3s")]
    NotVec3 { len: usize },
    #[error("mesh has {vertex_count} vertices, which is not a multiple of 3 (incomplete last face)")]
    PartialFace { vertex_count: usize },
    #[error("mesh has {positions} positions but {normals} normals")]
    NormalCountMismatch { positions: usize, normals: usize },
}

/// A triangle soup with one normal per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl Mesh {
    /// Build a mesh from vertex positions, deriving flat face normals.
    pub fn from_positions(positions: Vec<Vec3>) -> Result<Self, MeshError> {
        check_whole_faces(positions.len())?;
        let normals = flat_normals(&positions);
        Ok(Self { positions, normals })
    }

    /// Build a mesh from positions and matching per-vertex normals.
    pub fn with_normals(positions: Vec<Vec3>, normals: Vec<Vec3>) -> Result<Self, MeshError> {
        check_whole_faces(positions.len())?;
        if normals.len() != positions.len() {
            return Err(MeshError::NormalCountMismatch {
                positions: positions.len(),
                normals: normals.len(),
            });
        }
        Ok(Self { positions, normals })
    }

    /// Build a mesh from a flat `[x, y, z, x, y, z, ...]` buffer.
    pub fn from_flat_positions(flat: &[f32]) -> Result<Self, MeshError> {
        if flat.len() % 3 != 0 {
            return Err(MeshError::NotVec3 { len: flat.len() });
        }
        let positions = flat.chunks_exact(3).map(Vec3::from_slice).collect();
        Self::from_positions(positions)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate faces as vertex triples.
    pub fn faces(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|face| [face[0], face[1], face[2]])
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
        )
    }

    /// Translate the mesh so its bounding-box midpoint sits at the origin.
    ///
    /// Returns the translation that was applied.
    pub fn center(&mut self) -> Vec3 {
        let Some((min, max)) = self.bounds() else {
            return Vec3::ZERO;
        };
        let offset = -(min + max) * 0.5;
        for p in &mut self.positions {
            *p += offset;
        }
        offset
    }

    /// Consume the mesh and return it centered.
    pub fn centered(mut self) -> Self {
        self.center();
        self
    }

    /// Append the faces of `other` to this mesh.
    pub fn extend(&mut self, other: Mesh) {
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
    }
}

fn check_whole_faces(vertex_count: usize) -> Result<(), MeshError> {
    if vertex_count % 3 != 0 {
        return Err(MeshError::PartialFace { vertex_count });
    }
    Ok(())
}

/// Unit normal of one counter-clockwise face. Degenerate faces get zero.
pub fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0).normalize_or_zero()
}

fn flat_normals(positions: &[Vec3]) -> Vec<Vec3> {
    positions
        .chunks_exact(3)
        .flat_map(|face| {
            let n = face_normal(face[0], face[1], face[2]);
            [n, n, n]
        })
        .collect()
}
