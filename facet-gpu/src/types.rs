//! Host-side layouts of the vertex streams and uniform blocks.
//!
//! Every uniform struct mirrors a WGSL struct in `shaders/` and is padded to
//! WGSL alignment rules by hand.

use facet_data::Mesh;
use glam::{Mat4, Vec2, Vec3};

/// One vertex of the static geometry stream.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleave a mesh with its per-vertex color stream.
    ///
    /// `colors` holds three floats per vertex; missing entries become black.
    pub fn from_mesh(mesh: &Mesh, colors: &[f32]) -> Vec<MeshVertex> {
        mesh.positions()
            .iter()
            .zip(mesh.normals())
            .enumerate()
            .map(|(i, (position, normal))| {
                let color = colors
                    .get(3 * i..3 * i + 3)
                    .map_or([0.0; 3], |c| [c[0], c[1], c[2]]);
                MeshVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    color,
                }
            })
            .collect()
    }

    /// A `size` x `size` quad in the XY plane facing +Z, as two faces.
    pub fn plane(size: f32, color: [f32; 3]) -> Vec<MeshVertex> {
        let h = size * 0.5;
        let corners = [[-h, -h], [h, -h], [h, h], [-h, -h], [h, h], [-h, h]];
        corners
            .iter()
            .map(|[x, y]| MeshVertex {
                position: [*x, *y, 0.0],
                normal: [0.0, 0.0, 1.0],
                color,
            })
            .collect()
    }
}

/// Stride of the displacement stream: one vec3 per vertex.
pub const DISPLACEMENT_STRIDE: wgpu::BufferAddress = (3 * std::mem::size_of::<f32>()) as u64;

pub fn displacement_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: DISPLACEMENT_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// Shared camera uniform layout between host and shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_matrix: [[f32; 4]; 4],
    pub proj_matrix: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniforms {
    pub fn from_matrices(view: Mat4, proj: Mat4, eye: Vec3) -> Self {
        Self {
            view_matrix: view.to_cols_array_2d(),
            proj_matrix: proj.to_cols_array_2d(),
            view_pos: eye.to_array(),
            _padding: 0.0,
        }
    }
}

/// Per-frame inputs of the displacement shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub mouse_position: [f32; 2],
    pub displacement_scale: f32,
    pub _padding0: f32,
    pub light_position: [f32; 3],
    pub _padding1: f32,
}

impl SceneUniforms {
    pub fn new(mouse_position: Vec2, light_position: Vec3, displacement_scale: f32) -> Self {
        Self {
            mouse_position: mouse_position.to_array(),
            displacement_scale,
            _padding0: 0.0,
            light_position: light_position.to_array(),
            _padding1: 0.0,
        }
    }
}

/// Directional and hemisphere light, colors premultiplied by intensity.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniforms {
    pub directional_color: [f32; 4],
    /// Direction towards the light, normalized; `w` unused.
    pub directional_direction: [f32; 4],
    pub sky_color: [f32; 4],
    pub ground_color: [f32; 4],
}

impl LightUniforms {
    pub fn new(
        directional: ([f32; 3], f32),
        directional_position: Vec3,
        sky: [f32; 3],
        ground: [f32; 3],
        hemisphere_intensity: f32,
    ) -> Self {
        let scaled = |c: [f32; 3], k: f32| [c[0] * k, c[1] * k, c[2] * k, 0.0];
        let direction = directional_position.normalize_or_zero();
        Self {
            directional_color: scaled(directional.0, directional.1),
            directional_direction: direction.extend(0.0).to_array(),
            sky_color: scaled(sky, hemisphere_intensity),
            ground_color: scaled(ground, hemisphere_intensity),
        }
    }
}

/// Shading model selected by [`ModelUniforms::shading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Flat base color.
    Unlit,
    /// Lambert diffuse plus Blinn-Phong specular.
    Phong,
}

/// Per-object transform and material.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// `x` shininess, `y` 1.0 for Phong shading and 0.0 for unlit.
    pub material: [f32; 4],
}

impl ModelUniforms {
    pub fn new(model: Mat4, base_color: [f32; 3], shading: Shading, shininess: f32) -> Self {
        let lit = match shading {
            Shading::Unlit => 0.0,
            Shading::Phong => 1.0,
        };
        Self {
            model: model.to_cols_array_2d(),
            base_color: [base_color[0], base_color[1], base_color[2], 1.0],
            material: [shininess, lit, 0.0, 0.0],
        }
    }

    pub fn shading(&self) -> Shading {
        if self.material[1] > 0.5 {
            Shading::Phong
        } else {
            Shading::Unlit
        }
    }
}
