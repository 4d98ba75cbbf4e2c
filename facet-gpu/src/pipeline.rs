//! Render pipelines of the facet scene.
//!
//! Every scene pipeline shares one primitive, depth and blend setup and
//! differs only in its shader and vertex streams.

use crate::resource::Handle;
use crate::resource_registry::ResourceRegistry;
use crate::types::{MeshVertex, displacement_layout};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex buffers bound by a pipeline, in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexStreams {
    /// Slot 0: [`MeshVertex`].
    Mesh,
    /// Slot 0: [`MeshVertex`], slot 1: per-vertex displacement.
    Displaced,
}

/// Attachments the pipeline renders into.
#[derive(Debug, Clone, Copy)]
pub struct PipelineTargets {
    pub color_format: wgpu::TextureFormat,
    pub sample_count: u32,
}

/// MSAA sample counts every wgpu backend supports for color and depth.
pub fn check_sample_count(count: u32) -> Result<u32, PipelineBuildError> {
    match count {
        1 | 4 => Ok(count),
        other => Err(PipelineBuildError::UnsupportedSampleCount(other)),
    }
}

/// Build a double-sided, depth-tested pipeline from a registered shader
/// exporting `vs_main` and `fs_main`.
pub fn create_scene_pipeline(
    device: &wgpu::Device,
    registry: &mut ResourceRegistry,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: Handle<wgpu::ShaderModule>,
    streams: VertexStreams,
    targets: PipelineTargets,
) -> Result<Handle<wgpu::RenderPipeline>, PipelineBuildError> {
    let sample_count = check_sample_count(targets.sample_count)?;
    let module = registry
        .get(shader)
        .ok_or(PipelineBuildError::ShaderNotFound)?;

    let mesh = [MeshVertex::layout()];
    let displaced = [MeshVertex::layout(), displacement_layout()];
    let buffers: &[wgpu::VertexBufferLayout<'static>] = match streams {
        VertexStreams::Mesh => &mesh,
        VertexStreams::Displaced => &displaced,
    };

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers,
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: targets.color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
        cache: None,
    });

    Ok(registry.insert(pipeline))
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineBuildError {
    #[error("Shader module not found in registry")]
    ShaderNotFound,
    #[error("Unsupported MSAA sample count {0}, expected 1 or 4")]
    UnsupportedSampleCount(u32),
}
