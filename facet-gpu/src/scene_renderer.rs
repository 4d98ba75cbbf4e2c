//! Draws the facet scene: the displaced outer mesh, the Phong inner mesh and
//! the unlit background plane.

use crate::builder::{
    BindGroupBuildError, BindGroupBuilder, BindGroupLayoutBuilder, BufferBuildError,
    BufferBuilder, BufferUsage,
};
use crate::pipeline::{
    DEPTH_FORMAT, PipelineBuildError, PipelineTargets, VertexStreams, create_scene_pipeline,
};
use crate::resource::Handle;
use crate::resource_registry::ResourceRegistry;
use crate::shaders;
use crate::types::{CameraUniforms, LightUniforms, MeshVertex, ModelUniforms, SceneUniforms};
use bytemuck::Zeroable;
use facet_data::Mesh;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SceneRendererError {
    #[error("mesh has no faces")]
    EmptyMesh,
    #[error("displacement stream has {actual} floats, expected {expected}")]
    DisplacementLength { expected: usize, actual: usize },
    #[error("{0} missing from the resource registry")]
    MissingResource(&'static str),
    #[error(transparent)]
    Buffer(#[from] BufferBuildError),
    #[error(transparent)]
    BindGroup(#[from] BindGroupBuildError),
    #[error(transparent)]
    Pipeline(#[from] PipelineBuildError),
}

/// Everything needed to build a [`SceneRenderer`].
pub struct SceneDescriptor<'a> {
    pub mesh: &'a Mesh,
    /// Three floats per vertex, linear RGB.
    pub colors: &'a [f32],
    /// Three floats per vertex.
    pub displacement: &'a [f32],
    pub color_format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    /// Linear RGB.
    pub clear_color: [f32; 3],
    pub outer: ModelUniforms,
    pub inner: ModelUniforms,
    pub background: ModelUniforms,
    pub background_size: f32,
    pub lights: LightUniforms,
}

struct RenderTargets {
    _msaa_texture: Option<wgpu::Texture>,
    msaa_view: Option<wgpu::TextureView>,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl RenderTargets {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Self {
        let create = |label, format, usage| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            })
        };

        let msaa_texture = (sample_count > 1).then(|| {
            create(
                "MSAA Color Texture",
                format,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
        });
        let msaa_view = msaa_texture
            .as_ref()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()));
        let depth_texture = create(
            "Depth Texture",
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _msaa_texture: msaa_texture,
            msaa_view,
            _depth_texture: depth_texture,
            depth_view,
        }
    }
}

pub struct SceneRenderer {
    registry: ResourceRegistry,
    vertex_count: u32,
    sample_count: u32,
    color_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
    size: (u32, u32),
    targets: RenderTargets,
    mesh_vertices: Handle<wgpu::Buffer>,
    displacement: Handle<wgpu::Buffer>,
    background_vertices: Handle<wgpu::Buffer>,
    camera_buffer: Handle<wgpu::Buffer>,
    scene_buffer: Handle<wgpu::Buffer>,
    frame_bind_group: Handle<wgpu::BindGroup>,
    outer_bind_group: Handle<wgpu::BindGroup>,
    inner_bind_group: Handle<wgpu::BindGroup>,
    background_bind_group: Handle<wgpu::BindGroup>,
    displaced_pipeline: Handle<wgpu::RenderPipeline>,
    lit_pipeline: Handle<wgpu::RenderPipeline>,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        desc: &SceneDescriptor<'_>,
    ) -> Result<Self, SceneRendererError> {
        if desc.mesh.is_empty() {
            return Err(SceneRendererError::EmptyMesh);
        }
        let expected = desc.mesh.vertex_count() * 3;
        if desc.displacement.len() != expected {
            return Err(SceneRendererError::DisplacementLength {
                expected,
                actual: desc.displacement.len(),
            });
        }

        let mut registry = ResourceRegistry::new();

        let vertices = MeshVertex::from_mesh(desc.mesh, desc.colors);
        let mesh_vertices = BufferBuilder::new(device)
            .label("Mesh Vertex Buffer")
            .with_pod_data(&vertices)
            .usage(BufferUsage::Vertex)
            .build(&mut registry)?;
        let displacement = BufferBuilder::new(device)
            .label("Displacement Buffer")
            .with_pod_data(desc.displacement)
            .usage(BufferUsage::DynamicVertex)
            .build(&mut registry)?;
        let plane = MeshVertex::plane(desc.background_size, [0.0; 3]);
        let background_vertices = BufferBuilder::new(device)
            .label("Background Vertex Buffer")
            .with_pod_data(&plane)
            .usage(BufferUsage::Vertex)
            .build(&mut registry)?;

        let camera_buffer = uniform_buffer(
            device,
            &mut registry,
            "Camera Buffer",
            &[CameraUniforms::zeroed()],
        )?;
        let scene_buffer = uniform_buffer(
            device,
            &mut registry,
            "Scene Buffer",
            &[SceneUniforms::zeroed()],
        )?;
        let light_buffer =
            uniform_buffer(device, &mut registry, "Light Buffer", &[desc.lights])?;

        let frame_layout = BindGroupLayoutBuilder::new(device)
            .label("Frame Bind Group Layout")
            .uniform(wgpu::ShaderStages::VERTEX_FRAGMENT)
            .uniform(wgpu::ShaderStages::VERTEX_FRAGMENT)
            .uniform(wgpu::ShaderStages::FRAGMENT)
            .build()?;
        let model_layout = BindGroupLayoutBuilder::new(device)
            .label("Model Bind Group Layout")
            .uniform(wgpu::ShaderStages::VERTEX_FRAGMENT)
            .build()?;

        let frame_bind_group = BindGroupBuilder::new(device, &registry, &frame_layout)
            .label("Frame Bind Group")
            .buffer(camera_buffer)
            .buffer(scene_buffer)
            .buffer(light_buffer)
            .build()?;
        let frame_bind_group = registry.insert(frame_bind_group);

        let mut model_bind_group = |label: &'static str,
                                    model: ModelUniforms|
         -> Result<Handle<wgpu::BindGroup>, SceneRendererError> {
            let buffer = uniform_buffer(device, &mut registry, label, &[model])?;
            let bind_group = BindGroupBuilder::new(device, &registry, &model_layout)
                .label(label)
                .buffer(buffer)
                .build()?;
            Ok(registry.insert(bind_group))
        };
        let outer_bind_group = model_bind_group("Outer Model", desc.outer)?;
        let inner_bind_group = model_bind_group("Inner Model", desc.inner)?;
        let background_bind_group = model_bind_group("Background Model", desc.background)?;

        let displaced_shader = registry.insert(device.create_shader_module(
            wgpu::ShaderModuleDescriptor {
                label: Some("displaced_shader"),
                source: wgpu::ShaderSource::Wgsl(shaders::DISPLACED.into()),
            },
        ));
        let lit_shader = registry.insert(device.create_shader_module(
            wgpu::ShaderModuleDescriptor {
                label: Some("lit_shader"),
                source: wgpu::ShaderSource::Wgsl(shaders::LIT.into()),
            },
        ));

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &model_layout],
            push_constant_ranges: &[],
        });
        let targets = PipelineTargets {
            color_format: desc.color_format,
            sample_count: desc.sample_count,
        };
        let displaced_pipeline = create_scene_pipeline(
            device,
            &mut registry,
            "Displaced Pipeline",
            &layout,
            displaced_shader,
            VertexStreams::Displaced,
            targets,
        )?;
        let lit_pipeline = create_scene_pipeline(
            device,
            &mut registry,
            "Lit Pipeline",
            &layout,
            lit_shader,
            VertexStreams::Mesh,
            targets,
        )?;

        let (width, height) = (desc.width.max(1), desc.height.max(1));
        let targets = RenderTargets::new(
            device,
            desc.color_format,
            width,
            height,
            desc.sample_count,
        );

        let [r, g, b] = desc.clear_color;
        info!(
            "Scene renderer ready: {} vertices, {}x MSAA, {} GPU resources",
            vertices.len(),
            desc.sample_count,
            registry.len()
        );

        Ok(Self {
            registry,
            vertex_count: vertices.len() as u32,
            sample_count: desc.sample_count,
            color_format: desc.color_format,
            clear_color: wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: 1.0,
            },
            size: (width, height),
            targets,
            mesh_vertices,
            displacement,
            background_vertices,
            camera_buffer,
            scene_buffer,
            frame_bind_group,
            outer_bind_group,
            inner_bind_group,
            background_bind_group,
            displaced_pipeline,
            lit_pipeline,
        })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    fn resource<T: 'static>(
        &self,
        handle: Handle<T>,
        name: &'static str,
    ) -> Result<&T, SceneRendererError> {
        self.registry
            .get(handle)
            .ok_or(SceneRendererError::MissingResource(name))
    }

    /// Re-upload the whole displacement stream.
    pub fn write_displacement(
        &self,
        queue: &wgpu::Queue,
        displacement: &[f32],
    ) -> Result<(), SceneRendererError> {
        let expected = self.vertex_count as usize * 3;
        if displacement.len() != expected {
            return Err(SceneRendererError::DisplacementLength {
                expected,
                actual: displacement.len(),
            });
        }
        let buffer = self.resource(self.displacement, "displacement buffer")?;
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(displacement));
        Ok(())
    }

    pub fn write_frame(
        &self,
        queue: &wgpu::Queue,
        camera: &CameraUniforms,
        scene: &SceneUniforms,
    ) -> Result<(), SceneRendererError> {
        let camera_buffer = self.resource(self.camera_buffer, "camera buffer")?;
        queue.write_buffer(camera_buffer, 0, bytemuck::bytes_of(camera));
        let scene_buffer = self.resource(self.scene_buffer, "scene buffer")?;
        queue.write_buffer(scene_buffer, 0, bytemuck::bytes_of(scene));
        Ok(())
    }

    /// Recreate the render targets. Zero-sized dimensions are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size {
            return;
        }
        debug!("Resizing scene targets to {}x{}", width, height);
        self.targets = RenderTargets::new(
            device,
            self.color_format,
            width,
            height,
            self.sample_count,
        );
        self.size = (width, height);
    }

    /// Record the scene pass into `encoder`, resolving into `target`.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) -> Result<(), SceneRendererError> {
        let frame_bind_group = self.resource(self.frame_bind_group, "frame bind group")?;
        let outer = self.resource(self.outer_bind_group, "outer bind group")?;
        let inner = self.resource(self.inner_bind_group, "inner bind group")?;
        let background = self.resource(self.background_bind_group, "background bind group")?;
        let displaced_pipeline = self.resource(self.displaced_pipeline, "displaced pipeline")?;
        let lit_pipeline = self.resource(self.lit_pipeline, "lit pipeline")?;
        let mesh_vertices = self.resource(self.mesh_vertices, "mesh vertex buffer")?;
        let displacement = self.resource(self.displacement, "displacement buffer")?;
        let background_vertices =
            self.resource(self.background_vertices, "background vertex buffer")?;

        let (view, resolve_target, store) = match &self.targets.msaa_view {
            Some(msaa) => (msaa, Some(target), wgpu::StoreOp::Discard),
            None => (target, None, wgpu::StoreOp::Store),
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(0, frame_bind_group, &[]);

        render_pass.set_pipeline(lit_pipeline);
        render_pass.set_bind_group(1, background, &[]);
        render_pass.set_vertex_buffer(0, background_vertices.slice(..));
        render_pass.draw(0..6, 0..1);

        render_pass.set_bind_group(1, inner, &[]);
        render_pass.set_vertex_buffer(0, mesh_vertices.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);

        render_pass.set_pipeline(displaced_pipeline);
        render_pass.set_bind_group(1, outer, &[]);
        render_pass.set_vertex_buffer(1, displacement.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);

        Ok(())
    }
}

fn uniform_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    registry: &mut ResourceRegistry,
    label: &str,
    contents: &[T],
) -> Result<Handle<wgpu::Buffer>, BufferBuildError> {
    BufferBuilder::new(device)
        .label(label)
        .with_pod_data(contents)
        .usage(BufferUsage::Uniform)
        .build(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_device;
    use crate::types::Shading;
    use glam::{Mat4, Vec2, Vec3};

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    fn quad_mesh() -> Mesh {
        Mesh::from_positions(vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ])
        .unwrap()
    }

    fn descriptor<'a>(
        mesh: &'a Mesh,
        colors: &'a [f32],
        displacement: &'a [f32],
    ) -> SceneDescriptor<'a> {
        SceneDescriptor {
            mesh,
            colors,
            displacement,
            color_format: FORMAT,
            width: 64,
            height: 48,
            sample_count: 4,
            clear_color: [0.1, 0.05, 1.0],
            outer: ModelUniforms::new(
                Mat4::from_scale(Vec3::splat(2.0)),
                [1.0; 3],
                Shading::Unlit,
                0.0,
            ),
            inner: ModelUniforms::new(Mat4::IDENTITY, [0.0, 0.0, 0.2], Shading::Phong, 30.0),
            background: ModelUniforms::new(
                Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
                [0.0; 3],
                Shading::Unlit,
                0.0,
            ),
            background_size: 10.0,
            lights: LightUniforms::new(
                ([1.0; 3], 100.0),
                Vec3::new(0.0, 10.0, 10.0),
                [1.0; 3],
                [0.25; 3],
                2.0,
            ),
        }
    }

    fn target(device: &wgpu::Device) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("test target"),
                size: wgpu::Extent3d {
                    width: 64,
                    height: 48,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    #[test]
    fn test_rejects_mismatched_displacement() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let mesh = quad_mesh();
        let colors = vec![1.0; 18];
        let displacement = vec![0.0; 9];
        let result = SceneRenderer::new(&device, &descriptor(&mesh, &colors, &displacement));
        assert!(matches!(
            result,
            Err(SceneRendererError::DisplacementLength {
                expected: 18,
                actual: 9
            })
        ));
    }

    #[test]
    fn test_render_frame() {
        let Some((device, queue)) = test_device() else {
            return;
        };
        let mesh = quad_mesh();
        let colors = vec![1.0; 18];
        let displacement = vec![0.5; 18];
        let renderer =
            SceneRenderer::new(&device, &descriptor(&mesh, &colors, &displacement)).unwrap();
        assert_eq!(renderer.vertex_count(), 6);
        assert_eq!(renderer.size(), (64, 48));

        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(75f32.to_radians(), 64.0 / 48.0, 0.1, 1000.0);
        renderer
            .write_frame(
                &queue,
                &CameraUniforms::from_matrices(view, proj, Vec3::new(0.0, 0.0, 5.0)),
                &SceneUniforms::new(Vec2::ZERO, Vec3::new(1.0, 1.0, 5.0), 0.02),
            )
            .unwrap();
        renderer.write_displacement(&queue, &[1.0; 18]).unwrap();
        assert!(renderer.write_displacement(&queue, &[1.0; 3]).is_err());

        let target = target(&device);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test encoder"),
        });
        renderer.render(&mut encoder, &target).unwrap();
        queue.submit(Some(encoder.finish()));
    }

    #[test]
    fn test_resize_ignores_zero() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let mesh = quad_mesh();
        let colors = vec![1.0; 18];
        let displacement = vec![0.0; 18];
        let mut renderer =
            SceneRenderer::new(&device, &descriptor(&mesh, &colors, &displacement)).unwrap();
        renderer.resize(&device, 0, 100);
        assert_eq!(renderer.size(), (64, 48));
        renderer.resize(&device, 128, 96);
        assert_eq!(renderer.size(), (128, 96));
    }
}
