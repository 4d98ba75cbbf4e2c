//! Facet GPU Crate
//!
//! wgpu device setup, a handle-based resource registry, builders for buffers,
//! bind groups and pipelines, and the [`SceneRenderer`] that draws the facet
//! scene.

pub mod builder;
pub mod pipeline;
pub mod resource;
pub mod resource_registry;
pub mod scene_renderer;
pub mod shaders;
pub mod surface;
pub mod types;

pub use builder::{
    BindGroupBuildError, BindGroupBuilder, BindGroupLayoutBuilder, BufferBuildError,
    BufferBuilder, BufferUsage,
};
pub use pipeline::{
    DEPTH_FORMAT, PipelineBuildError, PipelineTargets, VertexStreams, create_scene_pipeline,
};
pub use resource::Handle;
pub use resource_registry::ResourceRegistry;
pub use scene_renderer::{SceneDescriptor, SceneRenderer, SceneRendererError};
pub use surface::SurfaceWrapper;
pub use types::{
    CameraUniforms, LightUniforms, MeshVertex, ModelUniforms, SceneUniforms, Shading,
};
pub use wgpu;

use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Request Adapter Error: {0}")]
    RequestAdapterError(#[from] wgpu::RequestAdapterError),
    #[error("Request Device Error: {0}")]
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
    #[error("Surface Error: {0}")]
    RequestSurfaceError(#[from] wgpu::SurfaceError),
    #[error("Create surface error: {0}")]
    CreateSurfaceError(#[from] wgpu::CreateSurfaceError),
    #[error("Surface is not supported by the adapter")]
    UnsupportedSurface,
}

/// Owns the wgpu instance, adapter, device and queue.
pub struct Renderer {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Renderer {
    pub async fn new() -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                ..Default::default()
            })
            .await?;
        info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Renderer"),
                ..Default::default()
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Configure `surface` for this device, preferring an sRGB format.
    pub fn create_surface(
        &self,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<SurfaceWrapper, RendererError> {
        let mut config = surface
            .get_default_config(&self.adapter, width.max(1), height.max(1))
            .ok_or(RendererError::UnsupportedSurface)?;

        let capabilities = surface.get_capabilities(&self.adapter);
        if let Some(format) = capabilities.formats.iter().copied().find(|f| f.is_srgb()) {
            config.format = format;
        }
        config.present_mode = wgpu::PresentMode::AutoVsync;

        surface.configure(&self.device, &config);
        info!(
            "Surface configured: {}x{} {:?}",
            config.width, config.height, config.format
        );
        Ok(SurfaceWrapper::new(surface, config))
    }
}

/// A headless device for tests, or `None` when the machine has no adapter.
#[cfg(test)]
pub(crate) fn test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    use pollster::FutureExt;

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .block_on()
        .ok()?;
    adapter
        .request_device(&wgpu::DeviceDescriptor::default())
        .block_on()
        .ok()
}
