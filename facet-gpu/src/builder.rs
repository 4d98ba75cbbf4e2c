//! High-level builder APIs for creating GPU resources
//!
//! These builders provide a simpler, more ergonomic API compared to
//! directly using wgpu descriptors.

use crate::resource::Handle;
use crate::resource_registry::ResourceRegistry;

/// Buffer usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex buffer written once at creation
    Vertex,
    /// Vertex buffer rewritten from the CPU while rendering
    DynamicVertex,
    /// Uniform buffer
    Uniform,
}

impl BufferUsage {
    fn to_wgpu(self) -> wgpu::BufferUsages {
        match self {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::DynamicVertex => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        }
    }
}

/// Builder for creating GPU buffers
pub struct BufferBuilder<'a> {
    device: &'a wgpu::Device,
    label: Option<String>,
    data: Option<&'a [u8]>,
    usage: BufferUsage,
}

impl<'a> BufferBuilder<'a> {
    pub(crate) fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            label: None,
            data: None,
            usage: BufferUsage::Vertex,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set buffer data from a slice of Pod types
    pub fn with_pod_data<T: bytemuck::Pod>(mut self, data: &'a [T]) -> Self {
        self.data = Some(bytemuck::cast_slice(data));
        self
    }

    pub fn usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Build the buffer and register it in the registry
    pub fn build(
        self,
        registry: &mut ResourceRegistry,
    ) -> Result<Handle<wgpu::Buffer>, BufferBuildError> {
        use wgpu::util::DeviceExt;

        let data = self.data.ok_or(BufferBuildError::MissingData)?;
        if data.is_empty() {
            return Err(BufferBuildError::Empty);
        }
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: self.label.as_deref(),
                contents: data,
                usage: self.usage.to_wgpu(),
            });

        Ok(registry.insert(buffer))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BufferBuildError {
    #[error("Buffer has no initial data")]
    MissingData,
    #[error("Buffer would be empty")]
    Empty,
}

/// Builder for a layout of uniform buffer bindings.
pub struct BindGroupLayoutBuilder<'a> {
    device: &'a wgpu::Device,
    label: Option<String>,
    entries: Vec<wgpu::BindGroupLayoutEntry>,
}

impl<'a> BindGroupLayoutBuilder<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            label: None,
            entries: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a uniform buffer visible to `visibility` at the next binding slot.
    pub fn uniform(mut self, visibility: wgpu::ShaderStages) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding: self.entries.len() as u32,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    pub fn build(self) -> Result<wgpu::BindGroupLayout, BindGroupBuildError> {
        if self.entries.is_empty() {
            return Err(BindGroupBuildError::NoEntries);
        }
        Ok(self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: self.label.as_deref(),
                entries: &self.entries,
            }))
    }
}

/// Builder binding registered buffers to a layout, one per slot in order.
pub struct BindGroupBuilder<'a> {
    device: &'a wgpu::Device,
    registry: &'a ResourceRegistry,
    layout: &'a wgpu::BindGroupLayout,
    label: Option<String>,
    buffers: Vec<Handle<wgpu::Buffer>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        registry: &'a ResourceRegistry,
        layout: &'a wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            device,
            registry,
            layout,
            label: None,
            buffers: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn buffer(mut self, buffer: Handle<wgpu::Buffer>) -> Self {
        self.buffers.push(buffer);
        self
    }

    /// Create the bind group. The caller registers it, since the registry is
    /// borrowed here for lookups.
    pub fn build(self) -> Result<wgpu::BindGroup, BindGroupBuildError> {
        if self.buffers.is_empty() {
            return Err(BindGroupBuildError::NoEntries);
        }

        let entries = self
            .buffers
            .iter()
            .enumerate()
            .map(|(binding, handle)| {
                let buffer = self
                    .registry
                    .get(*handle)
                    .ok_or(BindGroupBuildError::ResourceNotFound)?;
                Ok(wgpu::BindGroupEntry {
                    binding: binding as u32,
                    resource: buffer.as_entire_binding(),
                })
            })
            .collect::<Result<Vec<_>, BindGroupBuildError>>()?;

        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: self.label.as_deref(),
            layout: self.layout,
            entries: &entries,
        }))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BindGroupBuildError {
    #[error("Resource not found in registry")]
    ResourceNotFound,
    #[error("No bindings added to bind group")]
    NoEntries,
}
