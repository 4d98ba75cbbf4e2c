use wgpu::{Surface, SurfaceConfiguration, SurfaceTexture, TextureFormat};

/// Wrapper around wgpu::Surface with configuration management
pub struct SurfaceWrapper {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
}

impl SurfaceWrapper {
    pub fn new(surface: Surface<'static>, config: SurfaceConfiguration) -> Self {
        Self { surface, config }
    }

    pub fn config(&self) -> &SurfaceConfiguration {
        &self.config
    }

    pub fn format(&self) -> TextureFormat {
        self.config.format
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Reconfigure at a new size. Zero-sized dimensions are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.configure(device);
    }

    /// Apply the current configuration again, e.g. after the surface was lost.
    pub fn configure(&self, device: &wgpu::Device) {
        self.surface.configure(device, &self.config);
    }

    pub fn get_current_texture(&self) -> Result<SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }
}
