//! [`SceneBackend`] over a wgpu surface.

use facet_data::{Mesh, MeshAttributes, Rgb};
use facet_gpu::{
    CameraUniforms, LightUniforms, ModelUniforms, Renderer, SceneDescriptor, SceneRenderer,
    SceneRendererError, SceneUniforms, Shading, SurfaceWrapper, wgpu,
};
use facet_scene::{FrameView, SceneBackend, SceneConfig};
use glam::{Mat4, Vec3};
use std::sync::Arc;
use tracing::{debug, warn};
use winit::window::Window;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    Scene(#[from] SceneRendererError),
}

fn linear(hex: u32) -> [f32; 3] {
    Rgb::from_hex(hex).to_linear().to_array()
}

/// Translate the scene configuration into a renderer description.
pub(crate) fn scene_descriptor<'a>(
    mesh: &'a Mesh,
    attributes: &'a MeshAttributes,
    config: &SceneConfig,
    color_format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> SceneDescriptor<'a> {
    let render = &config.render;
    let lights = &config.lights;
    let scale = Mat4::from_scale(Vec3::splat(config.mesh.scale));

    SceneDescriptor {
        mesh,
        colors: &attributes.colors,
        displacement: &attributes.displacement,
        color_format,
        width,
        height,
        sample_count: render.msaa_samples,
        clear_color: linear(render.clear_color),
        outer: ModelUniforms::new(scale, [1.0; 3], Shading::Unlit, 0.0),
        inner: ModelUniforms::new(
            Mat4::from_translation(Vec3::new(0.0, 0.0, config.mesh.inner_offset_z)) * scale,
            linear(render.inner_color),
            Shading::Phong,
            render.shininess,
        ),
        background: ModelUniforms::new(
            Mat4::from_translation(Vec3::new(0.0, 0.0, render.background_z)),
            linear(render.background_color),
            Shading::Unlit,
            0.0,
        ),
        background_size: render.background_size,
        lights: LightUniforms::new(
            (linear(lights.directional_color), lights.directional_intensity),
            Vec3::from(lights.directional_position),
            linear(lights.hemisphere_sky),
            linear(lights.hemisphere_ground),
            lights.hemisphere_intensity,
        ),
    }
}

pub struct WgpuBackend {
    window: Arc<Window>,
    renderer: Renderer,
    surface: SurfaceWrapper,
    scene: SceneRenderer,
    displacement_scale: f32,
    pixel_ratio: f64,
}

impl WgpuBackend {
    pub fn new(
        window: Arc<Window>,
        renderer: Renderer,
        surface: SurfaceWrapper,
        mesh: &Mesh,
        attributes: &MeshAttributes,
        config: &SceneConfig,
    ) -> Result<Self, SceneRendererError> {
        let desc = scene_descriptor(
            mesh,
            attributes,
            config,
            surface.format(),
            surface.width(),
            surface.height(),
        );
        let scene = SceneRenderer::new(renderer.device(), &desc)?;
        let pixel_ratio = window.scale_factor();
        Ok(Self {
            window,
            renderer,
            surface,
            scene,
            displacement_scale: config.render.displacement_scale,
            pixel_ratio,
        })
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }
}

impl SceneBackend for WgpuBackend {
    type Error = BackendError;

    fn resize(&mut self, width: u32, height: u32) {
        let device = self.renderer.device();
        self.surface.resize(device, width, height);
        self.scene.resize(device, width, height);
    }

    // winit reports physical sizes, so the ratio only matters for logging.
    fn set_pixel_ratio(&mut self, ratio: f64) {
        debug!("Pixel ratio changed to {ratio}");
        self.pixel_ratio = ratio;
    }

    fn upload_displacement(&mut self, displacement: &[f32]) {
        if let Err(err) = self
            .scene
            .write_displacement(self.renderer.queue(), displacement)
        {
            warn!("Dropped displacement upload: {err}");
        }
    }

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), BackendError> {
        let camera = CameraUniforms::from_matrices(
            frame.camera.view_matrix(),
            frame.projection.matrix(),
            frame.camera.position(),
        );
        let uniforms = SceneUniforms::new(
            frame.uniforms.mouse_position,
            frame.uniforms.light_position,
            self.displacement_scale,
        );
        self.scene
            .write_frame(self.renderer.queue(), &camera, &uniforms)?;

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(self.renderer.device());
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.renderer
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });
        self.scene.render(&mut encoder, &surface_view)?;

        self.renderer.queue().submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();
        Ok(())
    }

    fn is_fatal(&self, error: &BackendError) -> bool {
        matches!(
            error,
            BackendError::Surface(wgpu::SurfaceError::OutOfMemory) | BackendError::Scene(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_data::{AttributeBuilder, ColorScheme};

    fn fixture() -> (Mesh, MeshAttributes) {
        let mesh = Mesh::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]).unwrap();
        let mut rng = SceneConfig::default().attribute_rng();
        let attributes = AttributeBuilder::new(ColorScheme::default()).build(&mesh, &mut rng);
        (mesh, attributes)
    }

    #[test]
    fn test_descriptor_follows_config() {
        let (mesh, attributes) = fixture();
        let config = SceneConfig::default();
        let desc = scene_descriptor(
            &mesh,
            &attributes,
            &config,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            800,
            600,
        );

        assert_eq!(desc.sample_count, 4);
        assert_eq!((desc.width, desc.height), (800, 600));
        assert_eq!(desc.displacement.len(), 9);
        assert_eq!(desc.clear_color, Rgb::from_hex(0x683afe).to_linear().to_array());
        assert_eq!(desc.background_size, 10.0);
        assert_eq!(desc.inner.shading(), Shading::Phong);
        assert_eq!(desc.outer.shading(), Shading::Unlit);

        let inner = Mat4::from_cols_array_2d(&desc.inner.model);
        let p = inner.transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert!((p - Vec3::new(2.0, 2.0, 1.9)).length() < 1e-6);

        let background = Mat4::from_cols_array_2d(&desc.background.model);
        assert_eq!(background.transform_point3(Vec3::ZERO), Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(desc.background.base_color, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_light_intensities() {
        let (mesh, attributes) = fixture();
        let desc = scene_descriptor(
            &mesh,
            &attributes,
            &SceneConfig::default(),
            wgpu::TextureFormat::Rgba8UnormSrgb,
            1,
            1,
        );
        for c in &desc.lights.directional_color[..3] {
            assert!((c - 100.0).abs() < 1e-3);
        }
        for c in &desc.lights.sky_color[..3] {
            assert!((c - 2.0).abs() < 1e-4);
        }
    }
}
