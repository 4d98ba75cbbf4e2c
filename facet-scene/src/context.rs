//! The running scene and its per-frame update.

use crate::animator::{DisplacementAnimator, DisplacementField};
use crate::camera::{Camera, OrbitControls, Projection};
use crate::config::SceneConfig;
use crate::events::SceneEvent;
use crate::pointer::{PointerState, Viewport};
use facet_data::{AttributeBuilder, Mesh, MeshAttributes};
use glam::{Vec2, Vec3};
use rand::Rng;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tracing::{error, info, warn};

/// Values bound to the displacement shader's uniform block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderUniforms {
    pub mouse_position: Vec2,
    pub light_position: Vec3,
}

/// Everything a backend needs to draw one frame.
pub struct FrameView<'a> {
    pub camera: &'a Camera,
    pub projection: &'a Projection,
    pub uniforms: &'a ShaderUniforms,
}

/// Rendering capability consumed by the frame loop.
pub trait SceneBackend {
    type Error: std::error::Error + 'static;

    /// Resize the drawable to `width` x `height` physical pixels.
    fn resize(&mut self, width: u32, height: u32);

    fn set_pixel_ratio(&mut self, ratio: f64);

    /// Re-upload the displacement vertex stream.
    fn upload_displacement(&mut self, displacement: &[f32]);

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), Self::Error>;

    /// Whether `error` should end the frame loop instead of skipping a frame.
    fn is_fatal(&self, _error: &Self::Error) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The mesh is still loading; nothing was drawn.
    Loading,
    Rendered,
    /// The frame failed or panicked and was dropped.
    Skipped,
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum FatalFrameError {
    #[error("fatal backend error: {0}")]
    Backend(String),
}

/// Owns the backend and all per-scene state.
pub struct SceneContext<B: SceneBackend> {
    backend: B,
    camera: Camera,
    projection: Projection,
    controls: OrbitControls,
    pointer: PointerState,
    viewport: Viewport,
    uniforms: ShaderUniforms,
    displacement: DisplacementField,
    animator: DisplacementAnimator,
    running: bool,
    frames_rendered: u64,
}

impl<B: SceneBackend> SceneContext<B> {
    /// Assemble a context around a backend that already holds `displacement`.
    pub fn new(
        backend: B,
        config: &SceneConfig,
        displacement: Vec<f32>,
        viewport: Viewport,
    ) -> Self {
        let camera = Camera::new(
            Vec3::from(config.camera.position),
            Vec3::from(config.camera.target),
        );
        let projection = Projection::new(
            viewport.width,
            viewport.height,
            config.camera.fov_degrees.to_radians(),
            config.camera.near,
            config.camera.far,
        );
        let controls = OrbitControls::new()
            .enabled(config.camera.controls_enabled)
            .damping(config.camera.damping, config.camera.damping_factor);

        let mut animator =
            DisplacementAnimator::new(config.tween(), config.animation.drift, &displacement);
        animator.start();

        Self {
            backend,
            camera,
            projection,
            controls,
            pointer: PointerState::new(),
            viewport,
            uniforms: ShaderUniforms {
                mouse_position: PointerState::new().uniform(viewport),
                light_position: Vec3::from(config.render.light_position),
            },
            displacement: DisplacementField::new(displacement),
            animator,
            running: true,
            frames_rendered: 0,
        }
    }

    /// Center `mesh`, generate its attributes and hand both to `make_backend`.
    pub fn initialize<R, F, E>(
        mut mesh: Mesh,
        config: &SceneConfig,
        rng: &mut R,
        viewport: Viewport,
        make_backend: F,
    ) -> Result<Self, E>
    where
        R: Rng,
        F: FnOnce(&Mesh, &MeshAttributes) -> Result<B, E>,
    {
        mesh.center();
        let attributes = AttributeBuilder::new(config.attributes.colors)
            .amplitude(config.attributes.amplitude)
            .linear_colors(true)
            .build(&mesh, rng);

        let backend = make_backend(&mesh, &attributes)?;
        info!(
            "Scene initialized: {} faces, {}x{} viewport",
            mesh.face_count(),
            viewport.width,
            viewport.height
        );
        Ok(Self::new(backend, config, attributes.displacement, viewport))
    }

    pub fn handle_event(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::PointerMoved { x, y } => self
                .pointer
                .update_from_client(Vec2::new(x as f32, y as f32), self.viewport),
            SceneEvent::PointerDragged { dx, dy } => self.controls.rotate(Vec2::new(dx, dy)),
            SceneEvent::Resized { width, height } => self.resize(width, height),
            SceneEvent::PixelRatioChanged(ratio) => self.backend.set_pixel_ratio(ratio),
        }
    }

    /// Resize the camera projection and the backend. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Viewport::new(width, height);
        self.projection.resize(width, height);
        self.backend.resize(width, height);
    }

    /// Run one frame at clock time `now`.
    pub fn frame(&mut self, now: Duration) -> Result<FrameOutcome, FatalFrameError> {
        if !self.running {
            return Ok(FrameOutcome::Stopped);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.frame_inner(now))) {
            Ok(Ok(())) => {
                self.frames_rendered += 1;
                Ok(FrameOutcome::Rendered)
            }
            Ok(Err(err)) if self.backend.is_fatal(&err) => {
                error!("Fatal render error, stopping frame loop: {err}");
                self.running = false;
                Err(FatalFrameError::Backend(err.to_string()))
            }
            Ok(Err(err)) => {
                warn!("Render error, skipping frame: {err}");
                Ok(FrameOutcome::Skipped)
            }
            Err(payload) => {
                warn!("Frame panicked, skipping: {}", panic_message(payload.as_ref()));
                Ok(FrameOutcome::Skipped)
            }
        }
    }

    fn frame_inner(&mut self, now: Duration) -> Result<(), B::Error> {
        self.animator.tick(&mut self.displacement, now);
        if self.displacement.take_dirty() {
            self.backend.upload_displacement(self.displacement.values());
        }

        self.uniforms.mouse_position = self.pointer.uniform(self.viewport);

        let frame = FrameView {
            camera: &self.camera,
            projection: &self.projection,
            uniforms: &self.uniforms,
        };
        self.backend.render(&frame)?;
        self.controls.update(&mut self.camera);
        Ok(())
    }

    /// Stop scheduling frames and the displacement animation.
    pub fn stop(&mut self) {
        self.running = false;
        self.animator.stop();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Cancel all scheduled work and release the backend.
    pub fn teardown(mut self) -> B {
        self.stop();
        self.animator.cancel();
        info!("Scene torn down after {} frames", self.frames_rendered);
        self.backend
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    pub fn displacement(&self) -> &DisplacementField {
        &self.displacement
    }

    pub fn animator(&self) -> &DisplacementAnimator {
        &self.animator
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::animator::perturbation;
    use crate::tween::TaskState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Debug, thiserror::Error)]
    pub enum FakeError {
        #[error("surface lost")]
        Lost,
        #[error("out of memory")]
        OutOfMemory,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Fault {
        None,
        Fail,
        Panic,
        Fatal,
    }

    /// Backend that records what the frame loop asked of it.
    #[derive(Debug)]
    pub struct RecordingBackend {
        pub viewport: (u32, u32),
        pub pixel_ratio: f64,
        pub uploads: Vec<Vec<f32>>,
        pub renders: usize,
        pub last_mouse: Option<Vec2>,
        pub last_aspect: Option<f32>,
        pub fault: Fault,
    }

    impl RecordingBackend {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                viewport: (width, height),
                pixel_ratio: 1.0,
                uploads: Vec::new(),
                renders: 0,
                last_mouse: None,
                last_aspect: None,
                fault: Fault::None,
            }
        }
    }

    impl SceneBackend for RecordingBackend {
        type Error = FakeError;

        fn resize(&mut self, width: u32, height: u32) {
            self.viewport = (width, height);
        }

        fn set_pixel_ratio(&mut self, ratio: f64) {
            self.pixel_ratio = ratio;
        }

        fn upload_displacement(&mut self, displacement: &[f32]) {
            self.uploads.push(displacement.to_vec());
        }

        fn render(&mut self, frame: &FrameView<'_>) -> Result<(), FakeError> {
            match self.fault {
                Fault::None => {}
                Fault::Fail => return Err(FakeError::Lost),
                Fault::Fatal => return Err(FakeError::OutOfMemory),
                Fault::Panic => panic!("backend exploded"),
            }
            self.renders += 1;
            self.last_mouse = Some(frame.uniforms.mouse_position);
            self.last_aspect = Some(frame.projection.aspect());
            Ok(())
        }

        fn is_fatal(&self, error: &FakeError) -> bool {
            matches!(error, FakeError::OutOfMemory)
        }
    }

    pub fn triangle_mesh(faces: usize) -> Mesh {
        let positions = (0..faces)
            .flat_map(|f| {
                let z = f as f32;
                [Vec3::new(1.0, 1.0, z), Vec3::new(3.0, 1.0, z), Vec3::new(1.0, 3.0, z)]
            })
            .collect();
        Mesh::from_positions(positions).unwrap()
    }

    pub fn running_context(faces: usize) -> SceneContext<RecordingBackend> {
        let mut config = SceneConfig::default();
        config.attributes.seed = Some(17);
        let mut rng = config.attribute_rng();
        SceneContext::initialize(
            triangle_mesh(faces),
            &config,
            &mut rng,
            Viewport::new(800, 600),
            |_mesh, _attributes| Ok::<_, FakeError>(RecordingBackend::new(800, 600)),
        )
        .unwrap()
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_initialize_centers_mesh_and_builds_attributes() {
        let config = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = None;
        let ctx = SceneContext::initialize(
            triangle_mesh(4),
            &config,
            &mut rng,
            Viewport::new(640, 480),
            |mesh, attributes| {
                seen = Some((mesh.bounds().unwrap(), attributes.clone()));
                Ok::<_, FakeError>(RecordingBackend::new(640, 480))
            },
        )
        .unwrap();

        let ((min, max), attributes) = seen.unwrap();
        assert_eq!((min + max) * 0.5, Vec3::ZERO);
        assert_eq!(attributes.colors.len(), 36);
        assert_eq!(ctx.displacement().values(), attributes.displacement.as_slice());
        assert_eq!(ctx.animator().tween().state(), TaskState::Running);
    }

    #[test]
    fn test_backend_creation_failure_propagates() {
        let config = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let result = SceneContext::<RecordingBackend>::initialize(
            triangle_mesh(1),
            &config,
            &mut rng,
            Viewport::new(1, 1),
            |_, _| Err(FakeError::Lost),
        );
        assert!(matches!(result, Err(FakeError::Lost)));
    }

    #[test]
    fn test_frame_pushes_pointer_uniform() {
        let mut ctx = running_context(2);
        ctx.frame(ms(8)).unwrap();
        assert_eq!(ctx.backend().last_mouse, Some(Vec2::new(800.0, 600.0)));

        ctx.handle_event(SceneEvent::PointerMoved { x: 800.0, y: 600.0 });
        assert_eq!(ctx.frame(ms(16)).unwrap(), FrameOutcome::Rendered);
        assert_eq!(ctx.backend().last_mouse, Some(Vec2::new(1.0, -1.0)));

        ctx.handle_event(SceneEvent::PointerMoved { x: 0.0, y: 0.0 });
        ctx.frame(ms(32)).unwrap();
        assert_eq!(ctx.backend().last_mouse, Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(ctx.uniforms().mouse_position, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_resize_updates_camera_and_backend() {
        let mut ctx = running_context(1);
        ctx.handle_event(SceneEvent::Resized {
            width: 1280,
            height: 720,
        });
        assert!((ctx.projection().aspect() - 1280.0 / 720.0).abs() < 1e-6);
        assert_eq!(ctx.backend().viewport, (1280, 720));
        assert_eq!(ctx.viewport(), Viewport::new(1280, 720));

        ctx.frame(ms(16)).unwrap();
        assert!((ctx.backend().last_aspect.unwrap() - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_resize_is_ignored() {
        let mut ctx = running_context(1);
        ctx.resize(0, 0);
        assert_eq!(ctx.backend().viewport, (800, 600));
        assert_eq!(ctx.viewport(), Viewport::new(800, 600));
    }

    #[test]
    fn test_pointer_normalized_against_latest_viewport() {
        let mut ctx = running_context(1);
        ctx.resize(400, 200);
        ctx.handle_event(SceneEvent::PointerMoved { x: 400.0, y: 0.0 });
        assert_eq!(ctx.pointer().position(), Some(Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_pixel_ratio_forwarded() {
        let mut ctx = running_context(1);
        ctx.handle_event(SceneEvent::PixelRatioChanged(2.0));
        assert_eq!(ctx.backend().pixel_ratio, 2.0);
    }

    #[test]
    fn test_each_frame_uploads_animated_displacement() {
        let mut ctx = running_context(3);
        let initial = ctx.displacement().values().to_vec();

        ctx.frame(ms(100)).unwrap();
        ctx.frame(ms(116)).unwrap();
        assert_eq!(ctx.backend().uploads.len(), 2);

        let uploaded = ctx.backend().uploads.last().unwrap();
        assert_eq!(uploaded.as_slice(), ctx.displacement().values());
        for (i, (value, start)) in uploaded.iter().zip(&initial).enumerate() {
            let expected = f64::from(*start) + perturbation(i, ms(100)) + perturbation(i, ms(116));
            assert!((f64::from(*value) - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_failed_frame_is_skipped() {
        let mut ctx = running_context(1);
        ctx.backend_mut().fault = Fault::Fail;
        assert_eq!(ctx.frame(ms(16)).unwrap(), FrameOutcome::Skipped);
        assert!(ctx.is_running());

        ctx.backend_mut().fault = Fault::None;
        assert_eq!(ctx.frame(ms(32)).unwrap(), FrameOutcome::Rendered);
        assert_eq!(ctx.frames_rendered(), 1);
    }

    #[test]
    fn test_panicking_frame_is_skipped() {
        let mut ctx = running_context(1);
        ctx.backend_mut().fault = Fault::Panic;
        assert_eq!(ctx.frame(ms(16)).unwrap(), FrameOutcome::Skipped);

        ctx.backend_mut().fault = Fault::None;
        assert_eq!(ctx.frame(ms(32)).unwrap(), FrameOutcome::Rendered);
        assert_eq!(ctx.backend().renders, 1);
    }

    #[test]
    fn test_fatal_error_stops_loop() {
        let mut ctx = running_context(1);
        ctx.backend_mut().fault = Fault::Fatal;
        assert!(ctx.frame(ms(16)).is_err());
        assert!(!ctx.is_running());
        assert_eq!(ctx.frame(ms(32)).unwrap(), FrameOutcome::Stopped);
    }

    #[test]
    fn test_stop_halts_rendering_and_animation() {
        let mut ctx = running_context(1);
        ctx.frame(ms(16)).unwrap();
        ctx.stop();
        assert_eq!(ctx.frame(ms(32)).unwrap(), FrameOutcome::Stopped);
        assert_eq!(ctx.animator().tween().state(), TaskState::Stopped);
        assert_eq!(ctx.backend().renders, 1);
    }

    #[test]
    fn test_teardown_cancels_animation() {
        let mut ctx = running_context(1);
        ctx.frame(ms(16)).unwrap();
        let backend = ctx.teardown();
        assert_eq!(backend.renders, 1);
    }
}
