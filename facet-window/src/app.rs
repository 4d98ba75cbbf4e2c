use crate::ViewerError;
use crate::backend::WgpuBackend;
use crate::input::PointerTracker;
use facet_gpu::{Renderer, RendererError, SurfaceWrapper};
use facet_scene::{
    FrameOutcome, Lifecycle, LoadHandle, SceneConfig, SceneContext, SceneEvent, Viewport,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Device and surface created on resume, waiting for the mesh.
struct PendingGpu {
    renderer: Renderer,
    surface: SurfaceWrapper,
}

pub(crate) struct App {
    config: SceneConfig,
    load: Option<LoadHandle>,
    window: Option<Arc<Window>>,
    gpu: Option<PendingGpu>,
    lifecycle: Lifecycle<WgpuBackend>,
    clock: Instant,
    pointer: PointerTracker,
    error: Option<ViewerError>,
}

impl App {
    pub(crate) fn new(config: SceneConfig, load: LoadHandle) -> Self {
        Self {
            config,
            load: Some(load),
            window: None,
            gpu: None,
            lifecycle: Lifecycle::new(),
            clock: Instant::now(),
            pointer: PointerTracker::default(),
            error: None,
        }
    }

    pub(crate) fn finish(self) -> Result<(), ViewerError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn create_gpu(
        &mut self,
        event_loop: &ActiveEventLoop,
    ) -> Result<(Arc<Window>, PendingGpu), ViewerError> {
        let attributes = Window::default_attributes()
            .with_title("facet")
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let renderer = pollster::block_on(Renderer::new())?;
        let size = window.inner_size();
        let surface = renderer
            .instance()
            .create_surface(window.clone())
            .map_err(RendererError::from)?;
        let surface = renderer.create_surface(surface, size.width, size.height)?;
        Ok((window, PendingGpu { renderer, surface }))
    }

    /// Build the scene once both the mesh and the GPU are ready.
    fn poll_load(&mut self) -> Result<(), ViewerError> {
        if self.gpu.is_none() {
            return Ok(());
        }
        let Some(result) = self.load.as_ref().and_then(LoadHandle::poll) else {
            return Ok(());
        };
        let Some(load) = self.load.take() else {
            return Ok(());
        };
        let mesh = result.map_err(|source| ViewerError::Load {
            path: load.locator().to_path_buf(),
            source,
        })?;
        let (Some(window), Some(PendingGpu { renderer, surface })) =
            (self.window.clone(), self.gpu.take())
        else {
            return Ok(());
        };

        let size = window.inner_size();
        let viewport = Viewport::new(size.width.max(1), size.height.max(1));
        let mut rng = self.config.attribute_rng();
        let config = &self.config;
        let context = SceneContext::initialize(mesh, config, &mut rng, viewport, |mesh, attributes| {
            WgpuBackend::new(window.clone(), renderer, surface, mesh, attributes, config)
        })?;
        self.lifecycle.complete_load(context)?;
        info!("Scene running");
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);

        match self.create_gpu(event_loop) {
            Ok((window, gpu)) => {
                self.window = Some(window);
                self.gpu = Some(gpu);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => self.lifecycle.push_event(SceneEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => self
                .lifecycle
                .push_event(SceneEvent::PixelRatioChanged(scale_factor)),
            WindowEvent::CursorMoved { position, .. } => {
                for event in self.pointer.moved(position.x, position.y) {
                    self.lifecycle.push_event(event);
                }
            }
            WindowEvent::CursorLeft { .. } => self.pointer.left(),
            WindowEvent::MouseInput { state, button, .. } => self.pointer.button(button, state),
            WindowEvent::RedrawRequested => {
                let _frame_span = tracing::info_span!("frame").entered();
                match self.lifecycle.frame(self.clock.elapsed()) {
                    Ok(FrameOutcome::Stopped) => event_loop.exit(),
                    Ok(_) => {}
                    Err(err) => self.fail(event_loop, err.into()),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.poll_load() {
            self.fail(event_loop, err);
            return;
        }
        if self.lifecycle.is_running() {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let lifecycle = std::mem::take(&mut self.lifecycle);
        if let Some(backend) = lifecycle.teardown() {
            let (width, height) = backend.viewport();
            info!("Scene torn down at {width}x{height}");
        }
    }
}
