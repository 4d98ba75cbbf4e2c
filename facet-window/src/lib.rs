//! Desktop viewer: hosts the facet scene in a winit window.

mod app;
mod backend;
mod input;

pub use backend::{BackendError, WgpuBackend};

use app::App;
use facet_data::{LoadError, ObjLoader};
use facet_gpu::{RendererError, SceneRendererError};
use facet_scene::{FatalFrameError, LifecycleError, SceneConfig, spawn_load};
use std::path::PathBuf;
use winit::event_loop::EventLoop;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("failed to load mesh {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
    #[error("failed to spawn the loader: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error(transparent)]
    Scene(#[from] SceneRendererError),
    #[error(transparent)]
    Frame(#[from] FatalFrameError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

fn init_tracing() {
    #[cfg(feature = "tracy")]
    {
        use tracing_subscriber::Layer;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;
        tracing_subscriber::registry()
            .with(tracing_tracy::TracyLayer::default())
            .with(
                tracing_subscriber::fmt::layer().with_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "info".into()),
                ),
            )
            .init();
    }

    #[cfg(not(feature = "tracy"))]
    {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }
}

/// Open the viewer and block until the window closes.
///
/// The mesh starts loading before the window exists; the scene starts
/// rendering once both are ready.
pub fn run(config: SceneConfig) -> Result<(), ViewerError> {
    init_tracing();

    let load = spawn_load(ObjLoader, config.mesh.path.clone())?;
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, load);
    let run_result = event_loop.run_app(&mut app);
    let app_result = app.finish();
    run_result?;
    app_result
}
