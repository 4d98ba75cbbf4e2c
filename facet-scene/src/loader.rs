//! Background mesh loading.

use facet_data::{LoadError, Mesh, MeshLoader};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, info};

/// Completion signal of a background load.
pub struct LoadHandle {
    locator: PathBuf,
    receiver: mpsc::Receiver<Result<Mesh, LoadError>>,
}

impl LoadHandle {
    pub fn locator(&self) -> &Path {
        &self.locator
    }

    /// Non-blocking check for the result.
    pub fn poll(&self) -> Option<Result<Mesh, LoadError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(LoadError::Interrupted)),
        }
    }

    /// Block until the load finishes.
    pub fn wait(self) -> Result<Mesh, LoadError> {
        self.receiver.recv().unwrap_or(Err(LoadError::Interrupted))
    }
}

/// Run `loader` on a dedicated thread.
pub fn spawn_load<L: MeshLoader>(loader: L, path: impl Into<PathBuf>) -> std::io::Result<LoadHandle> {
    let locator = path.into();
    let (sender, receiver) = mpsc::channel();
    let thread_path = locator.clone();

    thread::Builder::new()
        .name("mesh-loader".to_string())
        .spawn(move || {
            debug!("Mesh load started: {}", thread_path.display());
            let result = loader.load(&thread_path);
            if sender.send(result).is_err() {
                debug!("Mesh load finished after the receiver was dropped");
            }
        })?;

    info!("Loading mesh from {}", locator.display());
    Ok(LoadHandle { locator, receiver })
}
