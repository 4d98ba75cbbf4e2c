//! Loading and running states of the scene.

use crate::context::{FatalFrameError, FrameOutcome, SceneBackend, SceneContext};
use crate::events::{EventQueue, SceneEvent};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("scene is already running")]
    AlreadyRunning,
}

pub enum SceneState<B: SceneBackend> {
    Loading,
    Running(SceneContext<B>),
}

/// Queues events until the mesh arrives, then forwards them to the scene
/// once per frame.
pub struct Lifecycle<B: SceneBackend> {
    state: SceneState<B>,
    events: EventQueue,
}

impl<B: SceneBackend> Default for Lifecycle<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: SceneBackend> Lifecycle<B> {
    pub fn new() -> Self {
        Self {
            state: SceneState::Loading,
            events: EventQueue::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SceneState::Loading)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SceneState::Running(_))
    }

    pub fn state(&self) -> &SceneState<B> {
        &self.state
    }

    pub fn push_event(&mut self, event: SceneEvent) {
        self.events.push(event);
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Enter the running state. Only the first completed load is accepted.
    pub fn complete_load(&mut self, context: SceneContext<B>) -> Result<(), LifecycleError> {
        if self.is_running() {
            return Err(LifecycleError::AlreadyRunning);
        }
        info!(
            "Mesh ready, starting frame loop ({} queued events)",
            self.events.len()
        );
        self.state = SceneState::Running(context);
        Ok(())
    }

    pub fn context(&self) -> Option<&SceneContext<B>> {
        match &self.state {
            SceneState::Running(ctx) => Some(ctx),
            SceneState::Loading => None,
        }
    }

    pub fn context_mut(&mut self) -> Option<&mut SceneContext<B>> {
        match &mut self.state {
            SceneState::Running(ctx) => Some(ctx),
            SceneState::Loading => None,
        }
    }

    /// Deliver queued events and run one frame.
    pub fn frame(&mut self, now: Duration) -> Result<FrameOutcome, FatalFrameError> {
        let SceneState::Running(ctx) = &mut self.state else {
            return Ok(FrameOutcome::Loading);
        };

        for event in self.events.drain() {
            debug!(?event, "Scene event");
            ctx.handle_event(event);
        }
        ctx.frame(now)
    }

    /// Tear the scene down, returning the backend if one was running.
    pub fn teardown(self) -> Option<B> {
        match self.state {
            SceneState::Running(ctx) => Some(ctx.teardown()),
            SceneState::Loading => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::{RecordingBackend, running_context};
    use crate::loader::spawn_load;
    use facet_data::{LoadError, Mesh, MeshLoader};
    use glam::Vec2;
    use std::path::Path;

    struct MissingFile;

    impl MeshLoader for MissingFile {
        fn load(&self, path: &Path) -> Result<Mesh, LoadError> {
            Err(LoadError::Empty {
                locator: path.display().to_string(),
            })
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_loading_frames_draw_nothing() {
        let mut lifecycle = Lifecycle::<RecordingBackend>::new();
        assert!(lifecycle.is_loading());
        assert_eq!(lifecycle.frame(ms(16)).unwrap(), FrameOutcome::Loading);
        assert!(lifecycle.context().is_none());
        assert!(lifecycle.teardown().is_none());
    }

    #[test]
    fn test_events_queued_during_load_are_applied() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.push_event(SceneEvent::Resized {
            width: 1024,
            height: 512,
        });
        lifecycle.push_event(SceneEvent::PointerMoved { x: 0.0, y: 512.0 });
        assert_eq!(lifecycle.pending_events(), 2);

        lifecycle.complete_load(running_context(2)).unwrap();
        assert!(lifecycle.is_running());
        assert_eq!(lifecycle.frame(ms(16)).unwrap(), FrameOutcome::Rendered);
        assert_eq!(lifecycle.pending_events(), 0);

        let ctx = lifecycle.context().unwrap();
        assert_eq!(ctx.backend().viewport, (1024, 512));
        assert_eq!(ctx.backend().last_mouse, Some(Vec2::new(-1.0, -1.0)));
    }

    #[test]
    fn test_second_load_is_rejected() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.complete_load(running_context(1)).unwrap();
        lifecycle.frame(ms(16)).unwrap();

        assert_eq!(
            lifecycle.complete_load(running_context(5)),
            Err(LifecycleError::AlreadyRunning)
        );
        let ctx = lifecycle.context().unwrap();
        assert_eq!(ctx.displacement().len(), 9);
        assert_eq!(ctx.frames_rendered(), 1);
    }

    #[test]
    fn test_teardown_returns_backend() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.complete_load(running_context(1)).unwrap();
        lifecycle.frame(ms(16)).unwrap();
        lifecycle.frame(ms(32)).unwrap();
        let backend = lifecycle.teardown().unwrap();
        assert_eq!(backend.renders, 2);
    }

    #[test]
    fn test_failed_load_leaves_scene_uninitialized() {
        let mut lifecycle = Lifecycle::<RecordingBackend>::new();
        lifecycle.push_event(SceneEvent::PointerMoved { x: 1.0, y: 1.0 });

        let handle = spawn_load(MissingFile, "absent.obj").unwrap();
        let locator = handle.locator().to_path_buf();
        match handle.wait() {
            Ok(_) => lifecycle.complete_load(running_context(1)).unwrap(),
            Err(err) => assert!(err.to_string().contains("absent.obj")),
        }
        assert_eq!(locator, Path::new("absent.obj"));

        assert!(lifecycle.is_loading());
        assert!(lifecycle.context().is_none());
        assert_eq!(lifecycle.frame(ms(16)).unwrap(), FrameOutcome::Loading);
        assert_eq!(lifecycle.pending_events(), 1);
        assert!(lifecycle.teardown().is_none());
    }
}
