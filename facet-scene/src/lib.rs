//! Backend-independent scene state: camera, pointer, animation and the frame
//! loop that ties them to a renderer.

pub mod animator;
pub mod camera;
pub mod config;
pub mod context;
pub mod events;
pub mod lifecycle;
pub mod loader;
pub mod pointer;
pub mod tween;

pub use animator::{DisplacementAnimator, DisplacementField, DriftMode, perturbation};
pub use camera::{Camera, CameraPose, OrbitControls, Projection};
pub use config::{
    AnimationConfig, AttributeConfig, CameraConfig, ConfigError, LightConfig, MeshConfig,
    RenderConfig, SceneConfig,
};
pub use context::{
    FatalFrameError, FrameOutcome, FrameView, SceneBackend, SceneContext, ShaderUniforms,
};
pub use events::{EventQueue, SceneEvent};
pub use lifecycle::{Lifecycle, LifecycleError, SceneState};
pub use loader::{LoadHandle, spawn_load};
pub use pointer::{PointerState, Viewport, normalize_client};
pub use tween::{Direction, Ease, Repeat, TaskState, Tween, TweenSample};
