//! Scene configuration.
//!
//! Every field has a default matching the stock scene, so a JSON file only
//! needs to name the values it changes.

use crate::animator::DriftMode;
use crate::tween::{Repeat, Tween};
use facet_data::ColorScheme;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("animation.duration_secs must be a finite, non-negative number of seconds, got {0}")]
    InvalidDuration(f32),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub mesh: MeshConfig,
    pub attributes: AttributeConfig,
    pub animation: AnimationConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
    pub lights: LightConfig,
}

impl SceneConfig {
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.animation.cycle_duration()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    /// The displacement tween described by the animation section.
    pub fn tween(&self) -> Tween {
        let repeat = match self.animation.repeat {
            Some(count) => Repeat::Count(count),
            None => Repeat::Infinite,
        };
        // Out-of-range durations are rejected on load; saturate for hand-built configs.
        let duration = self.animation.cycle_duration().unwrap_or(Duration::MAX);
        Tween::new(duration)
            .repeat(repeat)
            .yoyo(self.animation.yoyo)
    }

    /// Random source for attribute generation; seeded when a seed is set.
    pub fn attribute_rng(&self) -> StdRng {
        match self.attributes.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub path: PathBuf,
    /// Uniform scale applied to both the displaced and the inner mesh.
    pub scale: f32,
    /// Z offset of the inner mesh relative to the displaced one.
    pub inner_offset_z: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model_0.obj"),
            scale: 2.0,
            inner_offset_z: -0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeConfig {
    pub colors: ColorScheme,
    pub amplitude: f32,
    pub seed: Option<u64>,
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            amplitude: facet_data::DEFAULT_AMPLITUDE,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub duration_secs: f32,
    pub yoyo: bool,
    /// Extra cycles after the first; `None` repeats forever.
    pub repeat: Option<u32>,
    pub drift: DriftMode,
}

impl AnimationConfig {
    /// Length of one tween cycle.
    pub fn cycle_duration(&self) -> Result<Duration, ConfigError> {
        if self.duration_secs < 0.0 {
            return Err(ConfigError::InvalidDuration(self.duration_secs));
        }
        Duration::try_from_secs_f32(self.duration_secs)
            .map_err(|_| ConfigError::InvalidDuration(self.duration_secs))
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_secs: 1.0,
            yoyo: true,
            repeat: None,
            drift: DriftMode::Compounding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub controls_enabled: bool,
    pub damping: bool,
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            controls_enabled: false,
            damping: true,
            damping_factor: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Colors are `0xRRGGBB`, sRGB encoded.
    pub clear_color: u32,
    pub inner_color: u32,
    pub background_color: u32,
    pub background_size: f32,
    pub background_z: f32,
    pub light_position: [f32; 3],
    /// World units of offset per unit of displacement.
    pub displacement_scale: f32,
    pub msaa_samples: u32,
    pub shininess: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: 0x683afe,
            inner_color: 0x0d003e,
            background_color: 0x000000,
            background_size: 10.0,
            background_z: -5.0,
            light_position: [1.0, 1.0, 5.0],
            displacement_scale: 0.02,
            msaa_samples: 4,
            shininess: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub directional_color: u32,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub hemisphere_sky: u32,
    pub hemisphere_ground: u32,
    pub hemisphere_intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            directional_color: 0xffffff,
            directional_intensity: 100.0,
            directional_position: [0.0, 10.0, 10.0],
            hemisphere_sky: 0xffffff,
            hemisphere_ground: 0x444444,
            hemisphere_intensity: 2.0,
        }
    }
}
