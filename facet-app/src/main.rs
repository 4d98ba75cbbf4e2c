//! Facet
//!
//! Renders a faceted mesh whose triangles breathe along their normals and
//! lean towards the pointer.

use clap::{Parser, ValueEnum};
use facet_scene::{ConfigError, DriftMode, SceneConfig};
use facet_window::ViewerError;
use std::path::PathBuf;

/// Facet - animated low-poly mesh viewer
#[derive(Parser, Debug)]
#[command(name = "facet")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON scene configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OBJ mesh to display, overrides the configured path
    #[arg(short, long)]
    mesh: Option<PathBuf>,

    /// Seed for face colors and displacement
    #[arg(short, long)]
    seed: Option<u64>,

    /// How the displacement evolves between ticks
    #[arg(long, value_enum)]
    drift: Option<DriftArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DriftArg {
    Compounding,
    Anchored,
}

impl From<DriftArg> for DriftMode {
    fn from(arg: DriftArg) -> Self {
        match arg {
            DriftArg::Compounding => DriftMode::Compounding,
            DriftArg::Anchored => DriftMode::Anchored,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

impl Args {
    fn scene_config(&self) -> Result<SceneConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::from_json_file(path)?,
            None => SceneConfig::default(),
        };
        if let Some(mesh) = &self.mesh {
            config.mesh.path = mesh.clone();
        }
        if let Some(seed) = self.seed {
            config.attributes.seed = Some(seed);
        }
        if let Some(drift) = self.drift {
            config.animation.drift = drift.into();
        }
        Ok(config)
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let config = args.scene_config()?;
    facet_window::run(config)?;
    Ok(())
}

fn main() {
    // Tracing is initialized inside facet_window::run.
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}
