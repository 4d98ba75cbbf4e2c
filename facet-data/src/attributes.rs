//! Per-face color and displacement attribute streams.
//!
//! Both streams hold three floats per vertex, nine per face, so they line up
//! one-to-one with the flattened position buffer of a [`Mesh`].

use crate::color::{Hsl, Rgb};
use crate::mesh::Mesh;
use rand::Rng;
use rand::distr::Open01;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Floats written per face in each attribute stream (3 vertices x 3 components).
pub const FLOATS_PER_FACE: usize = 9;

/// Default half-width of the random displacement range.
pub const DEFAULT_AMPLITUDE: f32 = 5.0;

/// Chooses the color of each face.
pub trait FaceColorPolicy {
    fn face_color(&self, face: usize, face_count: usize) -> Rgb;
}

/// The same HSL color on every face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidHsl(pub Hsl);

impl FaceColorPolicy for SolidHsl {
    fn face_color(&self, _face: usize, _face_count: usize) -> Rgb {
        self.0.to_rgb()
    }
}

/// Hue advances linearly with the face index, covering `span` turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueRamp {
    pub start: Hsl,
    pub span: f32,
}

impl FaceColorPolicy for HueRamp {
    fn face_color(&self, face: usize, face_count: usize) -> Rgb {
        let t = if face_count > 1 {
            face as f32 / (face_count - 1) as f32
        } else {
            0.0
        };
        Hsl {
            hue: self.start.hue + self.span * t,
            ..self.start
        }
        .to_rgb()
    }
}

/// Serializable choice of color policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorScheme {
    Solid { color: Hsl },
    HueRamp { start: Hsl, span: f32 },
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::Solid {
            color: Hsl::default(),
        }
    }
}

impl FaceColorPolicy for ColorScheme {
    fn face_color(&self, face: usize, face_count: usize) -> Rgb {
        match *self {
            ColorScheme::Solid { color } => SolidHsl(color).face_color(face, face_count),
            ColorScheme::HueRamp { start, span } => {
                HueRamp { start, span }.face_color(face, face_count)
            }
        }
    }
}

/// Color and displacement streams for one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAttributes {
    pub colors: Vec<f32>,
    pub displacement: Vec<f32>,
}

impl MeshAttributes {
    pub fn face_count(&self) -> usize {
        self.colors.len() / FLOATS_PER_FACE
    }

    /// Color of the first vertex of `face`.
    pub fn face_color(&self, face: usize) -> [f32; 3] {
        let base = face * FLOATS_PER_FACE;
        [self.colors[base], self.colors[base + 1], self.colors[base + 2]]
    }

    /// Displacement of the first component of `face`.
    pub fn face_displacement(&self, face: usize) -> f32 {
        self.displacement[face * FLOATS_PER_FACE]
    }
}

/// Draw one displacement magnitude, uniform in the open interval
/// `(-amplitude, amplitude)`.
pub fn random_displacement<R: Rng>(rng: &mut R, amplitude: f32) -> f32 {
    let u: f32 = rng.sample(Open01);
    2.0 * amplitude * (0.5 - u)
}

/// Generates [`MeshAttributes`] from a mesh.
#[derive(Debug, Clone)]
pub struct AttributeBuilder<P> {
    policy: P,
    amplitude: f32,
    linear_colors: bool,
}

impl<P: FaceColorPolicy> AttributeBuilder<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            amplitude: DEFAULT_AMPLITUDE,
            linear_colors: false,
        }
    }

    /// Set the half-width of the displacement range.
    pub fn amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Emit colors converted to linear space.
    pub fn linear_colors(mut self, linear: bool) -> Self {
        self.linear_colors = linear;
        self
    }

    pub fn build<R: Rng>(&self, mesh: &Mesh, rng: &mut R) -> MeshAttributes {
        let face_count = mesh.face_count();
        let mut colors = Vec::with_capacity(face_count * FLOATS_PER_FACE);
        let mut displacement = Vec::with_capacity(face_count * FLOATS_PER_FACE);

        for face in 0..face_count {
            let mut color = self.policy.face_color(face, face_count);
            if self.linear_colors {
                color = color.to_linear();
            }
            let d = random_displacement(rng, self.amplitude);

            for _vertex in 0..3 {
                colors.extend_from_slice(&color.to_array());
                displacement.extend_from_slice(&[d, d, d]);
            }
        }

        debug!(
            "Built attributes for {} faces ({} floats per stream)",
            face_count,
            colors.len()
        );

        MeshAttributes {
            colors,
            displacement,
        }
    }
}
