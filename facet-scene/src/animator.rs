//! Sine-driven animation of the displacement stream.

use crate::tween::{Tween, TweenSample};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Phase offset between neighbouring elements, in radians.
pub const PHASE_PER_ELEMENT: f64 = 0.1;
/// Radians of phase per millisecond of clock time.
pub const PHASE_PER_MS: f64 = 0.001;
/// Amplitude of one tick's contribution.
pub const TICK_GAIN: f64 = 0.1;

/// How successive ticks combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftMode {
    /// Each tick adds its sine term on top of the previous value, so the
    /// field drifts without bound.
    #[default]
    Compounding,
    /// Each tick recomputes `base + sine term` from the initial values.
    Anchored,
}

/// The CPU copy of the displacement vertex stream plus its dirty flag.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementField {
    values: Vec<f32>,
    dirty: bool,
}

impl DisplacementField {
    /// Wrap freshly uploaded values; the field starts clean.
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            dirty: false,
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Contribution of one tick to element `index` at clock time `now`.
pub fn perturbation(index: usize, now: Duration) -> f64 {
    let now_ms = now.as_secs_f64() * 1_000.0;
    (index as f64 * PHASE_PER_ELEMENT + now_ms * PHASE_PER_MS).sin() * TICK_GAIN
}

/// Drives a [`DisplacementField`] from a repeating tween.
#[derive(Debug, Clone)]
pub struct DisplacementAnimator {
    tween: Tween,
    mode: DriftMode,
    base: Vec<f32>,
    ticks: u64,
}

impl DisplacementAnimator {
    pub fn new(tween: Tween, mode: DriftMode, initial: &[f32]) -> Self {
        Self {
            tween,
            mode,
            base: initial.to_vec(),
            ticks: 0,
        }
    }

    pub fn start(&mut self) {
        self.tween.start();
    }

    pub fn stop(&mut self) {
        self.tween.stop();
    }

    pub fn cancel(&mut self) {
        self.tween.cancel();
    }

    pub fn tween(&self) -> &Tween {
        &self.tween
    }

    pub fn mode(&self) -> DriftMode {
        self.mode
    }

    /// Number of ticks that modified the field.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the tween and, while it runs, perturb every element of `field`.
    pub fn tick(&mut self, field: &mut DisplacementField, now: Duration) -> Option<TweenSample> {
        let sample = self.tween.advance(now)?;
        field.mark_dirty();

        match self.mode {
            DriftMode::Compounding => {
                for (i, value) in field.values.iter_mut().enumerate() {
                    *value = (f64::from(*value) + perturbation(i, now)) as f32;
                }
            }
            DriftMode::Anchored => {
                for (i, (value, base)) in field.values.iter_mut().zip(&self.base).enumerate() {
                    *value = (f64::from(*base) + perturbation(i, now)) as f32;
                }
            }
        }

        self.ticks += 1;
        Some(sample)
    }
}
