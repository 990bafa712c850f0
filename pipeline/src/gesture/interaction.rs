//! Continuous control axes derived from the stable gesture.
//!
//! The hand anchor (middle-finger MCP) is smoothed with exponential
//! interpolation.  An open palm turns horizontal offset into rotation
//! and vertical offset into scale; every other gesture relaxes the axes
//! back to neutral at the same rate instead of snapping.  The effect
//! flag is the exception: it follows the raw label frame by frame.

use serde::{Deserialize, Serialize};

use super::classifier::GestureLabel;
use super::landmarks::{HandJoint, LandmarkFrame};

/// Neutral rotation.
pub const NEUTRAL_ROTATION: f32 = 0.0;
/// Neutral scale.
pub const NEUTRAL_SCALE: f32 = 1.0;

// ── Config ─────────────────────────────────────────────────

/// Configuration for axis mapping and smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Axes only update while confidence is strictly above this.
    pub act_threshold: u8,
    /// Interpolation factor for the hand anchor, in (0, 1].
    pub position_alpha: f32,
    /// Interpolation factor for rotation and for relaxing to neutral, in (0, 1].
    pub axis_alpha: f32,
    /// Rotation per unit of horizontal offset from the image center.
    pub rotation_gain: f32,
    /// Raw rotation magnitudes up to this value produce exactly zero.
    pub dead_zone: f32,
    /// Scale target is `scale_origin - anchor_y`.
    pub scale_origin: f32,
    /// Fraction of the remaining scale error removed per tick, in (0, 1].
    pub scale_rate: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Relaxing axes snap to neutral once this close.
    pub settle_epsilon: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            act_threshold: 60,
            position_alpha: 0.2,
            axis_alpha: 0.15,
            rotation_gain: 4.0,
            dead_zone: 0.2,
            scale_origin: 1.6,
            scale_rate: 0.1,
            min_scale: 0.2,
            max_scale: 3.0,
            settle_epsilon: 1e-3,
        }
    }
}

// ── State ──────────────────────────────────────────────────

/// Published interaction axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionState {
    /// Nominally -1..1; positive when the hand is left of center.
    pub rotation_factor: f32,
    /// Always positive; 1 is neutral.
    pub scale_factor: f32,
    /// Smoothed anchor in normalized image coordinates, 0..1.
    pub hand_pos: (f32, f32),
    /// Visual effect toggle.  Follows the raw label with no smoothing.
    pub effect_active: bool,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            rotation_factor: NEUTRAL_ROTATION,
            scale_factor: NEUTRAL_SCALE,
            hand_pos: (0.5, 0.5),
            effect_active: false,
        }
    }
}

impl InteractionState {
    pub fn is_neutral(&self) -> bool {
        self.rotation_factor == NEUTRAL_ROTATION && self.scale_factor == NEUTRAL_SCALE
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:rotation {:.3} :scale {:.3} :hand-pos ({:.3} {:.3}) :effect {})",
            self.rotation_factor,
            self.scale_factor,
            self.hand_pos.0,
            self.hand_pos.1,
            if self.effect_active { "t" } else { "nil" },
        )
    }
}

// ── Mapper ─────────────────────────────────────────────────

/// Owner of `InteractionState`.
#[derive(Debug, Clone, Default)]
pub struct InteractionMapper {
    pub config: InteractionConfig,
    state: InteractionState,
}

impl InteractionMapper {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            state: InteractionState::default(),
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Advance the axes for one frame with a confident stable label.
    pub fn update(&mut self, label: GestureLabel, frame: &LandmarkFrame) -> InteractionState {
        if label.tracks_position() {
            // Detectors report points slightly outside the image near the edges.
            let anchor = frame.point(HandJoint::MiddleMcp);
            let alpha = self.config.position_alpha;
            self.state.hand_pos = (
                lerp(self.state.hand_pos.0, anchor.x.clamp(0.0, 1.0), alpha),
                lerp(self.state.hand_pos.1, anchor.y.clamp(0.0, 1.0), alpha),
            );
        }

        if label.is_manipulation() {
            let (x, y) = self.state.hand_pos;
            let target_rotation = self.rotation_target(x);
            self.state.rotation_factor =
                lerp(self.state.rotation_factor, target_rotation, self.config.axis_alpha);

            let target_scale = self.scale_target(y);
            self.state.scale_factor +=
                (target_scale - self.state.scale_factor) * self.config.scale_rate;
        } else {
            self.relax_axes();
        }

        self.state
    }

    /// Track the effect gesture on the raw per-frame label.
    pub fn observe_raw(&mut self, raw: GestureLabel) {
        self.state.effect_active = raw.is_effect();
    }

    /// Hand gone: pull rotation and scale toward neutral and drop the
    /// effect.  Position is kept.
    pub fn relax(&mut self) -> InteractionState {
        self.state.effect_active = false;
        self.relax_axes();
        self.state
    }

    fn relax_axes(&mut self) {
        let alpha = self.config.axis_alpha;
        let eps = self.config.settle_epsilon;
        self.state.rotation_factor = settle(
            lerp(self.state.rotation_factor, NEUTRAL_ROTATION, alpha),
            NEUTRAL_ROTATION,
            eps,
        );
        self.state.scale_factor = settle(
            lerp(self.state.scale_factor, NEUTRAL_SCALE, alpha),
            NEUTRAL_SCALE,
            eps,
        );
    }

    /// Rotation target for an anchor x-position, dead-zone applied.
    ///
    /// Zero inside the band; outside it the magnitude grows linearly
    /// from zero, so leaving the band never produces a jump.
    pub fn rotation_target(&self, x: f32) -> f32 {
        let raw = (0.5 - x) * self.config.rotation_gain;
        if raw.abs() <= self.config.dead_zone {
            0.0
        } else {
            raw.signum() * (raw.abs() - self.config.dead_zone)
        }
    }

    fn scale_target(&self, y: f32) -> f32 {
        (self.config.scale_origin - y).clamp(self.config.min_scale, self.config.max_scale)
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        self.state = InteractionState::default();
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        self.state.status_sexp()
    }
}

/// Linear interpolation helper.
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn settle(value: f32, target: f32, eps: f32) -> f32 {
    if (value - target).abs() < eps {
        target
    } else {
        value
    }
}

// ── Tests ──────────────────────────────────────────────────
