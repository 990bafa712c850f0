//! Hysteresis filter turning the raw per-frame label stream into a
//! stable label with a bounded confidence counter.
//!
//! Agreeing frames raise confidence; disagreeing frames lower it, and the
//! label only switches once confidence has been fully exhausted.  After a
//! one-shot action the tracker can be locked for a fixed window, during
//! which all input is ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, trace};

use super::classifier::GestureLabel;

/// Upper bound of the confidence counter.
pub const MAX_CONFIDENCE: u8 = 100;

// ── Config ─────────────────────────────────────────────────

/// Confidence step sizes for one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRates {
    /// Added for each frame agreeing with the stable label.
    pub increment: u8,
    /// Removed for each frame disagreeing with the stable label.
    pub decrement: u8,
}

impl Default for LabelRates {
    fn default() -> Self {
        Self {
            increment: 20,
            decrement: 20,
        }
    }
}

/// Configuration for label stabilization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Rates used for labels without an override.
    pub rates: LabelRates,
    /// Per-label rates.  Precision-sensitive labels climb more slowly.
    /// Entries from a config file are layered over the built-in ones.
    #[serde(deserialize_with = "overrides_over_defaults")]
    pub overrides: BTreeMap<GestureLabel, LabelRates>,
    /// Removed per tick while no hand is visible.
    pub absent_decay: u8,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            rates: LabelRates::default(),
            overrides: default_overrides(),
            absent_decay: 20,
        }
    }
}

fn default_overrides() -> BTreeMap<GestureLabel, LabelRates> {
    let mut overrides = BTreeMap::new();
    overrides.insert(
        GestureLabel::Ok,
        LabelRates {
            increment: 10,
            decrement: 20,
        },
    );
    overrides
}

fn overrides_over_defaults<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<GestureLabel, LabelRates>, D::Error>
where
    D: Deserializer<'de>,
{
    let configured = BTreeMap::<GestureLabel, LabelRates>::deserialize(deserializer)?;
    let mut overrides = default_overrides();
    overrides.extend(configured);
    Ok(overrides)
}

impl StabilityConfig {
    pub fn rates_for(&self, label: GestureLabel) -> LabelRates {
        self.overrides.get(&label).copied().unwrap_or(self.rates)
    }
}

// ── State ──────────────────────────────────────────────────

/// Published stabilization state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureState {
    pub label: GestureLabel,
    /// 0..=100.
    pub confidence: u8,
    /// Input is being ignored until the lock window ends.
    pub locked: bool,
}

impl GestureState {
    /// Whether downstream code may act on this label.
    pub fn exceeds(&self, threshold: u8) -> bool {
        self.confidence > threshold
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:label {} :confidence {} :locked {})",
            self.label.as_str(),
            self.confidence,
            if self.locked { "t" } else { "nil" },
        )
    }
}

// ── Tracker ────────────────────────────────────────────────

/// Sole owner and mutator of `GestureState`.
#[derive(Debug, Clone, Default)]
pub struct StabilityTracker {
    pub config: StabilityConfig,
    state: GestureState,
    /// End of the lock window (monotonic ms), if locked.
    lock_until_ms: Option<f64>,
}

impl StabilityTracker {
    pub fn new(config: StabilityConfig) -> Self {
        Self {
            config,
            state: GestureState::default(),
            lock_until_ms: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Feed one raw label observed at `now_ms`.
    pub fn update(&mut self, raw: GestureLabel, now_ms: f64) -> GestureState {
        if self.refresh_lock(now_ms) {
            return self.state;
        }

        let current = self.state.label;
        if raw == current {
            let inc = self.config.rates_for(current).increment;
            self.state.confidence = self
                .state
                .confidence
                .saturating_add(inc)
                .min(MAX_CONFIDENCE);
        } else if self.state.confidence == 0 {
            // Confidence was exhausted by earlier frames; this frame is
            // the first one counted for the new label.
            debug!("Stable gesture: {} -> {}", current.as_str(), raw.as_str());
            self.state.label = raw;
            self.state.confidence = self.config.rates_for(raw).increment.min(MAX_CONFIDENCE);
        } else {
            let dec = self.config.rates_for(current).decrement;
            self.state.confidence = self.state.confidence.saturating_sub(dec);
            trace!(
                "Holding {} against {} at confidence {}",
                current.as_str(),
                raw.as_str(),
                self.state.confidence,
            );
        }

        self.state
    }

    /// Tick with no hand visible: confidence drains, the label stays.
    pub fn hand_absent(&mut self, now_ms: f64) -> GestureState {
        if self.refresh_lock(now_ms) {
            return self.state;
        }
        self.state.confidence = self.state.confidence.saturating_sub(self.config.absent_decay);
        self.state
    }

    /// Ignore all input until `now_ms + duration_ms`.
    pub fn lock(&mut self, now_ms: f64, duration_ms: f64) {
        let until = now_ms + duration_ms.max(0.0);
        debug!("Gesture tracker locked for {:.0}ms", duration_ms);
        self.lock_until_ms = Some(until);
        self.state.locked = true;
    }

    /// Clear an expired lock.  Returns whether the tracker is still locked.
    fn refresh_lock(&mut self, now_ms: f64) -> bool {
        match self.lock_until_ms {
            Some(until) if now_ms < until => true,
            Some(_) => {
                debug!("Gesture tracker unlocked");
                self.lock_until_ms = None;
                self.state.locked = false;
                false
            }
            None => false,
        }
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        self.state = GestureState::default();
        self.lock_until_ms = None;
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        self.state.status_sexp()
    }
}

// ── Tests ──────────────────────────────────────────────────
