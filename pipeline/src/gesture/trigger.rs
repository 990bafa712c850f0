//! One-shot action triggers gated on the stable gesture.
//!
//! Mode changes fire once per change of mode.  Theme switches and
//! letters are high-cost actions: they need a stricter confidence, a
//! per-kind cooldown, and (for letters) a minimum hold duration.  A fired
//! letter asks the stability tracker to lock so the same pose cannot
//! re-arm immediately.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::classifier::GestureLabel;
use super::stability::GestureState;

// ── Events ─────────────────────────────────────────────────

/// Scene mode selected by a mode trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeKind {
    Tree,
    Scatter,
    Zoom,
}

impl ModeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Scatter => "scatter",
            Self::Zoom => "zoom",
        }
    }
}

/// Discrete action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    Mode(ModeKind),
    ThemeSwitch,
    Letter,
}

impl TriggerKind {
    /// The action a stable label asks for, if any.
    pub fn for_label(label: GestureLabel) -> Option<Self> {
        match label {
            GestureLabel::FistClosed => Some(Self::Mode(ModeKind::Tree)),
            GestureLabel::OpenFull => Some(Self::Mode(ModeKind::Scatter)),
            GestureLabel::Pointing => Some(Self::Mode(ModeKind::Zoom)),
            GestureLabel::FistThumb => Some(Self::ThemeSwitch),
            GestureLabel::Ok => Some(Self::Letter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mode(mode) => mode.as_str(),
            Self::ThemeSwitch => "theme-switch",
            Self::Letter => "letter",
        }
    }
}

/// A fired action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub kind: TriggerKind,
    /// Monotonic time of the tick that fired it.
    pub timestamp_ms: f64,
}

/// Result of evaluating one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TriggerDecision {
    pub event: Option<TriggerEvent>,
    /// When set, the stability tracker must lock for this long.
    pub lock_ms: Option<f64>,
}

// ── Config ─────────────────────────────────────────────────

/// Configuration for trigger gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Confidence that must be exceeded for mode changes.
    pub mode_threshold: u8,
    /// Confidence that must be exceeded for theme switches.
    pub theme_threshold: u8,
    /// Confidence that must be exceeded before the letter hold timer starts.
    pub letter_threshold: u8,
    /// Minimum time between theme switches (ms).
    pub theme_cooldown_ms: f64,
    /// Minimum time between letters (ms).
    pub letter_cooldown_ms: f64,
    /// Time the letter gesture must be held above threshold (ms).
    pub letter_hold_ms: f64,
    /// Stability lock applied after a letter fires (ms).
    pub letter_lock_ms: f64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            mode_threshold: 60,
            theme_threshold: 80,
            letter_threshold: 85,
            theme_cooldown_ms: 1500.0,
            letter_cooldown_ms: 3000.0,
            letter_hold_ms: 800.0,
            letter_lock_ms: 1500.0,
        }
    }
}

// ── Gate ───────────────────────────────────────────────────

/// Rate-limiting gate between the stable label and the application.
#[derive(Debug, Clone, Default)]
pub struct TriggerGate {
    pub config: TriggerConfig,
    last_mode: Option<ModeKind>,
    last_theme_ms: Option<f64>,
    last_letter_ms: Option<f64>,
    /// When the letter gesture first held above threshold.
    letter_armed_since: Option<f64>,
    last_event: Option<TriggerEvent>,
}

impl TriggerGate {
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Evaluate the current stable state.
    pub fn evaluate(&mut self, state: &GestureState, now_ms: f64) -> TriggerDecision {
        if state.locked {
            self.letter_armed_since = None;
            return TriggerDecision::default();
        }

        let kind = match TriggerKind::for_label(state.label) {
            Some(kind) => kind,
            None => {
                self.letter_armed_since = None;
                return TriggerDecision::default();
            }
        };

        match kind {
            TriggerKind::Mode(mode) => {
                self.letter_armed_since = None;
                if state.exceeds(self.config.mode_threshold) && self.last_mode != Some(mode) {
                    self.last_mode = Some(mode);
                    return self.fire(kind, now_ms, None);
                }
            }
            TriggerKind::ThemeSwitch => {
                self.letter_armed_since = None;
                if state.exceeds(self.config.theme_threshold)
                    && cooled_down(self.last_theme_ms, now_ms, self.config.theme_cooldown_ms)
                {
                    self.last_theme_ms = Some(now_ms);
                    return self.fire(kind, now_ms, None);
                }
            }
            TriggerKind::Letter => {
                if !state.exceeds(self.config.letter_threshold) {
                    self.letter_armed_since = None;
                    return TriggerDecision::default();
                }
                let armed_since = *self.letter_armed_since.get_or_insert(now_ms);
                let held_ms = now_ms - armed_since;
                if held_ms >= self.config.letter_hold_ms
                    && cooled_down(self.last_letter_ms, now_ms, self.config.letter_cooldown_ms)
                {
                    self.last_letter_ms = Some(now_ms);
                    self.letter_armed_since = None;
                    return self.fire(kind, now_ms, Some(self.config.letter_lock_ms));
                }
            }
        }

        TriggerDecision::default()
    }

    fn fire(&mut self, kind: TriggerKind, now_ms: f64, lock_ms: Option<f64>) -> TriggerDecision {
        info!("Trigger fired: {} at {:.0}ms", kind.as_str(), now_ms);
        let event = TriggerEvent {
            kind,
            timestamp_ms: now_ms,
        };
        self.last_event = Some(event);
        TriggerDecision {
            event: Some(event),
            lock_ms,
        }
    }

    /// Hand left the frame: any letter hold in progress is abandoned.
    pub fn hand_lost(&mut self) {
        if self.letter_armed_since.take().is_some() {
            debug!("Letter hold abandoned: hand lost");
        }
    }

    /// How far the letter hold has got, 0..=100.  Zero when not armed.
    pub fn arming_progress(&self, now_ms: f64) -> u8 {
        let Some(armed_since) = self.letter_armed_since else {
            return 0;
        };
        if self.config.letter_hold_ms <= 0.0 {
            return 100;
        }
        let fraction = ((now_ms - armed_since) / self.config.letter_hold_ms).clamp(0.0, 1.0);
        (fraction * 100.0) as u8
    }

    pub fn last_event(&self) -> Option<TriggerEvent> {
        self.last_event
    }

    pub fn last_mode(&self) -> Option<ModeKind> {
        self.last_mode
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:mode {} :last-event {} :letter-armed {})",
            self.last_mode.map(|m| m.as_str()).unwrap_or("nil"),
            self.last_event.map(|e| e.kind.as_str()).unwrap_or("nil"),
            if self.letter_armed_since.is_some() { "t" } else { "nil" },
        )
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:mode-threshold {} :theme-threshold {} :letter-threshold {} :theme-cooldown-ms {:.0} :letter-cooldown-ms {:.0} :letter-hold-ms {:.0} :letter-lock-ms {:.0})",
            self.config.mode_threshold,
            self.config.theme_threshold,
            self.config.letter_threshold,
            self.config.theme_cooldown_ms,
            self.config.letter_cooldown_ms,
            self.config.letter_hold_ms,
            self.config.letter_lock_ms,
        )
    }
}

fn cooled_down(last_ms: Option<f64>, now_ms: f64, cooldown_ms: f64) -> bool {
    last_ms.map_or(true, |last| now_ms - last >= cooldown_ms)
}

// ── Tests ──────────────────────────────────────────────────
