//! Rule-based gesture classification from a single landmark frame.
//!
//! Every threshold is scaled by the palm size (wrist to middle MCP) so
//! the result does not depend on how far the hand is from the camera.
//! Classification is a priority-ordered decision list: the first rule
//! that matches wins.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::landmarks::{HandJoint, LandmarkFrame, FINGERS};

// ── Gesture labels ─────────────────────────────────────────

/// Closed set of gesture labels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum GestureLabel {
    #[default]
    Unknown,
    Grab,
    Pointing,
    Victory,
    OpenFull,
    OpenNoThumb,
    FistClosed,
    FistThumb,
    Ok,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 9] = [
        Self::Unknown,
        Self::Grab,
        Self::Pointing,
        Self::Victory,
        Self::OpenFull,
        Self::OpenNoThumb,
        Self::FistClosed,
        Self::FistThumb,
        Self::Ok,
    ];

    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Grab => "grab",
            Self::Pointing => "pointing",
            Self::Victory => "victory",
            Self::OpenFull => "open-full",
            Self::OpenNoThumb => "open-no-thumb",
            Self::FistClosed => "fist-closed",
            Self::FistThumb => "fist-thumb",
            Self::Ok => "ok",
        }
    }

    /// Gestures that drive rotation and scale.
    pub fn is_manipulation(&self) -> bool {
        matches!(self, Self::OpenFull)
    }

    /// Gestures that hold the visual effect on while shown.
    pub fn is_effect(&self) -> bool {
        matches!(self, Self::Victory)
    }

    /// Gestures whose anchor position is tracked.
    pub fn tracks_position(&self) -> bool {
        matches!(self, Self::OpenFull | Self::Pointing)
    }
}

// ── Config ─────────────────────────────────────────────────

/// Geometric thresholds, all relative to palm size or joint distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// A finger is extended when wrist→tip exceeds wrist→pip by this factor.
    pub extension_ratio: f32,
    /// Thumb is extended when thumb tip → pinky MCP exceeds palm size × this.
    pub thumb_extension_ratio: f32,
    /// Pinch when thumb tip → index tip is below palm size × this.
    pub pinch_ratio: f32,
    /// Palm sizes below this are treated as a corrupt frame.
    pub min_palm_size: f32,
    /// When set, a two-finger pose whose index and middle tips are spread
    /// wider than palm size × this reads as `Victory` instead of
    /// `Pointing`.  Unset, the two-finger pose is always `Pointing`.
    pub victory_spread_ratio: Option<f32>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            extension_ratio: 1.15,
            thumb_extension_ratio: 1.1,
            pinch_ratio: 0.35,
            min_palm_size: 1e-3,
            victory_spread_ratio: None,
        }
    }
}

// ── Features ───────────────────────────────────────────────

/// Boolean pose features extracted from one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFeatures {
    pub palm_size: f32,
    /// Index, middle, ring, pinky.
    pub extended: [bool; 4],
    pub thumb_extended: bool,
    pub thumb_up: bool,
    pub pinch: bool,
    /// Index and middle tips spread past `victory_spread_ratio`.
    pub spread: bool,
}

impl HandFeatures {
    fn index(&self) -> bool {
        self.extended[0]
    }

    fn middle(&self) -> bool {
        self.extended[1]
    }

    fn ring(&self) -> bool {
        self.extended[2]
    }

    fn pinky(&self) -> bool {
        self.extended[3]
    }

    fn all_extended(&self) -> bool {
        self.extended.iter().all(|e| *e)
    }

    fn none_extended(&self) -> bool {
        !self.extended.iter().any(|e| *e)
    }

    /// Apply the decision list.  The order is the tie-break policy.
    pub fn label(&self) -> GestureLabel {
        // Pinch alone is also a closed fist; the raised middle and ring
        // fingers are what make it an OK sign.
        if self.pinch && self.middle() && self.ring() {
            return GestureLabel::Ok;
        }

        if self.index() && self.middle() && !self.ring() && !self.pinky() {
            if self.spread {
                return GestureLabel::Victory;
            }
            return GestureLabel::Pointing;
        }

        if self.all_extended() && self.thumb_extended {
            return GestureLabel::OpenFull;
        }

        if self.thumb_up && self.none_extended() {
            return GestureLabel::FistThumb;
        }

        if self.none_extended() && !self.pinch {
            return GestureLabel::FistClosed;
        }

        if self.all_extended() && !self.thumb_extended {
            return GestureLabel::OpenNoThumb;
        }

        GestureLabel::Unknown
    }
}

// ── Classifier ─────────────────────────────────────────────

/// Stateless geometric classifier.
#[derive(Debug, Clone, Default)]
pub struct GeometryClassifier {
    pub config: ClassifierConfig,
}

impl GeometryClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Extract pose features, or `None` when the frame is degenerate
    /// (non-finite coordinates or a collapsed palm).
    pub fn analyze(&self, frame: &LandmarkFrame) -> Option<HandFeatures> {
        if !frame.is_finite() {
            trace!("Rejecting frame with non-finite landmarks");
            return None;
        }

        let palm_size = frame.distance(HandJoint::Wrist, HandJoint::MiddleMcp);
        if palm_size < self.config.min_palm_size {
            trace!("Rejecting frame with palm size {:.5}", palm_size);
            return None;
        }

        let mut extended = [false; 4];
        for (slot, (pip, tip)) in extended.iter_mut().zip(FINGERS.iter()) {
            let to_tip = frame.distance(HandJoint::Wrist, *tip);
            let to_pip = frame.distance(HandJoint::Wrist, *pip);
            *slot = to_tip > to_pip * self.config.extension_ratio;
        }

        let thumb_tip = frame.point(HandJoint::ThumbTip);
        let thumb_extended = frame.distance(HandJoint::ThumbTip, HandJoint::PinkyMcp)
            > palm_size * self.config.thumb_extension_ratio;
        let thumb_up = thumb_tip.y < frame.point(HandJoint::ThumbIp).y
            && thumb_tip.y < frame.point(HandJoint::IndexMcp).y
            && !extended.iter().any(|e| *e);
        let pinch = frame.distance(HandJoint::ThumbTip, HandJoint::IndexTip)
            < palm_size * self.config.pinch_ratio;
        let spread = self.config.victory_spread_ratio.map_or(false, |ratio| {
            frame.distance(HandJoint::IndexTip, HandJoint::MiddleTip) > palm_size * ratio
        });

        Some(HandFeatures {
            palm_size,
            extended,
            thumb_extended,
            thumb_up,
            pinch,
            spread,
        })
    }

    /// Classify a frame.  Degenerate frames classify as `Unknown`.
    pub fn classify(&self, frame: &LandmarkFrame) -> GestureLabel {
        self.analyze(frame)
            .map(|f| f.label())
            .unwrap_or(GestureLabel::Unknown)
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:extension-ratio {:.2} :thumb-extension-ratio {:.2} :pinch-ratio {:.2} :min-palm-size {:.4})",
            self.config.extension_ratio,
            self.config.thumb_extension_ratio,
            self.config.pinch_ratio,
            self.config.min_palm_size,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
