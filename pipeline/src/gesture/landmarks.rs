//! Hand landmark data model.
//!
//! Models the 21 keypoints per hand produced by the upstream detector
//! (MediaPipe hand-landmarker ordering).  Coordinates are normalized to
//! the image: x grows to the right, y grows downward, both in 0..1.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

// ── Joint definitions ──────────────────────────────────────

/// The 21 hand keypoints in detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Number of keypoints in a present hand.
pub const LANDMARK_COUNT: usize = 21;

/// Values per keypoint in the flat detector layout (x, y, z).
const COORDS_PER_POINT: usize = 3;

impl HandJoint {
    /// Array index of this joint (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }
}

/// The four non-thumb fingers, each as (pip joint, tip joint).
pub const FINGERS: [(HandJoint, HandJoint); 4] = [
    (HandJoint::IndexPip, HandJoint::IndexTip),
    (HandJoint::MiddlePip, HandJoint::MiddleTip),
    (HandJoint::RingPip, HandJoint::RingTip),
    (HandJoint::PinkyPip, HandJoint::PinkyTip),
];

// ── Landmark ───────────────────────────────────────────────

/// A single normalized keypoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Relative depth.  Carried through but not interpreted.
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ── Frame ──────────────────────────────────────────────────

/// One hand's keypoints for one video frame.
///
/// A value of this type always holds exactly 21 points; "no hand" is
/// expressed as `Option::None` by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build a frame from a detector point list.
    pub fn from_points(points: &[Landmark]) -> Result<Self> {
        let points: [Landmark; LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| PipelineError::MalformedFrame {
                    expected: LANDMARK_COUNT,
                    actual: points.len(),
                })?;
        Ok(Self { points })
    }

    /// Build a frame from the flat `[x0, y0, z0, x1, ...]` layout.
    pub fn from_flat(data: &[f32]) -> Result<Self> {
        let expected = LANDMARK_COUNT * COORDS_PER_POINT;
        if data.len() != expected {
            return Err(PipelineError::MalformedFrame {
                expected,
                actual: data.len(),
            });
        }
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (point, chunk) in points.iter_mut().zip(data.chunks_exact(COORDS_PER_POINT)) {
            *point = Landmark::new(chunk[0], chunk[1], chunk[2]);
        }
        Ok(Self { points })
    }

    pub fn point(&self, joint: HandJoint) -> Landmark {
        self.points[joint.index()]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    /// Image-plane distance between two joints.
    pub fn distance(&self, a: HandJoint, b: HandJoint) -> f32 {
        let p1 = self.point(a);
        let p2 = self.point(b);
        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(Landmark::is_finite)
    }

    /// Copy of this frame shifted in the image plane.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let mut points = self.points;
        for p in &mut points {
            p.x += dx;
            p.y += dy;
        }
        Self { points }
    }
}

// ── Tests ──────────────────────────────────────────────────
