//! Golden hand poses shared by the unit tests.
//!
//! All poses share the same palm: wrist at (0.5, 0.8), middle MCP at
//! (0.5, 0.6), so `palm_size` is 0.2.  Fingers point up the image.

use super::landmarks::{HandJoint, Landmark, LandmarkFrame, LANDMARK_COUNT};

#[derive(Clone, Copy)]
enum Finger {
    Extended,
    Curled,
}

#[derive(Clone, Copy)]
enum Thumb {
    /// Spread away from the palm.
    Out,
    /// Folded across the palm toward the pinky base.
    Tucked,
    /// Pointing up above the index knuckle.
    Up,
    /// Touching a curled index fingertip.
    Pinch,
}

const MCP: [(HandJoint, f32, f32); 4] = [
    (HandJoint::IndexMcp, 0.45, 0.62),
    (HandJoint::MiddleMcp, 0.50, 0.60),
    (HandJoint::RingMcp, 0.55, 0.62),
    (HandJoint::PinkyMcp, 0.60, 0.64),
];

fn build(fingers: [Finger; 4], thumb: Thumb) -> LandmarkFrame {
    let mut points = [Landmark::default(); LANDMARK_COUNT];
    points[HandJoint::Wrist.index()] = Landmark::new(0.5, 0.8, 0.0);

    for (f, (mcp, x, y)) in MCP.iter().enumerate() {
        let base = mcp.index();
        points[base] = Landmark::new(*x, *y, 0.0);
        let (pip, dip, tip) = match fingers[f] {
            Finger::Extended => (y - 0.06, y - 0.10, y - 0.14),
            Finger::Curled => (y - 0.05, y - 0.02, y + 0.02),
        };
        points[base + 1] = Landmark::new(*x, pip, 0.0);
        points[base + 2] = Landmark::new(*x, dip, 0.0);
        points[base + 3] = Landmark::new(*x, tip, 0.0);
    }

    let (mcp, ip, tip) = match thumb {
        Thumb::Out => ((0.38, 0.71), (0.35, 0.67), (0.30, 0.62)),
        Thumb::Tucked => ((0.42, 0.70), (0.48, 0.68), (0.55, 0.66)),
        Thumb::Up => ((0.41, 0.68), (0.40, 0.60), (0.40, 0.50)),
        Thumb::Pinch => ((0.40, 0.70), (0.42, 0.66), (0.455, 0.645)),
    };
    points[HandJoint::ThumbCmc.index()] = Landmark::new(0.42, 0.76, 0.0);
    points[HandJoint::ThumbMcp.index()] = Landmark::new(mcp.0, mcp.1, 0.0);
    points[HandJoint::ThumbIp.index()] = Landmark::new(ip.0, ip.1, 0.0);
    points[HandJoint::ThumbTip.index()] = Landmark::new(tip.0, tip.1, 0.0);

    LandmarkFrame::new(points)
}

use Finger::{Curled as C, Extended as E};

pub fn open_full() -> LandmarkFrame {
    build([E, E, E, E], Thumb::Out)
}

pub fn open_no_thumb() -> LandmarkFrame {
    build([E, E, E, E], Thumb::Tucked)
}

pub fn fist_closed() -> LandmarkFrame {
    build([C, C, C, C], Thumb::Tucked)
}

pub fn fist_thumb() -> LandmarkFrame {
    build([C, C, C, C], Thumb::Up)
}

pub fn pointing() -> LandmarkFrame {
    build([E, E, C, C], Thumb::Tucked)
}

/// Two-finger pose with the index and middle tips spread apart.
pub fn victory() -> LandmarkFrame {
    let mut points = *pointing().points();
    points[HandJoint::IndexTip.index()].x = 0.38;
    points[HandJoint::MiddleTip.index()].x = 0.56;
    LandmarkFrame::new(points)
}

/// Curled index pinched by the thumb, other three fingers up.
pub fn ok() -> LandmarkFrame {
    build([C, E, E, E], Thumb::Pinch)
}

/// Only the index extended: matches none of the rules.
pub fn index_only() -> LandmarkFrame {
    build([E, C, C, C], Thumb::Tucked)
}

/// Every point at the same spot: palm size is zero.
pub fn collapsed() -> LandmarkFrame {
    LandmarkFrame::new([Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT])
}
