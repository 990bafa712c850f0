//! Gesture pipeline - hand keypoints to stable gestures, control axes
//! and rate-limited action triggers.
//!
//! The host owns the camera and the keypoint detector; it hands frames to
//! a `FrameScheduler` through the `LandmarkSource` trait and reads back a
//! `PipelineSnapshot` per processed tick.

pub mod config;
pub mod error;
pub mod gesture;
pub mod replay;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use gesture::{FrameScheduler, LandmarkSource, PipelineSnapshot, SharedScheduler};
