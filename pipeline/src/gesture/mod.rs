//! Gesture subsystem: hand keypoints to stable labels, control axes and
//! one-shot action triggers.
//!
//! Provides:
//! - `landmarks`: 21-point hand frame and joint indexing
//! - `classifier`: rule-based per-frame gesture labels
//! - `stability`: hysteresis confidence counter with post-action lock
//! - `interaction`: smoothed rotation/scale/position axes
//! - `trigger`: cooldown- and hold-gated discrete actions
//! - `scheduler`: lifecycle, rate limiting and per-tick orchestration

pub mod classifier;
pub mod interaction;
pub mod landmarks;
pub mod scheduler;
pub mod stability;
pub mod tick_timing;
pub mod trigger;

#[cfg(test)]
pub(crate) mod fixtures;

pub use classifier::{ClassifierConfig, GeometryClassifier, GestureLabel, HandFeatures};
pub use interaction::{InteractionConfig, InteractionMapper, InteractionState};
pub use landmarks::{HandJoint, Landmark, LandmarkFrame, LANDMARK_COUNT};
pub use scheduler::{
    FrameScheduler, LandmarkSource, MonotonicClock, PipelineSnapshot, SchedulerConfig,
    SharedScheduler,
};
pub use stability::{GestureState, LabelRates, StabilityConfig, StabilityTracker, MAX_CONFIDENCE};
pub use tick_timing::{TickOutcome, TickTiming, TickTimingStats};
pub use trigger::{ModeKind, TriggerConfig, TriggerDecision, TriggerEvent, TriggerGate, TriggerKind};
