//! Frame scheduler: lifecycle, rate limiting and per-tick orchestration.
//!
//! The host calls `tick` from whatever pacing source it has (display
//! refresh, timer, test harness).  A tick is processed only when the
//! pipeline is running, the minimum interval has elapsed and the video
//! frame has advanced.  Processing polls the landmark source once and
//! runs classifier → tracker → mapper/gate, publishing one snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::classifier::{GeometryClassifier, GestureLabel};
use super::interaction::{InteractionMapper, InteractionState};
use super::landmarks::LandmarkFrame;
use super::stability::{GestureState, StabilityTracker};
use super::tick_timing::{TickOutcome, TickTiming};
use super::trigger::{TriggerEvent, TriggerGate};
use crate::config::PipelineConfig;
use crate::error::Result;

// ── Source ─────────────────────────────────────────────────

/// Upstream keypoint detector.
pub trait LandmarkSource {
    /// Current detection.  `Ok(None)` means no hand is visible; `Err`
    /// means the detector broke its contract (e.g. wrong point count).
    fn poll(&mut self) -> Result<Option<LandmarkFrame>>;

    /// Release any external resources.  Called on `stop`.
    fn release(&mut self) {}
}

// ── Clock ──────────────────────────────────────────────────

/// Monotonic millisecond clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl MonotonicClock {
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

// ── Config ─────────────────────────────────────────────────

/// Configuration for tick pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ticks closer than this to the last processed tick are dropped (ms).
    pub min_tick_interval_ms: f64,
    /// Number of processing-time samples kept for percentiles.
    pub stats_window: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_tick_interval_ms: 33.0,
            stats_window: 300,
        }
    }
}

// ── Snapshot ───────────────────────────────────────────────

/// Immutable result of one processed tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub timestamp_ms: f64,
    pub hand_present: bool,
    /// Unstabilized label for this frame, when a usable hand was seen.
    pub raw_label: Option<GestureLabel>,
    pub gesture: GestureState,
    pub interaction: InteractionState,
    /// Present only on the tick an action fires.
    pub trigger: Option<TriggerEvent>,
    /// Letter hold progress, 0..=100, for arming feedback.
    pub arming_progress: u8,
}

impl Default for PipelineSnapshot {
    fn default() -> Self {
        Self {
            timestamp_ms: 0.0,
            hand_present: false,
            raw_label: None,
            gesture: GestureState::default(),
            interaction: InteractionState::default(),
            trigger: None,
            arming_progress: 0,
        }
    }
}

impl PipelineSnapshot {
    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:t {:.0} :hand {} :raw {} :gesture {} :interaction {} :trigger {} :arming {})",
            self.timestamp_ms,
            if self.hand_present { "t" } else { "nil" },
            self.raw_label.map(|l| l.as_str()).unwrap_or("nil"),
            self.gesture.status_sexp(),
            self.interaction.status_sexp(),
            self.trigger.map(|e| e.kind.as_str()).unwrap_or("nil"),
            self.arming_progress,
        )
    }
}

// ── Session ────────────────────────────────────────────────

/// All per-run state.  Exists only between `start` and `stop`.
struct Session {
    classifier: GeometryClassifier,
    tracker: StabilityTracker,
    mapper: InteractionMapper,
    gate: TriggerGate,
    last_tick_ms: Option<f64>,
    last_video_time: Option<f64>,
    snapshot: PipelineSnapshot,
}

impl Session {
    fn new(config: &PipelineConfig) -> Self {
        Self {
            classifier: GeometryClassifier::new(config.classifier.clone()),
            tracker: StabilityTracker::new(config.stability.clone()),
            mapper: InteractionMapper::new(config.interaction.clone()),
            gate: TriggerGate::new(config.trigger.clone()),
            last_tick_ms: None,
            last_video_time: None,
            snapshot: PipelineSnapshot::default(),
        }
    }

    /// Run one frame through the pipeline.
    fn process(
        &mut self,
        frame: Option<LandmarkFrame>,
        now_ms: f64,
    ) -> (PipelineSnapshot, TickOutcome) {
        let had_frame = frame.is_some();
        let hand = frame.and_then(|f| self.classifier.analyze(&f).map(|features| (f, features)));

        let mut raw_label = None;
        let mut trigger = None;

        let outcome = match hand {
            Some((frame, features)) => {
                let raw = features.label();
                raw_label = Some(raw);
                self.mapper.observe_raw(raw);

                let gesture = self.tracker.update(raw, now_ms);
                if gesture.exceeds(self.mapper.config.act_threshold) {
                    self.mapper.update(gesture.label, &frame);
                }

                let decision = self.gate.evaluate(&gesture, now_ms);
                if let Some(lock_ms) = decision.lock_ms {
                    self.tracker.lock(now_ms, lock_ms);
                }
                trigger = decision.event;
                TickOutcome::Hand
            }
            None => {
                self.tracker.hand_absent(now_ms);
                self.mapper.relax();
                self.gate.hand_lost();
                if had_frame {
                    debug!("Degenerate landmark frame treated as no hand");
                    TickOutcome::Degenerate
                } else {
                    TickOutcome::Absent
                }
            }
        };

        self.snapshot = PipelineSnapshot {
            timestamp_ms: now_ms,
            hand_present: raw_label.is_some(),
            raw_label,
            gesture: self.tracker.state(),
            interaction: self.mapper.state(),
            trigger,
            arming_progress: self.gate.arming_progress(now_ms),
        };
        (self.snapshot, outcome)
    }
}

// ── Scheduler ──────────────────────────────────────────────

/// Owner of the landmark source and of all pipeline state.
pub struct FrameScheduler<S: LandmarkSource> {
    config: PipelineConfig,
    source: S,
    clock: MonotonicClock,
    session: Option<Session>,
    timing: TickTiming,
}

impl<S: LandmarkSource> FrameScheduler<S> {
    /// Create a stopped scheduler.  Fails if the config is out of range.
    pub fn new(config: PipelineConfig, source: S) -> Result<Self> {
        config.validate()?;
        let timing = TickTiming::new(config.scheduler.stats_window);
        Ok(Self {
            config,
            source,
            clock: MonotonicClock::default(),
            session: None,
            timing,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Create fresh pipeline state and begin accepting ticks.
    pub fn start(&mut self) {
        if self.session.is_some() {
            debug!("Gesture pipeline already running");
            return;
        }
        info!(
            "Gesture pipeline started (min tick interval {:.0}ms)",
            self.config.scheduler.min_tick_interval_ms
        );
        self.session = Some(Session::new(&self.config));
        self.timing = TickTiming::new(self.config.scheduler.stats_window);
    }

    /// Drop all state and release the source.  Safe at any time.
    pub fn stop(&mut self) {
        if self.session.take().is_some() {
            info!("Gesture pipeline stopped");
        }
        self.timing = TickTiming::new(self.config.scheduler.stats_window);
        self.source.release();
    }

    /// Return every component to its initial state without stopping.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.as_mut() {
            debug!("Gesture pipeline reset");
            *session = Session::new(&self.config);
        }
    }

    /// Offer a tick using the scheduler's own clock.
    pub fn tick(&mut self, video_time: f64) -> Result<Option<PipelineSnapshot>> {
        let now_ms = self.clock.now_ms();
        self.tick_at(now_ms, video_time)
    }

    /// Offer a tick at an explicit monotonic time.
    ///
    /// Returns `Ok(None)` when the tick was dropped (not running, too
    /// soon, or same video frame as last time).
    pub fn tick_at(&mut self, now_ms: f64, video_time: f64) -> Result<Option<PipelineSnapshot>> {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => {
                trace!("Tick ignored: pipeline not running");
                return Ok(None);
            }
        };

        if let Some(last) = session.last_tick_ms {
            if now_ms - last < self.config.scheduler.min_tick_interval_ms {
                self.timing.record(TickOutcome::RateLimited);
                return Ok(None);
            }
        }
        if session.last_video_time == Some(video_time) {
            self.timing.record(TickOutcome::Duplicate);
            return Ok(None);
        }
        session.last_tick_ms = Some(now_ms);
        session.last_video_time = Some(video_time);

        let started = Instant::now();
        let frame = match self.source.poll() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Landmark source error: {}", e);
                self.timing.record(TickOutcome::Error);
                return Err(e);
            }
        };

        let (snapshot, outcome) = session.process(frame, now_ms);
        self.timing.record(outcome);
        self.timing
            .record_processing(started.elapsed().as_secs_f64() * 1000.0);

        Ok(Some(snapshot))
    }

    /// Most recently published snapshot, if running.
    pub fn snapshot(&self) -> Option<PipelineSnapshot> {
        self.session.as_ref().map(|s| s.snapshot)
    }

    pub fn timing(&self) -> &TickTiming {
        &self.timing
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        match &self.session {
            Some(session) => format!(
                "(:running t :snapshot {} :trigger-gate {} :stats {})",
                session.snapshot.status_sexp(),
                session.gate.status_sexp(),
                self.timing.stats_sexp(),
            ),
            None => "(:running nil)".to_string(),
        }
    }
}

// ── Shared access ──────────────────────────────────────────

/// Scheduler behind a single exclusive-access boundary for hosts that
/// tick from more than one thread.  A tick that finds the scheduler busy
/// is dropped, never queued.
pub struct SharedScheduler<S: LandmarkSource> {
    inner: Arc<Mutex<FrameScheduler<S>>>,
    busy_drops: Arc<AtomicU64>,
}

impl<S: LandmarkSource> Clone for SharedScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            busy_drops: Arc::clone(&self.busy_drops),
        }
    }
}

impl<S: LandmarkSource> SharedScheduler<S> {
    pub fn new(scheduler: FrameScheduler<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
            busy_drops: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Tick if no other tick is in progress; otherwise drop it.
    pub fn try_tick_at(&self, now_ms: f64, video_time: f64) -> Result<Option<PipelineSnapshot>> {
        match self.inner.try_lock() {
            Some(mut scheduler) => scheduler.tick_at(now_ms, video_time),
            None => {
                self.busy_drops.fetch_add(1, Ordering::Relaxed);
                trace!("Tick dropped: scheduler busy");
                Ok(None)
            }
        }
    }

    /// Run a control operation (start, stop, reset, inspection).
    pub fn with<R>(&self, f: impl FnOnce(&mut FrameScheduler<S>) -> R) -> R {
        let mut scheduler = self.inner.lock();
        f(&mut scheduler)
    }

    /// Ticks dropped because another tick held the scheduler.
    pub fn busy_drops(&self) -> u64 {
        self.busy_drops.load(Ordering::Relaxed)
    }
}

// ── Tests ──────────────────────────────────────────────────
