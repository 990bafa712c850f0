//! Tick accounting for the frame scheduler.
//!
//! Counts what happened to every tick offered by the host and keeps a
//! bounded rolling window of processing times for percentile reporting.

use std::collections::VecDeque;

/// Why a tick was not processed, or how a processed tick resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Arrived before the minimum interval elapsed.
    RateLimited,
    /// Video frame had not advanced.
    Duplicate,
    /// Processed with a hand present.
    Hand,
    /// Processed with no hand visible.
    Absent,
    /// Processed, but the frame geometry was unusable.
    Degenerate,
    /// The landmark source reported an error.
    Error,
}

/// Rolling tick statistics.
#[derive(Debug)]
pub struct TickTiming {
    /// Per-tick processing time (ms), oldest first.
    pub processing_times: VecDeque<f64>,
    /// Maximum number of samples to keep.
    pub window_size: usize,
    pub rate_limited: u64,
    pub duplicate: u64,
    pub hand: u64,
    pub absent: u64,
    pub degenerate: u64,
    pub errors: u64,
}

impl Default for TickTiming {
    fn default() -> Self {
        Self::new(300)
    }
}

impl TickTiming {
    pub fn new(window_size: usize) -> Self {
        Self {
            processing_times: VecDeque::with_capacity(window_size),
            window_size,
            rate_limited: 0,
            duplicate: 0,
            hand: 0,
            absent: 0,
            degenerate: 0,
            errors: 0,
        }
    }

    pub fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::RateLimited => self.rate_limited += 1,
            TickOutcome::Duplicate => self.duplicate += 1,
            TickOutcome::Hand => self.hand += 1,
            TickOutcome::Absent => self.absent += 1,
            TickOutcome::Degenerate => self.degenerate += 1,
            TickOutcome::Error => self.errors += 1,
        }
    }

    /// Record how long a processed tick took.
    pub fn record_processing(&mut self, ms: f64) {
        self.processing_times.push_back(ms);
        while self.processing_times.len() > self.window_size {
            self.processing_times.pop_front();
        }
    }

    /// Ticks that ran the pipeline.
    pub fn processed(&self) -> u64 {
        self.hand + self.absent + self.degenerate
    }

    /// Ticks that were skipped before polling the source.
    pub fn dropped(&self) -> u64 {
        self.rate_limited + self.duplicate
    }

    /// Compute percentile from a sorted slice.
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    pub fn stats(&self) -> TickTimingStats {
        let mut sorted: Vec<f64> = self.processing_times.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        TickTimingStats {
            processing_p50: Self::percentile(&sorted, 50.0),
            processing_p99: Self::percentile(&sorted, 99.0),
            processed: self.processed(),
            dropped: self.dropped(),
            absent: self.absent,
            degenerate: self.degenerate,
            errors: self.errors,
        }
    }

    /// Format stats as an s-expression for IPC.
    pub fn stats_sexp(&self) -> String {
        let s = self.stats();
        format!(
            "(:processing-p50 {:.3} :processing-p99 {:.3} :processed {} :dropped {} :absent {} :degenerate {} :errors {})",
            s.processing_p50, s.processing_p99, s.processed, s.dropped, s.absent, s.degenerate, s.errors,
        )
    }
}

/// Computed tick statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TickTimingStats {
    pub processing_p50: f64,
    pub processing_p99: f64,
    pub processed: u64,
    pub dropped: u64,
    pub absent: u64,
    pub degenerate: u64,
    pub errors: u64,
}
