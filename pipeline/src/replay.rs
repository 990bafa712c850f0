//! Recorded landmark scripts.
//!
//! A script is JSON lines, one detector result per line:
//!
//! ```text
//! {"t_ms": 0.0, "landmarks": [[0.5, 0.8, 0.0], ...21 points]}
//! {"t_ms": 33.3, "landmarks": null}
//! ```
//!
//! `ReplaySource` plays a script back through the `LandmarkSource` trait so
//! recorded sessions can be run through the pipeline without a camera.

use std::collections::VecDeque;
use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::gesture::{Landmark, LandmarkFrame, LandmarkSource};

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    /// Capture time of the video frame (ms).
    pub t_ms: f64,
    /// Detected points, or `None` when no hand was found.
    pub landmarks: Option<Vec<[f32; 3]>>,
}

impl ReplayRecord {
    /// Convert to the detector result the pipeline consumes.
    pub fn frame(&self) -> Result<Option<LandmarkFrame>> {
        match &self.landmarks {
            None => Ok(None),
            Some(points) => {
                let points: Vec<Landmark> = points
                    .iter()
                    .map(|[x, y, z]| Landmark::new(*x, *y, *z))
                    .collect();
                LandmarkFrame::from_points(&points).map(Some)
            }
        }
    }
}

/// Landmark source backed by a parsed script.
#[derive(Debug, Default)]
pub struct ReplaySource {
    records: VecDeque<ReplayRecord>,
    current: Option<ReplayRecord>,
}

impl ReplaySource {
    pub fn new(records: impl IntoIterator<Item = ReplayRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
            current: None,
        }
    }

    /// Parse a JSON-lines script.  Blank lines are skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut records = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| PipelineError::Source(format!("line {}: {}", n + 1, e)))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: ReplayRecord = serde_json::from_str(line)
                .map_err(|e| PipelineError::Source(format!("line {}: {}", n + 1, e)))?;
            records.push(record);
        }
        debug!("Parsed replay script: {} records", records.len());
        Ok(Self::new(records))
    }

    /// Move to the next record.  Returns its video time, or `None` at the
    /// end of the script.
    pub fn advance(&mut self) -> Option<f64> {
        self.current = self.records.pop_front();
        self.current.as_ref().map(|r| r.t_ms)
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl LandmarkSource for ReplaySource {
    fn poll(&mut self) -> Result<Option<LandmarkFrame>> {
        match &self.current {
            Some(record) => record.frame(),
            None => Ok(None),
        }
    }

    fn release(&mut self) {
        self.records.clear();
        self.current = None;
    }
}

// ── Tests ──────────────────────────────────────────────────
