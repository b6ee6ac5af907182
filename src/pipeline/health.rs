//! Health counters for a preview/record session

use std::time::{Duration, Instant};

/// Health metrics for a session
///
/// Only the coordinator's tick touches these, so plain counters suffice.
#[derive(Debug)]
pub struct PipelineHealth {
    /// Frames pulled from the preview stage
    frames_pulled: u64,

    /// Pulls that returned nothing within the timeout
    empty_pulls: u64,

    /// Frames dropped because their geometry did not match their buffer
    frame_drops: u64,

    /// Recording sessions started
    recordings: u64,

    /// Recording sessions whose flush timed out or failed
    truncated_recordings: u64,

    /// Instant of the last successfully pulled frame
    last_frame: Instant,

    /// Whether the current stall was already reported
    stall_reported: bool,
}

impl PipelineHealth {
    pub fn new() -> Self {
        Self {
            frames_pulled: 0,
            empty_pulls: 0,
            frame_drops: 0,
            recordings: 0,
            truncated_recordings: 0,
            last_frame: Instant::now(),
            stall_reported: false,
        }
    }

    /// Record a successfully pulled frame
    pub fn record_frame(&mut self) {
        self.frames_pulled += 1;
        self.last_frame = Instant::now();
        self.stall_reported = false;
    }

    /// Start a fresh stall window, e.g. after a deliberate pause
    pub fn restart_stall_clock(&mut self) {
        self.last_frame = Instant::now();
        self.stall_reported = false;
    }

    pub fn record_empty_pull(&mut self) {
        self.empty_pulls += 1;
    }

    pub fn record_frame_drop(&mut self) {
        self.frame_drops += 1;
    }

    pub fn record_recording(&mut self) {
        self.recordings += 1;
    }

    pub fn record_truncated_recording(&mut self) {
        self.truncated_recordings += 1;
    }

    pub fn frames_pulled(&self) -> u64 {
        self.frames_pulled
    }

    pub fn empty_pulls(&self) -> u64 {
        self.empty_pulls
    }

    pub fn frame_drops(&self) -> u64 {
        self.frame_drops
    }

    pub fn recordings(&self) -> u64 {
        self.recordings
    }

    pub fn truncated_recordings(&self) -> u64 {
        self.truncated_recordings
    }

    /// Check if the stream has stalled (no frames for given duration)
    pub fn is_stalled(&self, threshold: Duration) -> bool {
        self.last_frame.elapsed() > threshold
    }

    /// Report a stall once per stall episode
    ///
    /// Returns the time since the last frame the first time the threshold is
    /// crossed, `None` afterwards until a frame arrives again.
    pub fn take_stall(&mut self, threshold: Duration) -> Option<Duration> {
        if self.stall_reported || !self.is_stalled(threshold) {
            return None;
        }
        self.stall_reported = true;
        Some(self.last_frame.elapsed())
    }

    /// Get a summary of health metrics
    pub fn summary(&self) -> HealthSummary {
        HealthSummary {
            frames_pulled: self.frames_pulled,
            empty_pulls: self.empty_pulls,
            frame_drops: self.frame_drops,
            recordings: self.recordings,
            truncated_recordings: self.truncated_recordings,
        }
    }
}

impl Default for PipelineHealth {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of health metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSummary {
    pub frames_pulled: u64,
    pub empty_pulls: u64,
    pub frame_drops: u64,
    pub recordings: u64,
    pub truncated_recordings: u64,
}

impl std::fmt::Display for HealthSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "frames={} empty_pulls={} drops={} recordings={} truncated={}",
            self.frames_pulled,
            self.empty_pulls,
            self.frame_drops,
            self.recordings,
            self.truncated_recordings
        )
    }
}
