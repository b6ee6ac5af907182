//! Capture/preview/record pipeline
//!
//! Three independently controlled stages share one inter-pipeline channel:
//! - Capture: device → clock overlay → channel
//! - Preview: channel → RGBA frames pulled by the display loop
//! - Recording: channel → H.264 → MP4 file, started and stopped on demand
//!
//! # Architecture
//!
//! The [`coordinator::Coordinator`] owns the stages through the traits in
//! [`stage`] and is driven one tick at a time by the window loop. All
//! operator-visible state (pause, recording, position, the display surface
//! and its layout) lives in the coordinator; the stages only report what
//! their media runtime is doing.

pub mod channel;
pub mod clock;
pub mod coordinator;
pub mod error;
pub mod health;
pub mod layout;
pub mod settings;
pub mod stage;
pub mod state;
pub mod types;

#[cfg(test)]
mod testing;

