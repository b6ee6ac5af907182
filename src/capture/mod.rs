//! Capture stage
//!
//! Reads a V4L2 device (or the built-in test pattern), burns a wall-clock
//! overlay into each frame and publishes the stream on a named channel for
//! the preview and recording stages to consume.

mod source;

pub use source::CaptureSource;
