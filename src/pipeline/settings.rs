//! Declarative per-stage settings
//!
//! The coordinator and the CLI speak only in these structs; the media backend
//! turns them into concrete elements.

use std::path::PathBuf;

use super::channel::{Channel, ChannelError};
use super::types::PixelFormat;

/// Format of the wall-clock overlay burned into the captured stream
pub const CLOCK_OVERLAY_FORMAT: &str = "%Y-%m-%d  %T";

/// Preview buffers kept before the oldest is dropped
pub const PREVIEW_MAX_BUFFERS: u32 = 2;

/// What the capture stage reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A V4L2 device node, e.g. `/dev/video0`
    Device(String),
    /// Built-in live test pattern, selected with `test` or `videotestsrc`
    TestPattern,
}

impl SourceKind {
    pub fn from_device(device: &str) -> Self {
        match device {
            "test" | "videotestsrc" => SourceKind::TestPattern,
            other => SourceKind::Device(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    pub source: SourceKind,
    pub channel: Channel,
    /// strftime-style overlay format, `None` disables the overlay
    pub clock_overlay: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSettings {
    pub channel: Channel,
    pub format: PixelFormat,
    pub max_buffers: u32,
    /// Drop the oldest buffer instead of blocking upstream when full
    pub drop_oldest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSettings {
    pub channel: Channel,
    pub output: PathBuf,
}

/// Settings of all three stages for one device and output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub capture: CaptureSettings,
    pub preview: PreviewSettings,
    pub recording: RecordingSettings,
}

impl SessionSettings {
    /// Wire capture, preview and recording to one channel named after the device
    pub fn new(device: &str, output: impl Into<PathBuf>) -> Result<Self, ChannelError> {
        let channel = Channel::for_device(device)?;

        Ok(Self {
            capture: CaptureSettings {
                source: SourceKind::from_device(device),
                channel: channel.clone(),
                clock_overlay: Some(CLOCK_OVERLAY_FORMAT.to_string()),
            },
            preview: PreviewSettings {
                channel: channel.clone(),
                format: PixelFormat::Rgba,
                max_buffers: PREVIEW_MAX_BUFFERS,
                drop_oldest: true,
            },
            recording: RecordingSettings {
                channel,
                output: output.into(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_shares_one_channel() {
        let settings = SessionSettings::new("/dev/video0", "out.mp4").unwrap();
        assert_eq!(settings.capture.channel, settings.preview.channel);
        assert_eq!(settings.capture.channel, settings.recording.channel);
        assert_eq!(settings.capture.source, SourceKind::Device("/dev/video0".into()));
        assert_eq!(settings.recording.output, PathBuf::from("out.mp4"));
        assert_eq!(settings.preview.max_buffers, 2);
        assert!(settings.preview.drop_oldest);
        assert_eq!(settings.preview.format, PixelFormat::Rgba);
    }

    #[test]
    fn test_test_pattern_source() {
        assert_eq!(SourceKind::from_device("test"), SourceKind::TestPattern);
        assert_eq!(SourceKind::from_device("videotestsrc"), SourceKind::TestPattern);
        assert_eq!(SourceKind::from_device("cam0"), SourceKind::Device("cam0".into()));
    }

    #[test]
    fn test_session_rejects_empty_device() {
        assert!(SessionSettings::new("", "out.mp4").is_err());
    }
}
