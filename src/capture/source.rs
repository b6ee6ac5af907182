use std::time::Duration;

use gstreamer as gst;
use gstreamer::{Element, Pipeline};
use log::info;

use crate::pipeline::error::StageError;
use crate::pipeline::settings::{CaptureSettings, SourceKind};
use crate::pipeline::stage::{FrameSource, Stage};
use crate::pipeline::state::StageState;
use crate::utils::gist::{self, GstStage};

/// Device (or test pattern) → clock overlay → inter-pipeline channel
pub struct CaptureSource {
    stage: GstStage,
}

impl CaptureSource {
    pub fn new(settings: &CaptureSettings) -> Result<Self, StageError> {
        let pipeline = build_pipeline(settings)?;
        info!(
            "Capture from {:?} into channel '{}'",
            settings.source, settings.channel
        );
        Ok(Self {
            stage: GstStage::new("capture", pipeline)?,
        })
    }
}

fn build_pipeline(settings: &CaptureSettings) -> Result<Pipeline, gist::Error> {
    let source = match &settings.source {
        SourceKind::Device(device) => gst::ElementFactory::make("v4l2src")
            .name("capture-source")
            .property("device", device.as_str())
            .build()?,
        SourceKind::TestPattern => gst::ElementFactory::make("videotestsrc")
            .name("capture-source")
            .property("is-live", true)
            .build()?,
    };

    let overlay = settings
        .clock_overlay
        .as_deref()
        .map(|format| {
            gst::ElementFactory::make("clockoverlay")
                .name("clock-overlay")
                .property("time-format", format)
                .build()
        })
        .transpose()?;

    let sink = gst::ElementFactory::make("intervideosink")
        .name("capture-sink")
        .property("channel", settings.channel.name())
        .build()?;

    let mut elements: Vec<&Element> = vec![&source];
    elements.extend(overlay.as_ref());
    elements.push(&sink);

    gist::assemble("capture", &elements)
}

impl Stage for CaptureSource {
    fn name(&self) -> &str {
        self.stage.name()
    }

    fn state(&self) -> StageState {
        self.stage.state()
    }

    fn set_state(&mut self, state: StageState) -> Result<(), StageError> {
        Ok(self.stage.set_state(state)?)
    }

    fn take_fault(&mut self) -> Option<StageError> {
        let message = self.stage.poll_error()?;
        Some(StageError::fault(self.stage.name(), message))
    }
}

impl FrameSource for CaptureSource {
    fn position(&self) -> Option<Duration> {
        self.stage.position()
    }

    fn duration(&self) -> Option<Duration> {
        self.stage.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::settings::SessionSettings;

    #[test]
    #[ignore = "needs GStreamer with the base and bad plugins installed"]
    fn test_test_pattern_reaches_playing() {
        gist::init().unwrap();
        let settings = SessionSettings::new("videotestsrc", "unused.mp4").unwrap();
        let mut capture = CaptureSource::new(&settings.capture).unwrap();

        capture.set_state(StageState::Playing).unwrap();
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(capture.state(), StageState::Playing);
        assert!(capture.take_fault().is_none());
        // live sources have no end
        assert_eq!(capture.duration(), None);

        capture.teardown().unwrap();
        assert_eq!(capture.state(), StageState::Null);
    }
}
