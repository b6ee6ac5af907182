use std::path::{Path, PathBuf};
use std::time::Duration;

use gstreamer as gst;
use gstreamer::Pipeline;
use log::{info, warn};

use crate::pipeline::error::StageError;
use crate::pipeline::settings::RecordingSettings;
use crate::pipeline::stage::{RecordingSink, Stage};
use crate::pipeline::state::StageState;
use crate::pipeline::types::FlushOutcome;
use crate::utils::gist::{self, Error, GstStage};

/// Channel → H.264 → MP4 file
///
/// The pipeline is built once and cycled between `Null` and `Playing`; every
/// start reopens and truncates the output file.
pub struct RecordingStage {
    stage: GstStage,
    output: PathBuf,
}

impl RecordingStage {
    pub fn new(settings: &RecordingSettings) -> Result<Self, StageError> {
        let pipeline = build_pipeline(settings)?;
        Ok(Self {
            stage: GstStage::new("recording", pipeline)?,
            output: settings.output.clone(),
        })
    }
}

fn build_pipeline(settings: &RecordingSettings) -> Result<Pipeline, Error> {
    let location = settings.output.to_str().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("output path {} is not valid UTF-8", settings.output.display()),
        )
    })?;

    let src = gst::ElementFactory::make("intervideosrc")
        .name("recording-source")
        .property("channel", settings.channel.name())
        .build()?;

    let raw_queue = gst::ElementFactory::make("queue")
        .name("recording-raw-queue")
        .build()?;

    let video_convert = gst::ElementFactory::make("videoconvert")
        .name("recording-convert")
        .build()?;

    let video_encoder = gst::ElementFactory::make("x264enc")
        .name("recording-encoder")
        .build()?;

    let parser = gst::ElementFactory::make("h264parse")
        .name("recording-parser")
        .build()?;

    let encoded_queue = gst::ElementFactory::make("queue")
        .name("recording-encoded-queue")
        .build()?;

    let muxer = gst::ElementFactory::make("qtmux")
        .name("recording-muxer")
        .build()?;

    let sink = gst::ElementFactory::make("filesink")
        .name("recording-sink")
        .property("location", location)
        .build()?;

    gist::assemble(
        "recording",
        &[
            &src,
            &raw_queue,
            &video_convert,
            &video_encoder,
            &parser,
            &encoded_queue,
            &muxer,
            &sink,
        ],
    )
}

impl Stage for RecordingStage {
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

impl RecordingSink for RecordingStage {
    fn start(&mut self) -> Result<(), StageError> {
        if !self.state().can_start() {
            return Err(StageError::AlreadyRecording);
        }

        if self.output.exists() {
            warn!("Overwriting {}", self.output.display());
        }

        self.stage.set_state(StageState::Playing)?;
        info!("Recording started: {}", self.output.display());
        Ok(())
    }

    fn stop(&mut self, flush_timeout: Duration) -> Result<FlushOutcome, StageError> {
        if self.state() == StageState::Null {
            return Ok(FlushOutcome::NotRecording);
        }

        let flushed = self.stage.drain(flush_timeout);
        // close the file whether or not the flush made it
        self.stage.set_state(StageState::Null)?;

        Ok(if flushed {
            FlushOutcome::Complete
        } else {
            FlushOutcome::PossiblyTruncated
        })
    }

    fn output(&self) -> &Path {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureSource;
    use crate::pipeline::settings::SessionSettings;

    #[test]
    #[ignore = "needs GStreamer with the base, good, bad and ugly plugins installed"]
    fn test_records_test_pattern_to_one_file() {
        gist::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("capture.mp4");
        let settings = SessionSettings::new("videotestsrc", &output).unwrap();

        let mut capture = CaptureSource::new(&settings.capture).unwrap();
        let mut recording = RecordingStage::new(&settings.recording).unwrap();

        assert_eq!(
            recording.stop(Duration::from_secs(1)).unwrap(),
            FlushOutcome::NotRecording
        );

        capture.set_state(StageState::Playing).unwrap();
        recording.start().unwrap();
        assert!(matches!(recording.start(), Err(StageError::AlreadyRecording)));

        std::thread::sleep(Duration::from_secs(2));

        let outcome = recording.stop(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome, FlushOutcome::Complete);
        assert_eq!(recording.state(), StageState::Null);
        capture.teardown().unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }
}
