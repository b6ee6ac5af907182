//! In-memory stages for exercising the coordinator without a device

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use super::error::StageError;
use super::stage::{FrameSource, PreviewSink, RecordingSink, Stage};
use super::state::StageState;
use super::types::{FlushOutcome, Frame, FrameGeometry, PixelFormat};

pub fn frame(width: u32, height: u32, fill: u8) -> Frame {
    let geometry = FrameGeometry::new(width, height);
    Frame::new(
        geometry,
        PixelFormat::Rgba,
        vec![fill; geometry.byte_len(PixelFormat::Rgba)],
    )
}

#[derive(Default)]
struct LogInner {
    transitions: Vec<(String, StageState)>,
    teardowns: Vec<String>,
}

/// Shared record of what the coordinator asked every stage to do
#[derive(Clone, Default)]
pub struct StageLog(Rc<RefCell<LogInner>>);

impl StageLog {
    pub fn transitions(&self) -> Vec<(String, StageState)> {
        self.0.borrow().transitions.clone()
    }

    pub fn teardowns(&self) -> Vec<String> {
        self.0.borrow().teardowns.clone()
    }

    fn transition(&self, stage: &str, state: StageState) {
        self.0.borrow_mut().transitions.push((stage.to_string(), state));
    }

    fn teardown(&self, stage: &str) {
        self.0.borrow_mut().teardowns.push(stage.to_string());
    }
}

#[derive(Default)]
struct CaptureInner {
    state: StageState,
    position: Option<Duration>,
    duration: Option<Duration>,
    fault: Option<String>,
}

#[derive(Clone)]
pub struct FakeCapture {
    inner: Rc<RefCell<CaptureInner>>,
    log: StageLog,
}

impl FakeCapture {
    pub fn new(log: &StageLog) -> Self {
        Self {
            inner: Rc::default(),
            log: log.clone(),
        }
    }

    pub fn set_clock(&self, position: Option<Duration>, duration: Option<Duration>) {
        let mut inner = self.inner.borrow_mut();
        inner.position = position;
        inner.duration = duration;
    }

    pub fn inject_fault(&self, message: &str) {
        self.inner.borrow_mut().fault = Some(message.to_string());
    }
}

impl Stage for FakeCapture {
    fn name(&self) -> &str {
        "capture"
    }

    fn state(&self) -> StageState {
        self.inner.borrow().state
    }

    fn set_state(&mut self, state: StageState) -> Result<(), StageError> {
        self.log.transition(self.name(), state);
        self.inner.borrow_mut().state = state;
        Ok(())
    }

    fn take_fault(&mut self) -> Option<StageError> {
        let message = self.inner.borrow_mut().fault.take()?;
        Some(StageError::fault(self.name(), message))
    }

    fn teardown(&mut self) -> Result<(), StageError> {
        self.log.teardown(self.name());
        self.inner.borrow_mut().state = StageState::Null;
        Ok(())
    }
}

impl FrameSource for FakeCapture {
    fn position(&self) -> Option<Duration> {
        self.inner.borrow().position
    }

    fn duration(&self) -> Option<Duration> {
        self.inner.borrow().duration
    }
}

#[derive(Default)]
struct PreviewInner {
    state: StageState,
    frames: VecDeque<Frame>,
    seeks: Vec<Duration>,
    pull_timeouts: Vec<Duration>,
}

#[derive(Clone)]
pub struct FakePreview {
    inner: Rc<RefCell<PreviewInner>>,
    log: StageLog,
}

impl FakePreview {
    pub fn new(log: &StageLog) -> Self {
        Self {
            inner: Rc::default(),
            log: log.clone(),
        }
    }

    pub fn push_frame(&self, frame: Frame) {
        self.inner.borrow_mut().frames.push_back(frame);
    }

    /// Change the state behind the coordinator's back
    pub fn force_state(&self, state: StageState) {
        self.inner.borrow_mut().state = state;
    }

    pub fn seeks(&self) -> Vec<Duration> {
        self.inner.borrow().seeks.clone()
    }

    pub fn pull_timeouts(&self) -> Vec<Duration> {
        self.inner.borrow().pull_timeouts.clone()
    }
}

impl Stage for FakePreview {
    fn name(&self) -> &str {
        "preview"
    }

    fn state(&self) -> StageState {
        self.inner.borrow().state
    }

    fn set_state(&mut self, state: StageState) -> Result<(), StageError> {
        self.log.transition(self.name(), state);
        self.inner.borrow_mut().state = state;
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), StageError> {
        self.log.teardown(self.name());
        self.inner.borrow_mut().state = StageState::Null;
        Ok(())
    }
}

impl PreviewSink for FakePreview {
    fn pull_frame(&mut self, timeout: Duration) -> Result<Option<Frame>, StageError> {
        let mut inner = self.inner.borrow_mut();
        inner.pull_timeouts.push(timeout);
        Ok(inner.frames.pop_front())
    }

    fn seek(&mut self, target: Duration) -> Result<(), StageError> {
        self.inner.borrow_mut().seeks.push(target);
        Ok(())
    }
}

#[derive(Default)]
struct RecorderInner {
    state: StageState,
    starts: usize,
    stops: usize,
    flush_timeouts: Vec<Duration>,
    outcome: Option<FlushOutcome>,
}

/// Writes a placeholder file on start, the way a muxer would create it
#[derive(Clone)]
pub struct FakeRecorder {
    inner: Rc<RefCell<RecorderInner>>,
    log: StageLog,
    output: PathBuf,
}

impl FakeRecorder {
    pub fn new(log: &StageLog, output: PathBuf) -> Self {
        Self {
            inner: Rc::default(),
            log: log.clone(),
            output,
        }
    }

    pub fn force_state(&self, state: StageState) {
        self.inner.borrow_mut().state = state;
    }

    pub fn set_outcome(&self, outcome: FlushOutcome) {
        self.inner.borrow_mut().outcome = Some(outcome);
    }

    pub fn starts(&self) -> usize {
        self.inner.borrow().starts
    }

    pub fn stops(&self) -> usize {
        self.inner.borrow().stops
    }

    pub fn flush_timeouts(&self) -> Vec<Duration> {
        self.inner.borrow().flush_timeouts.clone()
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone()
    }
}

impl Stage for FakeRecorder {
    fn name(&self) -> &str {
        "recording"
    }

    fn state(&self) -> StageState {
        self.inner.borrow().state
    }

    fn set_state(&mut self, state: StageState) -> Result<(), StageError> {
        self.log.transition(self.name(), state);
        self.inner.borrow_mut().state = state;
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), StageError> {
        self.log.teardown(self.name());
        self.inner.borrow_mut().state = StageState::Null;
        Ok(())
    }
}

impl RecordingSink for FakeRecorder {
    fn start(&mut self) -> Result<(), StageError> {
        if self.state() == StageState::Playing {
            return Err(StageError::AlreadyRecording);
        }

        let mut file = File::create(&self.output).map_err(|e| StageError::fault("recording", e.to_string()))?;
        file.write_all(b"ftyp")
            .map_err(|e| StageError::fault("recording", e.to_string()))?;

        let mut inner = self.inner.borrow_mut();
        inner.state = StageState::Playing;
        inner.starts += 1;
        Ok(())
    }

    fn stop(&mut self, flush_timeout: Duration) -> Result<FlushOutcome, StageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.state == StageState::Null {
            return Ok(FlushOutcome::NotRecording);
        }
        inner.state = StageState::Null;
        inner.stops += 1;
        inner.flush_timeouts.push(flush_timeout);
        Ok(inner.outcome.unwrap_or(FlushOutcome::Complete))
    }

    fn output(&self) -> &Path {
        &self.output
    }
}
