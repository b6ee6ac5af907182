//! Capture/preview/record coordinator
//!
//! Owns the three stages, applies operator input to them and pulls preview
//! frames into the display surface, one tick at a time.

use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::display::surface::DisplaySurface;
use crate::pipeline::clock::{progress_fraction, seek_target, time_label};
use crate::pipeline::error::StageError;
use crate::pipeline::health::PipelineHealth;
use crate::pipeline::layout::{ProgressBar, ViewportLayout};
use crate::pipeline::stage::{FrameSource, PreviewSink, RecordingSink, Stage};
use crate::pipeline::state::{PlaybackState, SessionState, StageState};
use crate::pipeline::types::{Frame, InputEvent, Point, Viewport};

/// Stage the pause control acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PauseTarget {
    /// Freeze the on-screen preview only; capture and recording keep running
    #[default]
    Preview,
    /// Halt the capture device itself, which also starves the recording
    Capture,
}

/// Timing knobs of the coordinator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorOptions {
    /// Longest a tick waits for a preview frame
    pub pull_timeout: Duration,
    /// Longest a recording stop waits for the end-of-stream flush
    pub flush_timeout: Duration,
    /// Time without frames after which a stall is reported
    pub stall_threshold: Duration,
    pub pause_target: PauseTarget,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            pull_timeout: Duration::from_millis(1),
            flush_timeout: Duration::from_secs(2),
            stall_threshold: Duration::from_secs(3),
            pause_target: PauseTarget::Preview,
        }
    }
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The session was shut down; no further ticks do anything
    Finished,
}

/// Coordinates capture → {preview, recording}
///
/// Everything the tick touches (playback state, surface, layout) is owned
/// here and mutated only from [`Coordinator::tick`] and the calls it makes.
pub struct Coordinator<C, P, R>
where
    C: FrameSource,
    P: PreviewSink,
    R: RecordingSink,
{
    capture: C,
    preview: P,
    recording: R,
    options: CoordinatorOptions,

    session: SessionState,
    playback: PlaybackState,

    surface: Option<DisplaySurface>,
    layout: Option<ViewportLayout>,
    viewport: Option<Viewport>,

    pending: VecDeque<InputEvent>,
    health: PipelineHealth,
}

impl<C, P, R> Coordinator<C, P, R>
where
    C: FrameSource,
    P: PreviewSink,
    R: RecordingSink,
{
    pub fn new(capture: C, preview: P, recording: R, options: CoordinatorOptions) -> Self {
        Self {
            capture,
            preview,
            recording,
            options,
            session: SessionState::Initializing,
            playback: PlaybackState::default(),
            surface: None,
            layout: None,
            viewport: None,
            pending: VecDeque::new(),
            health: PipelineHealth::new(),
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn surface(&self) -> Option<&DisplaySurface> {
        self.surface.as_ref()
    }

    pub fn layout(&self) -> Option<ViewportLayout> {
        self.layout
    }

    pub fn health(&self) -> &PipelineHealth {
        &self.health
    }

    /// Fraction of the stream played, `None` while no duration is known
    pub fn progress(&self) -> Option<f32> {
        progress_fraction(self.playback.position, self.playback.duration)
    }

    /// Progress bar geometry, present only when there is something to show
    pub fn progress_bar(&self) -> Option<ProgressBar> {
        self.playback.known_duration()?;
        self.viewport.map(ProgressBar::for_viewport)
    }

    pub fn time_label(&self) -> Option<String> {
        time_label(self.playback.position, self.playback.duration)
    }

    /// Start capture, then preview; recording stays idle until requested
    pub fn start(&mut self) -> Result<(), StageError> {
        // the producer goes first so consumers find the channel fed
        self.capture.set_state(StageState::Playing)?;
        self.preview.set_state(StageState::Playing)?;
        self.transition(SessionState::Previewing);
        Ok(())
    }

    /// Queue an input event; one is applied per tick
    pub fn push_input(&mut self, event: InputEvent) {
        if self.session.is_shutting_down() {
            return;
        }
        self.pending.push_back(event);
    }

    /// Run one display tick against the current viewport size
    ///
    /// An `Err` is fatal for the session: the stages have already been torn
    /// down when it is returned.
    pub fn tick(&mut self, viewport: Viewport) -> Result<TickOutcome, StageError> {
        if self.session.is_shutting_down() {
            return Ok(TickOutcome::Finished);
        }

        match self.run_tick(viewport) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Session failed: {e}");
                if let Err(teardown) = self.shutdown() {
                    error!("Teardown after failure also failed: {teardown}");
                }
                Err(e)
            }
        }
    }

    fn run_tick(&mut self, viewport: Viewport) -> Result<TickOutcome, StageError> {
        self.check_faults()?;

        self.playback.position = self.capture.position();
        self.playback.duration = self.capture.duration();

        if let Some(event) = self.pending.pop_front()
            && self.apply(event, viewport)? == TickOutcome::Finished
        {
            return Ok(TickOutcome::Finished);
        }

        let frame = self.pull_frame()?;

        let mut relayout = self.viewport != Some(viewport);
        if let Some(frame) = &frame
            && self.surface.as_ref().is_none_or(|surface| !surface.matches(frame))
        {
            let geometry = frame.geometry();
            match &self.surface {
                None => info!("First frame: {geometry} {}", frame.format()),
                Some(old) => info!("Stream geometry changed: {} -> {geometry}", old.geometry()),
            }
            self.surface = Some(DisplaySurface::new(geometry, frame.format()));
            relayout = true;
        }

        if relayout {
            self.viewport = Some(viewport);
            if let Some(surface) = &self.surface {
                self.layout = ViewportLayout::fit(viewport, surface.geometry());
                debug!(
                    "Viewport {}x{}, layout {:?}",
                    viewport.width, viewport.height, self.layout
                );
            }
        }

        if let (Some(frame), Some(surface)) = (frame, self.surface.as_mut())
            && let Err(e) = surface.upload(&frame)
        {
            warn!("Dropping frame: {e}");
            self.health.record_frame_drop();
        }

        // no frames are expected while paused
        if !self.playback.pausing
            && let Some(since) = self.health.take_stall(self.options.stall_threshold)
        {
            warn!(
                "No preview frame for {:.1}s ({} received so far)",
                since.as_secs_f32(),
                self.health.frames_pulled()
            );
        }

        Ok(TickOutcome::Continue)
    }

    fn check_faults(&mut self) -> Result<(), StageError> {
        if let Some(fault) = self.capture.take_fault() {
            return Err(fault);
        }
        if let Some(fault) = self.preview.take_fault() {
            return Err(fault);
        }
        if let Some(fault) = self.recording.take_fault() {
            return Err(fault);
        }
        Ok(())
    }

    fn pull_frame(&mut self) -> Result<Option<Frame>, StageError> {
        match self.preview.pull_frame(self.options.pull_timeout)? {
            Some(frame) if frame.geometry().is_empty() || !frame.is_complete() => {
                warn!("Dropping incomplete frame {frame:?}");
                self.health.record_frame_drop();
                Ok(None)
            }
            Some(frame) => {
                self.health.record_frame();
                Ok(Some(frame))
            }
            None => {
                self.health.record_empty_pull();
                Ok(None)
            }
        }
    }

    fn apply(&mut self, event: InputEvent, viewport: Viewport) -> Result<TickOutcome, StageError> {
        match event {
            InputEvent::TogglePause => self.toggle_pause()?,
            InputEvent::ToggleRecord => self.toggle_record()?,
            InputEvent::SeekClick(point) => self.seek_click(point, viewport),
            InputEvent::Quit => {
                info!("Quit requested");
                self.shutdown()?;
                return Ok(TickOutcome::Finished);
            }
        }
        Ok(TickOutcome::Continue)
    }

    fn toggle_pause(&mut self) -> Result<(), StageError> {
        let stage: &mut dyn Stage = match self.options.pause_target {
            PauseTarget::Preview => &mut self.preview,
            PauseTarget::Capture => &mut self.capture,
        };

        // ask the stage rather than trusting `pausing`, which may have drifted
        let current = stage.state();
        let next = current.toggled();
        stage.set_state(next)?;
        info!("{}: {current} -> {next}", stage.name());

        self.playback.pausing = next == StageState::Paused;
        self.health.restart_stall_clock();
        self.transition(if self.playback.pausing {
            SessionState::Paused
        } else {
            SessionState::Previewing
        });
        Ok(())
    }

    fn toggle_record(&mut self) -> Result<(), StageError> {
        if self.playback.recording {
            self.finish_recording()
        } else {
            match self.recording.start() {
                Ok(()) => {
                    self.playback.recording = true;
                    self.health.record_recording();
                    info!("Recording to {}", self.recording.output().display());
                    Ok(())
                }
                Err(e) if e.is_misuse() => {
                    warn!("Record ignored: {e}");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    }

    fn finish_recording(&mut self) -> Result<(), StageError> {
        let result = self.recording.stop(self.options.flush_timeout);
        self.playback.recording = false;

        let outcome = result?;
        if outcome.is_truncated() {
            self.health.record_truncated_recording();
            warn!(
                "Recording {} closed without a confirmed flush, it may be truncated",
                self.recording.output().display()
            );
        } else {
            info!("Recording stopped ({outcome})");
        }
        Ok(())
    }

    fn seek_click(&mut self, point: Point, viewport: Viewport) {
        let Some(fraction) = ProgressBar::for_viewport(viewport).hit_test(point) else {
            return;
        };
        let Some(duration) = self.playback.known_duration() else {
            debug!("Seek ignored, stream has no duration");
            return;
        };

        let target = seek_target(fraction, duration);
        debug!("Seek to {target:?} ({:.1}%)", fraction * 100.0);
        if let Err(e) = self.preview.seek(target) {
            warn!("Seek to {target:?} refused: {e}");
        }
    }

    /// Stop recording if active, then tear the stages down in reverse order
    ///
    /// Recording goes first, then preview, then capture, so no consumer is
    /// left attached to a channel whose producer is gone. Idempotent.
    pub fn shutdown(&mut self) -> Result<(), StageError> {
        if self.session.is_shutting_down() {
            return Ok(());
        }
        self.transition(SessionState::ShuttingDown);
        self.pending.clear();

        let mut first_error = None;

        if self.playback.recording
            && let Err(e) = self.finish_recording()
        {
            error!("Failed to finish recording: {e}");
            first_error.get_or_insert(e);
        }

        let stages: [&mut dyn Stage; 3] = [&mut self.recording, &mut self.preview, &mut self.capture];
        for stage in stages {
            if let Err(e) = stage.teardown() {
                error!("Failed to tear down {}: {e}", stage.name());
                first_error.get_or_insert(e);
            }
        }

        self.surface = None;
        self.layout = None;

        info!("Session finished: {}", self.health.summary());

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.session == next {
            return;
        }
        if !self.session.can_transition_to(&next) {
            debug!("Ignoring session transition {} -> {next}", self.session);
            return;
        }
        info!(
            "Session: {} -> {}",
            self.session.describe(self.playback.recording),
            next.describe(self.playback.recording)
        );
        self.session = next;
    }
}

impl<C, P, R> Drop for Coordinator<C, P, R>
where
    C: FrameSource,
    P: PreviewSink,
    R: RecordingSink,
{
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("Teardown on drop failed: {e}");
        }
    }
}
