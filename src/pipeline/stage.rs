//! Media stage traits
//!
//! The coordinator drives every stage through these traits only, so the tick
//! logic can run against in-memory stages without a device.

use std::path::Path;
use std::time::Duration;

use super::error::StageError;
use super::state::StageState;
use super::types::{FlushOutcome, Frame};

/// A pipeline stage with its own lifecycle
pub trait Stage {
    /// Get the name of this stage for logging
    fn name(&self) -> &str;

    /// Query the lifecycle state the stage is actually in
    fn state(&self) -> StageState;

    /// Request a lifecycle transition
    fn set_state(&mut self, state: StageState) -> Result<(), StageError>;

    /// Take an unrecoverable fault the stage reported since the last call
    fn take_fault(&mut self) -> Option<StageError> {
        None
    }

    /// Drive the stage to `Null`, releasing everything it holds
    fn teardown(&mut self) -> Result<(), StageError> {
        self.set_state(StageState::Null)
    }
}

/// The capture stage: device → clock overlay → channel
pub trait FrameSource: Stage {
    /// Current stream position, `None` if unknown
    fn position(&self) -> Option<Duration>;

    /// Stream duration, `None` for live sources
    fn duration(&self) -> Option<Duration>;
}

/// The preview stage: channel → RGBA frames pulled by the coordinator
pub trait PreviewSink: Stage {
    /// Pull one frame, waiting at most `timeout`
    ///
    /// `Ok(None)` means nothing was ready in time; it is not an error.
    fn pull_frame(&mut self, timeout: Duration) -> Result<Option<Frame>, StageError>;

    /// Flushing, segment-scoped seek to `target`
    fn seek(&mut self, target: Duration) -> Result<(), StageError>;
}

/// The recording stage: channel → encoder → muxer → file
pub trait RecordingSink: Stage {
    /// Begin recording to the output file
    ///
    /// Fails with [`StageError::AlreadyRecording`] while already playing.
    fn start(&mut self) -> Result<(), StageError>;

    /// Finish the recording, waiting at most `flush_timeout` for the flush
    ///
    /// Always leaves the stage in `Null`. A no-op returning
    /// [`FlushOutcome::NotRecording`] when nothing is being recorded.
    fn stop(&mut self, flush_timeout: Duration) -> Result<FlushOutcome, StageError>;

    /// File the recording is written to
    fn output(&self) -> &Path;
}
