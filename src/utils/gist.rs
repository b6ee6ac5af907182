use std::time::Duration;

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer::{ClockTime, Element, MessageView, Pipeline};
use log::{debug, warn};
use thiserror::Error;

use crate::pipeline::state::StageState;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Glib(#[from] glib::Error),
    #[error("{0}")]
    Bool(#[from] glib::BoolError),
    #[error("failed to get the gstreamer bus")]
    Bus,
    #[error("{0}")]
    StateChange(#[from] gst::StateChangeError),
    #[error("failed to get media capabilities")]
    Caps,
    #[error("sample carries no readable buffer")]
    EmptySample,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

pub fn init() -> Result<(), Error> {
    gst::init()?;
    debug!("GStreamer {}", gst::version_string());
    Ok(())
}

/// Put `elements` into a new pipeline and link them in order
pub fn assemble(name: &str, elements: &[&Element]) -> Result<Pipeline, Error> {
    let pipeline = Pipeline::with_name(name);
    pipeline.add_many(elements)?;
    Element::link_many(elements)?;
    Ok(pipeline)
}

pub fn to_gst_state(state: StageState) -> gst::State {
    match state {
        StageState::Null => gst::State::Null,
        StageState::Ready => gst::State::Ready,
        StageState::Paused => gst::State::Paused,
        StageState::Playing => gst::State::Playing,
    }
}

pub fn from_gst_state(state: gst::State) -> StageState {
    match state {
        gst::State::Ready => StageState::Ready,
        gst::State::Paused => StageState::Paused,
        gst::State::Playing => StageState::Playing,
        _ => StageState::Null,
    }
}

pub fn to_duration(time: ClockTime) -> Duration {
    Duration::from_nanos(time.nseconds())
}

pub fn to_clock_time(duration: Duration) -> ClockTime {
    ClockTime::from_nseconds(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
}

/// A named pipeline with its bus, shared by all stage backends
pub struct GstStage {
    name: &'static str,
    pipeline: Pipeline,
    bus: gst::Bus,
}

impl GstStage {
    pub fn new(name: &'static str, pipeline: Pipeline) -> Result<Self, Error> {
        let bus = pipeline.bus().ok_or(Error::Bus)?;
        Ok(Self { name, pipeline, bus })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Effective lifecycle state, without blocking
    ///
    /// A pending target counts as reached: the pipeline accepted the change
    /// and will get there on its own.
    pub fn state(&self) -> StageState {
        let (_, current, pending) = self.pipeline.state(ClockTime::ZERO);
        match pending {
            gst::State::VoidPending => from_gst_state(current),
            pending => from_gst_state(pending),
        }
    }

    pub fn set_state(&self, state: StageState) -> Result<(), Error> {
        let change = self.pipeline.set_state(to_gst_state(state))?;
        debug!("{}: {state} requested, {change:?}", self.name);
        Ok(())
    }

    pub fn position(&self) -> Option<Duration> {
        self.pipeline.query_position::<ClockTime>().map(to_duration)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.pipeline.query_duration::<ClockTime>().map(to_duration)
    }

    pub fn seek(&self, target: Duration) -> Result<(), Error> {
        self.pipeline
            .seek_simple(gst::SeekFlags::FLUSH | gst::SeekFlags::SEGMENT, to_clock_time(target))?;
        Ok(())
    }

    /// Drain pending bus messages, returning the first error reported
    pub fn poll_error(&self) -> Option<String> {
        let mut fault = None;

        while let Some(msg) = self.bus.pop() {
            match msg.view() {
                MessageView::Error(err) => {
                    let source = err
                        .src()
                        .map(|s| s.path_string().to_string())
                        .unwrap_or_else(|| self.name.to_string());
                    debug!("{}: {:?}", self.name, err.debug());
                    fault.get_or_insert_with(|| format!("{source}: {}", err.error()));
                }
                MessageView::Warning(w) => warn!("{}: {}", self.name, w.error()),
                _ => {}
            }
        }

        fault
    }

    /// Push end-of-stream and wait up to `timeout` for it to reach the sinks
    ///
    /// Returns `true` only if EOS arrived on the bus in time.
    pub fn drain(&self, timeout: Duration) -> bool {
        if !self.pipeline.send_event(gst::event::Eos::new()) {
            warn!("{}: pipeline refused EOS", self.name);
            return false;
        }

        match self
            .bus
            .timed_pop_filtered(to_clock_time(timeout), &[gst::MessageType::Eos, gst::MessageType::Error])
        {
            Some(msg) => match msg.view() {
                MessageView::Eos(..) => true,
                MessageView::Error(err) => {
                    warn!("{}: error while draining: {}", self.name, err.error());
                    false
                }
                _ => false,
            },
            None => {
                warn!("{}: no EOS within {timeout:?}", self.name);
                false
            }
        }
    }
}

impl Drop for GstStage {
    fn drop(&mut self) {
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            warn!("{}: failed to release pipeline: {e}", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mapping() {
        for state in [
            StageState::Null,
            StageState::Ready,
            StageState::Paused,
            StageState::Playing,
        ] {
            assert_eq!(from_gst_state(to_gst_state(state)), state);
        }
        assert_eq!(from_gst_state(gst::State::VoidPending), StageState::Null);
    }

    #[test]
    fn test_clock_time_conversion() {
        let d = Duration::from_millis(1500);
        assert_eq!(to_clock_time(d), ClockTime::from_mseconds(1500));
        assert_eq!(to_duration(ClockTime::from_mseconds(1500)), d);
    }
}
