//! Recording stage: encodes the shared capture stream into an MP4 file

mod recording;

pub use recording::RecordingStage;
