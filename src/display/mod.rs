//! Preview stage and the surface its frames are shown from

mod preview;
pub mod surface;

pub use preview::PreviewStage;
