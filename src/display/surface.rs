use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::pipeline::types::{Frame, FrameGeometry, PixelFormat};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("frame geometry {frame} does not match surface {surface}")]
    Geometry {
        frame: FrameGeometry,
        surface: FrameGeometry,
    },
    #[error("frame carries {actual} bytes, {expected} expected")]
    Truncated { expected: usize, actual: usize },
}

/// CPU-resident image the latest preview frame is copied into
///
/// Sized once from the stream geometry; window resizes never touch it.
pub struct DisplaySurface {
    id: u64,
    geometry: FrameGeometry,
    format: PixelFormat,
    pixels: Vec<u8>,
    generation: u64,
}

impl DisplaySurface {
    pub fn new(geometry: FrameGeometry, format: PixelFormat) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);

        Self {
            id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
            geometry,
            format,
            pixels: vec![0; geometry.byte_len(format)],
            generation: 0,
        }
    }

    /// Identity of this allocation; changes only when a new surface is created
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of uploads so far; consumers re-upload their texture when it moves
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `frame` can be uploaded without recreating the surface
    pub fn matches(&self, frame: &Frame) -> bool {
        frame.geometry() == self.geometry && frame.format() == self.format
    }

    /// Copy a frame's pixels into the surface
    pub fn upload(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        if !self.matches(frame) {
            return Err(SurfaceError::Geometry {
                frame: frame.geometry(),
                surface: self.geometry,
            });
        }

        let expected = self.pixels.len();
        let source = frame.pixels();
        if source.len() < expected {
            return Err(SurfaceError::Truncated {
                expected,
                actual: source.len(),
            });
        }

        self.pixels.copy_from_slice(&source[..expected]);
        self.generation += 1;
        Ok(())
    }
}

impl std::fmt::Debug for DisplaySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplaySurface")
            .field("id", &self.id)
            .field("geometry", &self.geometry)
            .field("format", &self.format)
            .field("generation", &self.generation)
            .finish()
    }
}
