//! Core types for the pipeline system

/// Pixel layout delivered by the preview stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8 bits per channel, red first, alpha last
    #[default]
    Rgba,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba => 4,
        }
    }

    /// Name understood by the media runtime caps negotiation
    pub fn caps_name(&self) -> &'static str {
        match self {
            PixelFormat::Rgba => "RGBA",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.caps_name())
    }
}

/// Width and height of a video frame, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size in bytes of a tightly packed frame of this geometry
    pub fn byte_len(&self, format: PixelFormat) -> usize {
        self.width as usize * self.height as usize * format.bytes_per_pixel()
    }
}

impl std::fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One decoded image pulled from the preview stage
///
/// The pixel storage is whatever the media runtime handed out (usually a
/// mapped buffer); it is released back when the frame is dropped, so the
/// coordinator copies the pixels out and drops the frame within the same tick.
pub struct Frame {
    geometry: FrameGeometry,
    format: PixelFormat,
    pixels: Box<dyn AsRef<[u8]> + Send>,
}

impl Frame {
    /// Wrap tightly packed pixels of the given geometry
    pub fn new(
        geometry: FrameGeometry,
        format: PixelFormat,
        pixels: impl AsRef<[u8]> + Send + 'static,
    ) -> Self {
        Self {
            geometry,
            format,
            pixels: Box::new(pixels),
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        AsRef::<[u8]>::as_ref(&*self.pixels)
    }

    /// Check that the pixel storage covers the whole geometry
    pub fn is_complete(&self) -> bool {
        self.pixels().len() >= self.geometry.byte_len(self.format)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("geometry", &self.geometry)
            .field("format", &self.format)
            .field("size", &self.pixels().len())
            .finish()
    }
}

/// How a recording session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// End-of-stream reached the file sink before the sink was closed
    Complete,
    /// The flush wait timed out or the stage failed while draining; the file
    /// was closed anyway and may be missing its tail or index
    PossiblyTruncated,
    /// Stop was requested while nothing was being recorded
    NotRecording,
}

impl FlushOutcome {
    pub fn is_truncated(&self) -> bool {
        matches!(self, FlushOutcome::PossiblyTruncated)
    }
}

impl std::fmt::Display for FlushOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlushOutcome::Complete => write!(f, "complete"),
            FlushOutcome::PossiblyTruncated => write!(f, "possibly truncated"),
            FlushOutcome::NotRecording => write!(f, "not recording"),
        }
    }
}

/// A position in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Size of the window area the video is drawn into
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Discrete user input applied by the coordinator, one per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    TogglePause,
    ToggleRecord,
    /// Primary pointer press at the given viewport position
    SeekClick(Point),
    Quit,
}
