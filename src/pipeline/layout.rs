//! Fit-to-window geometry
//!
//! The display surface keeps the stream's native size; only the scale and
//! placement used to draw it change with the window.

use super::types::{FrameGeometry, Point, Viewport};

/// Where and how large the video is drawn inside the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportLayout {
    pub render_width: f32,
    pub render_height: f32,
    /// Ratio between rendered and native frame width
    pub render_scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ViewportLayout {
    /// Fit a frame into the viewport, preserving its aspect ratio
    ///
    /// Full width is preferred; when that would overflow vertically the frame
    /// is fitted to full height instead. The result is centered. Returns
    /// `None` for an empty frame.
    pub fn fit(viewport: Viewport, frame: FrameGeometry) -> Option<Self> {
        if frame.is_empty() {
            return None;
        }

        let viewport_width = viewport.width.max(0.0).floor();
        let viewport_height = viewport.height.max(0.0).floor();
        let frame_width = frame.width as f32;
        let frame_height = frame.height as f32;

        let mut render_width = viewport_width;
        let mut render_height = (viewport_width * frame_height / frame_width).floor();

        if render_height > viewport_height {
            render_height = viewport_height;
            render_width = (viewport_height * frame_width / frame_height).floor();
        }

        Some(Self {
            render_width,
            render_height,
            render_scale: render_width / frame_width,
            offset_x: ((viewport_width - render_width) / 2.0).floor(),
            offset_y: ((viewport_height - render_height) / 2.0).floor(),
        })
    }
}

/// Inset of the progress bar from the left, right and bottom edges
pub const PROGRESS_BAR_INSET: f32 = 5.0;
/// Height of the progress bar strip
pub const PROGRESS_BAR_HEIGHT: f32 = 10.0;

/// Progress bar strip along the bottom edge of the viewport
///
/// Doubles as the seek hit region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressBar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ProgressBar {
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            x: PROGRESS_BAR_INSET,
            y: viewport.height - PROGRESS_BAR_INSET - PROGRESS_BAR_HEIGHT,
            width: (viewport.width - 2.0 * PROGRESS_BAR_INSET).max(0.0),
            height: PROGRESS_BAR_HEIGHT,
        }
    }

    /// Fraction along the bar under `point`, or `None` outside the bar
    ///
    /// Both edges are inclusive, so the result is always within `[0, 1]`.
    pub fn hit_test(&self, point: Point) -> Option<f32> {
        if self.width <= 0.0 {
            return None;
        }

        let inside_x = point.x >= self.x && point.x <= self.x + self.width;
        let inside_y = point.y >= self.y && point.y <= self.y + self.height;
        if !(inside_x && inside_y) {
            return None;
        }

        Some(((point.x - self.x) / self.width).clamp(0.0, 1.0))
    }

    /// Width of the filled part of the bar for the given progress
    pub fn filled_width(&self, progress: f32) -> f32 {
        self.width * progress.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOMETRIES: [(u32, u32); 5] = [(640, 480), (1920, 1080), (1280, 720), (480, 640), (320, 240)];
    const VIEWPORTS: [(f32, f32); 5] = [
        (800.0, 450.0),
        (1920.0, 1080.0),
        (300.0, 900.0),
        (1024.0, 100.0),
        (641.0, 481.0),
    ];

    #[test]
    fn test_layout_fits_and_keeps_aspect() {
        for (fw, fh) in GEOMETRIES {
            for (vw, vh) in VIEWPORTS {
                let layout = ViewportLayout::fit(Viewport::new(vw, vh), FrameGeometry::new(fw, fh))
                    .unwrap();

                assert!(layout.render_width <= vw, "{fw}x{fh} in {vw}x{vh}: {layout:?}");
                assert!(layout.render_height <= vh, "{fw}x{fh} in {vw}x{vh}: {layout:?}");

                // one pixel of flooring on the derived axis
                let expected = fw as f32 / fh as f32;
                let tolerance = expected / layout.render_height.max(1.0) + expected / layout.render_width.max(1.0);
                let actual = layout.render_width / layout.render_height;
                assert!(
                    (actual - expected).abs() <= tolerance + 1e-4,
                    "{fw}x{fh} in {vw}x{vh}: ratio {actual} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn test_layout_prefers_full_width() {
        let layout =
            ViewportLayout::fit(Viewport::new(800.0, 600.0), FrameGeometry::new(1920, 1080)).unwrap();
        assert_eq!(layout.render_width, 800.0);
        assert_eq!(layout.render_height, 450.0);
        assert_eq!(layout.offset_x, 0.0);
        assert_eq!(layout.offset_y, 75.0);
        assert!((layout.render_scale - 800.0 / 1920.0).abs() < 1e-6);
    }

    #[test]
    fn test_layout_falls_back_to_full_height() {
        let layout =
            ViewportLayout::fit(Viewport::new(800.0, 450.0), FrameGeometry::new(640, 480)).unwrap();
        assert_eq!(layout.render_height, 450.0);
        assert_eq!(layout.render_width, 600.0);
        assert_eq!(layout.offset_x, 100.0);
        assert_eq!(layout.offset_y, 0.0);
    }

    #[test]
    fn test_layout_empty_frame() {
        assert!(ViewportLayout::fit(Viewport::new(800.0, 450.0), FrameGeometry::new(0, 0)).is_none());
    }

    #[test]
    fn test_layout_zero_viewport() {
        let layout = ViewportLayout::fit(Viewport::new(0.0, 0.0), FrameGeometry::new(640, 480)).unwrap();
        assert_eq!(layout.render_width, 0.0);
        assert_eq!(layout.render_height, 0.0);
    }

    #[test]
    fn test_progress_bar_edges() {
        let bar = ProgressBar::for_viewport(Viewport::new(800.0, 450.0));
        assert_eq!(bar.x, 5.0);
        assert_eq!(bar.y, 435.0);
        assert_eq!(bar.width, 790.0);

        assert_eq!(bar.hit_test(Point::new(5.0, 440.0)), Some(0.0));
        assert_eq!(bar.hit_test(Point::new(795.0, 440.0)), Some(1.0));
        assert_eq!(bar.hit_test(Point::new(400.0, 435.0)), Some(0.5));
    }

    #[test]
    fn test_progress_bar_misses() {
        let bar = ProgressBar::for_viewport(Viewport::new(800.0, 450.0));
        assert_eq!(bar.hit_test(Point::new(4.9, 440.0)), None);
        assert_eq!(bar.hit_test(Point::new(795.1, 440.0)), None);
        assert_eq!(bar.hit_test(Point::new(400.0, 434.0)), None);
        assert_eq!(bar.hit_test(Point::new(400.0, 446.0)), None);
        assert_eq!(bar.hit_test(Point::new(400.0, 100.0)), None);
    }

    #[test]
    fn test_progress_bar_fill() {
        let bar = ProgressBar::for_viewport(Viewport::new(110.0, 50.0));
        assert_eq!(bar.filled_width(0.5), 50.0);
        assert_eq!(bar.filled_width(2.0), 100.0);
        assert_eq!(bar.filled_width(-1.0), 0.0);
    }
}
