use iced::mouse::Cursor;
use iced::widget::canvas::{self, Frame, Geometry, Text};
use iced::widget::image::Handle;
use iced::{Color, Pixels, Point, Rectangle, Renderer, Size};

use crate::assets::{FONT_OVERLAY, ICON_SIZE, IconSet};
use crate::pipeline::layout::{ProgressBar, ViewportLayout};
use crate::pipeline::state::PlaybackState;

const MENU_ORIGIN: Point = Point::new(5.0, 5.0);
const MENU_SIZE: Size = Size::new(100.0, 80.0);
const TEXT_SIZE: f32 = 20.0;

const GRAY: Color = Color::from_rgb8(130, 130, 130);
const RED: Color = Color::from_rgb8(230, 41, 55);
const BLUE: Color = Color::from_rgb8(0, 121, 241);

/// Everything drawn on top of the white background in one tick
pub struct Overlay<'a> {
    pub frame: Option<(&'a Handle, ViewportLayout)>,
    pub icons: &'a IconSet,
    pub playback: PlaybackState,
    /// Bar geometry and fill fraction, only while a duration is known
    pub progress: Option<(ProgressBar, f32)>,
    pub time_label: Option<String>,
}

impl<Message, Theme> canvas::Program<Message, Theme> for Overlay<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::WHITE);

        if let Some((handle, layout)) = self.frame {
            let target = Rectangle::new(
                Point::new(layout.offset_x, layout.offset_y),
                Size::new(layout.render_width, layout.render_height),
            );
            frame.draw_image(target, canvas::Image::new(handle.clone()));
        }

        self.draw_menu(&mut frame);
        self.draw_indicators(&mut frame);

        if let Some((bar, fraction)) = self.progress {
            let origin = Point::new(bar.x, bar.y);
            frame.fill_rectangle(origin, Size::new(bar.width, bar.height), Color::WHITE.scale_alpha(0.5));
            frame.fill_rectangle(
                origin,
                Size::new(bar.filled_width(fraction), bar.height),
                BLUE.scale_alpha(0.5),
            );
        }

        if let Some(label) = &self.time_label {
            frame.fill_text(text(label, Point::new(5.0, bounds.height - 40.0), GRAY));
        }

        vec![frame.into_geometry()]
    }
}

impl Overlay<'_> {
    /// Menu entries light up while their mode is active
    fn draw_menu(&self, frame: &mut Frame) {
        frame.fill_rectangle(MENU_ORIGIN, MENU_SIZE, Color::WHITE.scale_alpha(0.3));

        let pause = if self.playback.pausing { GRAY } else { GRAY.scale_alpha(0.4) };
        frame.fill_text(text("(P)ause", Point::new(15.0, 15.0), pause));

        let record = if self.playback.recording { RED } else { RED.scale_alpha(0.4) };
        frame.fill_text(text("(R)ecord", Point::new(15.0, 30.0), record));
    }

    fn draw_indicators(&self, frame: &mut Frame) {
        let size = Size::new(ICON_SIZE as f32, ICON_SIZE as f32);
        let x = MENU_ORIGIN.x + MENU_SIZE.width + 5.0;

        let state_icon = if self.playback.pausing {
            &self.icons.pause
        } else {
            &self.icons.play
        };
        frame.draw_image(
            Rectangle::new(Point::new(x, MENU_ORIGIN.y), size),
            canvas::Image::new(state_icon.handle.clone()),
        );

        if self.playback.recording {
            frame.draw_image(
                Rectangle::new(Point::new(x + size.width + 5.0, MENU_ORIGIN.y), size),
                canvas::Image::new(self.icons.recording.handle.clone()),
            );
        }
    }
}

fn text(content: &str, position: Point, color: Color) -> Text {
    Text {
        content: content.to_string(),
        position,
        color,
        size: Pixels(TEXT_SIZE),
        font: FONT_OVERLAY,
        ..Text::default()
    }
}
