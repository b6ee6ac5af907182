//! Window, input and drawing
//!
//! A single iced window whose `update` drives the session one tick at a time.

use std::cell::RefCell;

use iced::window;

use crate::assets::{FONT_BYTES, FONT_OVERLAY};
use crate::config::Config;

mod app;
mod overlay;

pub use app::{App, Session};

pub fn run(app: App, config: &Config) -> iced::Result {
    let slot = RefCell::new(Some(app));

    iced::application(
        move || slot.borrow_mut().take().expect("application booted twice"),
        App::update,
        App::view,
    )
    .title(App::title)
    .subscription(App::subscription)
    .window(window::Settings {
        size: config.window_size,
        resizable: true,
        exit_on_close_request: false,
        ..Default::default()
    })
    .font(FONT_BYTES)
    .default_font(FONT_OVERLAY)
    .antialiasing(false)
    .run()
}
