use std::process::exit;
use std::time::Duration;

use iced::keyboard::{self, Key, Modifiers};
use iced::widget::canvas::Canvas;
use iced::widget::image::Handle;
use iced::{Element, Event, Length, Size, Subscription, Task, mouse, window};
use log::{debug, error, info};

use crate::assets::Assets;
use crate::capture::CaptureSource;
use crate::config::{Config, HotkeyMap};
use crate::display::PreviewStage;
use crate::encoder::RecordingStage;
use crate::gui::overlay::Overlay;
use crate::pipeline::coordinator::{Coordinator, TickOutcome};
use crate::pipeline::types::{InputEvent, Point, Viewport};
use crate::utils::sos::SignalOfStop;

pub type Session = Coordinator<CaptureSource, PreviewStage, RecordingStage>;

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    KeyPressed(Key, Modifiers),
    CursorMoved(iced::Point),
    PointerPressed,
    Resized(Size),
    CloseRequested,
}

/// Texture of the latest uploaded surface contents
struct FrameImage {
    surface_id: u64,
    generation: u64,
    handle: Handle,
}

pub struct App {
    session: Session,
    assets: Assets,
    hotkeys: HotkeyMap,
    sos: SignalOfStop,
    tick_interval: Duration,
    title: String,
    viewport: Viewport,
    cursor: Point,
    frame: Option<FrameImage>,
    quit_requested: bool,
}

impl App {
    pub fn new(session: Session, assets: Assets, config: &Config) -> Self {
        Self {
            session,
            assets,
            hotkeys: config.hotkey_map.clone(),
            sos: config.sos.clone(),
            tick_interval: config.tick_interval,
            title: config.title.clone(),
            viewport: Viewport::new(config.window_size.width, config.window_size.height),
            cursor: Point::default(),
            frame: None,
            quit_requested: false,
        }
    }

    pub fn title(&self) -> String {
        self.title.clone()
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                if self.sos.cancelled() {
                    self.request_quit();
                }

                match self.session.tick(self.viewport) {
                    Ok(TickOutcome::Continue) => {
                        self.refresh_frame();
                        Task::none()
                    }
                    Ok(TickOutcome::Finished) => {
                        self.frame = None;
                        info!("Bye");
                        iced::exit()
                    }
                    Err(e) => {
                        error!("Fatal: {e}");
                        exit(1)
                    }
                }
            }
            Message::KeyPressed(key, modifiers) => {
                debug!("Key pressed: {key:?} {modifiers:?}");
                match self.hotkeys.action(&key, modifiers) {
                    Some(InputEvent::Quit) => self.request_quit(),
                    Some(event) => self.session.push_input(event),
                    None => {}
                }
                Task::none()
            }
            Message::CursorMoved(position) => {
                self.cursor = Point::new(position.x, position.y);
                Task::none()
            }
            Message::PointerPressed => {
                self.session.push_input(InputEvent::SeekClick(self.cursor));
                Task::none()
            }
            Message::Resized(size) => {
                self.viewport = Viewport::new(size.width, size.height);
                Task::none()
            }
            Message::CloseRequested => {
                self.request_quit();
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let layout = self.session.layout();
        let overlay = Overlay {
            frame: self.frame.as_ref().map(|f| &f.handle).zip(layout),
            icons: &self.assets.icons,
            playback: *self.session.playback(),
            progress: self.session.progress_bar().zip(self.session.progress()),
            time_label: self.session.time_label(),
        };

        Canvas::new(overlay)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch(vec![
            iced::time::every(self.tick_interval).map(|_| Message::Tick),
            self.input_subscription(),
        ])
    }

    fn input_subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(|event, _status, _id| match event {
            Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
                Some(Message::KeyPressed(key, modifiers))
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) => Some(Message::CursorMoved(position)),
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => Some(Message::PointerPressed),
            Event::Window(window::Event::Resized(size)) => Some(Message::Resized(size)),
            Event::Window(window::Event::CloseRequested) => Some(Message::CloseRequested),
            _ => None,
        })
    }

    fn request_quit(&mut self) {
        if self.quit_requested {
            return;
        }
        self.quit_requested = true;
        self.session.push_input(InputEvent::Quit);
    }

    /// Rebuild the image handle when the surface changed since the last tick
    fn refresh_frame(&mut self) {
        let Some(surface) = self.session.surface() else {
            self.frame = None;
            return;
        };

        if self
            .frame
            .as_ref()
            .is_some_and(|f| f.surface_id == surface.id() && f.generation == surface.generation())
        {
            return;
        }

        let geometry = surface.geometry();
        self.frame = Some(FrameImage {
            surface_id: surface.id(),
            generation: surface.generation(),
            handle: Handle::from_rgba(geometry.width, geometry.height, surface.pixels().to_vec()),
        });
    }
}
