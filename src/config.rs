use std::time::Duration;

use iced::Size;
use iced::keyboard::{Key, Modifiers};

use crate::pipeline::coordinator::{CoordinatorOptions, PauseTarget};
use crate::pipeline::types::InputEvent;
use crate::utils::sos::SignalOfStop;

#[derive(Debug, Clone, PartialEq)]
pub struct HotkeyMap {
    pub pause: (Modifiers, Key),
    pub record: (Modifiers, Key),
    pub quit: (Modifiers, Key),
}

impl Default for HotkeyMap {
    fn default() -> Self {
        HotkeyMap {
            pause: (Modifiers::empty(), Key::Character("p".into())),
            record: (Modifiers::empty(), Key::Character("r".into())),
            quit: (Modifiers::empty(), Key::Character("q".into())),
        }
    }
}

impl HotkeyMap {
    /// Input event bound to a key press, if any
    ///
    /// Letters match case-insensitively and Shift is ignored.
    pub fn action(&self, key: &Key, modifiers: Modifiers) -> Option<InputEvent> {
        let pressed = (modifiers.difference(Modifiers::SHIFT), normalize(key));

        [
            (&self.pause, InputEvent::TogglePause),
            (&self.record, InputEvent::ToggleRecord),
            (&self.quit, InputEvent::Quit),
        ]
        .into_iter()
        .find(|((m, k), _)| (m.difference(Modifiers::SHIFT), normalize(k)) == pressed)
        .map(|(_, event)| event)
    }
}

fn normalize(key: &Key) -> Key {
    match key {
        Key::Character(c) => Key::Character(c.to_lowercase().into()),
        other => other.clone(),
    }
}

pub struct Config {
    pub hotkey_map: HotkeyMap,
    pub window_size: Size,
    pub title: String,
    /// Display tick period
    pub tick_interval: Duration,
    pub pull_timeout: Duration,
    pub flush_timeout: Duration,
    pub stall_threshold: Duration,
    pub pause_target: PauseTarget,
    pub sos: SignalOfStop,
}

impl Config {
    pub fn new() -> Self {
        let defaults = CoordinatorOptions::default();

        Config {
            hotkey_map: Default::default(),
            window_size: Size {
                width: 800f32,
                height: 450f32,
            },
            title: format!("{} {}", app_name(), version()),
            tick_interval: Duration::from_millis(16),
            pull_timeout: defaults.pull_timeout,
            flush_timeout: defaults.flush_timeout,
            stall_threshold: defaults.stall_threshold,
            pause_target: defaults.pause_target,
            sos: SignalOfStop::new(),
        }
    }

    pub fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            pull_timeout: self.pull_timeout,
            flush_timeout: self.flush_timeout,
            stall_threshold: self.stall_threshold,
            pause_target: self.pause_target,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a version as specified in Cargo.toml
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn app_name() -> &'static str {
    env!("CARGO_PKG_NAME")
}
