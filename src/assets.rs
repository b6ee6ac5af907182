use iced::Font;
use iced::font::{Family, Stretch, Style, Weight};
use iced::widget::image::Handle;
use image::ImageFormat;
use image::imageops::FilterType;
use log::debug;
use thiserror::Error;

/// Edge length of the on-screen status icons
pub const ICON_SIZE: u32 = 40;

pub const FONT_BYTES: &[u8] = include_bytes!("../resources/fonts/DejaVuSans-Bold.ttf");

pub const FONT_OVERLAY: Font = Font {
    family: Family::Name("DejaVu Sans"),
    weight: Weight::Bold,
    stretch: Stretch::Normal,
    style: Style::Normal,
};

const PAUSE_ICON_BYTES: &[u8] = include_bytes!("../resources/icons/pause.png");
const PLAY_ICON_BYTES: &[u8] = include_bytes!("../resources/icons/play.png");
const RECORDING_ICON_BYTES: &[u8] = include_bytes!("../resources/icons/recording.png");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Pause,
    Play,
    Recording,
}

impl std::fmt::Display for IconKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IconKind::Pause => "pause",
            IconKind::Play => "play",
            IconKind::Recording => "recording",
        };
        write!(f, "{name}")
    }
}

/// Every icon the overlay draws, in load order
pub const ICON_WORKLIST: [(IconKind, &[u8]); 3] = [
    (IconKind::Pause, PAUSE_ICON_BYTES),
    (IconKind::Play, PLAY_ICON_BYTES),
    (IconKind::Recording, RECORDING_ICON_BYTES),
];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to decode the {icon} icon: {source}")]
    Decode {
        icon: IconKind,
        #[source]
        source: image::ImageError,
    },
    #[error("the {0} icon is missing from the worklist")]
    Missing(IconKind),
}

#[derive(Debug, Clone)]
pub struct Icon {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct IconSet {
    pub pause: Icon,
    pub play: Icon,
    pub recording: Icon,
}

#[derive(Debug, Clone)]
pub struct Assets {
    pub icons: IconSet,
}

impl Assets {
    /// Decode and scale every embedded icon
    pub fn load() -> Result<Assets, AssetError> {
        Self::from_worklist(&ICON_WORKLIST)
    }

    fn from_worklist(worklist: &[(IconKind, &[u8])]) -> Result<Assets, AssetError> {
        let mut pause = None;
        let mut play = None;
        let mut recording = None;

        for &(kind, bytes) in worklist {
            let icon = decode_icon(kind, bytes)?;
            let slot = match kind {
                IconKind::Pause => &mut pause,
                IconKind::Play => &mut play,
                IconKind::Recording => &mut recording,
            };
            *slot = Some(icon);
        }

        Ok(Assets {
            icons: IconSet {
                pause: pause.ok_or(AssetError::Missing(IconKind::Pause))?,
                play: play.ok_or(AssetError::Missing(IconKind::Play))?,
                recording: recording.ok_or(AssetError::Missing(IconKind::Recording))?,
            },
        })
    }
}

fn decode_icon(kind: IconKind, bytes: &[u8]) -> Result<Icon, AssetError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|source| AssetError::Decode { icon: kind, source })?;
    debug!("Icon {kind}: {}x{}", decoded.width(), decoded.height());

    let rgba = decoded
        .resize_exact(ICON_SIZE, ICON_SIZE, FilterType::Triangle)
        .into_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(Icon {
        handle: Handle::from_rgba(width, height, rgba.into_raw()),
        width,
        height,
    })
}
