//! Colors: the fixed application palette and the light/dark toolbar theme.
//!
//! The palette is applied once at start-up and never changes. The theme
//! toggle only drives the toolbar background and the text color of the
//! search field and buttons.

/// RGBA color, components in 0.0–1.0.
pub type Rgba = [f32; 4];

const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

pub const WHITE: Rgba = rgb(0xFF, 0xFF, 0xFF);
pub const BLACK: Rgba = rgb(0x00, 0x00, 0x00);

/// Toolbar background in light mode (`#FFFFFF`).
pub const LIGHT_BACKGROUND: Rgba = rgb(0xFF, 0xFF, 0xFF);
/// Toolbar background in dark mode (`#1F1F1F`).
pub const DARK_BACKGROUND: Rgba = rgb(0x1F, 0x1F, 0x1F);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Style values derived from the theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellStyle {
    pub background: Rgba,
    pub text: Rgba,
}

impl Theme {
    pub fn from_dark_flag(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn style(self) -> ShellStyle {
        match self {
            Self::Light => ShellStyle {
                background: LIGHT_BACKGROUND,
                text: BLACK,
            },
            Self::Dark => ShellStyle {
                background: DARK_BACKGROUND,
                text: WHITE,
            },
        }
    }
}

/// Fixed dark palette for the chrome that the theme toggle does not drive.
///
/// `window` is the separator between toolbar and page, `button` the control
/// borders, `highlight` the fill of checked toggles and the focused field
/// border, `highlighted_text` the label of checked toggles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub window: Rgba,
    pub button: Rgba,
    pub highlight: Rgba,
    pub highlighted_text: Rgba,
}

impl Palette {
    /// Fusion-style dark values.
    pub const fn dark() -> Self {
        Self {
            window: rgb(60, 60, 60),
            button: rgb(53, 53, 53),
            highlight: rgb(42, 130, 218),
            highlighted_text: BLACK,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}
