//! Theme palettes.
//!
//! Four accent palettes, each with a light and a dark variant. Dark variants
//! keep the accent colors and swap the neutral surface/text colors.

use std::fmt::{Display, Formatter};

/// Selectable accent palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ThemeName {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
}

impl ThemeName {
    pub const ALL: [Self; 4] = [Self::Blue, Self::Green, Self::Purple, Self::Orange];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    /// Human label for pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Green => "Green",
            Self::Purple => "Purple",
            Self::Orange => "Orange",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "blue" => Some(Self::Blue),
            "green" => Some(Self::Green),
            "purple" => Some(Self::Purple),
            "orange" => Some(Self::Orange),
            _ => None,
        }
    }
}

impl Display for ThemeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved colors (`#rrggbb` or `#rgb`) for one theme variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub text: &'static str,
    pub card: &'static str,
    pub border: &'static str,
    pub input_background: &'static str,
}

/// Returns the palette for `theme` in light or dark mode.
pub fn palette(theme: ThemeName, dark_mode: bool) -> Palette {
    let (primary, secondary, accent) = match theme {
        ThemeName::Blue => ("#3498db", "#2980b9", "#e3f2fd"),
        ThemeName::Green => ("#2ecc71", "#27ae60", "#e8f8f5"),
        ThemeName::Purple => ("#9b59b6", "#8e44ad", "#f5eef8"),
        ThemeName::Orange => ("#e67e22", "#d35400", "#fef5e7"),
    };

    if dark_mode {
        Palette {
            primary,
            secondary,
            accent,
            background: "#121212",
            text: "#ffffff",
            card: "#1e1e1e",
            border: "#333333",
            input_background: "#2d2d2d",
        }
    } else {
        Palette {
            primary,
            secondary,
            accent,
            background: "#f5f5f5",
            text: "#2c3e50",
            card: "#ffffff",
            border: "#eee",
            input_background: "#ffffff",
        }
    }
}
