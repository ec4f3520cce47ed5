//! Participant accent colors.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Accent color shown next to a participant in a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    Red,
    Yellow,
    Emerald,
    Sky,
    Violet,
    Pink,
}

/// The palette, in assignment order.
pub const ACCENT_COLORS: [AccentColor; 6] = [
    AccentColor::Red,
    AccentColor::Yellow,
    AccentColor::Emerald,
    AccentColor::Sky,
    AccentColor::Violet,
    AccentColor::Pink,
];

impl AccentColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccentColor::Red => "red",
            AccentColor::Yellow => "yellow",
            AccentColor::Emerald => "emerald",
            AccentColor::Sky => "sky",
            AccentColor::Violet => "violet",
            AccentColor::Pink => "pink",
        }
    }
}

/// Checks whether `value` names a palette color.
pub fn is_valid_accent_color(value: &str) -> bool {
    value.parse::<AccentColor>().is_ok()
}

/// Picks the accent color for a new participant.
///
/// `taken` lists the colors of the course's current participants in creation
/// order. Colors are struck from the palette one participant at a time until a
/// single color is left, and the first color still available wins. Once every
/// color is in use this keeps handing out late-palette colors instead of
/// always restarting at the first one.
pub fn default_accent_color(taken: &[AccentColor]) -> AccentColor {
    let mut available: Vec<AccentColor> = ACCENT_COLORS.to_vec();
    for color in taken {
        available.retain(|c| c != color);
        if available.len() == 1 {
            break;
        }
    }
    available.first().copied().unwrap_or(ACCENT_COLORS[0])
}

impl FromStr for AccentColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACCENT_COLORS
            .iter()
            .find(|color| color.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown accent color: {}", s))
    }
}

impl std::fmt::Display for AccentColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
