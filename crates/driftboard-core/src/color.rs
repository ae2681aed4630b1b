//! Node and edge colors.
//!
//! A color is stored exactly as the user picked it: either one of the six
//! reserved palette keys (`"1"` through `"6"`) or a literal color value such
//! as `"#ff8800"`. Resolution never fails.

use serde::{Deserialize, Serialize};

/// Reserved palette, keyed by the string stored on nodes and edges.
pub const PALETTE: [(&str, &str); 6] = [
    ("1", "#fb464c"),
    ("2", "#e9973f"),
    ("3", "#e0de71"),
    ("4", "#44cf6e"),
    ("5", "#53dfdd"),
    ("6", "#a882ff"),
];

/// A color as stored in a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanvasColor(String);

impl CanvasColor {
    /// Wrap a raw color value (palette key or literal).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Palette entry by 1-based index. Returns `None` outside 1..=6.
    pub fn palette(index: u8) -> Option<Self> {
        PALETTE
            .get(usize::from(index).checked_sub(1)?)
            .map(|(key, _)| Self::new(*key))
    }

    /// The stored value, unresolved.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 1-based palette index if this color is a palette key.
    pub fn palette_index(&self) -> Option<u8> {
        PALETTE
            .iter()
            .position(|(key, _)| *key == self.0)
            .map(|i| i as u8 + 1)
    }

    /// Look the value up in the palette, else pass the literal through.
    pub fn resolve(&self) -> &str {
        PALETTE
            .iter()
            .find(|(key, _)| *key == self.0)
            .map(|(_, value)| *value)
            .unwrap_or(self.0.as_str())
    }

    /// Resolved color as RGBA8, if it is a hex literal (`#rgb`, `#rrggbb`, `#rrggbbaa`).
    pub fn rgba8(&self) -> Option<[u8; 4]> {
        parse_hex(self.resolve())
    }
}

impl From<&str> for CanvasColor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Parse a hex color string into RGBA8.
fn parse_hex(color: &str) -> Option<[u8; 4]> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match hex.len() {
        3 => Some([
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
            255,
        ]),
        6 => Some([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255]),
        8 => Some([channel(0..2)?, channel(2..4)?, channel(4..6)?, channel(6..8)?]),
        _ => None,
    }
}
