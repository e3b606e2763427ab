//! Color strings as stored in documents.
//!
//! Files carry `#RRGGBBAA` (alpha last) or one of the standard Xournal
//! color names. Internally colors are [`Color32`]; [`to_argb`] and
//! [`to_rgba`] convert between the alpha-last file order and the
//! alpha-first order used by most toolkits.

use egui::Color32;

/// Standard named colors and their values.
pub const STANDARD_COLORS: [(&str, Color32); 11] = [
    ("black", Color32::from_rgb(0, 0, 0)),
    ("blue", Color32::from_rgb(51, 51, 204)),
    ("red", Color32::from_rgb(255, 0, 0)),
    ("green", Color32::from_rgb(0, 128, 0)),
    ("gray", Color32::from_rgb(128, 128, 128)),
    ("lightblue", Color32::from_rgb(0, 192, 255)),
    ("lightgreen", Color32::from_rgb(0, 255, 0)),
    ("magenta", Color32::from_rgb(255, 0, 255)),
    ("orange", Color32::from_rgb(255, 128, 0)),
    ("yellow", Color32::from_rgb(255, 255, 0)),
    ("white", Color32::from_rgb(255, 255, 255)),
];

/// `#RRGGBBAA` to `#AARRGGBB`. `None` unless the input is 9 characters long.
pub fn to_argb(rgba: &str) -> Option<String> {
    if rgba.len() != 9 || !rgba.starts_with('#') || !rgba.is_ascii() {
        return None;
    }
    Some(format!("#{}{}", &rgba[7..9], &rgba[1..7]))
}

/// `#AARRGGBB` to `#RRGGBBAA`. `None` unless the input is 9 characters long.
pub fn to_rgba(argb: &str) -> Option<String> {
    if argb.len() != 9 || !argb.starts_with('#') || !argb.is_ascii() {
        return None;
    }
    Some(format!("#{}{}", &argb[3..9], &argb[1..3]))
}

fn parse_argb(argb: &str) -> Option<Color32> {
    let value = u32::from_str_radix(argb.strip_prefix('#')?, 16).ok()?;
    let [a, r, g, b] = value.to_be_bytes();
    Some(Color32::from_rgba_unmultiplied(r, g, b, a))
}

/// Decodes a file color string. Anything unrecognised becomes transparent.
pub fn parse_color(value: &str) -> Color32 {
    if value.starts_with('#') {
        return to_argb(value)
            .as_deref()
            .and_then(parse_argb)
            .unwrap_or(Color32::TRANSPARENT);
    }
    STANDARD_COLORS
        .iter()
        .find(|(name, _)| *name == value)
        .map_or(Color32::TRANSPARENT, |(_, color)| *color)
}

/// Encodes a color as lowercase `#rrggbbaa`.
///
/// `Color32` stores premultiplied alpha, so a translucent color read by
/// [`parse_color`] can come back a step or two off per channel. Opaque colors
/// and the alpha byte itself are exact.
pub fn format_color(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
}
