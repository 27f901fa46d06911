//! Resolved text styles.

use crate::model::RunFormatting;

use super::options::PageLayout;

/// Points per millimeter.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Bold/italic combination of a standard font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub const REGULAR: FontStyle = FontStyle {
        bold: false,
        italic: false,
    };

    /// Create a style from flags.
    pub fn new(bold: bool, italic: bool) -> Self {
        Self { bold, italic }
    }

    /// Style flags as a string: `""`, `"B"`, `"I"` or `"BI"`.
    pub fn flags(&self) -> &'static str {
        match (self.bold, self.italic) {
            (false, false) => "",
            (true, false) => "B",
            (false, true) => "I",
            (true, true) => "BI",
        }
    }
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to 0.0..=1.0 for PDF color operators.
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

/// Parse a six-digit hex color such as `FF0000`.
///
/// Anything else, including three-digit shorthand, yields black.
pub fn parse_hex_color(value: &str) -> Rgb {
    let value = value.trim();
    if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Rgb::BLACK;
    }

    let component = |i: usize| u8::from_str_radix(&value[i..i + 2], 16).unwrap_or(0);
    Rgb::new(component(0), component(2), component(4))
}

/// Font style, size in points, and color applied to drawn text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontStyle,
    pub size: f32,
    pub color: Rgb,
}

impl TextStyle {
    /// Unformatted body text.
    pub fn body(layout: &PageLayout) -> Self {
        Self {
            font: FontStyle::REGULAR,
            size: layout.body_font_size,
            color: Rgb::BLACK,
        }
    }

    /// Table cell text.
    pub fn table(layout: &PageLayout) -> Self {
        Self {
            size: layout.table_font_size,
            ..Self::body(layout)
        }
    }

    /// Resolve a run's formatting. Missing or unusable size and color fall
    /// back to the body defaults; nothing carries over from earlier runs.
    pub fn for_run(formatting: &RunFormatting, layout: &PageLayout) -> Self {
        Self {
            font: FontStyle::new(formatting.bold, formatting.italic),
            size: formatting
                .font_size_points()
                .unwrap_or(layout.body_font_size),
            color: formatting
                .color_hex
                .as_deref()
                .map(parse_hex_color)
                .unwrap_or(Rgb::BLACK),
        }
    }

    /// Font size in millimeters.
    pub fn size_mm(&self) -> f32 {
        self.size / PT_PER_MM
    }
}
