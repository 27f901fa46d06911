//! Standard Type1 fonts: names, metrics, and WinAnsi encoding.
//!
//! Only the base-14 fonts are used, so nothing is embedded. Widths come from
//! the Adobe AFM files in units of 1/1000 em. Oblique faces share the widths
//! of their upright counterparts.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::style::{FontStyle, PT_PER_MM};

/// Standard font family used for all text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Proportional sans-serif
    #[default]
    Helvetica,
    /// Monospaced
    Courier,
}

impl std::str::FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "helvetica" | "arial" | "sans" => Ok(FontFamily::Helvetica),
            "courier" | "mono" => Ok(FontFamily::Courier),
            other => Err(format!("unknown font family '{}'", other)),
        }
    }
}

/// A concrete font: family plus bold/italic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontFace {
    pub family: FontFamily,
    pub style: FontStyle,
}

impl FontFace {
    pub fn new(family: FontFamily, style: FontStyle) -> Self {
        Self { family, style }
    }

    /// PostScript name of the standard font.
    pub fn base_font(&self) -> &'static str {
        match (self.family, self.style.bold, self.style.italic) {
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
        }
    }

    /// Page resource name (`F1` .. `F8`).
    pub fn resource_name(&self) -> String {
        let family = match self.family {
            FontFamily::Helvetica => 0,
            FontFamily::Courier => 4,
        };
        let style = usize::from(self.style.bold) + 2 * usize::from(self.style.italic);
        format!("F{}", family + style + 1)
    }

    /// Advance width of one WinAnsi byte, in 1/1000 em.
    pub fn glyph_width(&self, byte: u8) -> u16 {
        match self.family {
            FontFamily::Courier => 600,
            FontFamily::Helvetica => {
                let table = if self.style.bold {
                    &HELVETICA_BOLD_WIDTHS
                } else {
                    &HELVETICA_WIDTHS
                };
                match byte {
                    32..=126 => table[usize::from(byte - 32)],
                    _ => DEFAULT_WIDTH,
                }
            }
        }
    }

    /// Width of encoded text at the given size, in millimeters.
    pub fn text_width_mm(&self, encoded: &[u8], size_pt: f32) -> f32 {
        let units: u32 = encoded.iter().map(|&b| u32::from(self.glyph_width(b))).sum();
        units as f32 * size_pt / 1000.0 / PT_PER_MM
    }
}

const DEFAULT_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Encode text for a simple font with `WinAnsiEncoding`.
///
/// Text is NFC-normalized first so decomposed accents map onto Latin-1.
/// Tabs become spaces, other control characters are dropped, and characters
/// outside the encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.nfc() {
        match ch {
            '\t' => out.push(b' '),
            c if c.is_control() => {}
            c if (c as u32) < 0x80 => out.push(c as u8),
            c if (0xA0..=0xFF).contains(&(c as u32)) => out.push(c as u32 as u8),
            c => out.push(win_ansi_special(c).unwrap_or(b'?')),
        }
    }
    out
}

fn win_ansi_special(ch: char) -> Option<u8> {
    let byte = match ch {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}
