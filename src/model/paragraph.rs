//! Paragraph and run-level types.

use serde::{Deserialize, Serialize};

/// A paragraph of text content (`<w:p>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Runs in the paragraph, in source order
    pub runs: Vec<Run>,

    /// Paragraph alignment
    pub alignment: Alignment,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with a single unformatted run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(Run::new(text));
        p
    }

    /// Set alignment and return self.
    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Add a run.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.plain_text()).collect()
    }

    /// Check if the paragraph has no text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.is_empty())
    }
}

/// A contiguous span of text sharing one formatting set (`<w:r>`).
///
/// Each `<w:t>` element of the run is kept as a separate fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Text fragments, in source order
    pub texts: Vec<String>,

    /// Formatting applied to every fragment
    pub formatting: RunFormatting,
}

impl Run {
    /// Create a run with one text fragment and default formatting.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            texts: vec![text.into()],
            formatting: RunFormatting::default(),
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(text).with_formatting(RunFormatting {
            bold: true,
            ..Default::default()
        })
    }

    /// Create an italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::new(text).with_formatting(RunFormatting {
            italic: true,
            ..Default::default()
        })
    }

    /// Replace the formatting and return self.
    pub fn with_formatting(mut self, formatting: RunFormatting) -> Self {
        self.formatting = formatting;
        self
    }

    /// Append a text fragment.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.texts.push(text.into());
    }

    /// Concatenated text of all fragments.
    pub fn plain_text(&self) -> String {
        self.texts.concat()
    }

    /// Check if the run carries no text.
    pub fn is_empty(&self) -> bool {
        self.texts.iter().all(|t| t.is_empty())
    }
}

/// Direct run formatting (`<w:rPr>`).
///
/// Size and color are kept as the raw attribute strings. They are resolved
/// (and defaulted when absent or invalid) at render time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFormatting {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Font size in half-points, as written in `w:sz`
    pub font_size_half_points: Option<String>,

    /// Text color as six hex digits, as written in `w:color`
    pub color_hex: Option<String>,
}

impl RunFormatting {
    /// Font size in points, if the half-point value is a usable number.
    pub fn font_size_points(&self) -> Option<f32> {
        let raw = self.font_size_half_points.as_deref()?;
        let half_points = raw.trim().parse::<f32>().ok()?;
        if half_points.is_finite() && half_points > 0.0 {
            Some(half_points / 2.0)
        } else {
            None
        }
    }

    /// Check if no formatting is applied.
    pub fn is_plain(&self) -> bool {
        !self.bold
            && !self.italic
            && self.font_size_half_points.is_none()
            && self.color_hex.is_none()
    }
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment (rendered as left)
    Justify,
}

impl Alignment {
    /// Map a `w:jc` value to an alignment. Unknown values fall back to left.
    pub fn from_wml(value: &str) -> Self {
        match value {
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" | "distribute" | "justify" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }
}
