//! Rendering module: PDF output plus text and JSON views of the document.

mod fonts;
mod json;
mod layout;
mod options;
mod pdf;
mod result;
mod style;
mod text;

pub use fonts::{encode_win_ansi, FontFace, FontFamily};
pub use json::{to_json, JsonFormat};
pub use layout::{layout_document, DrawOp, ImageOp, LaidOut, PageContent, RectOp, RenderState, TextOp};
pub use options::{BlockOrder, BoxMm, PageLayout, RenderOptions, DEFAULT_PRODUCER};
pub use pdf::{render_pdf, to_pdf, write_pdf};
pub use result::{RenderOutput, RenderStats};
pub use style::{parse_hex_color, FontStyle, Rgb, TextStyle, PT_PER_MM};
pub use text::to_text;
