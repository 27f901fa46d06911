//! Page layout: turns document blocks into positioned drawing operations.
//!
//! Coordinates are millimeters from the top-left corner of the page. The
//! PDF writer flips them into PDF user space.

use crate::media::MediaIndex;
use crate::model::{Alignment, Block, Document, ImagePlacement, Paragraph, Table};

use super::fonts::{encode_win_ansi, FontFace, FontFamily};
use super::options::{BlockOrder, BoxMm, PageLayout, RenderOptions};
use super::result::RenderStats;
use super::style::{Rgb, TextStyle};

/// A line of text to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    /// Left edge of the text
    pub x: f32,
    /// Baseline position
    pub y: f32,
    /// Source text
    pub text: String,
    /// WinAnsi-encoded text
    pub encoded: Vec<u8>,
    pub face: FontFace,
    /// Size in points
    pub size: f32,
    pub color: Rgb,
}

/// A stroked rectangle (table cell border).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectOp {
    pub rect: BoxMm,
}

/// An image scaled into a box.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOp {
    /// Archive name of the media entry
    pub name: String,
    pub rect: BoxMm,
}

/// One drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text(TextOp),
    Rect(RectOp),
    Image(ImageOp),
}

/// Drawing operations of one page, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub ops: Vec<DrawOp>,
}

impl PageContent {
    /// Text operations on this page.
    pub fn texts(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }
}

/// Result of laying out a document.
#[derive(Debug, Clone, Default)]
pub struct LaidOut {
    pub pages: Vec<PageContent>,
    pub stats: RenderStats,
}

/// Mutable drawing state: current font, style, and cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub family: FontFamily,
    pub style: TextStyle,
    pub x: f32,
    pub y: f32,
}

impl RenderState {
    fn face(&self) -> FontFace {
        FontFace::new(self.family, self.style.font)
    }
}

/// Lay out a document with the given options.
///
/// Image placements that do not resolve to an extracted media entry are
/// skipped. There is always at least one page.
pub fn layout_document(doc: &Document, media: &MediaIndex, options: &RenderOptions) -> LaidOut {
    let blocks: Vec<&Block> = match options.block_order {
        BlockOrder::Document => doc.blocks.iter().collect(),
        BlockOrder::Grouped => doc.grouped_blocks(),
    };

    let mut engine = LayoutEngine::new(&options.layout, options.font_family);
    for block in blocks {
        match block {
            Block::Paragraph(p) => engine.paragraph(p),
            Block::Table(t) => engine.table(t),
            Block::Image(i) => engine.image(i, media),
        }
    }
    engine.finish()
}

struct LayoutEngine<'a> {
    layout: &'a PageLayout,
    state: RenderState,
    pages: Vec<PageContent>,
    stats: RenderStats,
}

impl<'a> LayoutEngine<'a> {
    fn new(layout: &'a PageLayout, family: FontFamily) -> Self {
        let mut engine = Self {
            layout,
            state: RenderState {
                family,
                style: TextStyle::body(layout),
                x: layout.margin_left,
                y: layout.margin_top,
            },
            pages: Vec::new(),
            stats: RenderStats::new(),
        };
        engine.new_page();
        engine
    }

    fn new_page(&mut self) {
        self.pages.push(PageContent::default());
        self.state.x = self.layout.margin_left;
        self.state.y = self.layout.margin_top;
        self.stats.page_count += 1;
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Start a new page if a box of height `h` would cross the break line.
    fn ensure_room(&mut self, h: f32) {
        if self.state.y + h > self.layout.break_trigger() {
            self.new_page();
        }
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        self.state.style = TextStyle::body(self.layout);
        for run in &paragraph.runs {
            self.state.style = TextStyle::for_run(&run.formatting, self.layout);
            for text in &run.texts {
                self.line(text, paragraph.alignment);
            }
        }
        self.state.x = self.layout.margin_left;
        self.state.y += self.layout.paragraph_spacing;
        self.stats.paragraph_count += 1;
    }

    /// Draw one text fragment as a full-width line and move below it.
    fn line(&mut self, text: &str, alignment: Alignment) {
        let h = self.layout.line_height;
        self.ensure_room(h);

        let x = self.state.x;
        let width = self.layout.page_width - self.layout.margin_right - x;
        let encoded = encode_win_ansi(text);

        if !encoded.is_empty() {
            let face = self.state.face();
            let text_width = face.text_width_mm(&encoded, self.state.style.size);
            let margin = self.layout.cell_margin;
            let tx = match alignment {
                Alignment::Center => x + (width - text_width) / 2.0,
                Alignment::Right => x + width - margin - text_width,
                Alignment::Left | Alignment::Justify => x + margin,
            };
            let op = self.text_op(tx, self.state.y, h, text, encoded);
            self.push(DrawOp::Text(op));
        }

        self.state.x = self.layout.margin_left;
        self.state.y += h;
        self.stats.line_count += 1;
    }

    fn table(&mut self, table: &Table) {
        self.state.style = TextStyle::table(self.layout);
        let (w, h) = (self.layout.cell_width, self.layout.cell_height);

        for row in &table.rows {
            self.ensure_room(h);
            for cell in &row.cells {
                let x = self.state.x;
                let y = self.state.y;
                self.push(DrawOp::Rect(RectOp {
                    rect: BoxMm {
                        x,
                        y,
                        width: w,
                        height: h,
                    },
                }));

                let encoded = encode_win_ansi(&cell.text);
                if !encoded.is_empty() {
                    let text_width = self.state.face().text_width_mm(&encoded, self.state.style.size);
                    let op = self.text_op(x + (w - text_width) / 2.0, y, h, &cell.text, encoded);
                    self.push(DrawOp::Text(op));
                }

                self.state.x += w;
                self.stats.cell_count += 1;
            }
            self.state.x = self.layout.margin_left;
            self.state.y += h;
        }

        self.stats.table_count += 1;
    }

    fn image(&mut self, image: &ImagePlacement, media: &MediaIndex) {
        match media.resolve(&image.embed_id) {
            Some(name) => {
                self.push(DrawOp::Image(ImageOp {
                    name: name.to_string(),
                    rect: self.layout.image_box,
                }));
                self.stats.images_drawn += 1;
            }
            None => {
                log::debug!("Skipping image '{}': no matching media entry", image.embed_id);
                self.stats.images_skipped += 1;
            }
        }
    }

    /// Text vertically centered in a box of height `h` whose top is `top`.
    fn text_op(&self, x: f32, top: f32, h: f32, text: &str, encoded: Vec<u8>) -> TextOp {
        let style = self.state.style;
        TextOp {
            x,
            y: top + 0.5 * h + 0.3 * style.size_mm(),
            text: text.to_string(),
            encoded,
            face: self.state.face(),
            size: style.size,
            color: style.color,
        }
    }

    fn finish(self) -> LaidOut {
        LaidOut {
            pages: self.pages,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Run, RunFormatting, Table};
    use crate::render::style::FontStyle;

    fn lay_out(doc: &Document) -> LaidOut {
        layout_document(doc, &MediaIndex::new(), &RenderOptions::default())
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_empty_document_has_one_blank_page() {
        let out = lay_out(&Document::new());
        assert_eq!(out.pages.len(), 1);
        assert!(out.pages[0].ops.is_empty());
        assert_eq!(out.stats.page_count, 1);
    }

    #[test]
    fn test_single_line_position() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Hello"));

        let out = lay_out(&doc);
        let text = out.pages[0].texts().next().unwrap();

        assert_eq!(text.text, "Hello");
        assert!(approx(text.x, 11.0));
        // top 10 + half line 3 + 0.3 * 12pt in mm
        assert!(approx(text.y, 13.0 + 0.3 * 12.0 * 25.4 / 72.0));
        assert_eq!(text.face.style, FontStyle::REGULAR);
        assert_eq!(text.size, 12.0);
        assert_eq!(out.stats.line_count, 1);
        assert_eq!(out.stats.paragraph_count, 1);
    }

    #[test]
    fn test_paragraph_advance() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("one"));
        doc.add_paragraph(Paragraph::with_text("two"));

        let out = lay_out(&doc);
        let ys: Vec<f32> = out.pages[0].texts().map(|t| t.y).collect();
        // line height 6 plus paragraph spacing 4
        assert!(approx(ys[1] - ys[0], 10.0));
    }

    #[test]
    fn test_run_style_resolution() {
        let mut para = Paragraph::new();
        para.add_run(Run::new("Big").with_formatting(RunFormatting {
            bold: true,
            font_size_half_points: Some("28".into()),
            color_hex: Some("FF0000".into()),
            ..Default::default()
        }));
        para.add_run(Run::new("plain"));
        let mut doc = Document::new();
        doc.add_paragraph(para);

        let out = lay_out(&doc);
        let texts: Vec<&TextOp> = out.pages[0].texts().collect();

        assert_eq!(texts[0].face.style.flags(), "B");
        assert_eq!(texts[0].size, 14.0);
        assert_eq!(texts[0].color, Rgb::new(255, 0, 0));
        assert_eq!(texts[1].face.style.flags(), "");
        assert_eq!(texts[1].size, 12.0);
        assert_eq!(texts[1].color, Rgb::BLACK);
    }

    #[test]
    fn test_alignment() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("R").align(Alignment::Right));
        doc.add_paragraph(Paragraph::with_text("C").align(Alignment::Center));

        let out = lay_out(&doc);
        let texts: Vec<&TextOp> = out.pages[0].texts().collect();
        let face = texts[0].face;

        let right_width = face.text_width_mm(b"R", 12.0);
        assert!(approx(texts[0].x, 200.0 - 1.0 - right_width));

        let center_width = face.text_width_mm(b"C", 12.0);
        assert!(approx(texts[1].x, 10.0 + (190.0 - center_width) / 2.0));
    }

    #[test]
    fn test_empty_fragment_advances_without_drawing() {
        let mut para = Paragraph::new();
        para.add_run(Run::new(""));
        para.add_run(Run::new("after"));
        let mut doc = Document::new();
        doc.add_paragraph(para);

        let out = lay_out(&doc);
        let texts: Vec<&TextOp> = out.pages[0].texts().collect();
        assert_eq!(texts.len(), 1);
        assert_eq!(out.stats.line_count, 2);
        assert!(texts[0].y > 19.0);
    }

    #[test]
    fn test_table_cells() {
        let mut doc = Document::new();
        doc.add_table(Table::from_rows([["A", "B"], ["C", ""]]));

        let out = lay_out(&doc);
        let rects: Vec<BoxMm> = out.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect(r) => Some(r.rect),
                _ => None,
            })
            .collect();

        assert_eq!(rects.len(), 4);
        assert_eq!((rects[0].x, rects[0].y), (10.0, 10.0));
        assert_eq!((rects[1].x, rects[1].y), (50.0, 10.0));
        assert_eq!((rects[2].x, rects[2].y), (10.0, 20.0));
        assert_eq!((rects[0].width, rects[0].height), (40.0, 10.0));

        let texts: Vec<&TextOp> = out.pages[0].texts().collect();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0].size, 10.0);
        assert_eq!(out.stats.cell_count, 4);
        assert_eq!(out.stats.table_count, 1);
    }

    #[test]
    fn test_unresolved_image_is_skipped() {
        let mut doc = Document::new();
        doc.add_image(ImagePlacement::new("rId404"));

        let out = lay_out(&doc);
        assert!(out.pages[0].ops.is_empty());
        assert_eq!(out.stats.images_skipped, 1);
    }

    #[test]
    fn test_resolved_image_uses_fixed_box() {
        let mut media = MediaIndex::new();
        media.insert_bytes("word/media/pic.png", vec![1, 2, 3]);
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("x"));
        doc.add_image(ImagePlacement::new("pic.png"));

        let out = layout_document(&doc, &media, &RenderOptions::default());
        let image = out.pages[0]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Image(i) => Some(i),
                _ => None,
            })
            .unwrap();

        assert_eq!(image.name, "word/media/pic.png");
        assert_eq!(image.rect, PageLayout::default().image_box);
        assert_eq!(out.stats.images_drawn, 1);
    }

    #[test]
    fn test_page_break() {
        let mut doc = Document::new();
        for i in 0..30 {
            doc.add_paragraph(Paragraph::with_text(format!("line {}", i)));
        }

        let out = lay_out(&doc);
        // 10mm per paragraph, 267mm of usable height
        assert_eq!(out.pages.len(), 2);
        assert_eq!(out.pages[0].texts().count(), 27);
        let first_on_second = out.pages[1].texts().next().unwrap();
        assert_eq!(first_on_second.text, "line 27");
        assert!(first_on_second.y < 20.0);
    }

    #[test]
    fn test_grouped_order() {
        let mut doc = Document::new();
        doc.add_table(Table::from_rows([["cell"]]));
        doc.add_paragraph(Paragraph::with_text("para"));

        let options = RenderOptions::default().grouped();
        let out = layout_document(&doc, &MediaIndex::new(), &options);
        let texts: Vec<&str> = out.pages[0].texts().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["para", "cell"]);

        let out = lay_out(&doc);
        let texts: Vec<&str> = out.pages[0].texts().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["cell", "para"]);
    }
}
