//! Streaming parser for `word/document.xml`.
//!
//! The parser walks quick-xml events once and keeps a stack of the open
//! elements it cares about. Element prefixes are ignored; matching is done on
//! local names. Anything not modeled is skipped. Only XML that is not
//! well-formed is an error.

use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::{
    Alignment, Document, ImagePlacement, Paragraph, Run, Table, TableCell, TableRow,
};

/// Parse document markup into a [`Document`].
///
/// Metadata is left empty; see [`parse_core_properties`](super::parse_core_properties).
///
/// # Errors
///
/// Returns [`Error::MalformedMarkup`] for invalid UTF-8, XML syntax errors,
/// mismatched or unclosed tags, or input without a root element.
pub fn parse_document_xml(xml: &[u8]) -> Result<Document> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut builder = BodyBuilder::default();
    let mut buf = Vec::with_capacity(1024);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => builder.open(&e),
            Ok(Event::Empty(e)) => {
                builder.open(&e);
                builder.close()?;
            }
            Ok(Event::End(_)) => builder.close()?,
            Ok(Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref())
                    .map_err(|err| Error::MalformedMarkup(format!("invalid UTF-8 in text: {}", err)))?;
                let text = quick_xml::escape::unescape(raw)
                    .map_err(|err| Error::MalformedMarkup(err.to_string()))?;
                builder.text(&text)?;
            }
            Ok(Event::CData(e)) => {
                let text = std::str::from_utf8(e.as_ref())
                    .map_err(|err| Error::MalformedMarkup(format!("invalid UTF-8 in CDATA: {}", err)))?;
                builder.text(text)?;
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(text) = resolve_reference(&e)? {
                    builder.text(&text)?;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::MalformedMarkup(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    builder.finish()
}

/// Resolve a character or predefined entity reference.
fn resolve_reference(reference: &BytesRef) -> Result<Option<String>> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|e| Error::MalformedMarkup(e.to_string()))?
    {
        return Ok(Some(ch.to_string()));
    }

    let name = std::str::from_utf8(reference.as_ref())
        .map_err(|e| Error::MalformedMarkup(format!("invalid UTF-8 in reference: {}", e)))?;
    match quick_xml::escape::resolve_predefined_entity(name) {
        Some(value) => Ok(Some(value.to_string())),
        None => {
            log::debug!("Ignoring unknown entity reference &{};", name);
            Ok(None)
        }
    }
}

/// Role of an open element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Body,
    Paragraph,
    ParagraphProps,
    Run,
    RunProps,
    Text,
    Table,
    NestedTable,
    Row,
    Cell,
    CellParagraph,
    CellRun,
    CellText,
    TextBox,
    /// `oMath`/`oMathPara` and everything inside
    Math,
    /// `sdt`/`sdtContent`; transparent for structure
    Wrapper,
    /// `mc:Fallback`; duplicates its `mc:Choice` sibling
    Skipped,
    Other,
}

#[derive(Default)]
struct CellBuilder {
    parts: Vec<String>,
    current: String,
}

impl CellBuilder {
    fn end_paragraph(&mut self) {
        if !self.current.is_empty() {
            self.parts.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> TableCell {
        self.end_paragraph();
        TableCell::text(self.parts.join(" "))
    }
}

#[derive(Default)]
struct BodyBuilder {
    document: Document,
    stack: Vec<Tag>,
    seen_root: bool,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    text: Option<String>,
    table: Option<Table>,
    row: Option<TableRow>,
    cell: Option<CellBuilder>,
    pending_images: Vec<ImagePlacement>,
}

impl BodyBuilder {
    fn parent(&self) -> Option<Tag> {
        self.stack.last().copied()
    }

    /// Innermost open element that is not a content-control wrapper.
    fn structural_parent(&self) -> Option<Tag> {
        self.stack.iter().rev().copied().find(|tag| *tag != Tag::Wrapper)
    }

    fn within(&self, tag: Tag) -> bool {
        self.stack.contains(&tag)
    }

    fn open(&mut self, e: &BytesStart) {
        if self.stack.is_empty() {
            self.seen_root = true;
        }
        let tag = self.classify(e);
        self.begin(tag, e);
        self.stack.push(tag);
    }

    fn classify(&self, e: &BytesStart) -> Tag {
        let local = e.local_name();
        let name = local.as_ref();
        let parent = self.structural_parent();

        if parent == Some(Tag::Skipped) || name == b"Fallback" {
            return Tag::Skipped;
        }
        if name == b"body" {
            return Tag::Body;
        }
        if !self.within(Tag::Body) {
            return Tag::Other;
        }
        if name == b"txbxContent" {
            return Tag::TextBox;
        }
        if self.within(Tag::TextBox) {
            return Tag::Other;
        }
        if parent == Some(Tag::Math) || name == b"oMath" || name == b"oMathPara" {
            return Tag::Math;
        }
        if name == b"sdt" || name == b"sdtContent" {
            return Tag::Wrapper;
        }

        match name {
            b"tbl" if self.table.is_none() && self.paragraph.is_none() => Tag::Table,
            b"tbl" if self.table.is_some() => Tag::NestedTable,
            b"tr" if parent == Some(Tag::Table) => Tag::Row,
            b"tc" if parent == Some(Tag::Row) => Tag::Cell,
            b"p" if self.cell.is_some() => Tag::CellParagraph,
            b"p" if self.table.is_none() && self.paragraph.is_none() => Tag::Paragraph,
            b"pPr" if parent == Some(Tag::Paragraph) => Tag::ParagraphProps,
            b"r" if self.paragraph.is_some() && self.run.is_none() => Tag::Run,
            b"r" if self.cell.is_some() && !self.within(Tag::CellRun) => Tag::CellRun,
            b"rPr" if parent == Some(Tag::Run) => Tag::RunProps,
            b"t" if parent == Some(Tag::Run) => Tag::Text,
            b"t" if parent == Some(Tag::CellRun) => Tag::CellText,
            _ => Tag::Other,
        }
    }

    fn begin(&mut self, tag: Tag, e: &BytesStart) {
        match tag {
            Tag::Paragraph => self.paragraph = Some(Paragraph::new()),
            Tag::Run => self.run = Some(Run::default()),
            Tag::Text => self.text = Some(String::new()),
            Tag::Table => self.table = Some(Table::new()),
            Tag::Row => self.row = Some(TableRow::default()),
            Tag::Cell => self.cell = Some(CellBuilder::default()),
            Tag::Other => self.property(e),
            _ => {}
        }
    }

    /// Handle leaf elements that carry formatting or image references.
    fn property(&mut self, e: &BytesStart) {
        let local = e.local_name();
        let name = local.as_ref();

        if name == b"blip" {
            match attribute(e, b"embed") {
                Some(id) if !id.is_empty() => self.pending_images.push(ImagePlacement::new(id)),
                _ => log::debug!("Ignoring blip without embed reference"),
            }
            return;
        }

        match self.parent() {
            Some(Tag::ParagraphProps) if name == b"jc" => {
                if let (Some(paragraph), Some(value)) =
                    (self.paragraph.as_mut(), attribute(e, b"val"))
                {
                    paragraph.alignment = Alignment::from_wml(&value);
                }
            }
            Some(Tag::RunProps) => {
                let Some(run) = self.run.as_mut() else {
                    return;
                };
                let formatting = &mut run.formatting;
                match name {
                    b"b" => formatting.bold = toggle(e),
                    b"i" => formatting.italic = toggle(e),
                    b"sz" => formatting.font_size_half_points = attribute(e, b"val"),
                    b"color" => {
                        formatting.color_hex = attribute(e, b"val").filter(|v| v != "auto")
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn close(&mut self) -> Result<()> {
        let tag = self.stack.pop().ok_or_else(|| {
            Error::MalformedMarkup("closing tag without matching opening tag".to_string())
        })?;

        match tag {
            Tag::Text => {
                if let (Some(text), Some(run)) = (self.text.take(), self.run.as_mut()) {
                    run.push_text(text);
                }
            }
            Tag::Run => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.add_run(run);
                }
            }
            Tag::Paragraph => {
                if let Some(paragraph) = self.paragraph.take() {
                    self.document.add_paragraph(paragraph);
                }
                self.flush_images();
            }
            Tag::CellParagraph => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.end_paragraph();
                }
            }
            Tag::Cell => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.cells.push(cell.finish());
                }
            }
            Tag::Row => {
                if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.add_row(row);
                }
            }
            Tag::Table => {
                if let Some(table) = self.table.take() {
                    self.document.add_table(table);
                }
                self.flush_images();
            }
            Tag::Body => self.flush_images(),
            _ => {}
        }

        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        match self.parent() {
            Some(Tag::Text) => {
                if let Some(buffer) = self.text.as_mut() {
                    buffer.push_str(text);
                }
            }
            Some(Tag::CellText) => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.current.push_str(text);
                }
            }
            None if !text.trim().is_empty() => {
                return Err(Error::MalformedMarkup(
                    "text content outside the root element".to_string(),
                ));
            }
            _ => {}
        }
        Ok(())
    }

    /// Emit images collected inside the block that just ended.
    fn flush_images(&mut self) {
        if self.paragraph.is_some() || self.table.is_some() {
            return;
        }
        for image in self.pending_images.drain(..) {
            self.document.add_image(image);
        }
    }

    fn finish(self) -> Result<Document> {
        if !self.seen_root {
            return Err(Error::MalformedMarkup("no root element".to_string()));
        }
        if !self.stack.is_empty() {
            return Err(Error::MalformedMarkup(format!(
                "unexpected end of input with {} unclosed element(s)",
                self.stack.len()
            )));
        }
        Ok(self.document)
    }
}

/// Value of the first attribute with the given local name.
fn attribute(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == local)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// WML on/off property: present means on unless `w:val` says otherwise.
fn toggle(e: &BytesStart) -> bool {
    !matches!(
        attribute(e, b"val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Block;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
            xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
            xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"
            xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math">
<w:body>{}<w:sectPr/></w:body></w:document>"#,
            body
        )
    }

    fn parse(body: &str) -> Document {
        parse_document_xml(wrap(body).as_bytes()).unwrap()
    }

    #[test]
    fn test_single_plain_run() {
        let doc = parse("<w:p><w:r><w:t>Hello</w:t></w:r></w:p>");

        assert_eq!(doc.block_count(), 1);
        let para = doc.paragraphs().next().unwrap();
        assert_eq!(para.alignment, Alignment::Left);
        assert_eq!(para.runs.len(), 1);
        assert_eq!(para.runs[0].texts, vec!["Hello"]);
        assert!(para.runs[0].formatting.is_plain());
    }

    #[test]
    fn test_run_formatting() {
        let doc = parse(
            r#"<w:p><w:pPr><w:jc w:val="center"/><w:rPr><w:b/></w:rPr></w:pPr>
               <w:r><w:rPr><w:b/><w:i w:val="0"/><w:sz w:val="28"/><w:color w:val="FF0000"/></w:rPr>
               <w:t>Title</w:t></w:r></w:p>"#,
        );

        let para = doc.paragraphs().next().unwrap();
        assert_eq!(para.alignment, Alignment::Center);
        let fmt = &para.runs[0].formatting;
        assert!(fmt.bold);
        assert!(!fmt.italic);
        assert_eq!(fmt.font_size_half_points.as_deref(), Some("28"));
        assert_eq!(fmt.color_hex.as_deref(), Some("FF0000"));
    }

    #[test]
    fn test_auto_color_is_absent() {
        let doc = parse(r#"<w:p><w:r><w:rPr><w:color w:val="auto"/></w:rPr><w:t>x</w:t></w:r></w:p>"#);
        let run = &doc.paragraphs().next().unwrap().runs[0];
        assert_eq!(run.formatting.color_hex, None);
    }

    #[test]
    fn test_multiple_text_fragments_and_preserved_space() {
        let doc = parse(
            r#"<w:p><w:r><w:t xml:space="preserve">Hello </w:t><w:tab/><w:t>world</w:t></w:r></w:p>"#,
        );
        let run = &doc.paragraphs().next().unwrap().runs[0];
        assert_eq!(run.texts, vec!["Hello ", "world"]);
    }

    #[test]
    fn test_entities_are_resolved() {
        let doc = parse("<w:p><w:r><w:t>Fish &amp; Chips &#169;</w:t></w:r></w:p>");
        let run = &doc.paragraphs().next().unwrap().runs[0];
        assert_eq!(run.plain_text(), "Fish & Chips \u{a9}");
    }

    #[test]
    fn test_unknown_elements_are_ignored() {
        let doc = parse(
            r#"<w:p><w:proofErr w:type="spellStart"/><w:customThing><w:deep/></w:customThing>
               <w:r><w:rPr><w:rFonts w:ascii="Calibri"/><w:sz w:val="big"/></w:rPr><w:t>ok</w:t></w:r>
               <w:bookmarkEnd w:id="0"/></w:p>"#,
        );
        let run = &doc.paragraphs().next().unwrap().runs[0];
        assert_eq!(run.plain_text(), "ok");
        assert_eq!(run.formatting.font_size_points(), None);
    }

    #[test]
    fn test_hyperlink_runs_belong_to_paragraph() {
        let doc = parse(
            r#"<w:p><w:r><w:t>See </w:t></w:r><w:hyperlink r:id="rId9"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>"#,
        );
        assert_eq!(doc.paragraphs().next().unwrap().plain_text(), "See link");
    }

    #[test]
    fn test_math_runs_are_skipped() {
        let doc = parse(
            r#"<w:p><w:r><w:t>x = </w:t></w:r><m:oMath><m:r><m:t>y</m:t></m:r></m:oMath></w:p>"#,
        );
        let para = doc.paragraphs().next().unwrap();
        assert_eq!(para.runs.len(), 1);
        assert_eq!(para.plain_text(), "x = ");
    }

    #[test]
    fn test_math_under_any_prefix_is_skipped() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:mm="http://schemas.openxmlformats.org/officeDocument/2006/math"><w:body>
            <w:p><w:r><w:t>x = </w:t></w:r><mm:oMathPara><mm:oMath><mm:r><mm:t>y</mm:t></mm:r></mm:oMath></mm:oMathPara></w:p>
            </w:body></w:document>"#;
        let doc = parse_document_xml(xml.as_bytes()).unwrap();

        let para = doc.paragraphs().next().unwrap();
        assert_eq!(para.runs.len(), 1);
        assert_eq!(para.plain_text(), "x = ");
    }

    #[test]
    fn test_math_inside_table_cell_is_skipped() {
        let doc = parse(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>n</w:t></w:r><m:oMath><m:r><m:t>2</m:t></m:r></m:oMath></w:p></w:tc></w:tr></w:tbl>"#,
        );
        assert_eq!(doc.tables().next().unwrap().rows[0].cells[0].text, "n");
    }

    #[test]
    fn test_table() {
        let doc = parse(
            r#"<w:tbl><w:tblPr><w:jc w:val="center"/></w:tblPr>
               <w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr>
               <w:tr><w:tc><w:p><w:r><w:t>C</w:t></w:r></w:p><w:p><w:r><w:t>c2</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr>
               </w:tbl>"#,
        );

        assert_eq!(doc.paragraphs().count(), 0);
        let table = doc.tables().next().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].cells[0].text, "A");
        assert_eq!(table.rows[0].cells[1].text, "B");
        assert_eq!(table.rows[1].cells[0].text, "C c2");
        assert_eq!(table.rows[1].cells[1].text, "");
    }

    #[test]
    fn test_content_control_wrapped_rows_and_cells() {
        let doc = parse(
            r#"<w:tbl>
               <w:tr><w:sdt><w:sdtPr><w:alias w:val="pick"/></w:sdtPr><w:sdtContent>
                 <w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc>
               </w:sdtContent></w:sdt><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr>
               <w:sdt><w:sdtContent>
                 <w:tr><w:tc><w:p><w:sdt><w:sdtContent><w:r><w:t>C</w:t></w:r></w:sdtContent></w:sdt></w:p></w:tc></w:tr>
               </w:sdtContent></w:sdt>
               </w:tbl>"#,
        );

        let table = doc.tables().next().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].cells.len(), 2);
        assert_eq!(table.rows[0].cells[0].text, "A");
        assert_eq!(table.rows[0].cells[1].text, "B");
        assert_eq!(table.rows[1].cells[0].text, "C");
    }

    #[test]
    fn test_content_control_wrapped_paragraph() {
        let doc = parse(
            r#"<w:sdt><w:sdtContent><w:p><w:r><w:t>inside</w:t></w:r></w:p></w:sdtContent></w:sdt>"#,
        );
        assert_eq!(doc.paragraphs().next().unwrap().plain_text(), "inside");
    }

    #[test]
    fn test_nested_table_is_flattened_into_cell() {
        let doc = parse(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>outer</w:t></w:r></w:p>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
               </w:tc></w:tr></w:tbl>"#,
        );
        let table = doc.tables().next().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0].cells.len(), 1);
        assert_eq!(table.rows[0].cells[0].text, "outer inner");
    }

    #[test]
    fn test_inline_image_follows_its_paragraph() {
        let doc = parse(
            r#"<w:p><w:r><w:t>Before</w:t></w:r></w:p>
               <w:p><w:r><w:drawing><wp:inline xmlns:wp="wp"><a:graphic><a:graphicData>
               <pic:pic xmlns:pic="pic"><pic:blipFill><a:blip r:embed="rId5"/></pic:blipFill></pic:pic>
               </a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>
               <w:p><w:r><w:t>After</w:t></w:r></w:p>"#,
        );

        let kinds: Vec<&str> = doc
            .blocks
            .iter()
            .map(|b| match b {
                Block::Paragraph(_) => "p",
                Block::Table(_) => "t",
                Block::Image(_) => "i",
            })
            .collect();
        assert_eq!(kinds, ["p", "p", "i", "p"]);
        assert_eq!(doc.images().next().unwrap().embed_id, "rId5");
    }

    #[test]
    fn test_fallback_content_is_not_duplicated() {
        let doc = parse(
            r#"<w:p><w:r><mc:AlternateContent>
               <mc:Choice Requires="wps"><w:drawing><a:blip r:embed="rId1"/></w:drawing></mc:Choice>
               <mc:Fallback><w:pict><a:blip r:embed="rId1"/></w:pict></mc:Fallback>
               </mc:AlternateContent></w:r></w:p>"#,
        );
        assert_eq!(doc.images().count(), 1);
    }

    #[test]
    fn test_text_box_paragraphs_are_not_body_paragraphs() {
        let doc = parse(
            r#"<w:p><w:r><w:t>Body</w:t></w:r><w:r><w:drawing><wps:txbx xmlns:wps="wps"><w:txbxContent>
               <w:p><w:r><w:t>Boxed</w:t></w:r></w:p></w:txbxContent></wps:txbx></w:drawing></w:r></w:p>"#,
        );
        assert_eq!(doc.paragraphs().count(), 1);
        assert_eq!(doc.plain_text(), "Body");
    }

    #[test]
    fn test_empty_body() {
        let doc = parse("");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_mismatched_tags_are_malformed() {
        let xml = "<w:document><w:body><w:p></w:r></w:body></w:document>";
        let result = parse_document_xml(xml.as_bytes());
        assert!(matches!(result, Err(Error::MalformedMarkup(_))));
    }

    #[test]
    fn test_unclosed_root_is_malformed() {
        let result = parse_document_xml(b"<w:document><w:body><w:p>");
        assert!(matches!(result, Err(Error::MalformedMarkup(_))));
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(matches!(
            parse_document_xml(b""),
            Err(Error::MalformedMarkup(_))
        ));
        assert!(matches!(
            parse_document_xml(b"just some text"),
            Err(Error::MalformedMarkup(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let mut xml = b"<w:document><w:body><w:p><w:r><w:t>".to_vec();
        xml.extend_from_slice(&[0xFF, 0xFE]);
        xml.extend_from_slice(b"</w:t></w:r></w:p></w:body></w:document>");
        assert!(matches!(
            parse_document_xml(&xml),
            Err(Error::MalformedMarkup(_))
        ));
    }
}
