//! DOCX package parser.

use std::io::Read;
use std::path::Path;

use crate::container::{Container, CORE_PROPERTIES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART};
use crate::error::Result;
use crate::media::{extract_media_in, MediaIndex};
use crate::model::{Document, Metadata};

use super::document_xml::parse_document_xml;
use super::options::ParseOptions;
use super::properties::parse_core_properties;
use super::relationships::Relationships;

/// Result of parsing a package: the document tree and its extracted media.
#[derive(Debug)]
pub struct ParsedDocx {
    /// Document tree
    pub document: Document,

    /// Extracted media, with relationship IDs registered for lookup
    pub media: MediaIndex,
}

impl ParsedDocx {
    /// Discard the media and keep the document tree.
    pub fn into_document(self) -> Document {
        self.document
    }
}

/// DOCX package parser.
///
/// The container is opened and validated up front; [`parse`](Self::parse)
/// reads the markup and extracts media.
pub struct DocxParser<'a> {
    container: Container<'a>,
    options: ParseOptions,
}

impl<'a> DocxParser<'a> {
    /// Open a package from bytes.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Open a package from bytes with custom options.
    pub fn from_bytes_with_options(data: &'a [u8], options: ParseOptions) -> Result<Self> {
        let container = Container::open_with_limits(data, options.limits)?;
        Ok(Self { container, options })
    }

    /// Options in effect.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse the package.
    ///
    /// Markup parsing and media extraction share no state and run on
    /// separate rayon workers when `parallel` is set.
    pub fn parse(&self) -> Result<ParsedDocx> {
        let (structure, media) = if self.options.parallel && self.options.extract_media {
            rayon::join(|| self.parse_structure(), || self.extract_media())
        } else {
            (self.parse_structure(), self.extract_media())
        };

        let (document, relationships) = structure?;
        let mut media = media?;
        media.register_relationships(&relationships);

        log::debug!(
            "Parsed {} blocks, {} media entries",
            document.block_count(),
            media.len()
        );

        Ok(ParsedDocx { document, media })
    }

    /// Parse only the document tree, skipping media.
    pub fn parse_document(&self) -> Result<Document> {
        self.parse_structure().map(|(document, _)| document)
    }

    fn parse_structure(&self) -> Result<(Document, Relationships)> {
        let mut container = self.container.clone();

        let mut document = match container.read_entry(DOCUMENT_PART)? {
            Some(xml) => parse_document_xml(&xml)?,
            None => {
                log::warn!("Package has no {}; producing an empty document", DOCUMENT_PART);
                Document::new()
            }
        };

        document.metadata = match container.read_entry(CORE_PROPERTIES_PART)? {
            Some(xml) => parse_core_properties(&xml).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable core properties: {}", e);
                Metadata::default()
            }),
            None => Metadata::default(),
        };

        let relationships = match container.read_entry(DOCUMENT_RELS_PART)? {
            Some(xml) => Relationships::parse(&xml).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable document relationships: {}", e);
                Relationships::default()
            }),
            None => Relationships::default(),
        };

        Ok((document, relationships))
    }

    fn extract_media(&self) -> Result<MediaIndex> {
        if !self.options.extract_media {
            return Ok(MediaIndex::new());
        }
        let mut container = self.container.clone();
        extract_media_in(
            &mut container,
            self.options.media_storage,
            self.options.temp_root.as_deref(),
        )
    }
}

/// Read a whole package from a file path.
pub(crate) fn read_package<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Read a whole package from a reader.
pub(crate) fn read_package_from<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::tests::build_zip;
    use crate::error::Error;
    use crate::media::MediaStorage;

    const DOC: &[u8] = br#"<w:document xmlns:w="w" xmlns:r="r" xmlns:a="a"><w:body>
        <w:p><w:r><w:t>Hello</w:t></w:r></w:p>
        <w:p><w:r><w:drawing><a:blip r:embed="rId3"/></w:drawing></w:r></w:p>
        </w:body></w:document>"#;

    const RELS: &[u8] = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
        <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
        </Relationships>"#;

    fn package() -> Vec<u8> {
        build_zip(&[
            (DOCUMENT_PART, DOC),
            (DOCUMENT_RELS_PART, RELS),
            ("word/media/image1.png", b"png-bytes"),
            (CORE_PROPERTIES_PART, b"<cp:coreProperties xmlns:cp=\"cp\" xmlns:dc=\"dc\"><dc:title>T</dc:title></cp:coreProperties>"),
        ])
    }

    #[test]
    fn test_parse_package() {
        let data = package();
        let parsed = DocxParser::from_bytes(&data).unwrap().parse().unwrap();

        assert_eq!(parsed.document.block_count(), 3);
        assert_eq!(parsed.document.metadata.title.as_deref(), Some("T"));
        assert_eq!(parsed.media.len(), 1);
        assert_eq!(parsed.media.resolve("rId3"), Some("word/media/image1.png"));
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let data = package();
        let parallel = DocxParser::from_bytes(&data).unwrap().parse().unwrap();
        let sequential = DocxParser::from_bytes_with_options(
            &data,
            ParseOptions::new().sequential().temp_dir_media(),
        )
        .unwrap()
        .parse()
        .unwrap();

        assert_eq!(parallel.document, sequential.document);
        assert_eq!(
            parallel.media.names().collect::<Vec<_>>(),
            sequential.media.names().collect::<Vec<_>>()
        );
        assert!(sequential.media.storage_dir().is_some());
    }

    #[test]
    fn test_missing_document_part() {
        let data = build_zip(&[("word/styles.xml", b"<w:styles/>")]);
        let parsed = DocxParser::from_bytes(&data).unwrap().parse().unwrap();
        assert!(parsed.document.is_empty());
    }

    #[test]
    fn test_malformed_rels_are_ignored() {
        let data = build_zip(&[(DOCUMENT_PART, DOC), (DOCUMENT_RELS_PART, b"<Relationships><oops>")]);
        let parsed = DocxParser::from_bytes(&data).unwrap().parse().unwrap();
        assert_eq!(parsed.document.block_count(), 3);
        assert_eq!(parsed.media.resolve("rId3"), None);
    }

    #[test]
    fn test_text_only_skips_media() {
        let data = package();
        let parsed = DocxParser::from_bytes_with_options(&data, ParseOptions::new().text_only())
            .unwrap()
            .parse()
            .unwrap();
        assert!(parsed.media.is_empty());
    }

    #[test]
    fn test_malformed_markup_error() {
        let data = build_zip(&[(DOCUMENT_PART, b"<w:document><w:body>")]);
        let parser = DocxParser::from_bytes_with_options(
            &data,
            ParseOptions::new().with_media_storage(MediaStorage::TempDir),
        )
        .unwrap();
        assert!(matches!(parser.parse(), Err(Error::MalformedMarkup(_))));
    }

    #[test]
    fn test_malformed_markup_releases_temp_media() {
        let data = build_zip(&[
            (DOCUMENT_PART, b"<w:document><w:body><w:p>"),
            ("word/media/a.png", b"png-bytes"),
        ]);

        for parallel in [true, false] {
            let root = tempfile::tempdir().unwrap();
            let options = ParseOptions::new()
                .temp_dir_media()
                .with_temp_root(root.path())
                .with_parallel(parallel);
            let result = DocxParser::from_bytes_with_options(&data, options)
                .unwrap()
                .parse();

            assert!(matches!(result, Err(Error::MalformedMarkup(_))));
            assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
        }
    }

    #[test]
    fn test_media_write_failure_fails_parse() {
        let root = tempfile::tempdir().unwrap();
        let options = ParseOptions::new()
            .temp_dir_media()
            .with_temp_root(root.path().join("missing"));
        let result = DocxParser::from_bytes_with_options(&package(), options)
            .unwrap()
            .parse();

        assert!(matches!(result, Err(Error::MediaWrite { .. })));
    }

    #[test]
    fn test_temp_media_under_root() {
        let root = tempfile::tempdir().unwrap();
        let options = ParseOptions::new()
            .temp_dir_media()
            .with_temp_root(root.path());
        let parsed = DocxParser::from_bytes_with_options(&package(), options)
            .unwrap()
            .parse()
            .unwrap();

        let dir = parsed.media.storage_dir().unwrap().to_path_buf();
        assert_eq!(dir.parent(), Some(root.path()));
        assert!(dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(crate::media::TEMP_PREFIX));

        drop(parsed);
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_not_a_container() {
        assert!(matches!(
            DocxParser::from_bytes(b"plain text"),
            Err(Error::ContainerFormat(_))
        ));
    }
}
