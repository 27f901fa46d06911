//! Package relationships (`_rels/*.rels`).

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};

/// A single relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (`rId7`)
    pub id: String,

    /// Relationship type URI
    pub rel_type: String,

    /// Target, relative to the source part's directory unless absolute
    pub target: String,

    /// Whether the target lives outside the package
    pub external: bool,
}

impl Relationship {
    /// Check if this relationship points at an image.
    pub fn is_image(&self) -> bool {
        self.rel_type.ends_with("/image")
    }
}

/// Relationships of one source part, keyed by ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    by_id: BTreeMap<String, Relationship>,
}

impl Relationships {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a relationships part.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut relationships = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    if let Some(rel) = read_relationship(&e) {
                        relationships.insert(rel);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::MalformedMarkup(format!("relationships: {}", e))),
                _ => {}
            }
            buf.clear();
        }

        Ok(relationships)
    }

    /// Add a relationship, replacing any with the same ID.
    pub fn insert(&mut self, rel: Relationship) {
        self.by_id.insert(rel.id.clone(), rel);
    }

    /// Look up a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// Iterate relationships in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.by_id.values()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Check if there are no relationships.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Package part name targeted by an internal relationship.
    pub fn target_part(&self, id: &str, base_dir: &str) -> Option<String> {
        let rel = self.get(id)?;
        if rel.external {
            return None;
        }
        Some(resolve_target(base_dir, &rel.target))
    }
}

fn read_relationship(e: &BytesStart) -> Option<Relationship> {
    let mut id = None;
    let mut rel_type = String::new();
    let mut target = None;
    let mut external = false;

    for attr in e.attributes().flatten() {
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"Id" => id = Some(value.into_owned()),
            b"Type" => rel_type = value.into_owned(),
            b"Target" => target = Some(value.into_owned()),
            b"TargetMode" => external = value.eq_ignore_ascii_case("External"),
            _ => {}
        }
    }

    Some(Relationship {
        id: id?,
        rel_type,
        target: target?,
        external,
    })
}

/// Resolve a relationship target against the source part's directory.
///
/// A leading `/` makes the target package-absolute. `.` and `..` segments
/// are collapsed; `..` never climbs above the package root.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    let (start, rest) = match target.strip_prefix('/') {
        Some(rest) => ("", rest),
        None => (base_dir, target),
    };

    for segment in start.split('/').chain(rest.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
