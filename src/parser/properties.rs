//! Core document properties (`docProps/core.xml`).

use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::Metadata;

#[derive(Clone, Copy)]
enum Field {
    Title,
    Subject,
    Creator,
    Keywords,
    Description,
    LastModifiedBy,
    Created,
    Modified,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"subject" => Some(Field::Subject),
            b"creator" => Some(Field::Creator),
            b"keywords" => Some(Field::Keywords),
            b"description" => Some(Field::Description),
            b"lastModifiedBy" => Some(Field::LastModifiedBy),
            b"created" => Some(Field::Created),
            b"modified" => Some(Field::Modified),
            _ => None,
        }
    }
}

/// Parse core properties into [`Metadata`].
///
/// Empty values are dropped. Dates that do not parse are dropped with a
/// debug log rather than failing.
pub fn parse_core_properties(xml: &[u8]) -> Result<Metadata> {
    let mut reader = Reader::from_reader(xml);
    let mut metadata = Metadata::default();
    let mut buf = Vec::new();
    let mut current: Option<(Field, String)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                current = Field::from_local_name(e.local_name().as_ref()).map(|f| (f, String::new()));
            }
            Ok(Event::Text(e)) => {
                if let Some((_, value)) = current.as_mut() {
                    let raw = std::str::from_utf8(e.as_ref())
                        .map_err(|err| Error::MalformedMarkup(err.to_string()))?;
                    let text = quick_xml::escape::unescape(raw)
                        .map_err(|err| Error::MalformedMarkup(err.to_string()))?;
                    value.push_str(&text);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some((_, value)) = current.as_mut() {
                    if let Ok(Some(ch)) = e.resolve_char_ref() {
                        value.push(ch);
                    } else if let Some(resolved) = std::str::from_utf8(e.as_ref())
                        .ok()
                        .and_then(quick_xml::escape::resolve_predefined_entity)
                    {
                        value.push_str(resolved);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if let Some((field, value)) = current.take() {
                    apply(&mut metadata, field, value.trim());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::MalformedMarkup(format!("core properties: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(metadata)
}

fn apply(metadata: &mut Metadata, field: Field, value: &str) {
    if value.is_empty() {
        return;
    }
    let text = Some(value.to_string());
    match field {
        Field::Title => metadata.title = text,
        Field::Subject => metadata.subject = text,
        Field::Creator => metadata.author = text,
        Field::Keywords => metadata.keywords = text,
        Field::Description => metadata.description = text,
        Field::LastModifiedBy => metadata.last_modified_by = text,
        Field::Created => metadata.created = parse_date(value),
        Field::Modified => metadata.modified = parse_date(value),
    }
}

/// Parse a W3CDTF date; values without an offset are taken as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        Ok(naive) => Some(naive.and_utc()),
        Err(_) => {
            log::debug!("Ignoring unparseable date '{}'", value);
            None
        }
    }
}
