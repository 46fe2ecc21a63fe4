use std::path::Path;

use quick_xml::events::Event;
use tracing::{debug, info};

use crate::error::MigrateError;

/// Tag of the repeated record element in the Access export (`_x0020_` is an escaped space).
pub const RECORD_TAG: &str = "Microfilm_x0020_List";

/// One exported row: child tag → trimmed text, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRecord {
    fields: Vec<(String, String)>,
}

impl SourceRecord {
    /// Insert a field. A repeated tag replaces the earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Value of `name`, or `""` when the record has no such field.
    pub fn get(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SourceRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = SourceRecord::default();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Read and parse the export file at `path`.
pub fn read_records(path: &Path) -> Result<Vec<SourceRecord>, MigrateError> {
    info!("Reading source records: {}", path.display());
    let xml = std::fs::read_to_string(path).map_err(|e| MigrateError::io(path, e))?;
    let records = parse_records(&xml)?;
    info!("Source records found: {}", records.len());
    Ok(records)
}

/// Parse every `RECORD_TAG` element directly under the document root.
///
/// Only a child's leading text counts as its value (text after a nested
/// element is ignored). Attributes and nested elements are skipped.
pub fn parse_records(xml: &str) -> Result<Vec<SourceRecord>, MigrateError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut records = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<SourceRecord> = None;
    // (tag, collected text, still collecting)
    let mut field: Option<(String, String, bool)> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| MigrateError::Xml {
                position: reader.buffer_position(),
                source,
            })?;
        match event {
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => seen_root = true,
                    2 if e.name().as_ref() == RECORD_TAG.as_bytes() => {
                        current = Some(SourceRecord::default());
                    }
                    3 if current.is_some() => {
                        field = Some((tag_name(e.name().as_ref()), String::new(), true));
                    }
                    // Grandchild: whatever follows is tail text, not the field's own text.
                    _ => {
                        if let Some((_, _, collecting)) = field.as_mut() {
                            *collecting = false;
                        }
                    }
                }
            }
            Event::Empty(e) => match depth + 1 {
                1 => seen_root = true,
                2 if e.name().as_ref() == RECORD_TAG.as_bytes() => {
                    records.push(SourceRecord::default());
                }
                3 => {
                    if let Some(record) = current.as_mut() {
                        record.insert(tag_name(e.name().as_ref()), "");
                    }
                }
                _ => {
                    if let Some((_, _, collecting)) = field.as_mut() {
                        *collecting = false;
                    }
                }
            },
            Event::Text(e) => {
                if let Some((_, text, true)) = field.as_mut() {
                    let unescaped = e.unescape().map_err(|source| MigrateError::Xml {
                        position: reader.buffer_position(),
                        source,
                    })?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if let Some((_, text, true)) = field.as_mut() {
                    let raw = e.into_inner();
                    text.push_str(&String::from_utf8_lossy(&raw));
                }
            }
            Event::End(_) => {
                match depth {
                    2 => {
                        if let Some(record) = current.take() {
                            if record.is_empty() {
                                debug!("record without fields");
                            } else {
                                debug!(fields = record.len(), "record parsed");
                            }
                            records.push(record);
                        }
                    }
                    3 => {
                        if let (Some(record), Some((tag, text, _))) = (current.as_mut(), field.take()) {
                            record.insert(tag, text.trim());
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(MigrateError::MissingRoot);
    }
    if depth != 0 {
        return Err(MigrateError::Truncated { open: depth });
    }
    Ok(records)
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
