//! Property-set decoding over a CFB container.
//!
//! Decoding is tolerant by design: a single property that cannot be read
//! becomes a [`PropertyValue::Unreadable`] entry and decoding continues.
//! Only container-level inconsistency (an unopenable container, or a
//! fixed-property stream shorter than its mandatory header) is fatal for
//! the message.

use std::io::{Read, Seek};

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::{UTF_16LE, WINDOWS_1252};
use tracing::warn;

use crate::error::DecodeError;

use super::tags;
use super::value::{filetime_to_utc, PropertyTag, PropertyValue};

/// Stream holding the fixed-size property records of a storage.
const PROPERTIES_STREAM: &str = "__properties_version1.0";
/// Prefix of variable-length property streams (`__substg1.0_IIIITTTT`).
const SUBSTG_PREFIX: &str = "__substg1.0_";
/// Prefix of recipient row storages (`__recip_version1.0_#NNNNNNNN`).
const RECIP_PREFIX: &str = "__recip_version1.0_#";
/// Prefix of attachment row storages (`__attach_version1.0_#NNNNNNNN`).
const ATTACH_PREFIX: &str = "__attach_version1.0_#";

/// Fixed-property stream header length at the message top level.
const TOP_LEVEL_HEADER: usize = 32;
/// Fixed-property stream header length inside recipient/attachment storages.
const ROW_HEADER: usize = 8;
/// Length of one fixed-property record.
const RECORD_LEN: usize = 16;

static ABSENT: PropertyValue = PropertyValue::Absent;

/// An ordered mapping from property tag to decoded value for one storage.
///
/// Iteration order is the container's storage order: the order of the
/// fixed-property records, followed by any value streams the record table
/// did not reference. Duplicate tags keep the first-seen value.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    entries: Vec<(PropertyTag, PropertyValue)>,
}

impl PropertySet {
    /// Build a set from explicit entries. `Absent` values are not stored;
    /// absence is represented by the tag simply not being present.
    pub fn from_entries(entries: impl IntoIterator<Item = (PropertyTag, PropertyValue)>) -> Self {
        let mut set = Self::default();
        for (tag, value) in entries {
            if !value.is_absent() {
                set.insert(tag, value);
            }
        }
        set
    }

    fn insert(&mut self, tag: PropertyTag, value: PropertyValue) {
        if !self.contains(tag) {
            self.entries.push((tag, value));
        }
    }

    pub fn contains(&self, tag: PropertyTag) -> bool {
        self.entries.iter().any(|(t, _)| *t == tag)
    }

    /// Look up a tag. Never fails: a missing tag yields `Absent`.
    pub fn get(&self, tag: PropertyTag) -> &PropertyValue {
        self.entries
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v)
            .unwrap_or(&ABSENT)
    }

    /// Every tag present, in storage order.
    pub fn tags(&self) -> impl Iterator<Item = PropertyTag> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// Iterate `(tag, value)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyTag, &PropertyValue)> {
        self.entries.iter().map(|(t, v)| (*t, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The tag's text value, or an empty string when absent or non-text.
    pub fn text_or_empty(&self, tag: PropertyTag) -> String {
        self.get(tag).as_text().unwrap_or_default().to_string()
    }
}

/// The decoded property sets of one `.msg` container: the message's own
/// set plus its recipient and attachment rows, in sub-table order.
///
/// Read-only after [`PropertyStore::open`]; the input reader is only used
/// during `open`.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    root: PropertySet,
    recipients: Vec<PropertySet>,
    attachments: Vec<PropertySet>,
}

impl PropertyStore {
    /// Decode a `.msg` container from a readable, seekable byte stream.
    pub fn open<R: Read + Seek>(reader: R) -> Result<Self, DecodeError> {
        let mut comp = cfb::CompoundFile::open(reader).map_err(DecodeError::from_io)?;

        // Collect root entry names up front; streams are opened afterwards
        // because opening needs mutable access to the container.
        let mut recip_names: Vec<String> = Vec::new();
        let mut attach_names: Vec<String> = Vec::new();
        for entry in comp.read_storage("/").map_err(DecodeError::from_io)? {
            if entry.is_storage() {
                let name = entry.name();
                if name.starts_with(RECIP_PREFIX) {
                    recip_names.push(name.to_string());
                } else if name.starts_with(ATTACH_PREFIX) {
                    attach_names.push(name.to_string());
                }
            }
        }
        // The `#NNNNNNNN` suffix is fixed-width hex, so name order is row order.
        recip_names.sort();
        attach_names.sort();

        let root = read_set(&mut comp, "", TOP_LEVEL_HEADER)?;
        let recipients = read_rows(&mut comp, &recip_names);
        let attachments = read_rows(&mut comp, &attach_names);

        Ok(Self {
            root,
            recipients,
            attachments,
        })
    }

    /// Assemble a store from already-decoded sets (synthetic stores for
    /// tests and tools).
    pub fn from_parts(
        root: PropertySet,
        recipients: Vec<PropertySet>,
        attachments: Vec<PropertySet>,
    ) -> Self {
        Self {
            root,
            recipients,
            attachments,
        }
    }

    /// Look up a tag in the message's own property set. Never fails.
    pub fn get(&self, tag: PropertyTag) -> &PropertyValue {
        self.root.get(tag)
    }

    /// Every tag in the message's own property set, in storage order.
    pub fn tags(&self) -> impl Iterator<Item = PropertyTag> + '_ {
        self.root.tags()
    }

    /// The message's own property set.
    pub fn properties(&self) -> &PropertySet {
        &self.root
    }

    /// Recipient rows in sub-table order.
    pub fn recipient_rows(&self) -> &[PropertySet] {
        &self.recipients
    }

    /// Attachment rows in sub-table order.
    pub fn attachment_rows(&self) -> &[PropertySet] {
        &self.attachments
    }
}

/// Read the row storages named in `names`, degrading a broken row to an
/// empty set so one corrupt row cannot take down the whole message.
fn read_rows<R: Read + Seek>(comp: &mut cfb::CompoundFile<R>, names: &[String]) -> Vec<PropertySet> {
    names
        .iter()
        .map(|name| match read_set(comp, name, ROW_HEADER) {
            Ok(set) => set,
            Err(e) => {
                warn!(storage = %name, error = %e, "skipping undecodable row storage");
                PropertySet::default()
            }
        })
        .collect()
}

/// Decode the property set of one storage (`""` for the root).
fn read_set<R: Read + Seek>(
    comp: &mut cfb::CompoundFile<R>,
    storage: &str,
    header_len: usize,
) -> Result<PropertySet, DecodeError> {
    let storage_path = if storage.is_empty() {
        "/".to_string()
    } else {
        format!("/{storage}")
    };

    // Pass 1: catalog the storage's streams (directory order).
    let mut value_streams: Vec<(PropertyTag, u16, String)> = Vec::new();
    let mut has_record_stream = false;
    for entry in comp
        .read_storage(&storage_path)
        .map_err(DecodeError::from_io)?
    {
        if !entry.is_stream() {
            continue;
        }
        let name = entry.name();
        if name == PROPERTIES_STREAM {
            has_record_stream = true;
        } else if let Some(hex) = name.strip_prefix(SUBSTG_PREFIX) {
            match parse_substg_suffix(hex) {
                Some((tag, prop_type)) => {
                    value_streams.push((tag, prop_type, join(&storage_path, name)));
                }
                None => {
                    warn!(stream = %name, "ignoring value stream with unparseable name");
                }
            }
        }
    }

    let mut set = PropertySet::default();

    // Pass 2: the fixed-property records drive the canonical ordering.
    if has_record_stream {
        let data = read_stream_bytes(comp, &join(&storage_path, PROPERTIES_STREAM))
            .map_err(DecodeError::from_io)?;
        if data.len() < header_len {
            return Err(DecodeError::truncated(format!(
                "property stream in '{storage_path}' is {} bytes, header needs {header_len}",
                data.len()
            )));
        }
        let mut records = &data[header_len..];
        while records.len() >= RECORD_LEN {
            let raw_tag = LittleEndian::read_u32(&records[0..4]);
            let prop_type = (raw_tag & 0xFFFF) as u16;
            let tag = PropertyTag((raw_tag >> 16) as u16);
            let value_bytes = &records[8..16];

            if tags::is_stream_type(prop_type) {
                let found = value_streams
                    .iter()
                    .find(|(t, ty, _)| *t == tag && *ty == prop_type)
                    .map(|(_, _, path)| path.clone());
                match found {
                    Some(path) if !set.contains(tag) => {
                        let value = decode_stream_value(comp, &path, prop_type);
                        set.insert(tag, value);
                    }
                    Some(_) => {}
                    None => {
                        set.insert(
                            tag,
                            PropertyValue::Unreadable(format!(
                                "value stream for type {prop_type:04X} is missing"
                            )),
                        );
                    }
                }
            } else {
                set.insert(tag, decode_fixed_value(prop_type, value_bytes));
            }
            records = &records[RECORD_LEN..];
        }
        if !records.is_empty() {
            warn!(
                storage = %storage_path,
                trailing = records.len(),
                "partial property record at end of stream"
            );
        }
    }

    // Pass 3: value streams the record table did not mention.
    for (tag, prop_type, path) in &value_streams {
        if !set.contains(*tag) {
            let value = decode_stream_value(comp, path, *prop_type);
            set.insert(*tag, value);
        }
    }

    Ok(set)
}

/// Split a `IIIITTTT` stream-name suffix into (tag, type).
fn parse_substg_suffix(hex: &str) -> Option<(PropertyTag, u16)> {
    if hex.len() != 8 {
        return None;
    }
    let id = u16::from_str_radix(&hex[0..4], 16).ok()?;
    let prop_type = u16::from_str_radix(&hex[4..8], 16).ok()?;
    Some((PropertyTag(id), prop_type))
}

fn join(storage_path: &str, name: &str) -> String {
    if storage_path == "/" {
        format!("/{name}")
    } else {
        format!("{storage_path}/{name}")
    }
}

fn read_stream_bytes<R: Read + Seek>(
    comp: &mut cfb::CompoundFile<R>,
    path: &str,
) -> std::io::Result<Vec<u8>> {
    let mut stream = comp.open_stream(path)?;
    let mut bytes = Vec::with_capacity(stream.len() as usize);
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Decode a variable-length property from its value stream.
///
/// A failed read is a per-property condition, surfaced as `Unreadable`.
fn decode_stream_value<R: Read + Seek>(
    comp: &mut cfb::CompoundFile<R>,
    path: &str,
    prop_type: u16,
) -> PropertyValue {
    let bytes = match read_stream_bytes(comp, path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(stream = %path, error = %e, "failed to read property value stream");
            return PropertyValue::Unreadable(format!("value stream unreadable: {e}"));
        }
    };
    match prop_type {
        tags::PT_UNICODE => {
            let (text, _, _) = UTF_16LE.decode(&bytes);
            PropertyValue::Text(text.trim_end_matches('\0').to_string())
        }
        tags::PT_STRING8 => {
            let (text, _, _) = WINDOWS_1252.decode(&bytes);
            PropertyValue::Text(text.trim_end_matches('\0').to_string())
        }
        // PT_BINARY and everything without a dedicated variant: keep the
        // raw bytes so no information is lost.
        _ => PropertyValue::Binary(bytes),
    }
}

/// Decode a fixed-size property from the 8-byte value field of its record.
fn decode_fixed_value(prop_type: u16, value: &[u8]) -> PropertyValue {
    match prop_type {
        tags::PT_I2 => PropertyValue::Int16(LittleEndian::read_i16(&value[0..2])),
        tags::PT_LONG => PropertyValue::Int32(LittleEndian::read_i32(&value[0..4])),
        tags::PT_DOUBLE => PropertyValue::Double(LittleEndian::read_f64(&value[0..8])),
        tags::PT_BOOLEAN => PropertyValue::Bool(value[0] != 0),
        tags::PT_I8 => PropertyValue::Int64(LittleEndian::read_i64(&value[0..8])),
        tags::PT_SYSTIME => {
            let ticks = LittleEndian::read_i64(&value[0..8]);
            match filetime_to_utc(ticks) {
                Some(time) => PropertyValue::Time(time),
                None => PropertyValue::Unreadable(format!("FILETIME {ticks} out of range")),
            }
        }
        _ => PropertyValue::Binary(value.to_vec()),
    }
}
