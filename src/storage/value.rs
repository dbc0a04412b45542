//! Property tags and typed property values.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// A fixed-width MAPI property identifier.
///
/// Displays as four uppercase hex digits (`0037`), the form Outlook
/// tooling uses to name properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PropertyTag(pub u16);

impl PropertyTag {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Parse a tag from a 4-digit hex string, e.g. `"5D01"`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches("0x").trim_start_matches("0X");
        if s.is_empty() || s.len() > 4 {
            return None;
        }
        u16::from_str_radix(s, 16).ok().map(Self)
    }
}

impl std::fmt::Display for PropertyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// A decoded property value.
///
/// `get` on a property set never fails: a missing tag is `Absent` and a
/// value that could not be decoded is `Unreadable`, so callers can
/// distinguish "not there", "there but broken", and real data.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// The tag is not present in the property set.
    Absent,
    /// A decoded string (PT_UNICODE or PT_STRING8).
    Text(String),
    /// Raw bytes (PT_BINARY, and any type without a dedicated variant).
    Binary(Vec<u8>),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Bool(bool),
    /// A FILETIME property converted to UTC.
    Time(DateTime<Utc>),
    /// The property is present but its value could not be read;
    /// carries a human-readable reason.
    Unreadable(String),
}

impl PropertyValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Borrow the value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the value as raw bytes, if it is binary.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Widen any integer variant to `i64`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int16(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Short label for the value kind, used by the raw property dump.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
            Self::Int16(_) | Self::Int32(_) | Self::Int64(_) => "integer",
            Self::Double(_) => "double",
            Self::Bool(_) => "boolean",
            Self::Time(_) => "time",
            Self::Unreadable(_) => "unreadable",
        }
    }
}

/// Convert a Windows FILETIME (100-ns ticks since 1601-01-01 UTC) to a
/// UTC timestamp. Returns `None` for values outside chrono's range.
pub(crate) fn filetime_to_utc(ticks: i64) -> Option<DateTime<Utc>> {
    // Seconds between 1601-01-01 and 1970-01-01
    const EPOCH_DIFF_SECS: i64 = 11_644_473_600;
    let secs = ticks / 10_000_000 - EPOCH_DIFF_SECS;
    let nanos = ((ticks % 10_000_000) * 100) as u32;
    match Utc.timestamp_opt(secs, nanos) {
        chrono::LocalResult::Single(dt) => Some(dt),
        _ => None,
    }
}
