//! The decoded, immutable message model.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{LoadError, Result};
use crate::storage::{tags, PropertyStore, PropertyTag, PropertyValue};

use super::attachment::{self, Attachment};
use super::recipient::{self, Recipient, RecipientRole};

/// A fully decoded message.
///
/// All derived fields are computed once at construction from the
/// underlying property store; the struct is immutable afterwards and owns
/// the store for raw property access. Missing well-known string properties
/// are empty strings, and missing sub-tables are empty slices, so callers
/// have no null-handling burden.
#[derive(Debug)]
pub struct Message {
    subject: String,
    body: String,
    body_rtf: String,
    sender_name: String,
    sender_address: String,
    transport_headers: String,
    submitted: Option<DateTime<Utc>>,
    delivered: Option<DateTime<Utc>>,
    message_class: String,
    recipients: Vec<Recipient>,
    attachments: Vec<Attachment>,
    store: PropertyStore,
}

impl Message {
    /// Load and decode the message file at `path`.
    ///
    /// The file handle is scoped to this call: the whole container is
    /// decoded into memory and the handle is released before returning,
    /// on both the success and the error path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
        let metadata = file.metadata().map_err(|e| LoadError::io(path, e))?;
        if !metadata.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let store =
            PropertyStore::open(BufReader::new(file)).map_err(|e| LoadError::Decode {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!(path = %path.display(), "decoded message container");
        Ok(Self::from_store(store))
    }

    /// Build the normalized model from an already-decoded store.
    pub fn from_store(store: PropertyStore) -> Self {
        let props = store.properties();

        let subject = props.text_or_empty(tags::SUBJECT);
        let sender_name = props.text_or_empty(tags::SENDER_NAME);
        let sender_address = [tags::SENDER_SMTP, tags::SENDER_EMAIL]
            .iter()
            .find_map(|tag| props.get(*tag).as_text().filter(|s| !s.is_empty()))
            .unwrap_or_default()
            .to_string();
        let transport_headers = props.text_or_empty(tags::TRANSPORT_HEADERS);
        let message_class = props.text_or_empty(tags::MESSAGE_CLASS);
        let submitted = props.get(tags::CLIENT_SUBMIT_TIME).as_time();
        let delivered = props.get(tags::MESSAGE_DELIVERY_TIME).as_time();

        let body_rtf = decompress_rtf_body(props.get(tags::RTF_COMPRESSED));
        let plain = props.text_or_empty(tags::BODY);
        let body = if plain.is_empty() {
            rtf_to_text(&body_rtf).unwrap_or_default()
        } else {
            plain
        };

        let recipients = recipient::classify(store.recipient_rows());
        let attachments = attachment::extract(store.attachment_rows());

        Self {
            subject,
            body,
            body_rtf,
            sender_name,
            sender_address,
            transport_headers,
            submitted,
            delivered,
            message_class,
            recipients,
            attachments,
            store,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Display body: the plain-text property when present, otherwise text
    /// extracted from the decompressed RTF body. Empty when neither exists.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The decompressed RTF document, empty when the message has none.
    pub fn body_rtf(&self) -> &str {
        &self.body_rtf
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    pub fn sender_address(&self) -> &str {
        &self.sender_address
    }

    /// `"Sender Name <address>"`, degrading to whichever part is present.
    pub fn from_line(&self) -> String {
        if self.sender_name.is_empty() {
            self.sender_address.clone()
        } else if self.sender_address.is_empty() {
            self.sender_name.clone()
        } else {
            format!("{} <{}>", self.sender_name, self.sender_address)
        }
    }

    /// The raw transport header block, as stored.
    pub fn transport_headers(&self) -> &str {
        &self.transport_headers
    }

    pub fn message_class(&self) -> &str {
        &self.message_class
    }

    pub fn submitted(&self) -> Option<DateTime<Utc>> {
        self.submitted
    }

    pub fn delivered(&self) -> Option<DateTime<Utc>> {
        self.delivered
    }

    /// Recipients in sub-table row order, including unknown-role rows.
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// Attachments in sub-table order.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn to_summary(&self) -> String {
        recipient::summary(&self.recipients, RecipientRole::To)
    }

    pub fn cc_summary(&self) -> String {
        recipient::summary(&self.recipients, RecipientRole::Cc)
    }

    pub fn bcc_summary(&self) -> String {
        recipient::summary(&self.recipients, RecipientRole::Bcc)
    }

    /// Raw property lookup outside the well-known set. Never fails.
    pub fn raw_property(&self, tag: PropertyTag) -> &PropertyValue {
        self.store.get(tag)
    }

    /// Every tag in the message's own property set, in storage order.
    pub fn tags(&self) -> impl Iterator<Item = PropertyTag> + '_ {
        self.store.tags()
    }

    /// The underlying property store.
    pub fn store(&self) -> &PropertyStore {
        &self.store
    }
}

/// Decompress a PR_RTF_COMPRESSED payload. Failures are per-property:
/// logged and degraded to an empty document.
fn decompress_rtf_body(value: &PropertyValue) -> String {
    let Some(bytes) = value.as_bytes() else {
        return String::new();
    };
    match compressed_rtf::decompress_rtf(bytes) {
        Ok(rtf) => rtf,
        Err(e) => {
            warn!(error = %e, "failed to decompress RTF body");
            String::new()
        }
    }
}

/// Extract plain text from an RTF document.
fn rtf_to_text(rtf: &str) -> Option<String> {
    if rtf.is_empty() {
        return None;
    }
    let doc = rtf_parser::RtfDocument::try_from(rtf).ok()?;
    Some(doc.get_text())
}
