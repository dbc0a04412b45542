//! Attachment extraction from attachment sub-storages.

use tracing::warn;

use crate::storage::{tags, PropertySet};

/// One extracted attachment: resolved filename plus owned payload bytes.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Filename from the long-filename property, falling back to the 8.3
    /// short name, then to a generated `attachment-N` placeholder.
    pub filename: String,
    /// The full binary payload. Empty for entries without a data property
    /// (e.g. embedded message objects), which are kept so sub-table order
    /// and count are preserved.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Build an attachment from one row of the attachment sub-table.
    /// `index` is the zero-based row position, used for the placeholder name.
    pub fn from_row(row: &PropertySet, index: usize) -> Self {
        let filename = [tags::ATTACH_LONG_FILENAME, tags::ATTACH_FILENAME]
            .iter()
            .find_map(|tag| row.get(*tag).as_text().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("attachment-{index}"));

        let data = match row.get(tags::ATTACH_DATA) {
            value if value.is_absent() => {
                warn!(filename = %filename, "attachment entry has no payload property");
                Vec::new()
            }
            value => value.as_bytes().map(<[u8]>::to_vec).unwrap_or_default(),
        };

        Self { filename, data }
    }

    /// Payload length in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Extract every attachment, in sub-table order. No deduplication, no
/// filtering by type.
pub fn extract(rows: &[PropertySet]) -> Vec<Attachment> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| Attachment::from_row(row, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::PropertyValue;

    #[test]
    fn test_filename_placeholder_is_explicit() {
        let row = PropertySet::from_entries([(
            tags::ATTACH_DATA,
            PropertyValue::Binary(vec![1, 2, 3]),
        )]);
        let att = Attachment::from_row(&row, 4);
        assert_eq!(att.filename, "attachment-4");
        assert_eq!(att.size(), 3);
    }

    #[test]
    fn test_long_filename_preferred() {
        let row = PropertySet::from_entries([
            (tags::ATTACH_FILENAME, PropertyValue::Text("REPORT~1.PDF".into())),
            (
                tags::ATTACH_LONG_FILENAME,
                PropertyValue::Text("quarterly report.pdf".into()),
            ),
        ]);
        assert_eq!(Attachment::from_row(&row, 0).filename, "quarterly report.pdf");
    }

    #[test]
    fn test_extract_preserves_order_and_lengths() {
        let rows = vec![
            PropertySet::from_entries([
                (tags::ATTACH_LONG_FILENAME, PropertyValue::Text("a.txt".into())),
                (tags::ATTACH_DATA, PropertyValue::Binary(vec![0u8; 10])),
            ]),
            PropertySet::from_entries([
                (tags::ATTACH_LONG_FILENAME, PropertyValue::Text("b.bin".into())),
                (tags::ATTACH_DATA, PropertyValue::Binary(Vec::new())),
            ]),
        ];
        let attachments = extract(&rows);
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].filename, "a.txt");
        assert_eq!(attachments[0].size(), 10);
        assert_eq!(attachments[1].filename, "b.bin");
        assert_eq!(attachments[1].size(), 0);
    }
}
