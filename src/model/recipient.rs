//! Recipient rows and role classification.

use serde::Serialize;

use crate::storage::{tags, PropertySet};

/// Semantic role of a recipient row, from its `PidTagRecipientType`
/// indicator.
///
/// Any unrecognized or missing indicator maps to `Unknown`. Unknown rows
/// stay visible in the recipient list and via raw properties, but are
/// excluded from the To/Cc/Bcc summary strings so a misclassified row is
/// never silently folded into the wrong list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecipientRole {
    To,
    Cc,
    Bcc,
    Unknown,
}

impl RecipientRole {
    fn from_indicator(indicator: Option<i64>) -> Self {
        match indicator {
            Some(1) => Self::To,
            Some(2) => Self::Cc,
            Some(3) => Self::Bcc,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::To => "To",
            Self::Cc => "Cc",
            Self::Bcc => "Bcc",
            Self::Unknown => "Unknown",
        }
    }
}

/// One classified recipient.
#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub role: RecipientRole,
    /// Email address (SMTP address preferred over the transport address).
    pub address: String,
    /// Human-readable display name (may be empty).
    pub display_name: String,
}

impl Recipient {
    /// Build a recipient from one row of the recipient sub-table.
    pub fn from_row(row: &PropertySet) -> Self {
        let role = RecipientRole::from_indicator(row.get(tags::RECIPIENT_TYPE).as_int());
        let address = [tags::SMTP_ADDRESS, tags::EMAIL_ADDRESS]
            .iter()
            .find_map(|tag| row.get(*tag).as_text().filter(|s| !s.is_empty()))
            .unwrap_or_default()
            .to_string();
        let display_name = row.text_or_empty(tags::DISPLAY_NAME);
        Self {
            role,
            address,
            display_name,
        }
    }

    /// Format for display: `"Display Name <address>"` or just `"address"`.
    pub fn display(&self) -> String {
        if self.display_name.is_empty() {
            self.address.clone()
        } else if self.address.is_empty() {
            self.display_name.clone()
        } else {
            format!("{} <{}>", self.display_name, self.address)
        }
    }
}

/// Classify every row of the recipient sub-table, preserving row order.
pub fn classify(rows: &[PropertySet]) -> Vec<Recipient> {
    rows.iter().map(Recipient::from_row).collect()
}

/// Join the addresses of one role with `", "` — no trailing separator.
///
/// `Unknown` never produces a summary.
pub fn summary(recipients: &[Recipient], role: RecipientRole) -> String {
    if role == RecipientRole::Unknown {
        return String::new();
    }
    recipients
        .iter()
        .filter(|r| r.role == role && !r.address.is_empty())
        .map(|r| r.address.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
