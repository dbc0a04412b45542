//! Well-known MAPI property tags and property types ([MS-OXPROPS]).
//!
//! This table is a compatibility contract with the external format: a wrong
//! tag value silently misreads a field instead of failing, so every
//! well-known tag the crate interprets is centralized here.

use super::value::PropertyTag;

// ── Message ─────────────────────────────────────────────────────

/// PidTagSubject
pub const SUBJECT: PropertyTag = PropertyTag::new(0x0037);
/// PidTagBody (plain text)
pub const BODY: PropertyTag = PropertyTag::new(0x1000);
/// PidTagRtfCompressed
pub const RTF_COMPRESSED: PropertyTag = PropertyTag::new(0x1009);
/// PidTagTransportMessageHeaders
pub const TRANSPORT_HEADERS: PropertyTag = PropertyTag::new(0x007D);
/// PidTagSenderName
pub const SENDER_NAME: PropertyTag = PropertyTag::new(0x0C1A);
/// PidTagSenderEmailAddress
pub const SENDER_EMAIL: PropertyTag = PropertyTag::new(0x0C1F);
/// PidTagSenderSmtpAddress
pub const SENDER_SMTP: PropertyTag = PropertyTag::new(0x5D01);
/// PidTagClientSubmitTime
pub const CLIENT_SUBMIT_TIME: PropertyTag = PropertyTag::new(0x0039);
/// PidTagMessageDeliveryTime
pub const MESSAGE_DELIVERY_TIME: PropertyTag = PropertyTag::new(0x0E06);
/// PidTagMessageClass
pub const MESSAGE_CLASS: PropertyTag = PropertyTag::new(0x001A);

// ── Recipient rows ──────────────────────────────────────────────

/// PidTagRecipientType (1 = To, 2 = Cc, 3 = Bcc)
pub const RECIPIENT_TYPE: PropertyTag = PropertyTag::new(0x0C15);
/// PidTagDisplayName
pub const DISPLAY_NAME: PropertyTag = PropertyTag::new(0x3001);
/// PidTagEmailAddress
pub const EMAIL_ADDRESS: PropertyTag = PropertyTag::new(0x3003);
/// PidTagSmtpAddress
pub const SMTP_ADDRESS: PropertyTag = PropertyTag::new(0x39FE);

// ── Attachment rows ─────────────────────────────────────────────

/// PidTagAttachDataBinary
pub const ATTACH_DATA: PropertyTag = PropertyTag::new(0x3701);
/// PidTagAttachFilename (8.3 short name)
pub const ATTACH_FILENAME: PropertyTag = PropertyTag::new(0x3704);
/// PidTagAttachLongFilename
pub const ATTACH_LONG_FILENAME: PropertyTag = PropertyTag::new(0x3707);

// ── Property types (low word of a stream-name / record tag) ─────

pub const PT_I2: u16 = 0x0002;
pub const PT_LONG: u16 = 0x0003;
pub const PT_DOUBLE: u16 = 0x0005;
pub const PT_BOOLEAN: u16 = 0x000B;
pub const PT_I8: u16 = 0x0014;
pub const PT_STRING8: u16 = 0x001E;
pub const PT_UNICODE: u16 = 0x001F;
pub const PT_SYSTIME: u16 = 0x0040;
pub const PT_BINARY: u16 = 0x0102;

/// Whether a property type stores its value in a separate
/// `__substg1.0_` stream rather than inline in the property record.
pub fn is_stream_type(prop_type: u16) -> bool {
    !matches!(
        prop_type,
        PT_I2 | PT_LONG | PT_DOUBLE | PT_BOOLEAN | PT_I8 | PT_SYSTIME | 0x0001 | 0x000A
    )
}
