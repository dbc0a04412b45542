//! The normalized message model built on top of the property store.

pub mod attachment;
pub mod message;
pub mod recipient;

pub use attachment::Attachment;
pub use message::Message;
pub use recipient::{Recipient, RecipientRole};
