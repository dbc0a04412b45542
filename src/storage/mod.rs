//! Structured-storage property decoding for `.msg` files.
//!
//! A `.msg` file is a CFB (Compound File Binary) container. The
//! general-purpose container format is handled by the `cfb` crate; this
//! module owns the message-specific layer on top of it: locating the
//! property streams, decoding their typed values, and exposing ordered
//! property sets for the message and its recipient/attachment rows.

pub mod store;
pub mod tags;
pub mod value;

pub use store::{PropertySet, PropertyStore};
pub use value::{PropertyTag, PropertyValue};
