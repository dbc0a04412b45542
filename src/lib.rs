//! `msgview` — a terminal inspector for Outlook `.msg` files.
//!
//! This crate provides the core library for indexing directory trees of
//! message files, decoding their structured-storage property sets, and
//! exposing a normalized message model (subject, body, sender, recipients,
//! attachments) plus raw MAPI property access.

pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod storage;
