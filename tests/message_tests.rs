//! Integration tests for container decoding and the message model,
//! using synthetic `.msg` fixtures built in-process.

mod common;

use common::{AttachSpec, MsgSpec, RecipSpec};
use msgview::error::{DecodeError, LoadError};
use msgview::model::{Message, RecipientRole};
use msgview::storage::PropertyTag;

// ─── Test 1: Full message round-trip ────────────────────────────────

#[test]
fn test_load_full_message() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("full.msg");
    common::write_msg(
        &path,
        &MsgSpec {
            subject: Some("Quarterly numbers"),
            body: Some("See attached.\r\n"),
            sender_name: Some("Alice Example"),
            sender_smtp: Some("alice@example.com"),
            headers: Some("Received: from mail.example.com\r\n"),
            recipients: vec![
                RecipSpec { role: Some(1), smtp: "bob@example.com" },
                RecipSpec { role: Some(2), smtp: "carol@example.com" },
            ],
            attachments: vec![AttachSpec {
                filename: Some("numbers.csv"),
                data: b"a,b\n1,2\n".to_vec(),
            }],
        },
    );

    let msg = Message::load(&path).unwrap();
    assert_eq!(msg.subject(), "Quarterly numbers");
    assert_eq!(msg.body(), "See attached.\r\n");
    assert_eq!(msg.from_line(), "Alice Example <alice@example.com>");
    assert_eq!(msg.transport_headers(), "Received: from mail.example.com\r\n");
    assert_eq!(msg.to_summary(), "bob@example.com");
    assert_eq!(msg.cc_summary(), "carol@example.com");
    assert_eq!(msg.bcc_summary(), "");
    assert_eq!(msg.attachments().len(), 1);
    assert_eq!(msg.attachments()[0].filename, "numbers.csv");
    assert_eq!(msg.attachments()[0].size(), 8);
}

// ─── Test 2: Absent optional properties never fail ──────────────────

#[test]
fn test_minimal_message_absent_fields_are_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("minimal.msg");
    common::write_msg(&path, &MsgSpec::default());

    let msg = Message::load(&path).unwrap();
    assert_eq!(msg.subject(), "");
    assert_eq!(msg.body(), "");
    assert_eq!(msg.from_line(), "");
    assert_eq!(msg.transport_headers(), "");
    assert!(msg.recipients().is_empty());
    assert!(msg.attachments().is_empty());
}

// ─── Test 3: Attachment extraction is exact ─────────────────────────

#[test]
fn test_attachment_extraction_exact() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("attach.msg");
    common::write_msg(
        &path,
        &MsgSpec {
            attachments: vec![
                AttachSpec { filename: Some("a.txt"), data: vec![0x41; 10] },
                AttachSpec { filename: Some("b.bin"), data: Vec::new() },
            ],
            ..MsgSpec::default()
        },
    );

    let msg = Message::load(&path).unwrap();
    let atts = msg.attachments();
    assert_eq!(atts.len(), 2);
    assert_eq!(atts[0].filename, "a.txt");
    assert_eq!(atts[0].size(), 10);
    assert_eq!(atts[1].filename, "b.bin");
    assert_eq!(atts[1].size(), 0);
}

// ─── Test 4: Placeholder name for nameless attachments ──────────────

#[test]
fn test_attachment_placeholder_name() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nameless.msg");
    common::write_msg(
        &path,
        &MsgSpec {
            attachments: vec![AttachSpec { filename: None, data: vec![1, 2, 3] }],
            ..MsgSpec::default()
        },
    );

    let msg = Message::load(&path).unwrap();
    assert_eq!(msg.attachments()[0].filename, "attachment-0");
    assert_eq!(msg.attachments()[0].size(), 3);
}

// ─── Test 5: Recipient classification order and unknown bucket ──────

#[test]
fn test_recipient_order_and_unknown_role() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("recips.msg");
    common::write_msg(
        &path,
        &MsgSpec {
            recipients: vec![
                RecipSpec { role: Some(1), smtp: "first@example.com" },
                RecipSpec { role: None, smtp: "mystery@example.com" },
                RecipSpec { role: Some(1), smtp: "second@example.com" },
                RecipSpec { role: Some(3), smtp: "hidden@example.com" },
            ],
            ..MsgSpec::default()
        },
    );

    let msg = Message::load(&path).unwrap();
    assert_eq!(msg.recipients().len(), 4, "unknown rows stay in the list");
    assert_eq!(msg.recipients()[1].role, RecipientRole::Unknown);
    // Row order within a role is preserved; unknown is excluded.
    assert_eq!(msg.to_summary(), "first@example.com, second@example.com");
    assert_eq!(msg.bcc_summary(), "hidden@example.com");
}

// ─── Test 6: Raw property access and tag listing ────────────────────

#[test]
fn test_raw_properties_and_tags() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("raw.msg");
    common::write_msg(
        &path,
        &MsgSpec {
            subject: Some("raw"),
            ..MsgSpec::default()
        },
    );

    let msg = Message::load(&path).unwrap();
    let subject_tag = PropertyTag::from_hex("0037").unwrap();
    assert_eq!(msg.raw_property(subject_tag).as_text(), Some("raw"));
    assert!(msg.raw_property(PropertyTag::from_hex("5D01").unwrap()).is_absent());

    let tags: Vec<PropertyTag> = msg.tags().collect();
    assert!(tags.contains(&subject_tag));
    // Restartable: a second pass yields the same tags.
    let again: Vec<PropertyTag> = msg.tags().collect();
    assert_eq!(tags, again);
}

// ─── Test 7: Malformed and truncated containers ─────────────────────

#[test]
fn test_garbage_file_is_decode_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("garbage.msg");
    std::fs::write(&path, b"this is not a structured-storage container").unwrap();

    let err = Message::load(&path).unwrap_err();
    assert!(matches!(err, LoadError::Decode { .. }), "got: {err:?}");
}

#[test]
fn test_truncated_property_stream_is_truncated_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("truncated.msg");
    common::write_truncated_msg(&path);

    let err = Message::load(&path).unwrap_err();
    match err {
        LoadError::Decode {
            source: DecodeError::Truncated { .. },
            ..
        } => {}
        other => panic!("expected truncated decode error, got: {other:?}"),
    }
}

#[test]
fn test_broken_sibling_does_not_affect_valid_file() {
    let tmp = tempfile::tempdir().unwrap();
    let bad = tmp.path().join("bad.msg");
    let good = tmp.path().join("good.msg");
    std::fs::write(&bad, vec![0u8; 100]).unwrap();
    common::write_msg(
        &good,
        &MsgSpec {
            subject: Some("still fine"),
            ..MsgSpec::default()
        },
    );

    assert!(Message::load(&bad).is_err());
    let msg = Message::load(&good).unwrap();
    assert_eq!(msg.subject(), "still fine");

    // Indexing the directory is unaffected by the undecodable sibling.
    let tree = msgview::index::index(tmp.path());
    assert_eq!(tree.message_count(), 2);
}
