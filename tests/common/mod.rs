//! Synthetic `.msg` fixture builder.
//!
//! Builds minimal but structurally faithful message containers with the
//! `cfb` crate's write support: `__substg1.0_IIIITTTT` value streams plus
//! `__properties_version1.0` record streams where fixed-size values
//! (recipient roles) are needed.

use std::io::Write;
use std::path::Path;

/// One recipient row: optional `PidTagRecipientType` indicator + SMTP address.
pub struct RecipSpec {
    pub role: Option<i32>,
    pub smtp: &'static str,
}

/// One attachment row: optional long filename + payload.
pub struct AttachSpec {
    pub filename: Option<&'static str>,
    pub data: Vec<u8>,
}

/// Declarative description of a synthetic message.
#[derive(Default)]
pub struct MsgSpec {
    pub subject: Option<&'static str>,
    pub body: Option<&'static str>,
    pub sender_name: Option<&'static str>,
    pub sender_smtp: Option<&'static str>,
    pub headers: Option<&'static str>,
    pub recipients: Vec<RecipSpec>,
    pub attachments: Vec<AttachSpec>,
}

fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// A fixed-property record: `{tag, flags, 8-byte value}`, little-endian.
fn record(id: u16, prop_type: u16, value: u64) -> [u8; 16] {
    let mut rec = [0u8; 16];
    let raw_tag = (u32::from(id) << 16) | u32::from(prop_type);
    rec[0..4].copy_from_slice(&raw_tag.to_le_bytes());
    // flags stay zero
    rec[8..16].copy_from_slice(&value.to_le_bytes());
    rec
}

fn write_stream<F: std::io::Read + std::io::Write + std::io::Seek>(
    comp: &mut cfb::CompoundFile<F>,
    path: &str,
    bytes: &[u8],
) {
    let mut stream = comp.create_stream(path).expect("create stream");
    stream.write_all(bytes).expect("write stream");
    stream.flush().expect("flush stream");
}

/// Write a synthetic `.msg` file at `path`.
pub fn write_msg(path: &Path, spec: &MsgSpec) {
    let mut comp = cfb::create(path).expect("create container");

    if let Some(subject) = spec.subject {
        write_stream(&mut comp, "/__substg1.0_0037001F", &utf16le(subject));
    }
    if let Some(body) = spec.body {
        write_stream(&mut comp, "/__substg1.0_1000001F", &utf16le(body));
    }
    if let Some(name) = spec.sender_name {
        write_stream(&mut comp, "/__substg1.0_0C1A001F", &utf16le(name));
    }
    if let Some(smtp) = spec.sender_smtp {
        write_stream(&mut comp, "/__substg1.0_5D01001F", &utf16le(smtp));
    }
    if let Some(headers) = spec.headers {
        write_stream(&mut comp, "/__substg1.0_007D001F", &utf16le(headers));
    }

    // Top-level fixed-property stream: 32-byte header, no records needed.
    write_stream(&mut comp, "/__properties_version1.0", &[0u8; 32]);

    for (i, recip) in spec.recipients.iter().enumerate() {
        let storage = format!("/__recip_version1.0_#{i:08X}");
        comp.create_storage(&storage).expect("create recip storage");
        write_stream(
            &mut comp,
            &format!("{storage}/__substg1.0_39FE001F"),
            &utf16le(recip.smtp),
        );
        // 8-byte header, then the role indicator when present.
        let mut props = vec![0u8; 8];
        if let Some(role) = recip.role {
            props.extend_from_slice(&record(0x0C15, 0x0003, role as u32 as u64));
        }
        write_stream(&mut comp, &format!("{storage}/__properties_version1.0"), &props);
    }

    for (i, attach) in spec.attachments.iter().enumerate() {
        let storage = format!("/__attach_version1.0_#{i:08X}");
        comp.create_storage(&storage).expect("create attach storage");
        if let Some(filename) = attach.filename {
            write_stream(
                &mut comp,
                &format!("{storage}/__substg1.0_3707001F"),
                &utf16le(filename),
            );
        }
        write_stream(
            &mut comp,
            &format!("{storage}/__substg1.0_37010102"),
            &attach.data,
        );
        write_stream(&mut comp, &format!("{storage}/__properties_version1.0"), &[0u8; 8]);
    }

    comp.flush().expect("flush container");
}

/// Write a `.msg` whose top-level property stream is shorter than its
/// mandatory header (a truncated container).
pub fn write_truncated_msg(path: &Path) {
    let mut comp = cfb::create(path).expect("create container");
    write_stream(&mut comp, "/__substg1.0_0037001F", &utf16le("broken"));
    write_stream(&mut comp, "/__properties_version1.0", &[0u8; 4]);
    comp.flush().expect("flush container");
}
