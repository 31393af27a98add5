//! Minimal TTLV (tag-type-length-value) codec for the KMIP subset we speak.
//!
//! Items are `tag(3) || type(1) || length(4) || value` with the value padded
//! to an 8-byte boundary. Only the five value types the `Get` exchange needs
//! are implemented.

use crate::error::{KmsError, KmsResult};

// Tags (KMIP 1.2, section 9.1.3.1).
pub(crate) mod tag {
    pub const REQUEST_MESSAGE: u32 = 0x42_0078;
    pub const REQUEST_HEADER: u32 = 0x42_0077;
    pub const RESPONSE_MESSAGE: u32 = 0x42_007B;
    pub const PROTOCOL_VERSION: u32 = 0x42_0069;
    pub const PROTOCOL_VERSION_MAJOR: u32 = 0x42_006A;
    pub const PROTOCOL_VERSION_MINOR: u32 = 0x42_006B;
    pub const BATCH_COUNT: u32 = 0x42_000D;
    pub const BATCH_ITEM: u32 = 0x42_000F;
    pub const OPERATION: u32 = 0x42_005C;
    pub const REQUEST_PAYLOAD: u32 = 0x42_0079;
    pub const RESPONSE_PAYLOAD: u32 = 0x42_007C;
    pub const RESULT_STATUS: u32 = 0x42_007F;
    pub const RESULT_REASON: u32 = 0x42_007E;
    pub const RESULT_MESSAGE: u32 = 0x42_007D;
    pub const UNIQUE_IDENTIFIER: u32 = 0x42_0094;
    pub const SECRET_DATA: u32 = 0x42_0085;
    pub const KEY_BLOCK: u32 = 0x42_0040;
    pub const KEY_VALUE: u32 = 0x42_0045;
    pub const KEY_MATERIAL: u32 = 0x42_0043;
}

const TYPE_STRUCTURE: u8 = 0x01;
const TYPE_INTEGER: u8 = 0x02;
const TYPE_ENUMERATION: u8 = 0x05;
const TYPE_TEXT_STRING: u8 = 0x07;
const TYPE_BYTE_STRING: u8 = 0x08;

fn padded(len: usize) -> usize {
    len.div_ceil(8) * 8
}

/// Append-only TTLV encoder.
#[derive(Default)]
pub(crate) struct TtlvWriter {
    buf: Vec<u8>,
}

impl TtlvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn item(&mut self, tag: u32, ty: u8, value: &[u8]) {
        self.buf.extend_from_slice(&tag.to_be_bytes()[1..]);
        self.buf.push(ty);
        self.buf.extend_from_slice(&(value.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(value);
        // Pad to the 8-byte boundary.
        self.buf.extend(std::iter::repeat_n(0u8, padded(value.len()) - value.len()));
    }

    pub fn structure(&mut self, tag: u32, build: impl FnOnce(&mut TtlvWriter)) {
        let mut inner = TtlvWriter::new();
        build(&mut inner);
        self.item(tag, TYPE_STRUCTURE, &inner.buf);
    }

    pub fn integer(&mut self, tag: u32, value: i32) {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&value.to_be_bytes());
        self.item(tag, TYPE_INTEGER, &bytes);
    }

    pub fn enumeration(&mut self, tag: u32, value: u32) {
        self.item(tag, TYPE_ENUMERATION, &value.to_be_bytes());
    }

    pub fn text(&mut self, tag: u32, value: &str) {
        self.item(tag, TYPE_TEXT_STRING, value.as_bytes());
    }

    #[cfg(test)]
    pub fn bytes(&mut self, tag: u32, value: &[u8]) {
        self.item(tag, TYPE_BYTE_STRING, value);
    }
}

/// A decoded TTLV item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TtlvItem {
    pub tag: u32,
    pub value: TtlvValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TtlvValue {
    Structure(Vec<TtlvItem>),
    Integer(i32),
    Enumeration(u32),
    Text(String),
    Bytes(Vec<u8>),
}

impl TtlvItem {
    /// First direct child with the given tag, for structure items.
    pub fn child(&self, tag: u32) -> KmsResult<&TtlvItem> {
        match &self.value {
            TtlvValue::Structure(children) => children
                .iter()
                .find(|c| c.tag == tag)
                .ok_or_else(|| malformed(format!("missing TTLV item {tag:#08x}"))),
            _ => Err(malformed(format!(
                "TTLV item {:#08x} is not a structure",
                self.tag
            ))),
        }
    }

    pub fn enumeration(&self) -> KmsResult<u32> {
        match self.value {
            TtlvValue::Enumeration(v) => Ok(v),
            _ => Err(malformed(format!("TTLV item {:#08x} is not an enumeration", self.tag))),
        }
    }

    pub fn bytes(&self) -> KmsResult<&[u8]> {
        match &self.value {
            TtlvValue::Bytes(v) => Ok(v),
            _ => Err(malformed(format!("TTLV item {:#08x} is not a byte string", self.tag))),
        }
    }

    pub fn text(&self) -> KmsResult<&str> {
        match &self.value {
            TtlvValue::Text(v) => Ok(v),
            _ => Err(malformed(format!("TTLV item {:#08x} is not a text string", self.tag))),
        }
    }
}

fn malformed(msg: String) -> KmsError {
    KmsError::Response(format!("KMIP: {msg}"))
}

/// Parses the single top-level item in `buf`.
pub(crate) fn parse(buf: &[u8]) -> KmsResult<TtlvItem> {
    let (item, consumed) = parse_item(buf)?;
    if consumed != buf.len() {
        return Err(malformed(format!(
            "{} trailing bytes after top-level item",
            buf.len() - consumed
        )));
    }
    Ok(item)
}

fn parse_item(buf: &[u8]) -> KmsResult<(TtlvItem, usize)> {
    if buf.len() < 8 {
        return Err(malformed("truncated item header".to_string()));
    }
    let tag = u32::from_be_bytes([0, buf[0], buf[1], buf[2]]);
    let ty = buf[3];
    let len = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
    let total = 8 + padded(len);
    if buf.len() < total {
        return Err(malformed(format!("item {tag:#08x} overruns buffer")));
    }
    let value_bytes = &buf[8..8 + len];

    let value = match ty {
        TYPE_STRUCTURE => {
            let mut children = Vec::new();
            let mut offset = 0;
            while offset < value_bytes.len() {
                let (child, consumed) = parse_item(&value_bytes[offset..])?;
                children.push(child);
                offset += consumed;
            }
            TtlvValue::Structure(children)
        }
        TYPE_INTEGER => {
            if len != 4 {
                return Err(malformed(format!("integer {tag:#08x} has length {len}")));
            }
            TtlvValue::Integer(i32::from_be_bytes([
                value_bytes[0],
                value_bytes[1],
                value_bytes[2],
                value_bytes[3],
            ]))
        }
        TYPE_ENUMERATION => {
            if len != 4 {
                return Err(malformed(format!("enumeration {tag:#08x} has length {len}")));
            }
            TtlvValue::Enumeration(u32::from_be_bytes([
                value_bytes[0],
                value_bytes[1],
                value_bytes[2],
                value_bytes[3],
            ]))
        }
        TYPE_TEXT_STRING => TtlvValue::Text(
            std::str::from_utf8(value_bytes)
                .map_err(|_| malformed(format!("text item {tag:#08x} is not UTF-8")))?
                .to_string(),
        ),
        TYPE_BYTE_STRING => TtlvValue::Bytes(value_bytes.to_vec()),
        other => return Err(malformed(format!("unsupported TTLV type {other:#04x}"))),
    };

    Ok((TtlvItem { tag, value }, total))
}
