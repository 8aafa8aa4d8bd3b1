//! DER tag constants and length-field encoding.
//!
//! Only single-byte tags are supported. Lengths use the definite form with at
//! most four length octets, which covers every value below 4 GiB.

use tracing::trace;

use crate::error::{CursorError, Result};

/// Constructed bit of a tag byte.
pub const CONSTRUCTED: u8 = 0x20;

/// Context-specific class bits of a tag byte.
pub const CONTEXT_SPECIFIC: u8 = 0x80;

pub const BOOLEAN: u8 = 0x01;
pub const INTEGER: u8 = 0x02;
pub const BIT_STRING: u8 = 0x03;
pub const OCTET_STRING: u8 = 0x04;
pub const NULL: u8 = 0x05;
pub const OBJECT_IDENTIFIER: u8 = 0x06;
pub const UTF8_STRING: u8 = 0x0c;
pub const SEQUENCE: u8 = 0x10 | CONSTRUCTED;
pub const SET: u8 = 0x11 | CONSTRUCTED;

/// Low five bits of a tag byte that announce a multi-byte tag number.
pub const HIGH_TAG_NUMBER: u8 = 0x1f;

/// Maximum number of long-form length octets accepted or produced.
pub const MAX_LENGTH_OCTETS: usize = 4;

/// Largest value length representable with [`MAX_LENGTH_OCTETS`].
pub const MAX_LENGTH: usize = 0xffff_ffff;

/// Returns true if the tag has the constructed bit set.
pub fn is_constructed(tag: u8) -> bool {
    tag & CONSTRUCTED != 0
}

/// Returns true if the tag fits in a single identifier octet.
pub fn is_single_byte_tag(tag: u8) -> bool {
    tag & HIGH_TAG_NUMBER != HIGH_TAG_NUMBER
}

/// Returns a human-readable name for a universal tag.
pub fn tag_name(tag: u8) -> &'static str {
    match tag {
        BOOLEAN => "BOOLEAN",
        INTEGER => "INTEGER",
        BIT_STRING => "BIT STRING",
        OCTET_STRING => "OCTET STRING",
        NULL => "NULL",
        OBJECT_IDENTIFIER => "OBJECT IDENTIFIER",
        UTF8_STRING => "UTF8String",
        SEQUENCE => "SEQUENCE",
        SET => "SET",
        t if t & 0xc0 == CONTEXT_SPECIFIC => "CONTEXT",
        _ => "OTHER",
    }
}

/// Number of octets the DER length field for `len` occupies.
pub fn length_field_size(len: usize) -> usize {
    if len < 0x80 {
        1
    } else {
        1 + minimal_octets(len)
    }
}

/// Write the DER length field for `len` into `out`, returning the number of
/// octets used.
///
/// Returns `None` if `len` exceeds [`MAX_LENGTH`]. `out` must hold at least
/// `length_field_size(len)` bytes.
pub fn encode_length(len: usize, out: &mut [u8]) -> Option<usize> {
    if len > MAX_LENGTH {
        return None;
    }
    if len < 0x80 {
        out[0] = len as u8;
        return Some(1);
    }
    let count = minimal_octets(len);
    out[0] = 0x80 | count as u8;
    for (i, slot) in out[1..=count].iter_mut().enumerate() {
        *slot = (len >> (8 * (count - 1 - i))) as u8;
    }
    Some(1 + count)
}

/// A decoded DER element header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: u8,
    /// Bytes taken by the tag and length octets.
    pub header_len: usize,
    /// Bytes of value following the header.
    pub value_len: usize,
}

/// Decode the tag and length octets at the start of `input`.
///
/// Does not check that the value itself is present.
pub fn parse_header(input: &[u8]) -> Result<Header> {
    if input.len() < 2 {
        return Err(CursorError::OutOfBounds {
            needed: 2,
            remaining: input.len(),
        });
    }

    let tag = input[0];
    if !is_single_byte_tag(tag) {
        trace!(tag, "rejecting high tag number");
        return Err(CursorError::Malformed("high tag number form unsupported"));
    }

    let first = input[1];
    if first & 0x80 == 0 {
        return Ok(Header {
            tag,
            header_len: 2,
            value_len: first as usize,
        });
    }

    let count = (first & 0x7f) as usize;
    if count == 0 {
        return Err(CursorError::Malformed("indefinite length"));
    }
    if count > MAX_LENGTH_OCTETS {
        return Err(CursorError::Malformed("length too large"));
    }
    if input.len() < 2 + count {
        return Err(CursorError::OutOfBounds {
            needed: 2 + count,
            remaining: input.len(),
        });
    }

    let octets = &input[2..2 + count];
    if octets[0] == 0 {
        return Err(CursorError::Malformed("length has leading zero"));
    }
    let value_len = octets.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
    if value_len < 0x80 {
        return Err(CursorError::Malformed("long form for short length"));
    }

    Ok(Header {
        tag,
        header_len: 2 + count,
        value_len,
    })
}

fn minimal_octets(len: usize) -> usize {
    let bits = usize::BITS - len.leading_zeros();
    bits.div_ceil(8) as usize
}
