use bytes::Buf;

use crate::der::{self, Header};
use crate::error::{CursorError, Result};
use crate::width::PrefixWidth;

/// A read-only cursor over a borrowed byte string.
///
/// Reads consume from the front. Sub-cursors returned by length-prefixed and
/// DER reads borrow the same memory for `'a` and are independent of the
/// cursor they came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Bytes not yet consumed.
    pub fn remaining_len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The unconsumed bytes, without advancing.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Advance past `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Return the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.data.len() {
            return Err(CursorError::OutOfBounds {
                needed: n,
                remaining: self.data.len(),
            });
        }
        let (head, tail) = self.data.split_at(n);
        self.data = tail;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_be(2).map(|v| v as u16)
    }

    pub fn read_u24(&mut self) -> Result<u32> {
        self.read_be(3).map(|v| v as u32)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_be(4).map(|v| v as u32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_be(8)
    }

    fn read_be(&mut self, width: usize) -> Result<u64> {
        let raw = self.read_bytes(width)?;
        Ok(raw.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Read a `width`-byte big-endian length, then return a cursor over that
    /// many following bytes.
    ///
    /// `width` must be 1 to 4. On any failure the cursor is left unchanged.
    pub fn read_length_prefixed(&mut self, width: usize) -> Result<ByteCursor<'a>> {
        self.read_prefixed(PrefixWidth::try_from(width)?)
    }

    /// Typed form of [`read_length_prefixed`](Self::read_length_prefixed).
    pub fn read_prefixed(&mut self, width: PrefixWidth) -> Result<ByteCursor<'a>> {
        let mut probe = *self;
        let raw = probe.read_bytes(width.bytes())?;
        let len = width.decode(raw);
        let body = probe.read_bytes(len)?;
        *self = probe;
        Ok(ByteCursor::new(body))
    }

    pub fn read_u8_length_prefixed(&mut self) -> Result<ByteCursor<'a>> {
        self.read_prefixed(PrefixWidth::U8)
    }

    pub fn read_u16_length_prefixed(&mut self) -> Result<ByteCursor<'a>> {
        self.read_prefixed(PrefixWidth::U16)
    }

    pub fn read_u24_length_prefixed(&mut self) -> Result<ByteCursor<'a>> {
        self.read_prefixed(PrefixWidth::U24)
    }

    /// Parse a DER element and return its tag and a cursor over its value.
    ///
    /// Rejects high tag numbers, indefinite lengths and any length that is not
    /// minimally encoded.
    pub fn read_asn1_element(&mut self) -> Result<(u8, ByteCursor<'a>)> {
        let (header, element) = self.split_asn1()?;
        Ok((header.tag, ByteCursor::new(&element[header.header_len..])))
    }

    /// Parse a DER element and return its tag, the whole element including
    /// the header, and the header length.
    pub fn read_any_asn1_element(&mut self) -> Result<(u8, ByteCursor<'a>, usize)> {
        let (header, element) = self.split_asn1()?;
        Ok((header.tag, ByteCursor::new(element), header.header_len))
    }

    /// Parse a DER element that must carry `expected` as its tag.
    pub fn read_asn1(&mut self, expected: u8) -> Result<ByteCursor<'a>> {
        let mut probe = *self;
        let (tag, value) = probe.read_asn1_element()?;
        if tag != expected {
            return Err(CursorError::UnexpectedTag {
                expected,
                found: tag,
            });
        }
        *self = probe;
        Ok(value)
    }

    /// Skip over a DER element that must carry `expected` as its tag.
    pub fn skip_asn1(&mut self, expected: u8) -> Result<()> {
        self.read_asn1(expected).map(|_| ())
    }

    /// Read the next element only if it carries `tag`.
    ///
    /// Returns `Ok(None)` when the cursor is empty or the next tag differs.
    pub fn read_optional_asn1(&mut self, tag: u8) -> Result<Option<ByteCursor<'a>>> {
        if self.peek_asn1_tag() != Some(tag) {
            return Ok(None);
        }
        self.read_asn1(tag).map(Some)
    }

    /// The tag byte of the next element, without advancing.
    pub fn peek_asn1_tag(&self) -> Option<u8> {
        self.data.first().copied()
    }

    /// Read a DER INTEGER holding a non-negative value that fits in a `u64`.
    pub fn read_asn1_u64(&mut self) -> Result<u64> {
        let mut probe = *self;
        let value = probe.read_asn1(der::INTEGER)?.as_bytes();

        let (first, rest) = value
            .split_first()
            .ok_or(CursorError::Malformed("empty INTEGER"))?;
        if first & 0x80 != 0 {
            return Err(CursorError::Malformed("negative INTEGER"));
        }
        if *first == 0 && rest.first().is_some_and(|b| b & 0x80 == 0) {
            return Err(CursorError::Malformed("INTEGER not minimally encoded"));
        }
        let digits = if *first == 0 { rest } else { value };
        if digits.len() > 8 {
            return Err(CursorError::Malformed("INTEGER too large"));
        }

        *self = probe;
        Ok(digits.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    fn split_asn1(&mut self) -> Result<(Header, &'a [u8])> {
        let header = der::parse_header(self.data)?;
        let total = header
            .header_len
            .checked_add(header.value_len)
            .ok_or(CursorError::Malformed("length overflows address space"))?;
        let element = self.read_bytes(total)?;
        Ok((header, element))
    }
}

impl<'a> From<&'a [u8]> for ByteCursor<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl Buf for ByteCursor<'_> {
    fn remaining(&self) -> usize {
        self.data.len()
    }

    fn chunk(&self) -> &[u8] {
        self.data
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.data.len(),
            "cannot advance past end of cursor ({cnt} > {})",
            self.data.len()
        );
        self.data = &self.data[cnt..];
    }
}
