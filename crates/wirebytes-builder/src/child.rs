use std::io::Write;

use wirebytes_cursor::PrefixWidth;

use crate::arena::{Arena, PrefixKind};
use crate::error::{BuilderError, Result};

/// A nested field being written into its root's buffer.
///
/// Created by the `begin_*` methods of [`ByteBuilder`](crate::ByteBuilder)
/// or of another child. The handle borrows the whole builder tree, so the
/// parent can't be touched until the handle is flushed or dropped.
///
/// Dropping a handle without [`flush`](Self::flush)ing leaves the field open:
/// the parent rejects further writes with [`BuilderError::ActiveChild`] until
/// it calls `flush` (closing the field as written) or `discard_child`.
#[derive(Debug)]
pub struct ChildBuilder<'a> {
    arena: &'a mut Arena,
    depth: usize,
}

impl<'a> ChildBuilder<'a> {
    pub(crate) fn new(arena: &'a mut Arena, depth: usize) -> Self {
        Self { arena, depth }
    }

    /// Nesting depth; direct children of the root are at depth 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn add_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.arena.append(self.depth, data)
    }

    pub fn add_u8(&mut self, value: u8) -> Result<()> {
        self.add_bytes(&[value])
    }

    pub fn add_u16(&mut self, value: u16) -> Result<()> {
        self.add_bytes(&value.to_be_bytes())
    }

    /// Append the low 24 bits of `value`; larger values are rejected.
    pub fn add_u24(&mut self, value: u32) -> Result<()> {
        self.add_bytes(&u24_bytes(value)?)
    }

    pub fn add_u32(&mut self, value: u32) -> Result<()> {
        self.add_bytes(&value.to_be_bytes())
    }

    pub fn add_u64(&mut self, value: u64) -> Result<()> {
        self.add_bytes(&value.to_be_bytes())
    }

    pub fn add_zeros(&mut self, n: usize) -> Result<()> {
        self.add_space(n).map(|_| ())
    }

    pub fn add_space(&mut self, n: usize) -> Result<&mut [u8]> {
        self.arena.add_space(self.depth, n)
    }

    pub fn begin_length_prefixed(&mut self, width: usize) -> Result<ChildBuilder<'_>> {
        self.begin_prefixed(prefix_width(width)?)
    }

    pub fn begin_prefixed(&mut self, width: PrefixWidth) -> Result<ChildBuilder<'_>> {
        self.begin(PrefixKind::Fixed(width), None)
    }

    pub fn begin_u8_length_prefixed(&mut self) -> Result<ChildBuilder<'_>> {
        self.begin_prefixed(PrefixWidth::U8)
    }

    pub fn begin_u16_length_prefixed(&mut self) -> Result<ChildBuilder<'_>> {
        self.begin_prefixed(PrefixWidth::U16)
    }

    pub fn begin_u24_length_prefixed(&mut self) -> Result<ChildBuilder<'_>> {
        self.begin_prefixed(PrefixWidth::U24)
    }

    pub fn begin_asn1(&mut self, tag: u8) -> Result<ChildBuilder<'_>> {
        self.begin(PrefixKind::Der, Some(tag))
    }

    fn begin(&mut self, kind: PrefixKind, tag: Option<u8>) -> Result<ChildBuilder<'_>> {
        let depth = self.arena.begin(self.depth, kind, tag)?;
        Ok(ChildBuilder::new(&mut *self.arena, depth))
    }

    pub fn add_asn1_u64(&mut self, value: u64) -> Result<()> {
        self.arena.add_asn1_u64(self.depth, value)
    }

    pub fn add_asn1_octet_string(&mut self, data: &[u8]) -> Result<()> {
        self.arena.add_asn1_octet_string(self.depth, data)
    }

    pub fn discard_child(&mut self) -> Result<()> {
        self.arena.discard_child(self.depth)
    }

    /// Close this field's open children without closing the field itself.
    pub fn flush_children(&mut self) -> Result<()> {
        self.arena.flush_descendants(self.depth)
    }

    /// Close this field: close any open children, then write the length
    /// prefix.
    ///
    /// Fails with [`BuilderError::IntegrityError`] if the content is too long
    /// for the prefix, which poisons the whole builder.
    pub fn flush(self) -> Result<()> {
        self.arena.close(self.depth)
    }

    /// Content written to this field so far, excluding its prefix.
    pub fn data(&self) -> Result<&[u8]> {
        self.arena.data(self.depth)
    }

    pub fn len(&self) -> Result<usize> {
        self.data().map(<[u8]>::len)
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.data().map(<[u8]>::is_empty)
    }
}

impl Write for ChildBuilder<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.add_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub(crate) fn prefix_width(width: usize) -> Result<PrefixWidth> {
    PrefixWidth::try_from(width).map_err(|_| BuilderError::InvalidWidth(width))
}

pub(crate) fn u24_bytes(value: u32) -> Result<[u8; 3]> {
    if value > 0xff_ffff {
        return Err(BuilderError::ValueTooLarge {
            value: u64::from(value),
            width: 3,
        });
    }
    let be = value.to_be_bytes();
    Ok([be[1], be[2], be[3]])
}
