use std::io::Write;

use bytes::Bytes;
use tracing::debug;
use wirebytes_cursor::PrefixWidth;

use crate::arena::{Arena, PrefixKind};
use crate::child::{prefix_width, u24_bytes, ChildBuilder};
use crate::config::BuilderConfig;
use crate::error::{BuilderError, Result};

#[derive(Debug, Default)]
enum State {
    #[default]
    Uninitialized,
    Active(Arena),
    Finished,
}

/// Top-level builder. Sole owner of the output buffer.
///
/// A builder created with [`ByteBuilder::default`] (or [`zeroed`](Self::zeroed))
/// owns nothing and must be [`init`](Self::init)ialized before use; dropping
/// or [`abandon`](Self::abandon)ing it is always safe.
///
/// ```
/// use wirebytes_builder::ByteBuilder;
///
/// let mut builder = ByteBuilder::new(0);
/// builder.add_bytes(&[0x01, 0x02])?;
/// let mut child = builder.begin_length_prefixed(2)?;
/// child.add_bytes(&[0xaa, 0xbb, 0xcc])?;
/// child.flush()?;
///
/// let out = builder.finish()?;
/// assert_eq!(out.as_ref(), &[0x01, 0x02, 0x00, 0x03, 0xaa, 0xbb, 0xcc]);
/// # Ok::<(), wirebytes_builder::BuilderError>(())
/// ```
#[derive(Debug, Default)]
pub struct ByteBuilder {
    state: State,
}

impl ByteBuilder {
    /// Create a builder, reserving `capacity_hint` bytes if possible.
    pub fn new(capacity_hint: usize) -> Self {
        Self::with_config(BuilderConfig::with_capacity(capacity_hint))
    }

    /// Create a builder with explicit configuration.
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            state: State::Active(Arena::new(config)),
        }
    }

    /// An uninitialized placeholder that owns no storage.
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Give an uninitialized, abandoned or finished builder fresh storage.
    pub fn init(&mut self, capacity_hint: usize) -> Result<()> {
        self.init_with_config(BuilderConfig::with_capacity(capacity_hint))
    }

    /// Like [`init`](Self::init) with explicit configuration.
    pub fn init_with_config(&mut self, config: BuilderConfig) -> Result<()> {
        if let State::Active(_) = self.state {
            return Err(BuilderError::AlreadyInitialized);
        }
        self.state = State::Active(Arena::new(config));
        Ok(())
    }

    /// Returns true if the builder currently owns storage.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Active(_))
    }

    /// Current capacity of the backing buffer.
    pub fn capacity(&self) -> usize {
        match &self.state {
            State::Active(arena) => arena.capacity(),
            _ => 0,
        }
    }

    fn arena(&self) -> Result<&Arena> {
        match &self.state {
            State::Active(arena) => Ok(arena),
            State::Uninitialized => Err(BuilderError::Uninitialized),
            State::Finished => Err(BuilderError::Finished),
        }
    }

    fn arena_mut(&mut self) -> Result<&mut Arena> {
        match &mut self.state {
            State::Active(arena) => Ok(arena),
            State::Uninitialized => Err(BuilderError::Uninitialized),
            State::Finished => Err(BuilderError::Finished),
        }
    }

    pub fn add_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.arena_mut()?.append(0, data)
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

    /// Append `n` zero bytes and return them for the caller to fill.
    pub fn add_space(&mut self, n: usize) -> Result<&mut [u8]> {
        self.arena_mut()?.add_space(0, n)
    }

    /// Open a field behind a `width`-byte big-endian length prefix.
    ///
    /// Fails with [`BuilderError::ActiveChild`] while a previous child is
    /// still open, even if its handle has been dropped.
    pub fn begin_length_prefixed(&mut self, width: usize) -> Result<ChildBuilder<'_>> {
        self.begin_prefixed(prefix_width(width)?)
    }

    /// Typed form of [`begin_length_prefixed`](Self::begin_length_prefixed).
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

    /// Open a DER element with the given single-byte tag.
    pub fn begin_asn1(&mut self, tag: u8) -> Result<ChildBuilder<'_>> {
        self.begin(PrefixKind::Der, Some(tag))
    }

    fn begin(&mut self, kind: PrefixKind, tag: Option<u8>) -> Result<ChildBuilder<'_>> {
        let arena = self.arena_mut()?;
        let depth = arena.begin(0, kind, tag)?;
        Ok(ChildBuilder::new(arena, depth))
    }

    /// Append a DER INTEGER holding `value`.
    pub fn add_asn1_u64(&mut self, value: u64) -> Result<()> {
        self.arena_mut()?.add_asn1_u64(0, value)
    }

    /// Append a DER OCTET STRING wrapping `data`.
    pub fn add_asn1_octet_string(&mut self, data: &[u8]) -> Result<()> {
        self.arena_mut()?.add_asn1_octet_string(0, data)
    }

    /// Drop the open child, if any, together with everything it wrote.
    pub fn discard_child(&mut self) -> Result<()> {
        self.arena_mut()?.discard_child(0)
    }

    /// Close every open child field, patching their prefixes.
    ///
    /// The builder stays usable afterwards.
    pub fn flush(&mut self) -> Result<()> {
        self.arena_mut()?.flush_descendants(0)
    }

    /// The bytes written so far.
    ///
    /// Fails with [`BuilderError::ActiveChild`] while a child is open, since
    /// its prefix is not final yet.
    pub fn data(&self) -> Result<&[u8]> {
        self.arena()?.data(0)
    }

    pub fn len(&self) -> Result<usize> {
        self.data().map(<[u8]>::len)
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.data().map(<[u8]>::is_empty)
    }

    /// Take the finished byte string.
    ///
    /// Fails with [`BuilderError::PendingChildren`] if a child is still open,
    /// or with the recorded error if the builder was poisoned. Ownership is
    /// only transferred on success; afterwards the builder is finished.
    pub fn finish(&mut self) -> Result<Bytes> {
        let arena = self.arena()?;
        arena.check_poison()?;
        let count = arena.open_children();
        if count > 0 {
            return Err(BuilderError::PendingChildren { count });
        }

        match std::mem::replace(&mut self.state, State::Finished) {
            State::Active(arena) => {
                let out = arena.into_vec();
                debug!(len = out.len(), "builder finished");
                Ok(Bytes::from(out))
            }
            other => {
                self.state = other;
                Err(BuilderError::Finished)
            }
        }
    }

    /// Release all storage and return to the uninitialized state.
    ///
    /// Safe on a builder that was never initialized.
    pub fn abandon(&mut self) {
        if let State::Active(_) = std::mem::take(&mut self.state) {
            debug!("builder abandoned");
        }
    }
}

impl Write for ByteBuilder {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.add_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::der::{INTEGER, OCTET_STRING, SEQUENCE};

    #[test]
    fn prefixed_child_scenario() {
        let mut builder = ByteBuilder::new(0);
        builder.add_bytes(&[0x01, 0x02]).unwrap();
        let mut child = builder.begin_length_prefixed(2).unwrap();
        child.add_bytes(&[0xaa, 0xbb, 0xcc]).unwrap();
        child.flush().unwrap();

        let out = builder.finish().unwrap();
        assert_eq!(out.as_ref(), &[0x01, 0x02, 0x00, 0x03, 0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn fixed_width_appenders() {
        let mut builder = ByteBuilder::default();
        builder.init(16).unwrap();
        builder.add_u8(0x01).unwrap();
        builder.add_u16(0x0203).unwrap();
        builder.add_u24(0x04_0506).unwrap();
        builder.add_u32(0x0708_090a).unwrap();
        builder.add_u64(0x0b0c_0d0e_0f10_1112).unwrap();

        assert_eq!(builder.len().unwrap(), 18);
        assert_eq!(
            builder.data().unwrap(),
            &[
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
                0x0f, 0x10, 0x11, 0x12
            ]
        );
    }

    #[test]
    fn u24_rejects_wide_values() {
        let mut builder = ByteBuilder::new(0);
        assert!(matches!(
            builder.add_u24(0x0100_0000),
            Err(BuilderError::ValueTooLarge { .. })
        ));
        assert!(builder.is_empty().unwrap());
    }

    #[test]
    fn second_child_without_flush_fails() {
        let mut builder = ByteBuilder::new(0);
        let mut child = builder.begin_length_prefixed(2).unwrap();
        child.add_u8(0x01).unwrap();
        drop(child);

        assert_eq!(
            builder.begin_length_prefixed(2).unwrap_err(),
            BuilderError::ActiveChild
        );
        assert_eq!(builder.add_u8(0).unwrap_err(), BuilderError::ActiveChild);
        assert_eq!(builder.data().unwrap_err(), BuilderError::ActiveChild);
        assert_eq!(
            builder.finish().unwrap_err(),
            BuilderError::PendingChildren { count: 1 }
        );
    }

    #[test]
    fn flush_closes_dropped_children() {
        let mut builder = ByteBuilder::new(0);
        let mut child = builder.begin_u8_length_prefixed().unwrap();
        child.add_bytes(b"abc").unwrap();
        drop(child);

        builder.flush().unwrap();
        builder.add_u8(0xff).unwrap();
        assert_eq!(builder.finish().unwrap().as_ref(), b"\x03abc\xff");
    }

    #[test]
    fn discard_child_rewinds() {
        let mut builder = ByteBuilder::new(0);
        builder.add_u8(0x01).unwrap();
        let mut child = builder.begin_asn1(SEQUENCE).unwrap();
        child.add_bytes(&[1, 2, 3]).unwrap();
        drop(child);

        builder.discard_child().unwrap();
        assert_eq!(builder.data().unwrap(), &[0x01]);
        builder.discard_child().unwrap();
    }

    #[test]
    fn overflow_poisons_and_blocks_finish() {
        let mut builder = ByteBuilder::new(0);
        let mut child = builder.begin_u8_length_prefixed().unwrap();
        child.add_zeros(256).unwrap();

        let err = child.flush().unwrap_err();
        assert_eq!(err, BuilderError::IntegrityError { len: 256, max: 255 });
        assert!(err.is_fatal());
        assert_eq!(builder.finish().unwrap_err(), err);
        assert_eq!(builder.add_u8(0).unwrap_err(), err);
        assert!(builder.is_initialized());
    }

    #[test]
    fn max_len_is_a_length_limit() {
        let mut builder = ByteBuilder::with_config(BuilderConfig {
            initial_capacity: 4,
            max_len: Some(4),
        });
        builder.add_u32(1).unwrap();

        let err = builder.add_u8(1).unwrap_err();
        assert_eq!(
            err,
            BuilderError::LengthLimitExceeded {
                requested: 5,
                max: 4
            }
        );
        assert!(err.is_fatal());
        assert_eq!(builder.finish().unwrap_err(), err);
    }

    #[test]
    fn max_len_counts_der_long_form_expansion() {
        let mut builder = ByteBuilder::with_config(BuilderConfig {
            initial_capacity: 0,
            max_len: Some(130),
        });
        let mut element = builder.begin_asn1(OCTET_STRING).unwrap();
        element.add_zeros(128).unwrap();

        assert_eq!(
            element.flush().unwrap_err(),
            BuilderError::LengthLimitExceeded {
                requested: 131,
                max: 130
            }
        );
        assert!(matches!(
            builder.finish(),
            Err(BuilderError::LengthLimitExceeded { .. })
        ));
    }

    #[test]
    fn der_helpers() {
        let mut builder = ByteBuilder::new(0);
        builder.add_asn1_u64(0).unwrap();
        builder.add_asn1_u64(0x80).unwrap();
        builder.add_asn1_octet_string(b"hi").unwrap();

        assert_eq!(
            builder.finish().unwrap().as_ref(),
            &[INTEGER, 1, 0x00, INTEGER, 2, 0x00, 0x80, OCTET_STRING, 2, b'h', b'i']
        );
    }

    #[test]
    fn invalid_width_and_tag() {
        let mut builder = ByteBuilder::new(0);
        assert_eq!(
            builder.begin_length_prefixed(5).unwrap_err(),
            BuilderError::InvalidWidth(5)
        );
        assert_eq!(
            builder.begin_asn1(0x1f).unwrap_err(),
            BuilderError::InvalidTag(0x1f)
        );
        assert!(builder.is_empty().unwrap());
    }

    #[test]
    fn lifecycle_states() {
        let mut builder = ByteBuilder::zeroed();
        assert!(!builder.is_initialized());
        assert_eq!(builder.capacity(), 0);
        assert_eq!(builder.add_u8(1).unwrap_err(), BuilderError::Uninitialized);
        builder.abandon();

        builder.init(8).unwrap();
        assert!(builder.capacity() >= 8);
        assert_eq!(
            builder.init(8).unwrap_err(),
            BuilderError::AlreadyInitialized
        );

        builder.add_u8(1).unwrap();
        assert_eq!(builder.finish().unwrap().as_ref(), &[1]);
        assert_eq!(builder.finish().unwrap_err(), BuilderError::Finished);
        assert_eq!(builder.data().unwrap_err(), BuilderError::Finished);

        builder.init(0).unwrap();
        builder.add_u8(2).unwrap();
        builder.abandon();
        assert!(!builder.is_initialized());
    }

    #[test]
    fn abandon_never_initialized() {
        let mut builder = ByteBuilder::zeroed();
        builder.abandon();
        assert_eq!(builder.capacity(), 0);
        assert!(!builder.is_initialized());
    }

    #[test]
    fn capacity_hint_is_not_a_cap() {
        let mut builder = ByteBuilder::new(2);
        builder.add_bytes(&[0x55; 1024]).unwrap();
        assert_eq!(builder.len().unwrap(), 1024);
    }

    #[test]
    fn io_write_appends() {
        let mut builder = ByteBuilder::new(0);
        write!(builder, "v={}", 7).unwrap();
        assert_eq!(builder.data().unwrap(), b"v=7");
    }

    #[test]
    fn add_space_is_writable() {
        let mut builder = ByteBuilder::new(0);
        builder.add_space(3).unwrap().copy_from_slice(&[7, 8, 9]);
        assert_eq!(builder.data().unwrap(), &[7, 8, 9]);
    }
}
