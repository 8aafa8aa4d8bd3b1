//! Shared storage behind a builder tree.
//!
//! The root builder is depth 0. Pending prefix `i` belongs to the child at
//! depth `i + 1`, which was opened by the builder at depth `i`. A builder at
//! depth `d` has an open child exactly when `pending.len() > d`.

use tracing::{debug, trace};
use wirebytes_cursor::der;
use wirebytes_cursor::PrefixWidth;

use crate::config::BuilderConfig;
use crate::error::{BuilderError, Result};

/// How a reserved prefix is filled in when its field is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrefixKind {
    Fixed(PrefixWidth),
    /// DER length octets; one byte is reserved and the field shifts right
    /// if the long form is needed.
    Der,
}

impl PrefixKind {
    fn reserved(self) -> usize {
        match self {
            Self::Fixed(width) => width.bytes(),
            Self::Der => 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingPrefix {
    /// Where the field starts, including any tag written before the prefix.
    start: usize,
    /// Offset of the reserved prefix bytes.
    offset: usize,
    kind: PrefixKind,
}

impl PendingPrefix {
    fn content_start(&self) -> usize {
        self.offset + self.kind.reserved()
    }
}

#[derive(Debug)]
pub(crate) struct Arena {
    buf: Vec<u8>,
    pending: Vec<PendingPrefix>,
    config: BuilderConfig,
    poison: Option<BuilderError>,
}

impl Arena {
    pub(crate) fn new(config: BuilderConfig) -> Self {
        let mut buf = Vec::new();
        let hint = config
            .max_len
            .map_or(config.initial_capacity, |max| max.min(config.initial_capacity));
        if let Err(err) = buf.try_reserve(hint) {
            debug!(hint, error = %err, "ignoring unsatisfiable capacity hint");
        }
        Self {
            buf,
            pending: Vec::new(),
            config,
            poison: None,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub(crate) fn open_children(&self) -> usize {
        self.pending.len()
    }

    /// Fails if the tree is poisoned or the builder at `depth` has an open
    /// child.
    pub(crate) fn check(&self, depth: usize) -> Result<()> {
        if let Some(err) = &self.poison {
            return Err(err.clone());
        }
        debug_assert!(self.pending.len() >= depth, "builder outlived its field");
        if self.pending.len() > depth {
            return Err(BuilderError::ActiveChild);
        }
        Ok(())
    }

    pub(crate) fn check_poison(&self) -> Result<()> {
        match &self.poison {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn fail(&mut self, err: BuilderError) -> BuilderError {
        debug!(error = %err, "builder poisoned");
        self.poison = Some(err.clone());
        err
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        let Some(requested) = self.buf.len().checked_add(additional) else {
            return Err(self.fail(BuilderError::AllocationFailure {
                requested: usize::MAX,
            }));
        };
        if let Some(max) = self.config.max_len.filter(|&max| requested > max) {
            return Err(self.fail(BuilderError::LengthLimitExceeded { requested, max }));
        }

        let before = self.buf.capacity();
        if self.buf.try_reserve(additional).is_err() {
            return Err(self.fail(BuilderError::AllocationFailure { requested }));
        }
        if self.buf.capacity() != before {
            trace!(from = before, to = self.buf.capacity(), "grew builder buffer");
        }
        Ok(())
    }

    pub(crate) fn append(&mut self, depth: usize, data: &[u8]) -> Result<()> {
        self.check(depth)?;
        self.reserve(data.len())?;
        self.buf.extend_from_slice(data);
        Ok(())
    }

    pub(crate) fn add_space(&mut self, depth: usize, n: usize) -> Result<&mut [u8]> {
        self.check(depth)?;
        self.reserve(n)?;
        let start = self.buf.len();
        self.buf.resize(start + n, 0);
        Ok(&mut self.buf[start..])
    }

    /// Open a field for the builder at `depth` and return the child's depth.
    pub(crate) fn begin(
        &mut self,
        depth: usize,
        kind: PrefixKind,
        tag: Option<u8>,
    ) -> Result<usize> {
        self.check(depth)?;
        if let Some(tag) = tag {
            if !der::is_single_byte_tag(tag) {
                return Err(BuilderError::InvalidTag(tag));
            }
        }

        let tag_len = usize::from(tag.is_some());
        self.reserve(tag_len + kind.reserved())?;

        let start = self.buf.len();
        if let Some(tag) = tag {
            self.buf.push(tag);
        }
        let offset = self.buf.len();
        self.buf.resize(offset + kind.reserved(), 0);
        self.pending.push(PendingPrefix {
            start,
            offset,
            kind,
        });

        trace!(depth = depth + 1, offset, ?kind, "opened child field");
        Ok(depth + 1)
    }

    /// Close every open descendant of the builder at `depth`, deepest first.
    pub(crate) fn flush_descendants(&mut self, depth: usize) -> Result<()> {
        self.check_poison()?;
        while self.pending.len() > depth {
            self.close_top()?;
        }
        Ok(())
    }

    /// Close the field of the child at `depth` along with its descendants.
    pub(crate) fn close(&mut self, depth: usize) -> Result<()> {
        debug_assert!(depth > 0, "the root has no prefix to close");
        self.flush_descendants(depth)?;
        if self.pending.len() == depth {
            self.close_top()?;
        }
        Ok(())
    }

    fn close_top(&mut self) -> Result<()> {
        let Some(entry) = self.pending.pop() else {
            return Ok(());
        };
        let content_start = entry.content_start();
        let len = self.buf.len() - content_start;

        match entry.kind {
            PrefixKind::Fixed(width) => {
                let Some(encoded) = width.encode(len) else {
                    return Err(self.fail(BuilderError::IntegrityError {
                        len,
                        max: width.max_len(),
                    }));
                };
                self.buf[entry.offset..content_start].copy_from_slice(&encoded[..width.bytes()]);
            }
            PrefixKind::Der => {
                let mut octets = [0u8; 1 + der::MAX_LENGTH_OCTETS];
                let Some(written) = der::encode_length(len, &mut octets) else {
                    return Err(self.fail(BuilderError::IntegrityError {
                        len,
                        max: der::MAX_LENGTH,
                    }));
                };
                let extra = written - 1;
                if extra > 0 {
                    self.reserve(extra)?;
                    let end = self.buf.len();
                    self.buf.resize(end + extra, 0);
                    self.buf.copy_within(content_start..end, content_start + extra);
                }
                self.buf[entry.offset..entry.offset + written].copy_from_slice(&octets[..written]);
            }
        }

        trace!(depth = self.pending.len() + 1, len, "closed child field");
        Ok(())
    }

    /// Append a DER INTEGER holding `value`.
    pub(crate) fn add_asn1_u64(&mut self, depth: usize, value: u64) -> Result<()> {
        let be = value.to_be_bytes();
        let skip = be.iter().take_while(|&&b| b == 0).count().min(be.len() - 1);
        let digits = &be[skip..];
        let pad = usize::from(digits[0] & 0x80 != 0);

        let mut out = [0u8; 2 + 1 + 8];
        out[0] = der::INTEGER;
        out[1] = (pad + digits.len()) as u8;
        let start = 2 + pad;
        out[start..start + digits.len()].copy_from_slice(digits);
        self.append(depth, &out[..start + digits.len()])
    }

    /// Append a DER OCTET STRING wrapping `data`.
    pub(crate) fn add_asn1_octet_string(&mut self, depth: usize, data: &[u8]) -> Result<()> {
        let child = self.begin(depth, PrefixKind::Der, Some(der::OCTET_STRING))?;
        self.append(child, data)?;
        self.close(child)
    }

    /// Drop the open child of the builder at `depth` and everything it wrote.
    pub(crate) fn discard_child(&mut self, depth: usize) -> Result<()> {
        self.check_poison()?;
        if let Some(entry) = self.pending.get(depth).copied() {
            self.buf.truncate(entry.start);
            self.pending.truncate(depth);
            trace!(depth = depth + 1, "discarded child field");
        }
        Ok(())
    }

    /// Bytes written by the builder at `depth`, excluding its own prefix.
    pub(crate) fn data(&self, depth: usize) -> Result<&[u8]> {
        self.check(depth)?;
        let start = match depth {
            0 => 0,
            d => self.pending[d - 1].content_start(),
        };
        Ok(&self.buf[start..])
    }

    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}
