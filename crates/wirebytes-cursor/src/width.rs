//! Supported fixed length prefix widths.
//!
//! TLS and friends use 1, 2 and 3 byte prefixes; 4 bytes covers the rest.
//! Every width is an unsigned big-endian integer.

use crate::error::CursorError;

/// Width in bytes of a fixed big-endian length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixWidth {
    U8 = 1,
    U16 = 2,
    U24 = 3,
    U32 = 4,
}

impl PrefixWidth {
    /// All supported widths, narrowest first.
    pub const ALL: [PrefixWidth; 4] = [Self::U8, Self::U16, Self::U24, Self::U32];

    /// Number of bytes the prefix occupies on the wire.
    pub fn bytes(self) -> usize {
        self as usize
    }

    /// Largest payload length this prefix can describe.
    pub fn max_len(self) -> usize {
        match self {
            Self::U8 => 0xff,
            Self::U16 => 0xffff,
            Self::U24 => 0xff_ffff,
            Self::U32 => 0xffff_ffff,
        }
    }

    /// Big-endian encoding of `len` in exactly `self.bytes()` bytes.
    ///
    /// Returns `None` when `len` does not fit.
    pub fn encode(self, len: usize) -> Option<[u8; 4]> {
        if len > self.max_len() {
            return None;
        }
        let mut out = [0u8; 4];
        let be = (len as u32).to_be_bytes();
        let width = self.bytes();
        out[..width].copy_from_slice(&be[4 - width..]);
        Some(out)
    }

    /// Decode a big-endian length from exactly `self.bytes()` bytes.
    pub(crate) fn decode(self, raw: &[u8]) -> usize {
        debug_assert_eq!(raw.len(), self.bytes());
        raw.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize)
    }
}

impl TryFrom<usize> for PrefixWidth {
    type Error = CursorError;

    fn try_from(width: usize) -> Result<Self, Self::Error> {
        match width {
            1 => Ok(Self::U8),
            2 => Ok(Self::U16),
            3 => Ok(Self::U24),
            4 => Ok(Self::U32),
            other => Err(CursorError::InvalidLength(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_from_usize() {
        for width in PrefixWidth::ALL {
            assert_eq!(PrefixWidth::try_from(width.bytes()).unwrap(), width);
        }
        assert_eq!(
            PrefixWidth::try_from(0),
            Err(CursorError::InvalidLength(0))
        );
        assert_eq!(
            PrefixWidth::try_from(5),
            Err(CursorError::InvalidLength(5))
        );
    }

    #[test]
    fn encode_is_big_endian_and_bounded() {
        assert_eq!(&PrefixWidth::U8.encode(0xab).unwrap()[..1], &[0xab]);
        assert_eq!(&PrefixWidth::U16.encode(3).unwrap()[..2], &[0x00, 0x03]);
        assert_eq!(
            &PrefixWidth::U24.encode(0x01_0203).unwrap()[..3],
            &[0x01, 0x02, 0x03]
        );
        assert_eq!(
            &PrefixWidth::U32.encode(0xdead_beef).unwrap()[..4],
            &[0xde, 0xad, 0xbe, 0xef]
        );
        assert!(PrefixWidth::U8.encode(256).is_none());
        assert!(PrefixWidth::U16.encode(0x1_0000).is_none());
        assert!(PrefixWidth::U24.encode(0x100_0000).is_none());
    }

    #[test]
    fn decode_matches_encode() {
        let raw = PrefixWidth::U24.encode(70_000).unwrap();
        assert_eq!(PrefixWidth::U24.decode(&raw[..3]), 70_000);
    }
}
