/// Errors that can occur while reading from a [`ByteCursor`](crate::ByteCursor).
///
/// All of them are recoverable: the cursor is left unchanged and the caller
/// should treat the input as malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The read needs more bytes than remain in the cursor.
    #[error("out of bounds (needed {needed} bytes, {remaining} remaining)")]
    OutOfBounds { needed: usize, remaining: usize },

    /// A fixed length prefix width outside 1..=4 was requested.
    #[error("invalid length prefix width {0} (expected 1-4)")]
    InvalidLength(usize),

    /// A DER header violates the distinguished encoding rules.
    #[error("malformed DER: {0}")]
    Malformed(&'static str),

    /// The next DER element carries a different tag than requested.
    #[error("unexpected DER tag 0x{found:02x} (expected 0x{expected:02x})")]
    UnexpectedTag { expected: u8, found: u8 },
}

pub type Result<T> = std::result::Result<T, CursorError>;
