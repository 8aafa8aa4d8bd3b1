/// Errors that can occur while building a byte string.
///
/// `IntegrityError`, `LengthLimitExceeded` and `AllocationFailure` are fatal: the builder tree is
/// poisoned and every later operation returns the same error. The remaining
/// variants report misuse and leave the builder unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    /// A flushed field is longer than its length prefix can describe.
    #[error("field length {len} exceeds prefix capacity {max}")]
    IntegrityError { len: usize, max: usize },

    /// `finish` was called while child fields were still open.
    #[error("cannot finish with {count} open child field(s)")]
    PendingChildren { count: usize },

    /// The builder was used while one of its children is still open.
    #[error("builder has an open child field")]
    ActiveChild,

    /// The output would grow past the configured `max_len`.
    #[error("output length {requested} exceeds limit {max}")]
    LengthLimitExceeded { requested: usize, max: usize },

    /// The buffer could not grow to the requested size.
    #[error("allocation failure (requested {requested} bytes)")]
    AllocationFailure { requested: usize },

    /// A fixed length prefix width outside 1..=4 was requested.
    #[error("invalid length prefix width {0} (expected 1-4)")]
    InvalidWidth(usize),

    /// A value does not fit the fixed width it is written with.
    #[error("value {value} does not fit in {width} bytes")]
    ValueTooLarge { value: u64, width: usize },

    /// A DER tag that does not fit in a single identifier octet.
    #[error("unsupported DER tag 0x{0:02x}")]
    InvalidTag(u8),

    /// The builder was never initialized or has been abandoned.
    #[error("builder is not initialized")]
    Uninitialized,

    /// `init` was called on a builder that already owns storage.
    #[error("builder is already initialized")]
    AlreadyInitialized,

    /// The builder's output has already been taken by `finish`.
    #[error("builder already finished")]
    Finished,
}

impl BuilderError {
    /// Returns true for errors that poison the builder tree.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::IntegrityError { .. }
                | Self::LengthLimitExceeded { .. }
                | Self::AllocationFailure { .. }
        )
    }
}

impl From<BuilderError> for std::io::Error {
    fn from(err: BuilderError) -> Self {
        match err {
            BuilderError::AllocationFailure { .. } => {
                std::io::Error::new(std::io::ErrorKind::OutOfMemory, err)
            }
            other => std::io::Error::other(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuilderError>;
