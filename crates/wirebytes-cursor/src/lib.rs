//! Bounds-checked read cursor over borrowed byte strings.
//!
//! This is the parsing half of wirebytes. A [`ByteCursor`] wraps a borrowed
//! slice and consumes it front to back:
//! - Fixed-width big-endian integers (1 to 8 bytes)
//! - Payloads behind a 1, 2, 3 or 4 byte big-endian length prefix
//! - DER tag-length-value elements with strict length checking
//!
//! Every failed read leaves the cursor exactly where it was.

pub mod cursor;
pub mod der;
pub mod error;
pub mod width;

pub use cursor::ByteCursor;
pub use error::{CursorError, Result};
pub use width::PrefixWidth;
