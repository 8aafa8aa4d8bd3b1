//! Length-prefixed and DER byte strings for wire formats.
//!
//! wirebytes provides the byte-level substrate TLS and ASN.1 codecs are built
//! on: a bounds-checked read cursor and a growable builder with nested,
//! back-patched length prefixes.
//!
//! # Crate Structure
//!
//! - [`cursor`]: Read-only [`ByteCursor`] over borrowed bytes
//! - [`builder`]: [`ByteBuilder`] and its nested [`ChildBuilder`] fields
//!
//! ```
//! use wirebytes::{ByteBuilder, ByteCursor};
//!
//! let mut builder = ByteBuilder::new(0);
//! let mut field = builder.begin_u16_length_prefixed()?;
//! field.add_bytes(b"hello")?;
//! field.flush()?;
//! let wire = builder.finish()?;
//!
//! let mut cursor = ByteCursor::new(&wire);
//! let field = cursor.read_u16_length_prefixed().expect("field");
//! assert_eq!(field.as_bytes(), b"hello");
//! # Ok::<(), wirebytes::builder::BuilderError>(())
//! ```

/// Re-export cursor types.
pub mod cursor {
    pub use wirebytes_cursor::*;
}

/// Re-export builder types.
pub mod builder {
    pub use wirebytes_builder::*;
}

pub use wirebytes_builder::{BuilderConfig, ByteBuilder, ChildBuilder};
pub use wirebytes_cursor::{der, ByteCursor, PrefixWidth};
