//! Growable byte-string builder with nested length-prefixed fields.
//!
//! This is the serialization half of wirebytes. A top-level [`ByteBuilder`]
//! owns a single growable buffer. Opening a length-prefixed or DER field
//! reserves space for the prefix and hands out a [`ChildBuilder`] that writes
//! after it; the prefix is patched in once the child is flushed.
//!
//! Children never allocate. They hold a borrow of the root's arena plus their
//! depth in its stack of pending prefixes, so the borrow checker keeps a
//! parent untouchable while a child handle is live.

mod arena;
pub mod builder;
pub mod child;
pub mod config;
pub mod error;

pub use builder::ByteBuilder;
pub use child::ChildBuilder;
pub use config::BuilderConfig;
pub use error::{BuilderError, Result};
pub use wirebytes_cursor::{der, PrefixWidth};
