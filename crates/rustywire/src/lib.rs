//! # RustyWire, a self-describing, tag-based packet codec
//!
//! This crate implements the *core* of a binary packet codec for a
//! message-oriented transport: a pluggable, ancestry-aware type-encoder
//! registry; wire layouts for scalars, strings, byte buffers, field groups,
//! lists, and framed named packets; a resumable decode protocol; and a
//! length-checksum resynchronization state machine.
//!
//! It deliberately does **not** own the higher-level field-value object
//! model or the definition registry that maps `(name, version)` pairs to
//! schemas, those are collaborators. [`rustywire_model`](https://docs.rs)
//! (a sibling crate in this workspace) provides a concrete implementation
//! of both, the same way `rustyasn` provides concrete field types against
//! traits that, in the wider `RustyFix` workspace, are defined by the core
//! `rustyfix` crate.
//!
//! ## Resumability without coroutines
//!
//! The wire format's decoder is resumable: whenever the underlying stream
//! is short of bytes, decode suspends and can be resumed once more bytes
//! arrive. Rather than modeling this with generators or hand-rolled
//! continuation stacks, every multi-byte read on [`stream::StreamAdapter`]
//! checks `available()` *before* consuming anything and returns
//! [`stream::Poll::NeedMore`] untouched if there isn't enough. This means a
//! decode that suspends partway through a nested structure has advanced the
//! stream exactly as far as the bytes it has actually consumed, nothing
//! more. [`Codec::decode_iter`] wraps the whole attempt in a recorded start
//! position and rewinds to it on `NeedMore`, so a caller who feeds more
//! bytes and calls again gets a clean retry rather than a continuation.
//! This is sanctioned directly by the protocol: a partial decode can always
//! be retried from the start once the stream supports seeking.
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod field;
pub mod frame;
pub mod group;
pub mod list;
pub mod primitives;
pub mod registry;
pub mod stream;
pub mod strings;

mod codec;

pub use codec::Codec;
pub use config::Config;
pub use error::{DecodeError, EncodeError, Error, Result};
pub use field::{Category, FieldAttrs, FieldDecl, GroupAccess, ListAccess, Name, PacketAccess, PacketField, Scalar};
pub use registry::{FieldEncoder, Registry, TypeKey};
pub use stream::{BufferStream, ByteStream, BytesStream, DynStream, Poll, StreamAdapter};

/// Default `MaxValue` attribute for UINT/INT fields when unspecified (`2^32 - 1`).
pub const DEFAULT_MAX_VALUE: u64 = u32::MAX as u64;

/// Default `Bits` attribute for FLOAT fields when unspecified.
pub const DEFAULT_FLOAT_BITS: u8 = 32;

/// Maximum encodable length of a STRING field's UTF-8 payload (`2^16` bytes).
pub const MAX_STRING_LEN: u64 = 1 << 16;

/// Maximum encodable length of a BUFFER field's raw payload (`2^64`, i.e. unbounded for `usize`).
pub const MAX_BUFFER_LEN: u64 = u64::MAX;

/// Maximum number of elements a LIST field may encode (`2^16`).
pub const MAX_LIST_LEN: u64 = 1 << 16;

/// A [`Registry`] with every encoder this crate defines already registered:
/// the four scalars, `Str`/`Buffer`, `Group`, `List`, and the framed
/// `Packet` encoder. This is the Rust equivalent of the source protocol
/// registering each encoder as a side effect of importing its module, here
/// it's an explicit call instead of import-time global mutation.
///
/// A caller with its own element-specific override (say, a specialized
/// `LIST-of-UINT` encoder) should start from [`Registry::empty`] and
/// register only what it needs, or call this and then re-register the
/// specific key afterward, the registry always keeps the most recent
/// registration for a given key.
pub fn standard_registry() -> Registry {
    let mut registry = Registry::empty();
    registry.register(Category::Uint, None, std::sync::Arc::new(primitives::UintEncoder));
    registry.register(Category::Int, None, std::sync::Arc::new(primitives::IntEncoder));
    registry.register(Category::Bool, None, std::sync::Arc::new(primitives::BoolEncoder));
    registry.register(Category::Float, None, std::sync::Arc::new(primitives::FloatEncoder));
    registry.register(Category::Str, None, std::sync::Arc::new(strings::StringEncoder));
    registry.register(Category::Buffer, None, std::sync::Arc::new(strings::BufferEncoder));
    registry.register(Category::Group, None, std::sync::Arc::new(group::GroupEncoder));
    registry.register(Category::List, None, std::sync::Arc::new(list::ListEncoder));
    registry.register(Category::Packet, None, std::sync::Arc::new(frame::FrameEncoder));
    registry
}
