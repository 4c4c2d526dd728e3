//! Error types for encoding and decoding.
//!
//! `NeedMore` is *not* represented here, it is a suspension signal carried
//! by [`crate::stream::Poll`], not a failure. Everything in this module is a
//! genuine, non-recoverable-without-caller-action failure.

use smartstring::{LazyCompact, SmartString};
use thiserror::Error;

use crate::field::Category;

/// Small inline string used in error payloads, matching field/packet names
/// that are themselves short and rarely heap-allocated.
pub type WireString = SmartString<LazyCompact>;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for the codec.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure while encoding a field.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Failure while decoding a field.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The underlying byte stream itself failed (seek past end, write
    /// conflict, etc.), not a protocol-level error.
    #[error("stream I/O error: {0}")]
    StreamIo(WireString),
}

impl Error {
    pub(crate) fn stream_io(msg: impl Into<WireString>) -> Self {
        Error::StreamIo(msg.into())
    }
}

/// Errors that can occur while encoding a field value to the wire.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A field was left `UNSET` but its declaration does not mark it optional.
    #[error("field '{name}' is unset and not marked as optional")]
    FieldUnsetNotOptional {
        /// Declared field name.
        name: WireString,
    },

    /// Two fields in the same group declaration share a name.
    #[error("duplicate field '{name}'")]
    DuplicateField {
        /// The repeated name.
        name: WireString,
    },

    /// Two fields in the same group declaration share an explicit tag.
    #[error("duplicate explicit tag {tag} on field '{name}'")]
    DuplicateExplicitTag {
        /// The colliding tag.
        tag: u16,
        /// The field that tried to claim it.
        name: WireString,
    },

    /// No width in the UINT/INT table can represent the declared `MaxValue`.
    #[error("cannot encode uint of declared max value {max_value}")]
    MaxValueUnrepresentable {
        /// The offending `MaxValue` attribute.
        max_value: u64,
    },

    /// A STRING field's UTF-8 payload is longer than the format allows.
    #[error("string of length {len} exceeds maximum of {max}")]
    StringTooLong {
        /// Actual encoded length, in bytes.
        len: usize,
        /// Maximum permitted length.
        max: u64,
    },

    /// A BUFFER field's payload is longer than the format allows.
    #[error("buffer of length {len} exceeds maximum of {max}")]
    BufferTooLong {
        /// Actual length, in bytes.
        len: usize,
        /// Maximum permitted length.
        max: u64,
    },

    /// A LIST field has more elements than the format allows.
    #[error("list of length {len} exceeds maximum of {max}")]
    ListTooLong {
        /// Actual element count.
        len: usize,
        /// Maximum permitted element count.
        max: u64,
    },

    /// Encoding a named field failed; wraps the underlying cause.
    #[error("error encoding field '{name}'")]
    Field {
        /// The field that failed.
        name: WireString,
        /// Underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// Encoding a list element failed; wraps the underlying cause.
    #[error("error encoding index {index} of list")]
    ListElement {
        /// Index of the failing element.
        index: usize,
        /// Underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// A single `pack`/`unpack` request exceeded the adapter's configured
    /// maximum size.
    #[error("requested size {requested} exceeds stream limit of {limit}")]
    SizeExceedsLimit {
        /// The requested size.
        requested: usize,
        /// The configured limit.
        limit: usize,
    },

    /// No encoder is registered for this field's type key.
    #[error("cannot encode fields of type {category:?}")]
    NoEncoder {
        /// The category that had no registered encoder.
        category: Category,
    },

    /// Nested GROUP/LIST/PACKET encoding exceeded the configured recursion
    /// guard.
    #[error("recursion depth exceeded configured maximum of {max_depth}")]
    RecursionDepthExceeded {
        /// The configured maximum.
        max_depth: u32,
    },

    /// A PACKET's `definition_identifier` or `definition_version` is longer
    /// than the single-byte length prefix can represent.
    #[error("frame name of length {len} exceeds the {max}-byte length prefix")]
    FrameNameTooLong {
        /// Actual length, in bytes.
        len: usize,
        /// Maximum representable length (always 255, the `u8` ceiling).
        max: u8,
    },

    /// A group's `GroupAccess` implementation declared `name` in
    /// `declared_fields()` but would not hand back an accessor for it.
    #[error("declared field '{name}' has no accessor")]
    UnknownField {
        /// The declared-but-inaccessible field name.
        name: WireString,
    },
}

/// Errors that can occur while decoding a field value from the wire.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A group tag on the wire does not match any declared field.
    #[error("tag {tag} does not match any declared field")]
    UnknownTag {
        /// The unrecognized tag.
        tag: u16,
    },

    /// A STRING field's bytes were not valid UTF-8.
    #[error("invalid UTF-8 in string field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Decoding a list element failed; wraps the underlying cause.
    #[error("error decoding index {index} of list of type {category:?}")]
    ListElement {
        /// Index of the failing element.
        index: usize,
        /// Declared element category.
        category: Category,
        /// Underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// Decoding a named field failed; wraps the underlying cause.
    #[error("error decoding field '{name}'")]
    Field {
        /// The field that failed.
        name: WireString,
        /// Underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// After a frame relocked, the declared packet body length did not match
    /// the number of bytes the body decoder actually consumed.
    #[error("packet deserialization error: declared size {expected}, actual size {actual}")]
    FrameLengthMismatch {
        /// Declared frame length.
        expected: u64,
        /// Bytes actually consumed by the body decoder.
        actual: u64,
    },

    /// The frame's `(identifier, version)` pair has no known definition,
    /// and a zero-length tail confirms there was nothing more to recover.
    #[error("packet deserialization error: unresolved packet type {identifier}/{version}")]
    PacketTypeUnresolved {
        /// The frame's declared identifier.
        identifier: WireString,
        /// The frame's declared version string.
        version: WireString,
    },

    /// No encoder is registered for this field's type key.
    #[error("cannot decode fields of type {category:?}")]
    NoEncoder {
        /// The category that had no registered encoder.
        category: Category,
    },

    /// Nested GROUP/LIST/PACKET decoding exceeded the configured recursion
    /// guard.
    #[error("recursion depth exceeded configured maximum of {max_depth}")]
    RecursionDepthExceeded {
        /// The configured maximum.
        max_depth: u32,
    },

    /// A frame's declared `packet_length` exceeds [`crate::config::Config::max_message_size`],
    /// ahead of any attempt to honor it, guards against allocating for a
    /// corrupt or hostile length field.
    #[error("packet length {len} exceeds configured maximum of {max}")]
    FrameTooLarge {
        /// The frame's declared length.
        len: u64,
        /// The configured ceiling.
        max: u64,
    },

    /// `decode()` (the blocking convenience wrapper) observed `NeedMore`
    /// twice in a row with `available()` unchanged, the stream it was
    /// given cannot make progress, violating `decode()`'s precondition.
    #[error("stream stalled: decode() requires a stream whose available() eventually satisfies every pending read")]
    StreamStalled,

    /// A group's `GroupAccess` implementation declared `name` in
    /// `declared_fields()` but would not hand back an accessor for it.
    #[error("declared field '{name}' has no accessor")]
    UnknownField {
        /// The declared-but-inaccessible field name.
        name: WireString,
    },
}
