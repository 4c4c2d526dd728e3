//! Runtime configuration for a [`crate::Codec`].

/// Tunables for a [`crate::Codec`] instance.
///
/// Mirrors the shape of a typical encoding-rule config in this workspace:
/// a handful of size/depth guards plus a default buffer size hint for
/// streaming decode, with named presets instead of a builder for the
/// common cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Largest encodable/decodable framed packet body, in bytes. Guards
    /// against a corrupt or hostile length field causing an unbounded
    /// allocation.
    pub max_message_size: usize,

    /// Maximum nesting depth across GROUP/LIST/PACKET decode recursion.
    /// Not named in the wire format itself, but necessary so a
    /// self-referential or adversarial schema can't blow the call stack.
    pub max_recursion_depth: u32,

    /// Hint for the initial capacity of a streaming decoder's internal
    /// buffer.
    pub stream_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_message_size: 64 * 1024,
            max_recursion_depth: 32,
            stream_buffer_size: 8 * 1024,
        }
    }
}

impl Config {
    /// Tight limits suitable for decoding untrusted input off the wire:
    /// a smaller message cap and shallower recursion guard than the
    /// defaults.
    pub fn strict() -> Self {
        Config {
            max_message_size: 16 * 1024,
            max_recursion_depth: 16,
            stream_buffer_size: 4 * 1024,
        }
    }

    /// Relaxed limits for trusted, high-throughput links where messages are
    /// known to be large and deeply nested by design.
    pub fn permissive() -> Self {
        Config {
            max_message_size: 16 * 1024 * 1024,
            max_recursion_depth: 128,
            stream_buffer_size: 64 * 1024,
        }
    }
}
