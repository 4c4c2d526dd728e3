//! The top-level codec: registry-dispatched encode/decode, the resumable
//! decode protocol, and the recursion guard shared by every composite
//! encoder.

use std::cell::Cell;

use crate::config::Config;
use crate::error::{DecodeError, EncodeError, Result};
use crate::field::{Category, PacketField};
use crate::registry::Registry;
use crate::stream::{DynStream, Poll};

/// The entry point collaborators drive: dispatches to a registered
/// [`crate::registry::FieldEncoder`] by category, recursing back into
/// itself for nested fields (GROUP members, LIST elements, a PACKET's
/// body).
///
/// A `Codec` owns an immutable [`Registry`] and a [`Config`]; it borrows
/// the stream and field value for the duration of one call, it owns
/// neither. The codec is single-threaded per call, so the recursion depth
/// counter below uses a plain [`Cell`] rather than an atomic.
#[derive(Debug)]
pub struct Codec {
    registry: Registry,
    config: Config,
    depth: Cell<u32>,
}

impl Codec {
    /// Builds a codec from a fully-populated registry and configuration.
    /// The registry is not mutable again after this point, register every
    /// encoder first.
    pub fn new(registry: Registry, config: Config) -> Self {
        Codec { registry, config, depth: Cell::new(0) }
    }

    /// The codec's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The codec's type-encoder registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Serializes `field`'s current value to `stream` in one call. Composite
    /// fields recurse internally; there is no resumability on the encode
    /// path since encoding never needs to wait on input.
    pub fn encode(&self, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        self.depth.set(0);
        self.dispatch_encode(stream, field)
    }

    /// Looks up and invokes the registered encoder for `field`'s category,
    /// tracking recursion depth against [`Config::max_recursion_depth`].
    /// Composite encoders (group/list/frame) call this for their members;
    /// collaborators should use [`Codec::encode`] instead, which resets the
    /// depth counter.
    pub fn dispatch_encode(&self, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        let _guard = self.enter_depth().map_err(EncodeError::from_depth)?;
        let encoder = self.lookup(field).ok_or(EncodeError::NoEncoder { category: field.category() })?;
        encoder.encode(self, stream, field)
    }

    /// Drives the resumable decoder to completion on a stream whose
    /// `available()` is expected to eventually satisfy every pending read
    /// (e.g. a buffer that's already fully populated, or one fed by a
    /// caller-side loop). Fails with [`DecodeError::StreamStalled`] if two
    /// consecutive `NeedMore`s observe the same `available()`, since that
    /// means the stream can never make progress on its own.
    pub fn decode(&self, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<()> {
        let mut last_available = None;
        loop {
            match self.decode_iter(stream, field)? {
                Poll::Ready(()) => return Ok(()),
                Poll::NeedMore => {
                    let avail = stream.available();
                    if last_available == Some(avail) {
                        return Err(DecodeError::StreamStalled.into());
                    }
                    last_available = Some(avail);
                }
            }
        }
    }

    /// The resumable decode entry point: attempts to fill `field` from
    /// `stream`, returning [`Poll::NeedMore`] without having observably
    /// consumed anything if the stream runs short partway through.
    ///
    /// There is no persisted continuation: on `NeedMore` the stream is
    /// rewound to the position it held when this call started, so the next
    /// call re-attempts the whole decode from scratch. Any sub-fields that
    /// were filled in along the way get overwritten identically on the
    /// retry, satisfying "resumption produces the same result as if the
    /// bytes had been present from the start" without a continuation stack.
    pub fn decode_iter(&self, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        let start = stream.tell();
        self.depth.set(0);
        match self.dispatch_decode(stream, field) {
            Ok(Poll::Ready(())) => Ok(Poll::Ready(())),
            Ok(Poll::NeedMore) => {
                stream.seek(start)?;
                Ok(Poll::NeedMore)
            }
            Err(e) => Err(e),
        }
    }

    /// Looks up and invokes the registered decoder for `field`'s category,
    /// tracking recursion depth. Composite decoders call this for their
    /// members; collaborators should use [`Codec::decode`]/
    /// [`Codec::decode_iter`] instead.
    pub fn dispatch_decode(&self, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        let _guard = self.enter_depth().map_err(DecodeError::from_depth)?;
        let category = field.category();
        let encoder = self.lookup(field).ok_or(DecodeError::NoEncoder { category })?;
        encoder.decode(self, stream, field)
    }

    fn lookup(&self, field: &dyn PacketField) -> Option<std::sync::Arc<dyn crate::registry::FieldEncoder>> {
        let inner = match field.category() {
            Category::List => field.as_list().map(|l| l.element_category()),
            _ => None,
        };
        self.registry.lookup(field.category(), inner)
    }

    /// Increments the recursion counter for the lifetime of the returned
    /// guard, failing if doing so would exceed [`Config::max_recursion_depth`].
    fn enter_depth(&self) -> std::result::Result<DepthGuard<'_>, u32> {
        let next = self.depth.get() + 1;
        if next > self.config.max_recursion_depth {
            return Err(self.config.max_recursion_depth);
        }
        self.depth.set(next);
        Ok(DepthGuard(&self.depth))
    }
}

/// Decrements the codec's recursion counter when dropped, so a failed or
/// completed nested call doesn't leave depth permanently inflated.
struct DepthGuard<'a>(&'a Cell<u32>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl EncodeError {
    fn from_depth(max_depth: u32) -> Self {
        EncodeError::RecursionDepthExceeded { max_depth }
    }
}

impl DecodeError {
    fn from_depth(max_depth: u32) -> Self {
        DecodeError::RecursionDepthExceeded { max_depth }
    }
}
