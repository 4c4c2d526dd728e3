//! The type-encoder registry: a process-wide (or per-`Codec`) mapping from
//! type keys to encoder implementations.
//!
//! The original walks each value's class ancestry from most to least
//! specific, looking for a registered encoder at each step. Every category
//! here is already maximally specific, so that walk flattens into a single
//! two-level lookup: try `(category, Some(inner))` first, letting a caller
//! register a specialized encoder for, say, LIST-of-UINT, then fall back
//! to `(category, None)`, the generic encoder that serves every other inner
//! category. GROUP and PACKET never vary by inner category, so they are
//! always registered and looked up at `(category, None)`.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::field::{Category, PacketField};
use crate::stream::{DynStream, Poll};
use crate::Codec;

/// A type key: a field's category, plus its element category when that
/// varies (currently only `List`).
pub type TypeKey = (Category, Option<Category>);

/// An encoder/decoder pair registered against a [`TypeKey`].
///
/// Implementations recurse back into the codec via
/// [`Codec::dispatch_encode`]/[`Codec::dispatch_decode`] for nested fields,
/// not via `encode`/`decode_iter` directly, those outer entry points own
/// the resumability bookkeeping and would double it up if called from
/// inside a nested encoder.
pub trait FieldEncoder: Send + Sync {
    /// Encodes `field`'s current value to `stream`.
    fn encode(
        &self,
        codec: &Codec,
        stream: &mut DynStream,
        field: &dyn PacketField,
    ) -> Result<()>;

    /// Attempts to decode a value from `stream` into `field`, returning
    /// `NeedMore` without having consumed anything if the stream is short.
    fn decode(
        &self,
        codec: &Codec,
        stream: &mut DynStream,
        field: &mut dyn PacketField,
    ) -> Result<Poll<()>>;
}

/// The mapping from [`TypeKey`] to registered [`FieldEncoder`].
#[derive(Default)]
pub struct Registry {
    encoders: FxHashMap<TypeKey, Arc<dyn FieldEncoder>>,
}

impl Registry {
    /// An empty registry with nothing registered.
    pub fn empty() -> Self {
        Registry::default()
    }

    /// Registers `encoder` under the given key, replacing whatever was
    /// registered there before.
    pub fn register(&mut self, category: Category, inner: Option<Category>, encoder: Arc<dyn FieldEncoder>) {
        self.encoders.insert((category, inner), encoder);
    }

    /// Looks up an encoder for `category`/`inner`, preferring an exact
    /// `(category, Some(inner))` match and falling back to the generic
    /// `(category, None)` entry.
    pub fn lookup(&self, category: Category, inner: Option<Category>) -> Option<Arc<dyn FieldEncoder>> {
        if let Some(inner_cat) = inner {
            if let Some(enc) = self.encoders.get(&(category, Some(inner_cat))) {
                return Some(Arc::clone(enc));
            }
        }
        self.encoders.get(&(category, None)).map(Arc::clone)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("registered_keys", &self.encoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Category::*;

    struct DummyEncoder;
    impl FieldEncoder for DummyEncoder {
        fn encode(&self, _: &Codec, _: &mut DynStream, _: &dyn PacketField) -> Result<()> {
            Ok(())
        }
        fn decode(&self, _: &Codec, _: &mut DynStream, _: &mut dyn PacketField) -> Result<Poll<()>> {
            Ok(Poll::Ready(()))
        }
    }

    #[test]
    fn specific_key_wins_over_generic_fallback() {
        let mut reg = Registry::empty();
        reg.register(List, None, Arc::new(DummyEncoder));
        reg.register(List, Some(Uint), Arc::new(DummyEncoder));
        assert!(reg.lookup(List, Some(Uint)).is_some());
        assert!(reg.lookup(List, Some(Bool)).is_some(), "falls back to the generic entry");
        assert!(reg.lookup(Group, None).is_none());
    }
}
