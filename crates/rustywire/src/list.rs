//! The `List` encoder: a length-prefixed homogeneous sequence.
//!
//! Every element shares the list's declared element category; there is no
//! per-element type tag on the wire; heterogeneous lists are not
//! representable by this format.

use crate::codec::Codec;
use crate::error::{DecodeError, EncodeError, Result};
use crate::field::{Category, PacketField};
use crate::registry::FieldEncoder;
use crate::stream::{DynStream, Poll};

/// Encoder for the `List` category.
#[derive(Debug, Default)]
pub struct ListEncoder;

impl FieldEncoder for ListEncoder {
    fn encode(&self, codec: &Codec, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        let list = field.as_list().ok_or(EncodeError::NoEncoder { category: Category::List })?;
        let len = list.len();
        if len as u64 >= crate::MAX_LIST_LEN {
            return Err(EncodeError::ListTooLong { len, max: crate::MAX_LIST_LEN }.into());
        }
        stream.write_u16(len as u16)?;
        for index in 0..len {
            let elem = list.get(index);
            codec.dispatch_encode(stream, elem).map_err(|source| EncodeError::ListElement {
                index,
                source: Box::new(source),
            })?;
        }
        Ok(())
    }

    fn decode(&self, codec: &Codec, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        let len = match stream.read_u16()? {
            Poll::Ready(len) => len as usize,
            Poll::NeedMore => return Ok(Poll::NeedMore),
        };

        let element_category = field
            .as_list()
            .ok_or(DecodeError::NoEncoder { category: Category::List })?
            .element_category();

        let list = field.as_list_mut().ok_or(DecodeError::NoEncoder { category: Category::List })?;
        list.clear();
        for _ in 0..len {
            list.push_unset();
        }

        for index in 0..len {
            let elem = list.get_mut(index);
            match codec.dispatch_decode(stream, elem) {
                Ok(Poll::Ready(())) => continue,
                Ok(Poll::NeedMore) => return Ok(Poll::NeedMore),
                Err(source) => {
                    return Err(DecodeError::ListElement {
                        index,
                        category: element_category,
                        source: Box::new(source),
                    }
                    .into())
                }
            }
        }
        Ok(Poll::Ready(()))
    }
}
