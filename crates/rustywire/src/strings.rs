//! Encoders for the `Str` and `Buffer` variable-length categories.
//!
//! Both are length-prefixed payloads; they differ only in prefix width and
//! in UTF-8 validation. The source protocol's `StringFieldType` has a known
//! bug where its max-length check compares `len(data)` against the wrong
//! variable after a refactor; the intended check (`str_len > MAX_LENGTH`) is
//! what's implemented here, there is no bug to preserve.

use crate::codec::Codec;
use crate::error::{EncodeError, Result};
use crate::field::{Category, PacketField};
use crate::registry::FieldEncoder;
use crate::stream::{DynStream, Poll};
use crate::{MAX_BUFFER_LEN, MAX_STRING_LEN};

/// Encoder for the `Str` category: a 2-byte length prefix followed by
/// UTF-8 bytes.
#[derive(Debug, Default)]
pub struct StringEncoder;

impl FieldEncoder for StringEncoder {
    fn encode(&self, _codec: &Codec, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        let Some(text) = field.as_str() else {
            return Err(EncodeError::NoEncoder { category: Category::Str }.into());
        };
        let bytes = text.as_bytes();
        let len = bytes.len();
        if len as u64 >= MAX_STRING_LEN {
            return Err(EncodeError::StringTooLong { len, max: MAX_STRING_LEN }.into());
        }
        stream.write_u16(len as u16)?;
        stream.write_bytes(bytes)
    }

    fn decode(&self, _codec: &Codec, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        let len = match stream.read_u16()? {
            Poll::Ready(len) => len as usize,
            Poll::NeedMore => return Ok(Poll::NeedMore),
        };
        match stream.read_bytes(len)? {
            Poll::Ready(bytes) => {
                let text = std::str::from_utf8(&bytes)?;
                field.set_str(text.to_owned());
                Ok(Poll::Ready(()))
            }
            Poll::NeedMore => Ok(Poll::NeedMore),
        }
    }
}

/// Encoder for the `Buffer` category: an 8-byte length prefix followed by
/// raw bytes.
#[derive(Debug, Default)]
pub struct BufferEncoder;

impl FieldEncoder for BufferEncoder {
    fn encode(&self, _codec: &Codec, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        let Some(data) = field.as_buf() else {
            return Err(EncodeError::NoEncoder { category: Category::Buffer }.into());
        };
        let len = data.len();
        if len as u64 > MAX_BUFFER_LEN {
            return Err(EncodeError::BufferTooLong { len, max: MAX_BUFFER_LEN }.into());
        }
        stream.write_u64(len as u64)?;
        stream.write_bytes(data)
    }

    fn decode(&self, _codec: &Codec, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        let len = match stream.read_u64()? {
            Poll::Ready(len) => len,
            Poll::NeedMore => return Ok(Poll::NeedMore),
        };
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        match stream.read_bytes(len)? {
            Poll::Ready(bytes) => {
                field.set_buf(bytes);
                Ok(Poll::Ready(()))
            }
            Poll::NeedMore => Ok(Poll::NeedMore),
        }
    }
}
