//! Encoders for the UINT/INT/BOOL/FLOAT scalar categories.
//!
//! All four share one trait impl each, dispatched by [`crate::field::Category`].
//! UINT and INT share their width table: the source protocol's `IntEncoder`
//! literally subclasses `UintEncoder`, reusing its width-from-`MaxValue`
//! logic with signed pack codes instead of unsigned ones. Here that
//! relationship is a shared free function, [`width_for_max_value`], called
//! by both encoders rather than true inheritance.

use crate::codec::Codec;
use crate::error::{EncodeError, Result};
use crate::field::{Category, PacketField, Scalar};
use crate::registry::FieldEncoder;
use crate::stream::{DynStream, Poll};

/// The four wire widths, in bits, that a UINT/INT field's `MaxValue`
/// attribute can select.
const WIDTHS: [u32; 4] = [8, 16, 32, 64];

/// Picks the narrowest width in `{8, 16, 32, 64}` bits whose unsigned range
/// covers `max_value` (`MaxValue = 255` selects the 8-bit width, not 16).
/// `max_value`
/// of `u64::MAX` selects the 64-bit width like any other value in its
/// range, the source protocol's own table walk only raises once `maxValue`
/// reaches `2**64`, a value with no `u64` representation at all, so within
/// the `u64` domain this never fails; `u64::MAX` is the natural way a caller
/// asks for "the full 64-bit range, no declared cap."
pub(crate) fn width_for_max_value(max_value: u64) -> Result<u32> {
    for bits in WIDTHS {
        let range_max = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
        if range_max >= max_value {
            return Ok(bits);
        }
    }
    Err(EncodeError::MaxValueUnrepresentable { max_value }.into())
}

/// Encoder for the `Uint` category.
#[derive(Debug, Default)]
pub struct UintEncoder;

impl FieldEncoder for UintEncoder {
    fn encode(&self, _codec: &Codec, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        let width = width_for_max_value(field.attrs().max_value)?;
        let Some(Scalar::Uint(value)) = field.as_scalar() else {
            return Err(EncodeError::NoEncoder { category: Category::Uint }.into());
        };
        match width {
            8 => stream.write_u8(value as u8),
            16 => stream.write_u16(value as u16),
            32 => stream.write_u32(value as u32),
            _ => stream.write_u64(value),
        }
    }

    fn decode(&self, _codec: &Codec, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        let width = width_for_max_value(field.attrs().max_value)?;
        let value = match width {
            8 => stream.read_u8()?.map(u64::from),
            16 => stream.read_u16()?.map(u64::from),
            32 => stream.read_u32()?.map(u64::from),
            _ => stream.read_u64()?,
        };
        match value {
            Poll::Ready(v) => {
                field.set_scalar(Scalar::Uint(v));
                Ok(Poll::Ready(()))
            }
            Poll::NeedMore => Ok(Poll::NeedMore),
        }
    }
}

/// Encoder for the `Int` category. Shares [`width_for_max_value`] with
/// [`UintEncoder`], a signed field's `MaxValue` attribute still bounds the
/// magnitude the width table must represent.
#[derive(Debug, Default)]
pub struct IntEncoder;

impl FieldEncoder for IntEncoder {
    fn encode(&self, _codec: &Codec, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        let width = width_for_max_value(field.attrs().max_value)?;
        let Some(Scalar::Int(value)) = field.as_scalar() else {
            return Err(EncodeError::NoEncoder { category: Category::Int }.into());
        };
        match width {
            8 => stream.write_i8(value as i8),
            16 => stream.write_i16(value as i16),
            32 => stream.write_i32(value as i32),
            _ => stream.write_i64(value),
        }
    }

    fn decode(&self, _codec: &Codec, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        let width = width_for_max_value(field.attrs().max_value)?;
        let value = match width {
            8 => stream.read_i8()?.map(i64::from),
            16 => stream.read_i16()?.map(i64::from),
            32 => stream.read_i32()?.map(i64::from),
            _ => stream.read_i64()?,
        };
        match value {
            Poll::Ready(v) => {
                field.set_scalar(Scalar::Int(v));
                Ok(Poll::Ready(()))
            }
            Poll::NeedMore => Ok(Poll::NeedMore),
        }
    }
}

/// Encoder for the `Bool` category: a single `0x00`/`0x01` byte.
#[derive(Debug, Default)]
pub struct BoolEncoder;

impl FieldEncoder for BoolEncoder {
    fn encode(&self, _codec: &Codec, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        let Some(Scalar::Bool(value)) = field.as_scalar() else {
            return Err(EncodeError::NoEncoder { category: Category::Bool }.into());
        };
        stream.write_bool(value)
    }

    fn decode(&self, _codec: &Codec, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        match stream.read_bool()? {
            Poll::Ready(v) => {
                field.set_scalar(Scalar::Bool(v));
                Ok(Poll::Ready(()))
            }
            Poll::NeedMore => Ok(Poll::NeedMore),
        }
    }
}

/// Encoder for the `Float` category: IEEE-754, width chosen by the `Bits`
/// attribute (32 or 64).
#[derive(Debug, Default)]
pub struct FloatEncoder;

impl FieldEncoder for FloatEncoder {
    fn encode(&self, _codec: &Codec, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        let bits = field.attrs().bits;
        let Some(Scalar::Float(value)) = field.as_scalar() else {
            return Err(EncodeError::NoEncoder { category: Category::Float }.into());
        };
        if bits == 64 {
            stream.write_f64(value)
        } else {
            stream.write_f32(value as f32)
        }
    }

    fn decode(&self, _codec: &Codec, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        let bits = field.attrs().bits;
        let value = if bits == 64 {
            stream.read_f64()?
        } else {
            stream.read_f32()?.map(f64::from)
        };
        match value {
            Poll::Ready(v) => {
                field.set_scalar(Scalar::Float(v));
                Ok(Poll::Ready(()))
            }
            Poll::NeedMore => Ok(Poll::NeedMore),
        }
    }
}
