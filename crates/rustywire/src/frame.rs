//! The outermost `Packet` encoder: the length/check frame header, the
//! resync state machine, and the frame-tail fixup.
//!
//! Framing only ever lives at this, the outermost layer, a `Packet`'s body
//! is an ordinary `Group`, encoded/decoded via [`crate::group::GroupEncoder`]
//! through the same [`Codec::dispatch_encode`]/[`Codec::dispatch_decode`]
//! recursion every other composite uses.
//!
//! Decode is structured as a single straight-line attempt rather than a
//! persisted resync cursor: on `NeedMore` anywhere inside it, the enclosing
//! [`Codec::decode_iter`] rewinds the stream all the way back to the
//! position this call started at, and the next call re-runs the whole
//! resync scan from scratch. Bytes already on the stream don't change
//! between attempts, so the scan is idempotent, this trades a bit of
//! redone work for not needing a persisted cursor across suspensions.

use crate::codec::Codec;
use crate::error::{DecodeError, EncodeError, Result};
use crate::field::{Category, PacketField};
use crate::registry::FieldEncoder;
use crate::stream::{DynStream, Poll};

/// `length XOR all-ones`, used both to write the check field and to test it.
const LENGTH_CHECK_MASK: u64 = 0xFFFF_FFFF_FFFF_FFFF;

/// Encoder for the `Packet` category: the framed, named, versioned wrapper
/// around a `Group` body.
#[derive(Debug, Default)]
pub struct FrameEncoder;

impl FieldEncoder for FrameEncoder {
    fn encode(&self, codec: &Codec, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        let packet = field.as_packet().ok_or(EncodeError::NoEncoder { category: Category::Packet })?;
        let (identifier, version) =
            packet.identity().ok_or(EncodeError::NoEncoder { category: Category::Packet })?;
        let identifier = identifier.to_owned();
        let version = version.to_owned();
        let id_bytes = identifier.as_bytes();
        let ver_bytes = version.as_bytes();
        if id_bytes.len() > u8::MAX as usize {
            return Err(EncodeError::FrameNameTooLong { len: id_bytes.len(), max: u8::MAX }.into());
        }
        if ver_bytes.len() > u8::MAX as usize {
            return Err(EncodeError::FrameNameTooLong { len: ver_bytes.len(), max: u8::MAX }.into());
        }

        let body = packet.body_ref().ok_or(EncodeError::NoEncoder { category: Category::Packet })?;

        let frame_start = stream.tell();
        // Placeholders for packet_length and length_check, fixed up below
        // once the true length is known.
        stream.write_u64(0)?;
        stream.write_u64(0)?;
        stream.write_u8(id_bytes.len() as u8)?;
        stream.write_bytes(id_bytes)?;
        stream.write_u8(ver_bytes.len() as u8)?;
        stream.write_bytes(ver_bytes)?;

        codec.dispatch_encode(stream, body)?;

        let frame_end = stream.tell();
        let packet_length = frame_end - frame_start;
        stream.seek(frame_start)?;
        stream.write_u64(packet_length)?;
        stream.write_u64(packet_length ^ LENGTH_CHECK_MASK)?;
        stream.seek(frame_end)?;
        Ok(())
    }

    fn decode(&self, codec: &Codec, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        let search_start = stream.tell();
        let (frame_start, packet_length) = match self.resync_to_lock(stream, search_start)? {
            Poll::Ready(locked) => locked,
            Poll::NeedMore => return Ok(Poll::NeedMore),
        };

        let max_message_size = codec.config().max_message_size as u64;
        if packet_length > max_message_size {
            return Err(DecodeError::FrameTooLarge { len: packet_length, max: max_message_size }.into());
        }
        stream.set_max_size(packet_length as usize);

        let name_len = match stream.read_u8()? {
            Poll::Ready(v) => v as usize,
            Poll::NeedMore => return Ok(Poll::NeedMore),
        };
        let identifier = match stream.read_bytes(name_len)? {
            Poll::Ready(bytes) => String::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.utf8_error()))?,
            Poll::NeedMore => return Ok(Poll::NeedMore),
        };
        let version_len = match stream.read_u8()? {
            Poll::Ready(v) => v as usize,
            Poll::NeedMore => return Ok(Poll::NeedMore),
        };
        let version = match stream.read_bytes(version_len)? {
            Poll::Ready(bytes) => String::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.utf8_error()))?,
            Poll::NeedMore => return Ok(Poll::NeedMore),
        };

        let packet = field.as_packet_mut().ok_or(DecodeError::NoEncoder { category: Category::Packet })?;
        let resolved_body = packet.resolve_body(&identifier, &version);
        let type_resolved = resolved_body.is_some();

        if let Some(body) = resolved_body {
            packet.bind(&identifier, &version, body);
            let body_mut = packet
                .body_mut()
                .ok_or(DecodeError::NoEncoder { category: Category::Packet })?;
            match codec.dispatch_decode(stream, body_mut) {
                Ok(Poll::Ready(())) => {}
                Ok(Poll::NeedMore) => return Ok(Poll::NeedMore),
                Err(source) => {
                    stream.clear_max_size();
                    return Err(source);
                }
            }
        } else {
            log::debug!("packet type {identifier}/{version} unresolved, skipping body to frame tail");
        }

        let bytes_used = stream.tell() - frame_start;
        stream.clear_max_size();

        if bytes_used < packet_length {
            let remainder = (packet_length - bytes_used) as usize;
            match stream.read_bytes(remainder)? {
                Poll::Ready(_) => {}
                Poll::NeedMore => return Ok(Poll::NeedMore),
            }
            return Err(DecodeError::FrameLengthMismatch { expected: packet_length, actual: bytes_used }.into());
        }

        if !type_resolved {
            return Err(DecodeError::PacketTypeUnresolved { identifier: identifier.into(), version: version.into() }
                .into());
        }

        Ok(Poll::Ready(()))
    }
}

impl FrameEncoder {
    /// Scans forward one byte at a time from `search_start` until it finds a
    /// position where `packet_length == length_check XOR all-ones`. Returns
    /// the locked frame's start position together with its `packet_length`,
    /// and leaves the stream positioned right after the two 8-byte header
    /// fields. Logs a transition when resync begins and when it relocks,
    /// mirroring the
    /// source protocol's `logger.debug` calls.
    fn resync_to_lock(&self, stream: &mut DynStream, search_start: u64) -> Result<Poll<(u64, u64)>> {
        let mut tentative_start = search_start;
        let mut resyncing = false;
        loop {
            stream.seek(tentative_start)?;
            let len = match stream.read_u64()? {
                Poll::Ready(v) => v,
                Poll::NeedMore => return Ok(Poll::NeedMore),
            };
            let check = match stream.read_u64()? {
                Poll::Ready(v) => v,
                Poll::NeedMore => return Ok(Poll::NeedMore),
            };

            if len == (check ^ LENGTH_CHECK_MASK) {
                if resyncing {
                    log::debug!("packet deserialization recovered at stream position {tentative_start}");
                }
                return Ok(Poll::Ready((tentative_start, len)));
            }

            if !resyncing {
                log::debug!(
                    "packet length mismatch {len}!={} at stream position {tentative_start}, advancing to resync",
                    check ^ LENGTH_CHECK_MASK
                );
                resyncing = true;
            }
            tentative_start += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::field::{FieldAttrs, FieldDecl, GroupAccess, PacketAccess, Scalar};
    use crate::registry::Registry;
    use crate::stream::BufferStream;

    #[derive(Debug, Default, Clone)]
    struct U32Field(Option<u32>);
    impl PacketField for U32Field {
        fn category(&self) -> Category {
            Category::Uint
        }
        fn is_unset(&self) -> bool {
            self.0.is_none()
        }
        fn set_unset(&mut self) {
            self.0 = None;
        }
        fn as_scalar(&self) -> Option<Scalar> {
            self.0.map(|v| Scalar::Uint(v as u64))
        }
        fn set_scalar(&mut self, value: Scalar) {
            if let Scalar::Uint(v) = value {
                self.0 = Some(v as u32);
            }
        }
    }

    #[derive(Debug, Default)]
    struct EmptyGroup;
    impl PacketField for EmptyGroup {
        fn category(&self) -> Category {
            Category::Group
        }
        fn is_unset(&self) -> bool {
            false
        }
        fn set_unset(&mut self) {}
        fn as_group(&self) -> Option<&dyn GroupAccess> {
            Some(self)
        }
        fn as_group_mut(&mut self) -> Option<&mut dyn GroupAccess> {
            Some(self)
        }
    }
    impl GroupAccess for EmptyGroup {
        fn declared_fields(&self) -> &[FieldDecl] {
            &[]
        }
        fn field_ref(&self, _name: &str) -> Option<&dyn PacketField> {
            None
        }
        fn field_mut(&mut self, _name: &str) -> Option<&mut dyn PacketField> {
            None
        }
        fn initialize(&mut self) {}
    }

    #[derive(Debug)]
    struct DemoPacket {
        identifier: &'static str,
        version: &'static str,
        body: Box<dyn PacketField>,
        resolves: bool,
    }
    impl PacketField for DemoPacket {
        fn category(&self) -> Category {
            Category::Packet
        }
        fn is_unset(&self) -> bool {
            false
        }
        fn set_unset(&mut self) {}
        fn as_packet(&self) -> Option<&dyn PacketAccess> {
            Some(self)
        }
        fn as_packet_mut(&mut self) -> Option<&mut dyn PacketAccess> {
            Some(self)
        }
    }
    impl PacketAccess for DemoPacket {
        fn identity(&self) -> Option<(&str, &str)> {
            Some((self.identifier, self.version))
        }
        fn body_ref(&self) -> Option<&dyn PacketField> {
            Some(self.body.as_ref())
        }
        fn body_mut(&mut self) -> Option<&mut dyn PacketField> {
            Some(self.body.as_mut())
        }
        fn bind(&mut self, _identifier: &str, _version: &str, body: Box<dyn PacketField>) {
            self.body = body;
        }
        fn resolve_body(&self, identifier: &str, version: &str) -> Option<Box<dyn PacketField>> {
            if self.resolves && identifier == self.identifier && version == self.version {
                Some(Box::new(EmptyGroup))
            } else {
                None
            }
        }
    }

    fn codec() -> Codec {
        let mut registry = Registry::empty();
        registry.register(Category::Group, None, std::sync::Arc::new(crate::group::GroupEncoder));
        registry.register(Category::Packet, None, std::sync::Arc::new(FrameEncoder));
        Codec::new(registry, Config::default())
    }

    fn demo_packet(resolves: bool) -> DemoPacket {
        DemoPacket { identifier: "demo", version: "1.0.0", body: Box::new(EmptyGroup), resolves }
    }

    #[test]
    fn empty_demo_packet_has_frame_length_29() {
        let codec = codec();
        let packet = demo_packet(true);
        let mut stream = DynStream::boxed(BufferStream::new());
        codec.encode(&mut stream, &packet).unwrap();
        let bytes = stream.into_bytes().unwrap();
        assert_eq!(bytes.len(), 29);
        let len = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        let check = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
        assert_eq!(len, 0x0000_0000_0000_001D);
        assert_eq!(check, 0xFFFF_FFFF_FFFF_FFE2);
        assert_eq!(len ^ check, LENGTH_CHECK_MASK);
    }

    #[test]
    fn roundtrips_through_resolved_definition() {
        let codec = codec();
        let packet = demo_packet(true);
        let mut stream = DynStream::boxed(BufferStream::new());
        codec.encode(&mut stream, &packet).unwrap();
        let bytes = stream.into_bytes().unwrap();

        let mut stream = DynStream::boxed(BufferStream::with_data(bytes));
        let mut out = demo_packet(true);
        codec.decode(&mut stream, &mut out).unwrap();
        assert_eq!(out.identity(), Some(("demo", "1.0.0")));
    }

    #[test]
    fn unresolved_type_with_exact_tail_fails_unresolved() {
        let codec = codec();
        let packet = demo_packet(true);
        let mut stream = DynStream::boxed(BufferStream::new());
        codec.encode(&mut stream, &packet).unwrap();
        let bytes = stream.into_bytes().unwrap();

        let mut stream = DynStream::boxed(BufferStream::with_data(bytes));
        let mut out = demo_packet(false);
        let err = codec.decode(&mut stream, &mut out).unwrap_err();
        assert!(matches!(err, crate::Error::Decode(DecodeError::PacketTypeUnresolved { .. })));
    }

    #[test]
    fn resync_skips_leading_garbage_and_advances_past_the_packet() {
        let _ = env_logger::try_init();

        let codec = codec();
        let packet = demo_packet(true);
        let mut stream = DynStream::boxed(BufferStream::new());
        codec.encode(&mut stream, &packet).unwrap();
        let mut bytes = stream.into_bytes().unwrap();
        let packet_len = bytes.len();

        let garbage = [0xDEu8, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03];
        let mut with_garbage = garbage.to_vec();
        with_garbage.extend_from_slice(&bytes);
        bytes = with_garbage;

        let mut stream = DynStream::boxed(BufferStream::with_data(bytes));
        let mut out = demo_packet(true);
        codec.decode(&mut stream, &mut out).unwrap();
        assert_eq!(stream.tell(), (garbage.len() + packet_len) as u64);
    }

    #[test]
    fn short_body_leaves_stream_aligned_to_next_frame() {
        // A field-group encoder for a single declared, non-optional field
        // lets us build a frame whose declared length exceeds what its body
        // decoder actually consumes, by truncating the trailing count byte
        // mid-frame is awkward to construct directly; instead we shrink the
        // recorded packet_length by hand to simulate a short body read.
        let codec = codec();
        let packet = demo_packet(true);
        let mut stream = DynStream::boxed(BufferStream::new());
        codec.encode(&mut stream, &packet).unwrap();
        let mut bytes = stream.into_bytes().unwrap();

        // Inflate the declared length (and its check) by 4 bytes, then pad
        // the tail with matching filler so the stream still has that many
        // bytes to read and discard.
        let inflated = bytes.len() as u64 + 4;
        bytes[0..8].copy_from_slice(&inflated.to_be_bytes());
        bytes[8..16].copy_from_slice(&(inflated ^ LENGTH_CHECK_MASK).to_be_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0]);

        let mut stream = DynStream::boxed(BufferStream::with_data(bytes));
        let mut out = demo_packet(true);
        let err = codec.decode(&mut stream, &mut out).unwrap_err();
        assert!(matches!(err, crate::Error::Decode(DecodeError::FrameLengthMismatch { .. })));
        assert_eq!(stream.available(), 0, "stream should be aligned past the declared frame");
    }

    #[test]
    fn short_body_after_leading_garbage_is_measured_from_the_locked_frame() {
        // Regression test: `bytes_used` must be measured from the resync-
        // locked frame start, not the position the scan began at. With
        // leading garbage present, using the pre-resync start would
        // overcount `bytes_used` by the garbage length and could hide a
        // short body whenever the deficit didn't exceed that overcount.
        let _ = env_logger::try_init();

        let codec = codec();
        let packet = demo_packet(true);
        let mut stream = DynStream::boxed(BufferStream::new());
        codec.encode(&mut stream, &packet).unwrap();
        let mut bytes = stream.into_bytes().unwrap();

        let inflated = bytes.len() as u64 + 4;
        bytes[0..8].copy_from_slice(&inflated.to_be_bytes());
        bytes[8..16].copy_from_slice(&(inflated ^ LENGTH_CHECK_MASK).to_be_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0]);

        let garbage = [0xDEu8, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03];
        let mut with_garbage = garbage.to_vec();
        with_garbage.extend_from_slice(&bytes);

        let total_len = with_garbage.len();
        let mut stream = DynStream::boxed(BufferStream::with_data(with_garbage));
        let mut out = demo_packet(true);
        let err = codec.decode(&mut stream, &mut out).unwrap_err();
        assert!(matches!(err, crate::Error::Decode(DecodeError::FrameLengthMismatch { .. })));
        assert_eq!(stream.tell(), total_len as u64, "stream should be aligned past the declared frame");
    }
}
