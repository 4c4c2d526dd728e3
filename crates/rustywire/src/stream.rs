//! The byte-stream collaborator and the adapter the codec reads/writes
//! through.
//!
//! [`ByteStream`] is the minimal seekable-buffer contract the codec needs;
//! [`BufferStream`] is an in-memory stand-in good enough to drive every
//! encoder/decoder and test against. [`StreamAdapter`] layers typed
//! pack/unpack operations and a size cap on top, mirroring the original's
//! `EncoderStreamAdapter`.

use crate::error::{EncodeError, Error, Result};

/// The result of one resumable decode step: either the value is ready, or
/// the stream didn't have enough bytes yet and nothing was consumed.
///
/// This is a suspension signal, not an error, see the crate-level docs for
/// why resumable decode is modeled this way instead of with coroutines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<T> {
    /// Decoding finished; here is the value.
    Ready(T),
    /// Not enough bytes were available; nothing was consumed. Retry once
    /// more bytes have been fed to the stream.
    NeedMore,
}

impl<T> Poll<T> {
    /// Maps the ready value, leaving `NeedMore` untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Poll<U> {
        match self {
            Poll::Ready(v) => Poll::Ready(f(v)),
            Poll::NeedMore => Poll::NeedMore,
        }
    }

    /// Returns `true` if this is `Ready`.
    pub fn is_ready(&self) -> bool {
        matches!(self, Poll::Ready(_))
    }
}

/// The minimal seekable byte-stream contract the codec depends on.
///
/// A real transport implementation (a socket wrapped to block until more
/// bytes arrive, say) is expected to implement this directly; it is
/// deliberately narrow so that doing so is easy.
pub trait ByteStream: std::fmt::Debug {
    /// Number of bytes immediately readable without blocking.
    fn available(&self) -> usize;
    /// Current read/write position.
    fn tell(&self) -> u64;
    /// Repositions to an absolute offset. Errors if out of range.
    fn seek(&mut self, pos: u64) -> Result<()>;
    /// Reads exactly `buf.len()` bytes. Callers must first check
    /// `available()`, this is a hard error if too few bytes are present,
    /// not a `NeedMore` signal.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;
    /// Writes `buf` at the current position, overwriting in place if the
    /// position is before the current end, extending otherwise.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Appends more bytes to the tail without disturbing the read position,
    /// simulating more data arriving on the wire. Only meaningful for an
    /// in-memory stand-in like [`BufferStream`] driving a resumability
    /// test; a real transport has no such operation since bytes just
    /// arrive on their own.
    fn feed(&mut self, bytes: &[u8]);
}

/// An in-memory, growable byte buffer implementing [`ByteStream`].
///
/// Bytes already consumed (before the current read position) are retained
/// rather than dropped, so `seek` can rewind into them, this is what lets
/// [`crate::Codec::decode_iter`] restart a suspended decode from its
/// recorded start position.
#[derive(Debug, Default, Clone)]
pub struct BufferStream {
    data: Vec<u8>,
    pos: usize,
}

impl BufferStream {
    /// An empty stream, ready to have bytes written or fed into it.
    pub fn new() -> Self {
        BufferStream::default()
    }

    /// A stream pre-loaded with `data`, positioned at the start.
    pub fn with_data(data: Vec<u8>) -> Self {
        BufferStream { data, pos: 0 }
    }

    /// Appends more bytes to the tail, simulating more data arriving on the
    /// wire. Does not move the read position.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Consumes the stream, returning its full backing buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// The full backing buffer, including already-consumed bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl ByteStream for BufferStream {
    fn available(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn tell(&self) -> u64 {
        self.pos as u64
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        let pos = pos as usize;
        if pos > self.data.len() {
            return Err(Error::stream_io("seek past end of buffer"));
        }
        self.pos = pos;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = buf.len();
        if self.data.len() - self.pos < n {
            return Err(Error::stream_io("short read"));
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let end = self.pos + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        Ok(())
    }

    fn feed(&mut self, bytes: &[u8]) {
        BufferStream::feed(self, bytes);
    }
}

/// An in-memory [`ByteStream`] backed by [`bytes::BytesMut`], for callers
/// already working in the `bytes`/`tokio-util` ecosystem (e.g. assembling a
/// frame out of a socket-fed `BytesMut` before handing it to the codec).
/// Functionally identical to [`BufferStream`], retained bytes before the
/// read position, growable tail, but avoids a `Vec<u8>` copy when the
/// caller's transport already hands over a `BytesMut`.
#[derive(Debug, Default, Clone)]
pub struct BytesStream {
    data: bytes::BytesMut,
    pos: usize,
}

impl BytesStream {
    /// An empty stream, ready to have bytes written or fed into it.
    pub fn new() -> Self {
        BytesStream::default()
    }

    /// A stream pre-loaded with `data`, positioned at the start.
    pub fn with_data(data: bytes::BytesMut) -> Self {
        BytesStream { data, pos: 0 }
    }

    /// Appends more bytes to the tail, simulating more data arriving on the
    /// wire. Does not move the read position.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Consumes the stream, returning its full backing buffer.
    pub fn into_inner(self) -> bytes::BytesMut {
        self.data
    }
}

impl ByteStream for BytesStream {
    fn available(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn tell(&self) -> u64 {
        self.pos as u64
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        let pos = pos as usize;
        if pos > self.data.len() {
            return Err(Error::stream_io("seek past end of buffer"));
        }
        self.pos = pos;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = buf.len();
        if self.data.len() - self.pos < n {
            return Err(Error::stream_io("short read"));
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let end = self.pos + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        Ok(())
    }

    fn feed(&mut self, bytes: &[u8]) {
        BytesStream::feed(self, bytes);
    }
}

macro_rules! fixed_width_io {
    ($read_name:ident, $write_name:ident, $ty:ty, $size:expr) => {
        /// Reads a big-endian
        #[doc = concat!(stringify!($ty))]
        /// , or `NeedMore` if fewer than
        #[doc = concat!(stringify!($size))]
        /// bytes are available.
        pub fn $read_name(&mut self) -> Result<Poll<$ty>> {
            self.check_size($size)?;
            if self.stream.available() < $size {
                return Ok(Poll::NeedMore);
            }
            let mut buf = [0u8; $size];
            self.stream.read_exact(&mut buf)?;
            Ok(Poll::Ready(<$ty>::from_be_bytes(buf)))
        }

        /// Writes a big-endian
        #[doc = concat!(stringify!($ty))]
        /// .
        pub fn $write_name(&mut self, value: $ty) -> Result<()> {
            self.stream.write_all(&value.to_be_bytes())
        }
    };
}

impl ByteStream for Box<dyn ByteStream> {
    fn available(&self) -> usize {
        (**self).available()
    }
    fn tell(&self) -> u64 {
        (**self).tell()
    }
    fn seek(&mut self, pos: u64) -> Result<()> {
        (**self).seek(pos)
    }
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_exact(buf)
    }
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write_all(buf)
    }
    fn feed(&mut self, bytes: &[u8]) {
        (**self).feed(bytes)
    }
}

/// A [`StreamAdapter`] over a boxed, type-erased [`ByteStream`], the
/// concrete type every [`crate::registry::FieldEncoder`] and [`Codec`]
/// method operates against, so that encoders don't need to be generic over
/// the stream implementation.
///
/// [`Codec`]: crate::Codec
pub type DynStream = StreamAdapter<Box<dyn ByteStream>>;

/// Wraps a [`ByteStream`] with typed pack/unpack operations and an optional
/// per-read size cap, mirroring `EncoderStreamAdapter` in the source
/// protocol this format was distilled from.
#[derive(Debug)]
pub struct StreamAdapter<S: ByteStream> {
    stream: S,
    max_size: Option<usize>,
}

impl<S: ByteStream> StreamAdapter<S> {
    /// Wraps `stream` with no size cap.
    pub fn new(stream: S) -> Self {
        StreamAdapter { stream, max_size: None }
    }

    /// Caps every subsequent read/write request at `max_size` bytes. A
    /// request larger than this, checked against the *requested* size, not
    /// against what's currently available, fails immediately rather than
    /// waiting.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = Some(max_size);
    }

    /// Removes the size cap.
    pub fn clear_max_size(&mut self) {
        self.max_size = None;
    }

    /// Bytes immediately readable without blocking.
    pub fn available(&self) -> usize {
        self.stream.available()
    }

    /// Current position in the underlying stream.
    pub fn tell(&self) -> u64 {
        self.stream.tell()
    }

    /// Repositions the underlying stream.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.stream.seek(pos)
    }

    /// Unwraps the adapter, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Mutable access to the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Read-only access to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Collects every byte currently held by the stream, from the start,
    /// through the [`ByteStream`] trait alone, so it works even once the
    /// concrete stream type has been erased, as in [`DynStream`], where
    /// there is no way to downcast back to e.g. [`BufferStream`] and call
    /// its own `into_inner`.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        self.stream.seek(0)?;
        let n = self.stream.available();
        let mut buf = vec![0u8; n];
        self.stream.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Copies every byte the stream currently holds, from the start,
    /// without disturbing the current read position. Unlike [`into_bytes`],
    /// this borrows rather than consumes the adapter, so a test can inspect
    /// what's been written so far and keep using the stream afterward; it
    /// works the same way through a type-erased [`DynStream`] since it only
    /// relies on the [`ByteStream`] trait.
    ///
    /// [`into_bytes`]: StreamAdapter::into_bytes
    pub fn peek_bytes(&mut self) -> Result<Vec<u8>> {
        let saved = self.stream.tell();
        self.stream.seek(0)?;
        let n = self.stream.available();
        let mut buf = vec![0u8; n];
        self.stream.read_exact(&mut buf)?;
        self.stream.seek(saved)?;
        Ok(buf)
    }

    fn check_size(&self, n: usize) -> Result<()> {
        if let Some(max) = self.max_size {
            if n > max {
                return Err(EncodeError::SizeExceedsLimit { requested: n, limit: max }.into());
            }
        }
        Ok(())
    }

    fixed_width_io!(read_u8, write_u8, u8, 1);
    fixed_width_io!(read_u16, write_u16, u16, 2);
    fixed_width_io!(read_u32, write_u32, u32, 4);
    fixed_width_io!(read_u64, write_u64, u64, 8);
    fixed_width_io!(read_i8, write_i8, i8, 1);
    fixed_width_io!(read_i16, write_i16, i16, 2);
    fixed_width_io!(read_i32, write_i32, i32, 4);
    fixed_width_io!(read_i64, write_i64, i64, 8);
    fixed_width_io!(read_f32, write_f32, f32, 4);
    fixed_width_io!(read_f64, write_f64, f64, 8);

    /// Reads `n` raw bytes, or `NeedMore` if fewer are available. The size
    /// cap is checked against `n` itself before waiting on availability,
    /// a request that could never be satisfied fails immediately instead of
    /// spinning.
    pub fn read_bytes(&mut self, n: usize) -> Result<Poll<Vec<u8>>> {
        self.check_size(n)?;
        if self.stream.available() < n {
            return Ok(Poll::NeedMore);
        }
        let mut buf = vec![0u8; n];
        self.stream.read_exact(&mut buf)?;
        Ok(Poll::Ready(buf))
    }

    /// Reads a single boolean byte (`0x00` or any nonzero as `true`).
    pub fn read_bool(&mut self) -> Result<Poll<bool>> {
        Ok(self.read_u8()?.map(|b| b != 0))
    }

    /// Writes a single boolean byte.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// Writes raw bytes verbatim.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data)
    }
}

impl DynStream {
    /// Boxes `stream` and wraps it, erasing its concrete type. This is the
    /// usual way to build the stream a [`Codec`](crate::Codec) is driven
    /// with.
    pub fn boxed(stream: impl ByteStream + 'static) -> Self {
        StreamAdapter::new(Box::new(stream) as Box<dyn ByteStream>)
    }
}
