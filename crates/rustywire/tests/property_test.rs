//! Property-based round-trip and width-determinism checks for the wire
//! format, driven by `quickcheck` rather than hand-picked examples.

use quickcheck_macros::quickcheck;
use rustywire::{
    BufferStream, Category, Codec, Config, DynStream, FieldAttrs, PacketField, Scalar,
};

#[derive(Debug, Default, Clone)]
struct UintField {
    value: Option<u64>,
    max_value: u64,
}

impl PacketField for UintField {
    fn category(&self) -> Category {
        Category::Uint
    }
    fn attrs(&self) -> FieldAttrs {
        FieldAttrs { max_value: self.max_value, ..FieldAttrs::default() }
    }
    fn is_unset(&self) -> bool {
        self.value.is_none()
    }
    fn set_unset(&mut self) {
        self.value = None;
    }
    fn as_scalar(&self) -> Option<Scalar> {
        self.value.map(Scalar::Uint)
    }
    fn set_scalar(&mut self, value: Scalar) {
        if let Scalar::Uint(v) = value {
            self.value = Some(v);
        }
    }
}

#[derive(Debug, Default, Clone)]
struct IntField(Option<i64>);

impl PacketField for IntField {
    fn category(&self) -> Category {
        Category::Int
    }
    fn is_unset(&self) -> bool {
        self.0.is_none()
    }
    fn set_unset(&mut self) {
        self.0 = None;
    }
    fn as_scalar(&self) -> Option<Scalar> {
        self.0.map(Scalar::Int)
    }
    fn set_scalar(&mut self, value: Scalar) {
        if let Scalar::Int(v) = value {
            self.0 = Some(v);
        }
    }
}

#[derive(Debug, Default, Clone)]
struct BoolField(Option<bool>);

impl PacketField for BoolField {
    fn category(&self) -> Category {
        Category::Bool
    }
    fn is_unset(&self) -> bool {
        self.0.is_none()
    }
    fn set_unset(&mut self) {
        self.0 = None;
    }
    fn as_scalar(&self) -> Option<Scalar> {
        self.0.map(Scalar::Bool)
    }
    fn set_scalar(&mut self, value: Scalar) {
        if let Scalar::Bool(v) = value {
            self.0 = Some(v);
        }
    }
}

#[derive(Debug, Default, Clone)]
struct StrField(Option<String>);

impl PacketField for StrField {
    fn category(&self) -> Category {
        Category::Str
    }
    fn is_unset(&self) -> bool {
        self.0.is_none()
    }
    fn set_unset(&mut self) {
        self.0 = None;
    }
    fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
    fn set_str(&mut self, value: String) {
        self.0 = Some(value);
    }
}

#[derive(Debug, Default, Clone)]
struct BufField(Option<Vec<u8>>);

impl PacketField for BufField {
    fn category(&self) -> Category {
        Category::Buffer
    }
    fn is_unset(&self) -> bool {
        self.0.is_none()
    }
    fn set_unset(&mut self) {
        self.0 = None;
    }
    fn as_buf(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }
    fn set_buf(&mut self, value: Vec<u8>) {
        self.0 = Some(value);
    }
}

fn codec() -> Codec {
    Codec::new(rustywire::standard_registry(), Config::default())
}

/// Picks one of the four declared UINT/INT widths from an arbitrary byte.
fn width_from_byte(b: u8) -> (u64, u32) {
    match b % 4 {
        0 => (u8::MAX as u64, 1),
        1 => (u16::MAX as u64, 2),
        2 => (u32::MAX as u64, 4),
        _ => (u64::MAX - 1, 8),
    }
}

#[quickcheck]
fn uint_roundtrips_for_every_width(raw_value: u64, width_choice: u8) -> bool {
    let (max_value, width) = width_from_byte(width_choice);
    let value = raw_value % (max_value.saturating_add(1)).max(1);
    let codec = codec();
    let field = UintField { value: Some(value), max_value };
    let mut stream = DynStream::boxed(BufferStream::new());
    codec.encode(&mut stream, &field).unwrap();
    let bytes = stream.into_bytes().unwrap();
    if bytes.len() != width as usize {
        return false;
    }
    let mut stream = DynStream::boxed(BufferStream::with_data(bytes));
    let mut out = UintField { value: None, max_value };
    codec.decode(&mut stream, &mut out).unwrap();
    out.value == Some(value)
}

#[quickcheck]
fn int_roundtrips(value: i32) -> bool {
    let codec = codec();
    let field = IntField(Some(value as i64));
    let mut stream = DynStream::boxed(BufferStream::new());
    codec.encode(&mut stream, &field).unwrap();
    assert_eq!(stream.get_ref().as_slice().len(), 4, "default MaxValue selects 32 bits");
    let bytes = stream.into_bytes().unwrap();
    let mut stream = DynStream::boxed(BufferStream::with_data(bytes));
    let mut out = IntField::default();
    codec.decode(&mut stream, &mut out).unwrap();
    out.0 == Some(value as i64)
}

#[quickcheck]
fn bool_roundtrips(value: bool) -> bool {
    let codec = codec();
    let field = BoolField(Some(value));
    let mut stream = DynStream::boxed(BufferStream::new());
    codec.encode(&mut stream, &field).unwrap();
    assert_eq!(stream.get_ref().as_slice().len(), 1);
    let bytes = stream.into_bytes().unwrap();
    let mut stream = DynStream::boxed(BufferStream::with_data(bytes));
    let mut out = BoolField::default();
    codec.decode(&mut stream, &mut out).unwrap();
    out.0 == Some(value)
}

#[quickcheck]
fn string_roundtrips_for_any_short_utf8(text: String) -> bool {
    if text.len() as u64 >= rustywire::MAX_STRING_LEN {
        return true;
    }
    let codec = codec();
    let field = StrField(Some(text.clone()));
    let mut stream = DynStream::boxed(BufferStream::new());
    codec.encode(&mut stream, &field).unwrap();
    let bytes = stream.into_bytes().unwrap();
    let mut stream = DynStream::boxed(BufferStream::with_data(bytes));
    let mut out = StrField::default();
    codec.decode(&mut stream, &mut out).unwrap();
    out.0 == Some(text)
}

#[quickcheck]
fn buffer_roundtrips_for_any_bytes(data: Vec<u8>) -> bool {
    let codec = codec();
    let field = BufField(Some(data.clone()));
    let mut stream = DynStream::boxed(BufferStream::new());
    codec.encode(&mut stream, &field).unwrap();
    let bytes = stream.into_bytes().unwrap();
    let mut stream = DynStream::boxed(BufferStream::with_data(bytes));
    let mut out = BufField::default();
    codec.decode(&mut stream, &mut out).unwrap();
    out.0 == Some(data)
}

#[quickcheck]
fn resumability_matches_one_shot_decode_for_any_uint(raw_value: u64) -> bool {
    let value = raw_value % (u32::MAX as u64 + 1);
    let codec = codec();
    let field = UintField { value: Some(value), max_value: rustywire::DEFAULT_MAX_VALUE };
    let mut encode_stream = DynStream::boxed(BufferStream::new());
    codec.encode(&mut encode_stream, &field).unwrap();
    let full_bytes = encode_stream.into_bytes().unwrap();

    for prefix_len in 0..full_bytes.len() {
        let mut stream = DynStream::boxed(BufferStream::with_data(full_bytes[..prefix_len].to_vec()));
        let mut out = UintField { value: None, max_value: rustywire::DEFAULT_MAX_VALUE };
        let poll = codec.decode_iter(&mut stream, &mut out).unwrap();
        if poll.is_ready() {
            return false;
        }
        stream.get_mut().feed(&full_bytes[prefix_len..]);
        codec.decode(&mut stream, &mut out).unwrap();
        if out.value != Some(value) {
            return false;
        }
    }
    true
}
