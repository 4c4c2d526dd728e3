//! Leaf scalar field values: `UintField`, `IntField`, `BoolField`, `FloatField`.
//!
//! Each is a thin `Option<T>` plus the `FieldAttrs` that govern its wire
//! width, `MaxValue` for the integer fields, `Bits` for the float. Building
//! one with non-default attributes is done with the `with_*` constructors
//! rather than a builder, since there's only ever one attribute that
//! matters per type.

use rustywire::{Category, FieldAttrs, PacketField, Scalar};

/// An unsigned integer field. Wire width is chosen by [`FieldAttrs::max_value`]
/// at encode/decode time, not by this type.
#[derive(Debug, Clone, Default)]
pub struct UintField {
    value: Option<u64>,
    attrs: FieldAttrs,
}

impl UintField {
    /// An `UNSET` field using the default `MaxValue` (`2^32 - 1`).
    pub fn new() -> Self {
        UintField::default()
    }

    /// An `UNSET` field with an explicit `MaxValue`, selecting a narrower or
    /// wider wire width.
    pub fn with_max_value(max_value: u64) -> Self {
        UintField { value: None, attrs: FieldAttrs { max_value, ..FieldAttrs::default() } }
    }

    /// A field already holding `value`, using the default `MaxValue`.
    pub fn holding(value: u64) -> Self {
        UintField { value: Some(value), attrs: FieldAttrs::default() }
    }

    /// The current value, if set.
    pub fn value(&self) -> Option<u64> {
        self.value
    }

    /// Marks this field as `Optional`, so it may encode as absent when `UNSET`.
    pub fn optional(mut self) -> Self {
        self.attrs.optional = true;
        self
    }
}

impl PacketField for UintField {
    fn category(&self) -> Category {
        Category::Uint
    }
    fn attrs(&self) -> FieldAttrs {
        self.attrs
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

/// A signed integer field. Shares the same width-from-`MaxValue` rule as
/// [`UintField`].
#[derive(Debug, Clone, Default)]
pub struct IntField {
    value: Option<i64>,
    attrs: FieldAttrs,
}

impl IntField {
    /// An `UNSET` field using the default `MaxValue`.
    pub fn new() -> Self {
        IntField::default()
    }

    /// An `UNSET` field with an explicit `MaxValue`.
    pub fn with_max_value(max_value: u64) -> Self {
        IntField { value: None, attrs: FieldAttrs { max_value, ..FieldAttrs::default() } }
    }

    /// A field already holding `value`.
    pub fn holding(value: i64) -> Self {
        IntField { value: Some(value), attrs: FieldAttrs::default() }
    }

    /// The current value, if set.
    pub fn value(&self) -> Option<i64> {
        self.value
    }

    /// Marks this field as `Optional`.
    pub fn optional(mut self) -> Self {
        self.attrs.optional = true;
        self
    }
}

impl PacketField for IntField {
    fn category(&self) -> Category {
        Category::Int
    }
    fn attrs(&self) -> FieldAttrs {
        self.attrs
    }
    fn is_unset(&self) -> bool {
        self.value.is_none()
    }
    fn set_unset(&mut self) {
        self.value = None;
    }
    fn as_scalar(&self) -> Option<Scalar> {
        self.value.map(Scalar::Int)
    }
    fn set_scalar(&mut self, value: Scalar) {
        if let Scalar::Int(v) = value {
            self.value = Some(v);
        }
    }
}

/// A single-byte boolean field.
#[derive(Debug, Clone, Default)]
pub struct BoolField {
    value: Option<bool>,
    optional: bool,
}

impl BoolField {
    /// An `UNSET` boolean field.
    pub fn new() -> Self {
        BoolField::default()
    }

    /// A field already holding `value`.
    pub fn holding(value: bool) -> Self {
        BoolField { value: Some(value), optional: false }
    }

    /// The current value, if set.
    pub fn value(&self) -> Option<bool> {
        self.value
    }

    /// Marks this field as `Optional`.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl PacketField for BoolField {
    fn category(&self) -> Category {
        Category::Bool
    }
    fn attrs(&self) -> FieldAttrs {
        FieldAttrs { optional: self.optional, ..FieldAttrs::default() }
    }
    fn is_unset(&self) -> bool {
        self.value.is_none()
    }
    fn set_unset(&mut self) {
        self.value = None;
    }
    fn as_scalar(&self) -> Option<Scalar> {
        self.value.map(Scalar::Bool)
    }
    fn set_scalar(&mut self, value: Scalar) {
        if let Scalar::Bool(v) = value {
            self.value = Some(v);
        }
    }
}

/// An IEEE-754 float field, carried internally as `f64` regardless of wire
/// width; [`FieldAttrs::bits`] picks 32 or 64 bits at encode/decode time.
#[derive(Debug, Clone, Default)]
pub struct FloatField {
    value: Option<f64>,
    attrs: FieldAttrs,
}

impl FloatField {
    /// An `UNSET` field using the default 32-bit width.
    pub fn new() -> Self {
        FloatField::default()
    }

    /// An `UNSET` field with an explicit bit width (32 or 64).
    pub fn with_bits(bits: u8) -> Self {
        FloatField { value: None, attrs: FieldAttrs { bits, ..FieldAttrs::default() } }
    }

    /// A field already holding `value` at the default 32-bit width.
    pub fn holding(value: f64) -> Self {
        FloatField { value: Some(value), attrs: FieldAttrs::default() }
    }

    /// The current value, if set.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Marks this field as `Optional`.
    pub fn optional(mut self) -> Self {
        self.attrs.optional = true;
        self
    }
}

impl PacketField for FloatField {
    fn category(&self) -> Category {
        Category::Float
    }
    fn attrs(&self) -> FieldAttrs {
        self.attrs
    }
    fn is_unset(&self) -> bool {
        self.value.is_none()
    }
    fn set_unset(&mut self) {
        self.value = None;
    }
    fn as_scalar(&self) -> Option<Scalar> {
        self.value.map(Scalar::Float)
    }
    fn set_scalar(&mut self, value: Scalar) {
        if let Scalar::Float(v) = value {
            self.value = Some(v);
        }
    }
}
