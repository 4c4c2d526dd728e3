//! `StringField` and `BufferField`: the two variable-length leaf categories.

use rustywire::{Category, FieldAttrs, PacketField};

/// A UTF-8 string field.
#[derive(Debug, Clone, Default)]
pub struct StringField {
    value: Option<String>,
    optional: bool,
}

impl StringField {
    /// An `UNSET` string field.
    pub fn new() -> Self {
        StringField::default()
    }

    /// A field already holding `value`.
    pub fn holding(value: impl Into<String>) -> Self {
        StringField { value: Some(value.into()), optional: false }
    }

    /// The current value, if set.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Marks this field as `Optional`.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl PacketField for StringField {
    fn category(&self) -> Category {
        Category::Str
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
    fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }
    fn set_str(&mut self, value: String) {
        self.value = Some(value);
    }
}

/// A raw byte buffer field.
#[derive(Debug, Clone, Default)]
pub struct BufferField {
    value: Option<Vec<u8>>,
    optional: bool,
}

impl BufferField {
    /// An `UNSET` buffer field.
    pub fn new() -> Self {
        BufferField::default()
    }

    /// A field already holding `value`.
    pub fn holding(value: impl Into<Vec<u8>>) -> Self {
        BufferField { value: Some(value.into()), optional: false }
    }

    /// The current value, if set.
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    /// Marks this field as `Optional`.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl PacketField for BufferField {
    fn category(&self) -> Category {
        Category::Buffer
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
    fn as_buf(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }
    fn set_buf(&mut self, value: Vec<u8>) {
        self.value = Some(value);
    }
}
