//! The field-value interface the codec operates against.
//!
//! The wire format is schema-driven at runtime: a GROUP's declared fields,
//! a LIST's element type, and a PACKET's identifier all come from the
//! value being encoded/decoded, not from a compile-time type. `PacketField`
//! is the object-safe trait that makes this possible, a single trait
//! object the registry-dispatched encoders operate against, with
//! category-specific views (`ListAccess`, `GroupAccess`, `PacketAccess`)
//! reached through `as_list`/`as_group`/`as_packet`.
//!
//! Concrete field types (`UintField`, `GroupField`, ...) live in the
//! `rustywire-model` crate; this crate only defines the contract.

use smartstring::{LazyCompact, SmartString};

/// Short inline string used for field/packet names and identifiers.
pub type Name = SmartString<LazyCompact>;

/// The closed set of field categories the codec understands. This is the
/// flattened equivalent of the original's class-ancestry walk: since every
/// category here is already maximally specific, the registry's "walk from
/// specific to general" collapses to a single `(Category, Option<Category>)`
/// table lookup rather than a runtime ancestry traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Unsigned integer, width chosen from the `MaxValue` attribute.
    Uint,
    /// Signed integer, width chosen from the `MaxValue` attribute.
    Int,
    /// Single-byte boolean.
    Bool,
    /// IEEE-754 float, width chosen from the `Bits` attribute.
    Float,
    /// UTF-8 string with a 2-byte length prefix.
    Str,
    /// Raw byte buffer with an 8-byte length prefix.
    Buffer,
    /// Homogeneous sequence with a 2-byte length prefix.
    List,
    /// Named, ordered collection of heterogeneous fields with a tag
    /// bijection.
    Group,
    /// Framed, named, versioned packet wrapping a `Group`.
    Packet,
}

/// The decoded value of a scalar (UINT/INT/BOOL/FLOAT) field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Unsigned integer value.
    Uint(u64),
    /// Signed integer value.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Floating-point value, always carried as `f64`; the `bits` attribute
    /// decides the wire width at encode time.
    Float(f64),
}

/// Declaration-time attributes that shape wire encoding. These come from a
/// field's declaration (the `{MaxValue: ..., Bits: ..., ExplicitTag: ...}`
/// dict in the source protocol), not from its current value.
#[derive(Debug, Clone, Copy)]
pub struct FieldAttrs {
    /// Whether the field may be omitted (left `UNSET`) when encoding.
    pub optional: bool,
    /// An explicit tag the field claims, overriding auto-assignment.
    pub explicit_tag: Option<u16>,
    /// Declared maximum value; selects UINT/INT wire width.
    pub max_value: u64,
    /// Declared bit width; selects FLOAT wire width (32 or 64).
    pub bits: u8,
}

impl Default for FieldAttrs {
    fn default() -> Self {
        FieldAttrs {
            optional: false,
            explicit_tag: None,
            max_value: crate::DEFAULT_MAX_VALUE,
            bits: crate::DEFAULT_FLOAT_BITS,
        }
    }
}

/// One entry in a group's `FIELDS` declaration list: a name plus the
/// attributes needed to compute the name↔tag bijection.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Declared field name.
    pub name: Name,
    /// An explicit tag, if the declaration pins one.
    pub explicit_tag: Option<u16>,
}

/// The object-safe interface every encodable/decodable value implements.
///
/// Methods irrelevant to a given category return `None` (for the `as_*`
/// accessors) rather than panicking, a well-behaved registry only calls
/// the accessor matching the category it was dispatched for.
pub trait PacketField: std::fmt::Debug {
    /// This value's category, the primary key into the type-encoder
    /// registry.
    fn category(&self) -> Category;

    /// Declaration-time attributes governing wire encoding.
    fn attrs(&self) -> FieldAttrs {
        FieldAttrs::default()
    }

    /// Whether the field is currently `UNSET` (no value to encode).
    fn is_unset(&self) -> bool;

    /// Clears the field back to `UNSET`.
    fn set_unset(&mut self);

    /// The scalar value, for UINT/INT/BOOL/FLOAT categories.
    fn as_scalar(&self) -> Option<Scalar> {
        None
    }

    /// Sets the scalar value. A no-op for any field whose category does not
    /// accept scalars, only called by an encoder already dispatched on a
    /// matching category.
    fn set_scalar(&mut self, _value: Scalar) {}

    /// The string payload, for the `Str` category.
    fn as_str(&self) -> Option<&str> {
        None
    }

    /// Sets the string payload. A no-op on a category mismatch.
    fn set_str(&mut self, _value: String) {}

    /// The raw byte payload, for the `Buffer` category.
    fn as_buf(&self) -> Option<&[u8]> {
        None
    }

    /// Sets the raw byte payload. A no-op on a category mismatch.
    fn set_buf(&mut self, _value: Vec<u8>) {}

    /// Read-only list access, for the `List` category.
    fn as_list(&self) -> Option<&dyn ListAccess> {
        None
    }

    /// Mutable list access, for the `List` category.
    fn as_list_mut(&mut self) -> Option<&mut dyn ListAccess> {
        None
    }

    /// Read-only group access, for the `Group` category.
    fn as_group(&self) -> Option<&dyn GroupAccess> {
        None
    }

    /// Mutable group access, for the `Group` category.
    fn as_group_mut(&mut self) -> Option<&mut dyn GroupAccess> {
        None
    }

    /// Read-only packet access, for the `Packet` category.
    fn as_packet(&self) -> Option<&dyn PacketAccess> {
        None
    }

    /// Mutable packet access, for the `Packet` category.
    fn as_packet_mut(&mut self) -> Option<&mut dyn PacketAccess> {
        None
    }
}

/// Category-specific view over a `List`-category [`PacketField`].
pub trait ListAccess {
    /// Declared category of every element.
    fn element_category(&self) -> Category;
    /// Number of elements currently present.
    fn len(&self) -> usize;
    /// Whether the list is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Borrows element `index`.
    fn get(&self, index: usize) -> &dyn PacketField;
    /// Mutably borrows element `index`.
    fn get_mut(&mut self, index: usize) -> &mut dyn PacketField;
    /// Empties the list.
    fn clear(&mut self);
    /// Appends one `UNSET` element of the declared element category, ready
    /// to be decoded into.
    fn push_unset(&mut self);
}

/// Category-specific view over a `Group`-category [`PacketField`].
pub trait GroupAccess {
    /// The group's declared fields, in declaration order.
    fn declared_fields(&self) -> &[FieldDecl];
    /// Borrows the named field, or `None` if `name` is not one of
    /// [`Self::declared_fields`].
    fn field_ref(&self, name: &str) -> Option<&dyn PacketField>;
    /// Mutably borrows the named field, or `None` if `name` is not one of
    /// [`Self::declared_fields`].
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn PacketField>;
    /// Resets every declared field back to `UNSET`, as is done before
    /// decoding a fresh group value into this storage.
    fn initialize(&mut self);
}

/// Category-specific view over a `Packet`-category [`PacketField`].
pub trait PacketAccess {
    /// The packet's declared `(identifier, version)`, once bound to a
    /// concrete body.
    fn identity(&self) -> Option<(&str, &str)>;
    /// Read-only access to the bound body, if any.
    fn body_ref(&self) -> Option<&dyn PacketField>;
    /// Mutable access to the bound body, if any.
    fn body_mut(&mut self) -> Option<&mut dyn PacketField>;
    /// Binds a concrete, freshly-constructed body value (looked up from a
    /// definition registry by `(identifier, version)`) before decoding into
    /// it.
    fn bind(&mut self, identifier: &str, version: &str, body: Box<dyn PacketField>);

    /// The `DEFINITIONS_STORE` hook: asks this packet's `base_packet_type`
    /// whether `(identifier, version)` resolves to a known GROUP schema,
    /// and if so constructs a fresh, `UNSET` instance of it. Returns `None`
    /// for an unresolved pair, not an error; the frame decoder's resync
    /// state machine handles that by skipping the body and continuing to
    /// the next frame. The default implementation never resolves anything,
    /// matching a packet type with no bound definition registry.
    fn resolve_body(&self, identifier: &str, version: &str) -> Option<Box<dyn PacketField>> {
        let _ = (identifier, version);
        None
    }
}
