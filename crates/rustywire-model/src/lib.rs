//! Concrete field-value model and definition registry for `rustywire`.
//!
//! `rustywire` defines the wire format and the `PacketField` trait family it
//! dispatches against, but deliberately owns none of the object model a real
//! caller would use to build messages. This crate supplies that model:
//! scalar/string/buffer leaf fields, a schema-driven `GroupField`, a
//! homogeneous `ListField`, and `PacketValue` paired with a
//! `DefinitionRegistry`, the same way `rustyasn` supplies concrete ASN.1
//! field types against traits that, in the wider workspace, are otherwise
//! defined by the core `rustyfix` crate.
//!
//! None of this is required to use `rustywire`: any type implementing
//! [`rustywire::PacketField`] (and the relevant `*Access` trait) works with
//! the codec. This crate exists so the round-trip examples and tests in
//! `rustywire` have something concrete to encode and decode.
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod group;
pub mod list;
pub mod packet;
pub mod scalar;
pub mod strings;

pub use group::{FieldSpec, GroupField, GroupSchema};
pub use list::ListField;
pub use packet::{DefinitionRegistry, PacketValue, Version, VersionParseError};
pub use scalar::{BoolField, FloatField, IntField, UintField};
pub use strings::{BufferField, StringField};
