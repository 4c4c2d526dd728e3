//! `GroupField`: a schema-driven, ordered collection of named fields.
//!
//! A [`GroupSchema`] is the wire format's `FIELDS` declaration, an ordered
//! list of `(name, explicit_tag, element factory)`
//! triples shared by every instance of that group shape. `GroupField` itself
//! is just that schema plus one freshly-constructed value per declared
//! field; `initialize` (called by the codec before decoding into a group)
//! rebuilds the value list from the schema, discarding whatever was there.

use std::sync::Arc;

use rustywire::{Category, FieldDecl, GroupAccess, Name, PacketField};

/// Builds a fresh, `UNSET` value for one declared group member.
pub type FieldFactory = fn() -> Box<dyn PacketField>;

/// One entry in a group's `FIELDS` declaration.
pub struct FieldSpec {
    /// Declared field name.
    pub name: Name,
    /// An explicit tag this field claims, if any.
    pub explicit_tag: Option<u16>,
    /// Constructs a fresh, `UNSET` value for this field.
    pub make: FieldFactory,
}

impl FieldSpec {
    /// A declaration for `name`, auto-assigned a tag, built by `make`.
    pub fn new(name: impl Into<Name>, make: FieldFactory) -> Self {
        FieldSpec { name: name.into(), explicit_tag: None, make }
    }

    /// A declaration for `name` that claims `tag` explicitly.
    pub fn with_tag(name: impl Into<Name>, tag: u16, make: FieldFactory) -> Self {
        FieldSpec { name: name.into(), explicit_tag: Some(tag), make }
    }
}

/// The shared shape of a group: its declared fields, in declaration order.
/// Multiple [`GroupField`] instances can be built from one `Arc<GroupSchema>`
/// without re-declaring the field list each time, the same way a
/// definition registry hands out one schema per `(name, version)` to every
/// packet that resolves to it.
pub struct GroupSchema {
    fields: Vec<FieldSpec>,
}

impl GroupSchema {
    /// A schema declaring `fields`, in the given order.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        GroupSchema { fields }
    }
}

/// A group value built from a [`GroupSchema`].
pub struct GroupField {
    schema: Arc<GroupSchema>,
    decls: Vec<FieldDecl>,
    values: Vec<Box<dyn PacketField>>,
}

impl GroupField {
    /// A freshly-initialized group, every declared field `UNSET`.
    pub fn new(schema: Arc<GroupSchema>) -> Self {
        let decls = schema
            .fields
            .iter()
            .map(|f| FieldDecl { name: f.name.clone(), explicit_tag: f.explicit_tag })
            .collect();
        let values = schema.fields.iter().map(|f| (f.make)()).collect();
        GroupField { schema, decls, values }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.decls.iter().position(|d| d.name.as_str() == name)
    }
}

impl std::fmt::Debug for GroupField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupField").field("fields", &self.decls.len()).finish()
    }
}

impl PacketField for GroupField {
    fn category(&self) -> Category {
        Category::Group
    }
    fn is_unset(&self) -> bool {
        false
    }
    fn set_unset(&mut self) {
        self.initialize();
    }
    fn as_group(&self) -> Option<&dyn GroupAccess> {
        Some(self)
    }
    fn as_group_mut(&mut self) -> Option<&mut dyn GroupAccess> {
        Some(self)
    }
}

impl GroupAccess for GroupField {
    fn declared_fields(&self) -> &[FieldDecl] {
        &self.decls
    }

    fn field_ref(&self, name: &str) -> Option<&dyn PacketField> {
        let index = self.index_of(name)?;
        Some(self.values[index].as_ref())
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn PacketField> {
        let index = self.index_of(name)?;
        Some(self.values[index].as_mut())
    }

    fn initialize(&mut self) {
        self.values = self.schema.fields.iter().map(|f| (f.make)()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UintField;

    fn some_fields_schema() -> Arc<GroupSchema> {
        Arc::new(GroupSchema::new(vec![
            FieldSpec::new("field1", || Box::new(UintField::default())),
            FieldSpec::new("field2", || Box::new(UintField::default())),
        ]))
    }

    #[test]
    fn new_initializes_every_declared_field_unset() {
        let group = GroupField::new(some_fields_schema());
        assert!(group.field_ref("field1").unwrap().is_unset());
        assert!(group.field_ref("field2").unwrap().is_unset());
    }

    #[test]
    fn field_mut_lets_a_caller_populate_a_value() {
        let mut group = GroupField::new(some_fields_schema());
        group.field_mut("field1").unwrap().set_scalar(rustywire::Scalar::Uint(50));
        assert_eq!(group.field_ref("field1").unwrap().as_scalar(), Some(rustywire::Scalar::Uint(50)));
    }

    #[test]
    fn initialize_discards_previously_set_values() {
        let mut group = GroupField::new(some_fields_schema());
        group.field_mut("field1").unwrap().set_scalar(rustywire::Scalar::Uint(50));
        group.initialize();
        assert!(group.field_ref("field1").unwrap().is_unset());
    }

    #[test]
    fn field_ref_returns_none_on_unknown_name() {
        let group = GroupField::new(some_fields_schema());
        assert!(group.field_ref("nope").is_none());
    }
}
