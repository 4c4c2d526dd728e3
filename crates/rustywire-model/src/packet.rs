//! `PacketValue` (the `Packet`-category field) and the `DefinitionRegistry`
//! collaborator it consults to resolve a decoded `(identifier, version)`
//! pair to a concrete [`GroupSchema`].

use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use rustywire::{Category, Name, PacketAccess, PacketField};
use thiserror::Error;

use crate::group::{GroupField, GroupSchema};

/// A parsed `major.minor.patch` version triple, a frame's
/// `definition_version` string must be parseable as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version component.
    pub major: u32,
    /// Minor version component.
    pub minor: u32,
    /// Patch version component.
    pub patch: u32,
}

impl Version {
    /// Builds a version directly from its components.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version { major, minor, patch }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Failure parsing a `"major.minor.patch"` string into a [`Version`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a parseable major.minor.patch version")]
pub struct VersionParseError(String);

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');
        let (Some(major), Some(minor), Some(patch), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(VersionParseError(s.to_owned()));
        };
        let parse = |p: &str| p.parse::<u32>().map_err(|_| VersionParseError(s.to_owned()));
        Ok(Version { major: parse(major)?, minor: parse(minor)?, patch: parse(patch)? })
    }
}

/// Maps `(identifier, version)` to a [`GroupSchema`], the collaborator the
/// frame decoder's resync state machine consults via
/// [`PacketAccess::resolve_body`] once it has locked onto a frame and read
/// its header.
///
/// Read-mostly after startup registration, so lookups take a read lock,
/// the same shape as `rustywire`'s own process-wide type-encoder registry.
#[derive(Default)]
pub struct DefinitionRegistry {
    schemas: RwLock<FxHashMap<(String, Version), Arc<GroupSchema>>>,
}

impl DefinitionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        DefinitionRegistry::default()
    }

    /// Registers `schema` under `(identifier, version)`, replacing whatever
    /// was registered there before.
    pub fn register(&self, identifier: impl Into<String>, version: Version, schema: Arc<GroupSchema>) {
        self.schemas.write().insert((identifier.into(), version), schema);
    }

    /// Looks up the schema for `(identifier, version)`. `version` must parse
    /// as a `major.minor.patch` triple; an unparseable version is simply
    /// treated as unresolved, same as a genuinely unknown pair, the frame
    /// decoder doesn't distinguish the two.
    pub fn get_definition(&self, identifier: &str, version: &str) -> Option<Arc<GroupSchema>> {
        let version: Version = version.parse().ok()?;
        self.schemas.read().get(&(identifier.to_owned(), version)).cloned()
    }
}

impl std::fmt::Debug for DefinitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionRegistry").field("registered", &self.schemas.read().len()).finish()
    }
}

/// The `Packet`-category field: a framed, named, versioned wrapper around a
/// `Group` body, bound to a [`DefinitionRegistry`] for decode-time
/// resolution (the `DEFINITIONS_STORE` hook).
#[derive(Debug)]
pub struct PacketValue {
    identifier: Name,
    version: Name,
    body: Option<Box<dyn PacketField>>,
    definitions: Arc<DefinitionRegistry>,
}

impl PacketValue {
    /// An encode-ready packet: `identifier`/`version` plus an already
    /// populated `body`. `definitions` is unused on the encode path but
    /// required up front so the same value can be fed to `decode` too.
    pub fn new(
        identifier: impl Into<Name>,
        version: impl Into<Name>,
        body: Box<dyn PacketField>,
        definitions: Arc<DefinitionRegistry>,
    ) -> Self {
        PacketValue { identifier: identifier.into(), version: version.into(), body: Some(body), definitions }
    }

    /// A decode-ready, still-unbound packet: no identifier/version/body yet
    ///, the frame decoder fills all three in via [`PacketAccess::bind`]
    /// once it has read the frame header and resolved a definition.
    pub fn unbound(definitions: Arc<DefinitionRegistry>) -> Self {
        PacketValue { identifier: Name::new(), version: Name::new(), body: None, definitions }
    }
}

impl PacketField for PacketValue {
    fn category(&self) -> Category {
        Category::Packet
    }
    fn is_unset(&self) -> bool {
        self.body.is_none()
    }
    fn set_unset(&mut self) {
        self.body = None;
    }
    fn as_packet(&self) -> Option<&dyn PacketAccess> {
        Some(self)
    }
    fn as_packet_mut(&mut self) -> Option<&mut dyn PacketAccess> {
        Some(self)
    }
}

impl PacketAccess for PacketValue {
    fn identity(&self) -> Option<(&str, &str)> {
        if self.identifier.is_empty() {
            None
        } else {
            Some((&self.identifier, &self.version))
        }
    }

    fn body_ref(&self) -> Option<&dyn PacketField> {
        self.body.as_deref()
    }

    fn body_mut(&mut self) -> Option<&mut dyn PacketField> {
        self.body.as_deref_mut()
    }

    fn bind(&mut self, identifier: &str, version: &str, body: Box<dyn PacketField>) {
        self.identifier = identifier.into();
        self.version = version.into();
        self.body = Some(body);
    }

    fn resolve_body(&self, identifier: &str, version: &str) -> Option<Box<dyn PacketField>> {
        let schema = self.definitions.get_definition(identifier, version)?;
        Some(Box::new(GroupField::new(schema)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::FieldSpec;
    use crate::UintField;

    #[test]
    fn version_parses_major_minor_patch() {
        assert_eq!("1.0.0".parse::<Version>().unwrap(), Version::new(1, 0, 0));
        assert_eq!("2.10.3".parse::<Version>().unwrap(), Version::new(2, 10, 3));
    }

    #[test]
    fn version_rejects_malformed_strings() {
        assert!("1.0".parse::<Version>().is_err());
        assert!("1.0.0.0".parse::<Version>().is_err());
        assert!("a.b.c".parse::<Version>().is_err());
    }

    #[test]
    fn registry_resolves_registered_pair_only() {
        let registry = DefinitionRegistry::new();
        let schema = Arc::new(GroupSchema::new(vec![FieldSpec::new("field1", || Box::new(UintField::default()))]));
        registry.register("demo", Version::new(1, 0, 0), schema);

        assert!(registry.get_definition("demo", "1.0.0").is_some());
        assert!(registry.get_definition("demo", "2.0.0").is_none());
        assert!(registry.get_definition("other", "1.0.0").is_none());
        assert!(registry.get_definition("demo", "not-a-version").is_none());
    }

    #[test]
    fn unbound_packet_has_no_identity_until_bind() {
        let registry = Arc::new(DefinitionRegistry::new());
        let packet = PacketValue::unbound(registry);
        assert_eq!(packet.identity(), None);
        assert!(packet.is_unset());
    }

    #[test]
    fn resolve_body_consults_the_registry() {
        let registry = Arc::new(DefinitionRegistry::new());
        let schema = Arc::new(GroupSchema::new(vec![]));
        registry.register("demo", Version::new(1, 0, 0), schema);
        let packet = PacketValue::unbound(Arc::clone(&registry));

        assert!(packet.resolve_body("demo", "1.0.0").is_some());
        assert!(packet.resolve_body("demo", "9.9.9").is_none());
    }
}
