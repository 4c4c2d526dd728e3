//! The `Group` encoder: a tag→value multiset with a deterministically
//! rebuilt `name ↔ tag` bijection.
//!
//! The bijection is computed fresh on every encode and decode from the same
//! `FIELDS` declaration, so it never needs to travel on the wire, only the
//! tag numbers. This module owns that computation plus the present/optional-
//! field walk that decides what actually gets written.

use rustc_hash::FxHashMap;

use crate::codec::Codec;
use crate::error::{DecodeError, EncodeError, Result};
use crate::field::{Category, FieldDecl, GroupAccess, PacketField};
use crate::registry::FieldEncoder;
use crate::stream::{DynStream, Poll};

/// The `name ↔ tag` bijection for one `FIELDS` declaration, built in a
/// single pass: claim explicit tags first, then auto-assign the rest.
struct TagBijection {
    name_to_tag: FxHashMap<String, u16>,
    tag_to_name: FxHashMap<u16, String>,
}

impl TagBijection {
    fn build(fields: &[FieldDecl]) -> Result<Self> {
        let mut name_to_tag = FxHashMap::default();
        let mut tag_to_name = FxHashMap::default();
        let mut taken = std::collections::HashSet::new();

        // First pass: claim every explicit tag, failing on collisions.
        for decl in fields {
            if name_to_tag.contains_key(decl.name.as_str()) {
                return Err(EncodeError::DuplicateField { name: decl.name.as_str().into() }.into());
            }
            if let Some(tag) = decl.explicit_tag {
                if !taken.insert(tag) {
                    return Err(EncodeError::DuplicateExplicitTag { tag, name: decl.name.as_str().into() }.into());
                }
                name_to_tag.insert(decl.name.to_string(), tag);
                tag_to_name.insert(tag, decl.name.to_string());
            } else {
                // Reserve the slot so the second pass can tell explicit from
                // auto-assigned entries apart.
                name_to_tag.insert(decl.name.to_string(), u16::MAX);
            }
        }

        // Second pass: auto-assign the smallest unused tag, in declaration
        // order, to every field that didn't claim one explicitly.
        let mut next_candidate: u16 = 0;
        for decl in fields {
            if decl.explicit_tag.is_some() {
                continue;
            }
            while taken.contains(&next_candidate) {
                next_candidate = next_candidate.wrapping_add(1);
            }
            let tag = next_candidate;
            taken.insert(tag);
            name_to_tag.insert(decl.name.to_string(), tag);
            tag_to_name.insert(tag, decl.name.to_string());
        }

        Ok(TagBijection { name_to_tag, tag_to_name })
    }

    fn tag_of(&self, name: &str) -> u16 {
        self.name_to_tag[name]
    }

    fn name_of(&self, tag: u16) -> Option<&str> {
        self.tag_to_name.get(&tag).map(String::as_str)
    }
}

/// Encoder for the `Group` category.
#[derive(Debug, Default)]
pub struct GroupEncoder;

impl FieldEncoder for GroupEncoder {
    fn encode(&self, codec: &Codec, stream: &mut DynStream, field: &dyn PacketField) -> Result<()> {
        let group = field.as_group().ok_or(EncodeError::NoEncoder { category: Category::Group })?;
        let declared = group.declared_fields();
        let bijection = TagBijection::build(declared)?;

        let mut present = Vec::with_capacity(declared.len());
        for decl in declared {
            let value = group
                .field_ref(&decl.name)
                .ok_or_else(|| EncodeError::UnknownField { name: decl.name.as_str().into() })?;
            if value.is_unset() {
                if !value.attrs().optional {
                    return Err(EncodeError::FieldUnsetNotOptional { name: decl.name.as_str().into() }.into());
                }
                continue;
            }
            present.push(decl.name.as_str());
        }

        stream.write_u16(present.len() as u16)?;
        for name in present {
            let tag = bijection.tag_of(name);
            stream.write_u16(tag)?;
            let value = group
                .field_ref(name)
                .ok_or_else(|| EncodeError::UnknownField { name: name.into() })?;
            codec
                .dispatch_encode(stream, value)
                .map_err(|source| EncodeError::Field { name: name.into(), source: Box::new(source) })?;
        }
        Ok(())
    }

    fn decode(&self, codec: &Codec, stream: &mut DynStream, field: &mut dyn PacketField) -> Result<Poll<()>> {
        let group = field.as_group_mut().ok_or(DecodeError::NoEncoder { category: Category::Group })?;
        group.initialize();
        let bijection = TagBijection::build(group.declared_fields())?;

        let count = match stream.read_u16()? {
            Poll::Ready(c) => c,
            Poll::NeedMore => return Ok(Poll::NeedMore),
        };

        for _ in 0..count {
            let tag = match stream.read_u16()? {
                Poll::Ready(t) => t,
                Poll::NeedMore => return Ok(Poll::NeedMore),
            };
            let name = bijection.name_of(tag).ok_or(DecodeError::UnknownTag { tag })?.to_owned();
            let group = field.as_group_mut().ok_or(DecodeError::NoEncoder { category: Category::Group })?;
            let value = group
                .field_mut(&name)
                .ok_or_else(|| DecodeError::UnknownField { name: name.as_str().into() })?;
            match codec.dispatch_decode(stream, value) {
                Ok(Poll::Ready(())) => continue,
                Ok(Poll::NeedMore) => return Ok(Poll::NeedMore),
                Err(source) => {
                    return Err(DecodeError::Field { name: name.as_str().into(), source: Box::new(source) }.into())
                }
            }
        }
        Ok(Poll::Ready(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(name: &str, explicit_tag: Option<u16>) -> FieldDecl {
        FieldDecl { name: name.into(), explicit_tag }
    }

    #[test]
    fn auto_assigns_smallest_unused_tag_in_order() {
        let fields = vec![decl("field1", None), decl("field2", None), decl("list1", None)];
        let bijection = TagBijection::build(&fields).unwrap();
        assert_eq!(bijection.tag_of("field1"), 0);
        assert_eq!(bijection.tag_of("field2"), 1);
        assert_eq!(bijection.tag_of("list1"), 2);
    }

    #[test]
    fn explicit_tag_is_honored_and_skipped_by_auto_assignment() {
        let fields = vec![decl("a", Some(5)), decl("b", None), decl("c", None)];
        let bijection = TagBijection::build(&fields).unwrap();
        assert_eq!(bijection.tag_of("a"), 5);
        assert_eq!(bijection.tag_of("b"), 0);
        assert_eq!(bijection.tag_of("c"), 1);
    }

    #[test]
    fn duplicate_explicit_tag_fails() {
        let fields = vec![decl("a", Some(1)), decl("b", Some(1))];
        let err = TagBijection::build(&fields).unwrap_err();
        assert!(matches!(err, crate::Error::Encode(EncodeError::DuplicateExplicitTag { tag: 1, .. })));
    }

    #[test]
    fn duplicate_name_fails() {
        let fields = vec![decl("a", None), decl("a", Some(2))];
        let err = TagBijection::build(&fields).unwrap_err();
        assert!(matches!(err, crate::Error::Encode(EncodeError::DuplicateField { .. })));
    }

    #[test]
    fn tag_assignment_is_deterministic_across_two_builds() {
        let fields = vec![decl("field1", None), decl("field2", Some(7)), decl("field3", None)];
        let a = TagBijection::build(&fields).unwrap();
        let b = TagBijection::build(&fields).unwrap();
        for decl in &fields {
            assert_eq!(a.tag_of(&decl.name), b.tag_of(&decl.name));
        }
    }
}
