use super::{Lookups, NewRelationship, Skip};
use crate::source::{Relationship, RelationshipType};
use ahash::AHashMap;

/// Translate a Monica relationship into its canonical direction.
///
/// Monica stores both directions of every relationship (`A parent-of B` and
/// `B child-of A`). Both rows translate to the same canonical record, which
/// is what lets the importer collapse them.
pub fn translate_relationship(
    relationship: &Relationship,
    types: &AHashMap<i64, RelationshipType>,
    lookups: &Lookups,
) -> Result<NewRelationship, Skip> {
    let (Some(contact_is), Some(of_contact)) = (relationship.contact_is, relationship.of_contact)
    else {
        return Err(Skip::UnresolvedContact);
    };

    let rel_type = relationship
        .relationship_type_id
        .and_then(|id| types.get(&id))
        .ok_or(Skip::MissingLookup)?;
    let name = rel_type.name.as_deref().ok_or(Skip::MissingLookup)?;

    let (kind, swap) = lookups.canonical_relationship(name, rel_type.name_reverse.as_deref());
    let (contact, related) = if swap {
        (of_contact, contact_is)
    } else {
        (contact_is, of_contact)
    };

    Ok(NewRelationship {
        source_id: relationship.id,
        contact,
        related,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types() -> AHashMap<i64, RelationshipType> {
        let mut types = AHashMap::new();
        for (id, name, reverse) in [
            (1, "parent", "child"),
            (2, "child", "parent"),
            (3, "friend", "friend"),
        ] {
            types.insert(
                id,
                RelationshipType {
                    id,
                    name: Some(name.to_string()),
                    name_reverse: Some(reverse.to_string()),
                },
            );
        }
        types
    }

    fn rel(id: i64, type_id: i64, contact_is: i64, of_contact: i64) -> Relationship {
        Relationship {
            id,
            relationship_type_id: Some(type_id),
            contact_is: Some(contact_is),
            of_contact: Some(of_contact),
        }
    }

    #[test]
    fn test_inverse_rows_translate_identically() {
        let lookups = Lookups::default();
        let forward = translate_relationship(&rel(1, 1, 1, 2), &types(), &lookups).unwrap();
        let reverse = translate_relationship(&rel(2, 2, 2, 1), &types(), &lookups).unwrap();

        assert_eq!(forward.kind, "parent");
        assert_eq!((forward.contact, forward.related), (1, 2));
        assert_eq!(reverse.kind, "parent");
        assert_eq!((reverse.contact, reverse.related), (1, 2));
    }

    #[test]
    fn test_symmetric_type_keeps_direction() {
        let new =
            translate_relationship(&rel(3, 3, 5, 4), &types(), &Lookups::default()).unwrap();
        assert_eq!(new.kind, "friend");
        assert_eq!((new.contact, new.related), (5, 4));
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        assert_eq!(
            translate_relationship(&rel(4, 99, 1, 2), &types(), &Lookups::default()),
            Err(Skip::MissingLookup)
        );
    }
}
