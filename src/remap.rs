//! Source id -> destination id translation.
//!
//! Maps are filled while an entity is imported and consulted by every entity
//! imported after it. A missing id means the parent was never imported
//! (partial contact, failed insert, absent row).

use ahash::{AHashMap, AHashSet};

/// Destination ids of one entity kind, keyed by source id
#[derive(Debug, Default, Clone)]
pub struct IdMap {
    ids: AHashMap<i64, String>,
}

impl IdMap {
    pub fn insert(&mut self, source_id: i64, destination_id: String) {
        self.ids.insert(source_id, destination_id);
    }

    /// Destination id for an optional source foreign key
    pub fn resolve(&self, source_id: Option<i64>) -> Option<&str> {
        source_id
            .and_then(|id| self.ids.get(&id))
            .map(String::as_str)
    }

    pub fn contains(&self, source_id: i64) -> bool {
        self.ids.contains_key(&source_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// One map per entity that other entities reference
#[derive(Debug, Default)]
pub struct IdRemapper {
    pub contacts: IdMap,
    pub tags: IdMap,
}

/// Undirected relationship identity: `{a, b}` plus canonical type
#[derive(Debug, Default)]
pub struct RelationshipDedup {
    seen: AHashSet<(i64, i64, String)>,
}

impl RelationshipDedup {
    /// Record a relationship; `false` if it (or its mirror) was seen before
    pub fn insert(&mut self, a: i64, b: i64, kind: &str) -> bool {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        self.seen.insert((low, high, kind.to_string()))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let mut map = IdMap::default();
        map.insert(1, "c-1".to_string());
        assert_eq!(map.resolve(Some(1)), Some("c-1"));
        assert_eq!(map.resolve(Some(2)), None);
        assert_eq!(map.resolve(None), None);
        assert!(map.contains(1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_dedup_is_undirected() {
        let mut dedup = RelationshipDedup::default();
        assert!(dedup.insert(1, 2, "parent"));
        assert!(!dedup.insert(2, 1, "parent"));
        assert!(dedup.insert(1, 2, "friend"));
        assert_eq!(dedup.len(), 2);
    }
}
