//! Mapping from legacy identifiers to new-store keys.

use std::collections::HashMap;

use crate::models::{LegacyRecordId, NewRecordKey};

/// Append-only association built while records are migrated.
///
/// Only successfully migrated records have an entry; failed ones are
/// absent, never mapped to a sentinel.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    keys: HashMap<LegacyRecordId, NewRecordKey>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the key assigned to a migrated record.
    ///
    /// Returns `false` (and keeps the existing key) if the legacy id was
    /// already mapped.
    pub fn insert(&mut self, id: LegacyRecordId, key: NewRecordKey) -> bool {
        match self.keys.entry(id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(key);
                true
            }
        }
    }

    pub fn get(&self, id: LegacyRecordId) -> Option<&NewRecordKey> {
        self.keys.get(&id)
    }

    pub fn contains(&self, id: LegacyRecordId) -> bool {
        self.keys.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut map = IdentifierMap::new();
        let key = NewRecordKey::from("01HZX".to_string());

        assert!(map.is_empty());
        assert!(map.insert(LegacyRecordId(1), key.clone()));
        assert_eq!(map.get(LegacyRecordId(1)), Some(&key));
        assert!(!map.contains(LegacyRecordId(2)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_insert_is_append_only() {
        let mut map = IdentifierMap::new();
        let first = NewRecordKey::from("first".to_string());
        let second = NewRecordKey::from("second".to_string());

        assert!(map.insert(LegacyRecordId(9), first.clone()));
        assert!(!map.insert(LegacyRecordId(9), second));
        assert_eq!(map.get(LegacyRecordId(9)), Some(&first));
        assert_eq!(map.len(), 1);
    }
}
