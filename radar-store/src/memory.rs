//! In-process document store.

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::{self, Document, DocumentStore};

/// A document store that lives only as long as the process. Used by tests
/// and by dry-run passes seeded from the real store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every document of `collections` out of `source`.
    pub fn copy_from<S: DocumentStore + ?Sized>(
        source: &S,
        collections: &[&str],
    ) -> Result<Self, StoreError> {
        let mut copy = Self::new();
        for name in collections {
            let docs = source.find(name, &Filter::All)?;
            copy.collections.insert((*name).to_string(), docs);
        }
        Ok(copy)
    }

    /// Number of documents currently held in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

impl DocumentStore for MemoryStore {
    fn insert_one(&mut self, collection: &str, document: Document) -> Result<(), StoreError> {
        let docs = self.collections.entry(collection.to_string()).or_default();
        store::insert(docs, collection, document)
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| store::select(docs, filter))
            .unwrap_or_default())
    }

    fn update_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> Result<u64, StoreError> {
        match self.collections.get_mut(collection) {
            Some(docs) => store::replace_first(docs, collection, filter, document),
            None => Ok(0),
        }
    }

    fn delete_many(&mut self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        Ok(self
            .collections
            .get_mut(collection)
            .map(|docs| store::remove_matching(docs, filter))
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_find_update_delete() {
        let mut store = MemoryStore::new();
        store
            .insert_one("organizations", json!({"name": "acme", "description": ""}))
            .unwrap();
        store
            .insert_one("organizations", json!({"name": "foo", "description": ""}))
            .unwrap();
        assert_eq!(store.len("organizations"), 2);

        let modified = store
            .update_one(
                "organizations",
                &Filter::eq("name", "acme"),
                json!({"name": "acme", "description": "rockets"}),
            )
            .unwrap();
        assert_eq!(modified, 1);
        let found = store
            .find("organizations", &Filter::eq("name", "acme"))
            .unwrap();
        assert_eq!(found[0]["description"], "rockets");

        let deleted = store
            .delete_many("organizations", &Filter::is_in("name", ["foo", "bar"]))
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.len("organizations"), 1);
    }

    #[test]
    fn update_without_match_reports_zero() {
        let mut store = MemoryStore::new();
        let modified = store
            .update_one("repositories", &Filter::eq("name", "x"), json!({"name": "x"}))
            .unwrap();
        assert_eq!(modified, 0);
        assert!(store.is_empty("repositories"));
    }

    #[test]
    fn non_object_documents_are_rejected() {
        let mut store = MemoryStore::new();
        let err = store.insert_one("organizations", json!("acme")).unwrap_err();
        assert!(err.is_rejection(), "got: {err}");
    }

    #[test]
    fn copy_from_snapshots_collections() {
        let mut source = MemoryStore::new();
        source
            .insert_one("organizations", json!({"name": "acme"}))
            .unwrap();
        let mut copy = MemoryStore::copy_from(&source, &["organizations", "repositories"]).unwrap();
        copy.insert_one("organizations", json!({"name": "foo"})).unwrap();
        assert_eq!(source.len("organizations"), 1);
        assert_eq!(copy.len("organizations"), 2);
    }
}
