//! The generic document store capability and the collection operations
//! shared by the in-memory and on-disk implementations.

use serde_json::Value;

use crate::error::{rejected, StoreError};
use crate::filter::Filter;

/// A stored document: always a JSON object.
pub type Document = Value;

/// Collection-scoped document operations.
///
/// Each call is atomic at the document level; there are no cross-document
/// transactions.
pub trait DocumentStore {
    fn insert_one(&mut self, collection: &str, document: Document) -> Result<(), StoreError>;

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Replace the first document matching `filter`. Returns the number of
    /// documents replaced (0 or 1).
    fn update_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> Result<u64, StoreError>;

    /// Delete every document matching `filter`. Returns the number deleted.
    fn delete_many(&mut self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &mut S {
    fn insert_one(&mut self, collection: &str, document: Document) -> Result<(), StoreError> {
        (**self).insert_one(collection, document)
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        (**self).find(collection, filter)
    }

    fn update_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> Result<u64, StoreError> {
        (**self).update_one(collection, filter, document)
    }

    fn delete_many(&mut self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).delete_many(collection, filter)
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn insert_one(&mut self, collection: &str, document: Document) -> Result<(), StoreError> {
        (**self).insert_one(collection, document)
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        (**self).find(collection, filter)
    }

    fn update_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> Result<u64, StoreError> {
        (**self).update_one(collection, filter, document)
    }

    fn delete_many(&mut self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).delete_many(collection, filter)
    }
}

// ---------------------------------------------------------------------------
// Collection operations on a plain Vec, shared by both implementations
// ---------------------------------------------------------------------------

pub(crate) fn insert(
    docs: &mut Vec<Document>,
    collection: &str,
    document: Document,
) -> Result<(), StoreError> {
    if !document.is_object() {
        return Err(rejected(collection, "document must be a JSON object"));
    }
    docs.push(document);
    Ok(())
}

pub(crate) fn select(docs: &[Document], filter: &Filter) -> Vec<Document> {
    docs.iter().filter(|d| filter.matches(d)).cloned().collect()
}

pub(crate) fn replace_first(
    docs: &mut [Document],
    collection: &str,
    filter: &Filter,
    document: Document,
) -> Result<u64, StoreError> {
    if !document.is_object() {
        return Err(rejected(collection, "document must be a JSON object"));
    }
    match docs.iter_mut().find(|d| filter.matches(d)) {
        Some(slot) => {
            *slot = document;
            Ok(1)
        }
        None => Ok(0),
    }
}

pub(crate) fn remove_matching(docs: &mut Vec<Document>, filter: &Filter) -> u64 {
    let before = docs.len();
    docs.retain(|d| !filter.matches(d));
    (before - docs.len()) as u64
}
