//! Typed access to the `organizations` collection.

use radar_core::{Organization, OrganizationName};

use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::DocumentStore;

pub const COLLECTION: &str = "organizations";

pub fn find_all<S: DocumentStore + ?Sized>(store: &S) -> Result<Vec<Organization>, StoreError> {
    decode_all(store, &Filter::All)
}

/// Stored organizations whose name is not in `names`.
pub fn find_not_in<S: DocumentStore + ?Sized>(
    store: &S,
    names: &[OrganizationName],
) -> Result<Vec<Organization>, StoreError> {
    decode_all(store, &Filter::not_in("name", names.iter().map(|n| n.0.clone())))
}

pub fn insert<S: DocumentStore + ?Sized>(
    store: &mut S,
    organization: &Organization,
) -> Result<(), StoreError> {
    store.insert_one(COLLECTION, serde_json::to_value(organization)?)
}

/// Bulk delete by name. Returns the number actually deleted.
pub fn delete_by_names<S: DocumentStore + ?Sized>(
    store: &mut S,
    names: &[OrganizationName],
) -> Result<u64, StoreError> {
    if names.is_empty() {
        return Ok(0);
    }
    store.delete_many(
        COLLECTION,
        &Filter::is_in("name", names.iter().map(|n| n.0.clone())),
    )
}

fn decode_all<S: DocumentStore + ?Sized>(
    store: &S,
    filter: &Filter,
) -> Result<Vec<Organization>, StoreError> {
    store
        .find(COLLECTION, filter)?
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn names(list: &[&str]) -> Vec<OrganizationName> {
        list.iter().map(|n| OrganizationName::from(*n)).collect()
    }

    #[test]
    fn find_not_in_returns_stale_organizations() {
        let mut store = MemoryStore::new();
        for name in ["acme", "foo", "bar"] {
            insert(&mut store, &Organization::observed(name)).unwrap();
        }
        let mut stale: Vec<String> = find_not_in(&store, &names(&["acme"]))
            .unwrap()
            .into_iter()
            .map(|o| o.name.0)
            .collect();
        stale.sort();
        assert_eq!(stale, vec!["bar", "foo"]);
    }

    #[test]
    fn delete_by_names_counts_only_existing() {
        let mut store = MemoryStore::new();
        insert(&mut store, &Organization::observed("acme")).unwrap();
        let deleted = delete_by_names(&mut store, &names(&["acme", "ghost"])).unwrap();
        assert_eq!(deleted, 1);
        assert!(find_all(&store).unwrap().is_empty());
    }

    #[test]
    fn delete_with_no_names_is_a_no_op() {
        let mut store = MemoryStore::new();
        insert(&mut store, &Organization::observed("acme")).unwrap();
        assert_eq!(delete_by_names(&mut store, &[]).unwrap(), 0);
        assert_eq!(find_all(&store).unwrap().len(), 1);
    }
}
