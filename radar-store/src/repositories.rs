//! Typed access to the `repositories` collection, keyed by
//! `(name, organization)`.

use radar_core::{OrganizationName, Repository, RepositoryKey, RepositoryName};

use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::DocumentStore;

pub const COLLECTION: &str = "repositories";

fn key_filter(key: &RepositoryKey) -> Filter {
    Filter::And(vec![
        Filter::eq("name", key.name.0.clone()),
        Filter::eq("organization", key.organization.0.clone()),
    ])
}

pub fn find_one<S: DocumentStore + ?Sized>(
    store: &S,
    key: &RepositoryKey,
) -> Result<Option<Repository>, StoreError> {
    match store.find(COLLECTION, &key_filter(key))?.into_iter().next() {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

pub fn find_by_organization<S: DocumentStore + ?Sized>(
    store: &S,
    organization: &OrganizationName,
) -> Result<Vec<Repository>, StoreError> {
    decode_all(store, &Filter::eq("organization", organization.0.clone()))
}

pub fn find_all<S: DocumentStore + ?Sized>(store: &S) -> Result<Vec<Repository>, StoreError> {
    decode_all(store, &Filter::All)
}

pub fn insert<S: DocumentStore + ?Sized>(
    store: &mut S,
    repository: &Repository,
) -> Result<(), StoreError> {
    store.insert_one(COLLECTION, serde_json::to_value(repository)?)
}

/// Full-document replacement keyed by `(name, organization)`. Returns the
/// number of documents replaced.
pub fn replace<S: DocumentStore + ?Sized>(
    store: &mut S,
    repository: &Repository,
) -> Result<u64, StoreError> {
    store.update_one(
        COLLECTION,
        &key_filter(&repository.key()),
        serde_json::to_value(repository)?,
    )
}

/// Delete the named repositories of one organization.
pub fn delete_by_keys<S: DocumentStore + ?Sized>(
    store: &mut S,
    organization: &OrganizationName,
    names: &[RepositoryName],
) -> Result<u64, StoreError> {
    if names.is_empty() {
        return Ok(0);
    }
    store.delete_many(
        COLLECTION,
        &Filter::And(vec![
            Filter::eq("organization", organization.0.clone()),
            Filter::is_in("name", names.iter().map(|n| n.0.clone())),
        ]),
    )
}

/// Delete every repository belonging to `organizations`.
pub fn delete_by_organizations<S: DocumentStore + ?Sized>(
    store: &mut S,
    organizations: &[OrganizationName],
) -> Result<u64, StoreError> {
    if organizations.is_empty() {
        return Ok(0);
    }
    store.delete_many(
        COLLECTION,
        &Filter::is_in("organization", organizations.iter().map(|n| n.0.clone())),
    )
}

fn decode_all<S: DocumentStore + ?Sized>(
    store: &S,
    filter: &Filter,
) -> Result<Vec<Repository>, StoreError> {
    store
        .find(COLLECTION, filter)?
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}
