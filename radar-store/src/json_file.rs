//! On-disk document store.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   organizations.json   (JSON array of documents)
//!   repositories.json
//! ```
//!
//! All collections are loaded at [`JsonFileStore::open`]. Every write builds
//! the new collection, persists it with `.json.tmp` + rename, and only then
//! replaces the in-memory copy, so a failed write leaves both disk and memory
//! at the previous state.
//!
//! Each write rewrites its whole collection file, so a pass that touches
//! every document costs O(n²) in the collection size. Files are written as
//! compact JSON to keep that rewrite small. This suits stores of a few
//! thousand repositories; larger mirrors want an engine with in-place updates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{io_err, StoreError};
use crate::filter::Filter;
use crate::store::{self, Document, DocumentStore};

#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    collections: BTreeMap<String, Vec<Document>>,
}

impl JsonFileStore {
    /// Open (creating if needed) the store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;

        let mut collections = BTreeMap::new();
        let entries = std::fs::read_dir(&root).map_err(|e| io_err(&root, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&root, e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let docs = load_collection(&path)?;
            tracing::debug!(collection = name, documents = docs.len(), "loaded collection");
            collections.insert(name.to_string(), docs);
        }

        Ok(Self { root, collections })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<collection>.json`. Pure, no I/O.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }

    /// Persist `docs` as `collection`, then commit them in memory.
    fn commit(&mut self, collection: &str, docs: Vec<Document>) -> Result<(), StoreError> {
        let path = self.collection_path(collection);
        save_collection(&path, &docs)?;
        self.collections.insert(collection.to_string(), docs);
        Ok(())
    }

    fn snapshot(&self, collection: &str) -> Vec<Document> {
        self.collections.get(collection).cloned().unwrap_or_default()
    }
}

impl DocumentStore for JsonFileStore {
    fn insert_one(&mut self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut docs = self.snapshot(collection);
        store::insert(&mut docs, collection, document)?;
        self.commit(collection, docs)
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
        let mut docs = self.snapshot(collection);
        let modified = store::replace_first(&mut docs, collection, filter, document)?;
        if modified > 0 {
            self.commit(collection, docs)?;
        }
        Ok(modified)
    }

    fn delete_many(&mut self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut docs = self.snapshot(collection);
        let deleted = store::remove_matching(&mut docs, filter);
        if deleted > 0 {
            self.commit(collection, docs)?;
        }
        Ok(deleted)
    }
}

fn load_collection(path: &Path) -> Result<Vec<Document>, StoreError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    let docs: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(docs.into_iter().map(Document::Object).collect())
}

fn save_collection(path: &Path, docs: &[Document]) -> Result<(), StoreError> {
    let json = serde_json::to_vec(docs)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}
