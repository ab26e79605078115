//! In-memory store binding.
//!
//! Keeps documents in insertion order per collection, which makes find results
//! without a sort deterministic. Handles for the same coordinates share state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;

use common::{AppError, AppResult};
use domain::ID_FIELD;

use super::matcher::{compare_by, matches};
use super::{
    DocumentCursor, FindOptions, ReplaceOutcome, StoreClient, StoreCollection, StoreDatabase,
    WriteOptions,
};

type CollectionKey = (String, String);

/// Store binding keeping every collection in process memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<CollectionKey, Arc<MemoryCollection>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require documents written to a collection to match `validator`.
    ///
    /// Writes carrying [`WriteOptions::bypass_document_validation`] skip the check.
    pub async fn set_validator(&self, db: &str, collection: &str, validator: Document) {
        let handle = self.collection_handle(db, collection);
        *handle.validator.write().await = Some(validator);
    }

    /// Snapshot of a collection's documents in insertion order
    pub async fn documents(&self, db: &str, collection: &str) -> Vec<Document> {
        self.collection_handle(db, collection)
            .documents
            .read()
            .await
            .clone()
    }

    fn collection_handle(&self, db: &str, collection: &str) -> Arc<MemoryCollection> {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        collections
            .entry((db.to_string(), collection.to_string()))
            .or_insert_with(|| Arc::new(MemoryCollection::new(db, collection)))
            .clone()
    }
}

impl StoreClient for MemoryStore {
    fn database(&self, name: &str) -> Arc<dyn StoreDatabase> {
        Arc::new(MemoryDatabase {
            name: name.to_string(),
            store: self.clone(),
        })
    }
}

struct MemoryDatabase {
    name: String,
    store: MemoryStore,
}

impl StoreDatabase for MemoryDatabase {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn collection(&self, name: &str) -> Arc<dyn StoreCollection> {
        self.store.collection_handle(&self.name, name)
    }
}

struct MemoryCollection {
    namespace: String,
    documents: RwLock<Vec<Document>>,
    validator: RwLock<Option<Document>>,
}

impl MemoryCollection {
    fn new(db: &str, collection: &str) -> Self {
        Self {
            namespace: format!("{}.{}", db, collection),
            documents: RwLock::new(Vec::new()),
            validator: RwLock::new(None),
        }
    }

    async fn validate(&self, document: &Document, options: WriteOptions) -> AppResult<()> {
        if options.bypass_document_validation {
            return Ok(());
        }

        match self.validator.read().await.as_ref() {
            Some(validator) if !matches(document, validator)? => Err(
                AppError::document_validation(format!("rejected by {} validator", self.namespace)),
            ),
            _ => Ok(()),
        }
    }
}

fn same_id(document: &Document, id: &Bson) -> bool {
    document.get(ID_FIELD) == Some(id)
}

#[async_trait]
impl StoreCollection for MemoryCollection {
    fn namespace(&self) -> String {
        self.namespace.clone()
    }

    async fn insert_one(&self, mut document: Document, options: WriteOptions) -> AppResult<()> {
        self.validate(&document, options).await?;

        if !document.contains_key(ID_FIELD) {
            document.insert(ID_FIELD, ObjectId::new());
        }

        let mut documents = self.documents.write().await;
        if let Some(id) = document.get(ID_FIELD) {
            if documents.iter().any(|existing| same_id(existing, id)) {
                return Err(AppError::duplicate_key(format!(
                    "{} {} {}",
                    self.namespace, ID_FIELD, id
                )));
            }
        }

        documents.push(document);
        Ok(())
    }

    async fn replace_one(
        &self,
        filter: Document,
        mut replacement: Document,
        options: WriteOptions,
    ) -> AppResult<ReplaceOutcome> {
        self.validate(&replacement, options).await?;

        let mut documents = self.documents.write().await;
        let mut position = None;
        for (index, document) in documents.iter().enumerate() {
            if matches(document, &filter)? {
                position = Some(index);
                break;
            }
        }

        let Some(index) = position else {
            return Ok(ReplaceOutcome {
                acknowledged: true,
                ..ReplaceOutcome::default()
            });
        };

        let current_id = documents[index].get(ID_FIELD).cloned();
        match (replacement.get(ID_FIELD), current_id) {
            (Some(new_id), Some(current_id)) if *new_id != current_id => {
                return Err(AppError::validation(format!(
                    "replacement would change immutable field {}",
                    ID_FIELD
                )));
            }
            (None, Some(current_id)) => {
                replacement.insert(ID_FIELD, current_id);
            }
            _ => {}
        }

        let modified = documents[index] != replacement;
        documents[index] = replacement;

        Ok(ReplaceOutcome {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn find_one(&self, filter: Document) -> AppResult<Option<Document>> {
        let documents = self.documents.read().await;
        for document in documents.iter() {
            if matches(document, &filter)? {
                return Ok(Some(document.clone()));
            }
        }
        Ok(None)
    }

    async fn find(&self, filter: Document, options: FindOptions) -> AppResult<DocumentCursor> {
        let mut selected = Vec::new();
        for document in self.documents.read().await.iter() {
            if matches(document, &filter)? {
                selected.push(document.clone());
            }
        }

        if let Some(sort) = options.sort.as_ref().filter(|sort| !sort.is_empty()) {
            selected.sort_by(|left, right| compare_by(left, right, sort));
        }

        let skip = options.skip.unwrap_or(0) as usize;
        // A limit of zero means no limit; a negative limit is treated as its magnitude
        let limit = options
            .limit
            .filter(|limit| *limit != 0)
            .map_or(usize::MAX, |limit| limit.unsigned_abs() as usize);

        let page: Vec<AppResult<Document>> =
            selected.into_iter().skip(skip).take(limit).map(Ok).collect();

        Ok(stream::iter(page).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use futures::TryStreamExt;

    use crate::query::{Filter, Sort};

    async fn collect(cursor: DocumentCursor) -> Vec<Document> {
        cursor.try_collect().await.unwrap()
    }

    #[tokio::test]
    async fn test_handles_share_collection_state() {
        let store = MemoryStore::new();
        let first = store.database("db").collection("people");
        let second = store.database("db").collection("people");

        first
            .insert_one(doc! { "_id": 1, "age": 20 }, WriteOptions::default())
            .await
            .unwrap();

        let found = second.find_one(doc! { "_id": 1 }).await.unwrap();
        assert_eq!(found, Some(doc! { "_id": 1, "age": 20 }));
        assert_eq!(second.namespace(), "db.people");
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let collection = MemoryStore::new().database("db").collection("people");
        collection
            .insert_one(doc! { "_id": 1 }, WriteOptions::default())
            .await
            .unwrap();

        let result = collection
            .insert_one(doc! { "_id": 1 }, WriteOptions::default())
            .await;

        assert!(matches!(result, Err(AppError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn test_insert_assigns_missing_id() {
        let store = MemoryStore::new();
        let collection = store.database("db").collection("people");
        collection
            .insert_one(doc! { "age": 1 }, WriteOptions::default())
            .await
            .unwrap();

        let documents = store.documents("db", "people").await;
        assert!(documents[0].get_object_id(ID_FIELD).is_ok());
    }

    #[tokio::test]
    async fn test_validator_enforced_unless_bypassed() {
        let store = MemoryStore::new();
        store
            .set_validator("db", "people", Filter::gte("age", 0).into_document())
            .await;
        let collection = store.database("db").collection("people");

        let rejected = collection
            .insert_one(doc! { "_id": 1, "age": -1 }, WriteOptions::default())
            .await;
        let bypassed = collection
            .insert_one(doc! { "_id": 2, "age": -1 }, WriteOptions::bypass_validation())
            .await;

        assert!(matches!(rejected, Err(AppError::DocumentValidation(_))));
        assert!(bypassed.is_ok());
    }

    #[tokio::test]
    async fn test_replace_keeps_id_and_reports_counts() {
        let collection = MemoryStore::new().database("db").collection("people");
        collection
            .insert_one(doc! { "_id": 1, "age": 20 }, WriteOptions::default())
            .await
            .unwrap();

        let outcome = collection
            .replace_one(doc! { "_id": 1 }, doc! { "age": 21 }, WriteOptions::default())
            .await
            .unwrap();
        let missing = collection
            .replace_one(doc! { "_id": 2 }, doc! { "age": 30 }, WriteOptions::default())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReplaceOutcome {
                acknowledged: true,
                matched_count: 1,
                modified_count: 1
            }
        );
        assert!(missing.acknowledged);
        assert_eq!(missing.matched_count, 0);
        assert_eq!(
            collection.find_one(doc! { "_id": 1 }).await.unwrap(),
            Some(doc! { "age": 21, "_id": 1 })
        );
    }

    #[tokio::test]
    async fn test_replace_rejects_id_change() {
        let collection = MemoryStore::new().database("db").collection("people");
        collection
            .insert_one(doc! { "_id": 1 }, WriteOptions::default())
            .await
            .unwrap();

        let result = collection
            .replace_one(doc! { "_id": 1 }, doc! { "_id": 2 }, WriteOptions::default())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_find_applies_sort_skip_and_limit() {
        let collection = MemoryStore::new().database("db").collection("people");
        for (id, age) in [(1, 30), (2, 10), (3, 20)] {
            collection
                .insert_one(doc! { "_id": id, "age": age }, WriteOptions::default())
                .await
                .unwrap();
        }

        let options = FindOptions {
            sort: Some(Sort::ascending("age").into_document()),
            skip: Some(1),
            limit: Some(1),
        };
        let page = collect(collection.find(Document::new(), options).await.unwrap()).await;

        assert_eq!(page, vec![doc! { "_id": 3, "age": 20 }]);
    }

    #[tokio::test]
    async fn test_find_without_sort_keeps_insertion_order() {
        let collection = MemoryStore::new().database("db").collection("people");
        for (id, age) in [(1, 65), (2, 17), (3, 18)] {
            collection
                .insert_one(doc! { "_id": id, "age": age }, WriteOptions::default())
                .await
                .unwrap();
        }

        let found = collect(
            collection
                .find(Filter::gte("age", 18).into_document(), FindOptions::default())
                .await
                .unwrap(),
        )
        .await;

        let ids: Vec<i32> = found.iter().map(|d| d.get_i32("_id").unwrap()).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
