//! Generic repository contract and its document-store implementation.
//!
//! Writes never return errors: failures are handed to the injected
//! [`ErrorLogger`] and reported as `false`. Reads return every failure to the
//! caller unchanged.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use bson::Document;
use futures::TryStreamExt;
use uuid::Uuid;

use common::{AppError, AppResult, ErrorLogger, MongoSettings};
use domain::Entity;

use crate::cancellation::{with_cancellation, CancellationToken};
use crate::query::{Filter, Sort};
use crate::store::{DocumentCursor, FindOptions, StoreClient, StoreCollection, WriteOptions};

/// CRUD operations over one entity type.
///
/// Every operation accepts an optional cancellation token. A cancelled write
/// resolves to `false`; a cancelled read resolves to [`AppError::Cancelled`].
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert a new document. `true` once the store acknowledged the insert.
    async fn create(&self, model: T, cancel: Option<&CancellationToken>) -> bool;

    /// Replace the stored document having the model's id.
    ///
    /// Returns the store's acknowledgement, which is also `true` when no
    /// document had that id.
    async fn update(&self, model: T, cancel: Option<&CancellationToken>) -> bool;

    /// First document with the given id
    async fn find_by_id(&self, id: Uuid, cancel: Option<&CancellationToken>)
        -> AppResult<Option<T>>;

    /// First document matching `filter`
    async fn find_one(&self, filter: Filter, cancel: Option<&CancellationToken>)
        -> AppResult<Option<T>>;

    /// Documents matching `filter`, ordered by `sort`, after skipping `skip`
    /// and capped at `limit`
    async fn find(
        &self,
        filter: Filter,
        sort: Option<Sort>,
        skip: Option<u64>,
        limit: Option<i64>,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<Vec<T>>;
}

/// [`Repository`] backed by a store collection.
///
/// Holds only immutable handles, so one instance can serve concurrent callers.
pub struct MongoRepository<T> {
    client: Arc<dyn StoreClient>,
    settings: MongoSettings,
    logger: Arc<dyn ErrorLogger>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> MongoRepository<T> {
    /// Create a repository for the collection named in `settings`.
    ///
    /// Fails when the database or collection name is empty.
    pub fn new(
        client: Arc<dyn StoreClient>,
        settings: &MongoSettings,
        logger: Arc<dyn ErrorLogger>,
    ) -> AppResult<Self> {
        settings.validate()?;

        Ok(Self {
            client,
            settings: settings.clone(),
            logger,
            _entity: PhantomData,
        })
    }

    pub fn settings(&self) -> &MongoSettings {
        &self.settings
    }

    /// Resolve the target collection from the client and settings
    pub fn collection(&self) -> Arc<dyn StoreCollection> {
        self.client
            .database(&self.settings.db_name)
            .collection(&self.settings.collection_name)
    }

    /// Run `filter` and materialize every matching entity
    pub async fn find_all(
        &self,
        filter: Filter,
        options: FindOptions,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<Vec<T>> {
        let collection = self.collection();
        let cursor =
            with_cancellation(cancel, collection.find(filter.into_document(), options)).await?;

        materialize(cursor, cancel).await
    }

    async fn try_create(&self, model: &T, cancel: Option<&CancellationToken>) -> AppResult<()> {
        let collection = self.collection();
        let document = bson::to_document(model)?;

        with_cancellation(
            cancel,
            collection.insert_one(document, WriteOptions::bypass_validation()),
        )
        .await
    }

    async fn try_update(&self, model: &T, cancel: Option<&CancellationToken>) -> AppResult<bool> {
        if !model.has_id() {
            return Err(AppError::validation("entity id must be set before update"));
        }

        let collection = self.collection();
        let replacement = bson::to_document(model)?;
        let outcome = with_cancellation(
            cancel,
            collection.replace_one(
                Filter::by_id(model.id()).into_document(),
                replacement,
                WriteOptions::bypass_validation(),
            ),
        )
        .await?;

        tracing::debug!(
            collection = %self.settings.namespace(),
            id = %model.id(),
            matched = outcome.matched_count,
            modified = outcome.modified_count,
            "Document replaced"
        );

        Ok(outcome.acknowledged)
    }

    fn absorb(&self, error: AppError) -> bool {
        self.logger.log_error(&error);
        false
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MongoRepository<T> {
    async fn create(&self, model: T, cancel: Option<&CancellationToken>) -> bool {
        match self.try_create(&model, cancel).await {
            Ok(()) => {
                tracing::debug!(
                    collection = %self.settings.namespace(),
                    id = %model.id(),
                    "Document inserted"
                );
                true
            }
            Err(error) => self.absorb(error),
        }
    }

    async fn update(&self, model: T, cancel: Option<&CancellationToken>) -> bool {
        self.try_update(&model, cancel)
            .await
            .unwrap_or_else(|error| self.absorb(error))
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<Option<T>> {
        self.find_one(Filter::by_id(id), cancel).await
    }

    async fn find_one(
        &self,
        filter: Filter,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<Option<T>> {
        let collection = self.collection();
        let document =
            with_cancellation(cancel, collection.find_one(filter.into_document())).await?;

        document.map(decode).transpose()
    }

    async fn find(
        &self,
        filter: Filter,
        sort: Option<Sort>,
        skip: Option<u64>,
        limit: Option<i64>,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<Vec<T>> {
        let options = FindOptions {
            sort: sort.map(Sort::into_document),
            skip,
            limit,
        };

        self.find_all(filter, options, cancel).await
    }
}

/// Drain a cursor into entities.
async fn materialize<T: Entity>(
    cursor: DocumentCursor,
    cancel: Option<&CancellationToken>,
) -> AppResult<Vec<T>> {
    let documents: Vec<Document> = with_cancellation(cancel, cursor.try_collect()).await?;

    documents.into_iter().map(decode).collect()
}

fn decode<T: Entity>(document: Document) -> AppResult<T> {
    bson::from_document(document).map_err(AppError::from)
}
