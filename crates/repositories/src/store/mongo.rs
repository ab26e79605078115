//! MongoDB store binding over the official driver.

use std::sync::Arc;

use async_trait::async_trait;
use bson::Document;
use futures::{StreamExt, TryStreamExt};
use mongodb::options::{
    ClientOptions, FindOptions as DriverFindOptions, InsertOneOptions, ReplaceOptions,
};
use mongodb::{Client, Collection, Database};

use common::{AppError, AppResult, MongoSettings};

use super::{
    DocumentCursor, FindOptions, ReplaceOutcome, StoreClient, StoreCollection, StoreDatabase,
    WriteOptions,
};

/// Store binding backed by a pooled [`mongodb::Client`].
///
/// Cloning is cheap and shares the driver's connection pool.
#[derive(Clone, Debug)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Open a client for the configured server.
    ///
    /// The driver connects lazily, so this only fails on a malformed URI.
    pub async fn connect(settings: &MongoSettings) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&settings.uri).await?;
        if let Some(app_name) = &settings.app_name {
            options.app_name = Some(app_name.clone());
        }

        let client = Client::with_options(options)?;
        tracing::info!(db = %settings.db_name, "MongoDB client created");

        Ok(Self { client })
    }

    /// Wrap an existing driver client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl StoreClient for MongoStore {
    fn database(&self, name: &str) -> Arc<dyn StoreDatabase> {
        Arc::new(MongoDatabase {
            database: self.client.database(name),
        })
    }
}

struct MongoDatabase {
    database: Database,
}

impl StoreDatabase for MongoDatabase {
    fn name(&self) -> String {
        self.database.name().to_string()
    }

    fn collection(&self, name: &str) -> Arc<dyn StoreCollection> {
        Arc::new(MongoCollection {
            collection: self.database.collection::<Document>(name),
        })
    }
}

struct MongoCollection {
    collection: Collection<Document>,
}

#[async_trait]
impl StoreCollection for MongoCollection {
    fn namespace(&self) -> String {
        self.collection.namespace().to_string()
    }

    async fn insert_one(&self, document: Document, options: WriteOptions) -> AppResult<()> {
        let options = InsertOneOptions::builder()
            .bypass_document_validation(options.bypass_document_validation)
            .build();

        self.collection.insert_one(document, options).await?;
        Ok(())
    }

    async fn replace_one(
        &self,
        filter: Document,
        replacement: Document,
        options: WriteOptions,
    ) -> AppResult<ReplaceOutcome> {
        let options = ReplaceOptions::builder()
            .bypass_document_validation(options.bypass_document_validation)
            .upsert(false)
            .build();

        let result = self
            .collection
            .replace_one(filter, replacement, options)
            .await?;

        // The driver only yields a result once the server acknowledged the write
        Ok(ReplaceOutcome {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn find_one(&self, filter: Document) -> AppResult<Option<Document>> {
        self.collection
            .find_one(filter, None)
            .await
            .map_err(AppError::from)
    }

    async fn find(&self, filter: Document, options: FindOptions) -> AppResult<DocumentCursor> {
        let options = DriverFindOptions::builder()
            .sort(options.sort)
            .skip(options.skip)
            .limit(options.limit)
            .build();

        let cursor = self.collection.find(filter, options).await?;
        Ok(cursor.map_err(AppError::from).boxed())
    }
}
