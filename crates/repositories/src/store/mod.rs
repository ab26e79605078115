//! Store binding - Document store capabilities used by repositories.
//!
//! The traits mirror the driver's client → database → collection chain and
//! work on raw BSON documents so they stay object safe. Two bindings ship
//! with the crate:
//!
//! - [`MongoStore`]: the official MongoDB driver
//! - [`MemoryStore`]: an in-process store for tests and local runs

mod matcher;
mod memory;
mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use bson::Document;
use futures::stream::BoxStream;

use common::AppResult;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Lazy sequence of documents returned by a find.
pub type DocumentCursor = BoxStream<'static, AppResult<Document>>;

/// Options applied to insert and replace operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Skip the collection's schema validation for this write
    pub bypass_document_validation: bool,
}

impl WriteOptions {
    pub fn bypass_validation() -> Self {
        Self {
            bypass_document_validation: true,
        }
    }
}

/// Options applied to find operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

/// Store response to a replace operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// The store confirmed the write under its write concern
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Entry point of a store binding.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait StoreClient: Send + Sync {
    /// Handle to a named database
    fn database(&self, name: &str) -> Arc<dyn StoreDatabase>;
}

/// Database handle of a store binding.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait StoreDatabase: Send + Sync {
    fn name(&self) -> String;

    /// Handle to a named collection
    fn collection(&self, name: &str) -> Arc<dyn StoreCollection>;
}

/// Collection handle of a store binding.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StoreCollection: Send + Sync {
    /// Fully qualified name (`db.collection`)
    fn namespace(&self) -> String;

    async fn insert_one(&self, document: Document, options: WriteOptions) -> AppResult<()>;

    /// Replace the first document matching `filter`. Never upserts.
    async fn replace_one(
        &self,
        filter: Document,
        replacement: Document,
        options: WriteOptions,
    ) -> AppResult<ReplaceOutcome>;

    async fn find_one(&self, filter: Document) -> AppResult<Option<Document>>;

    async fn find(&self, filter: Document, options: FindOptions) -> AppResult<DocumentCursor>;
}
