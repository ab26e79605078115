//! Person repository with age-based queries.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use common::{AppResult, ErrorLogger, MongoSettings};
use domain::person::fields;
use domain::{Person, ADULT_AGE};

use super::base::{MongoRepository, Repository};
use crate::cancellation::CancellationToken;
use crate::query::{Filter, Sort};
use crate::store::{FindOptions, StoreClient};

/// Person repository trait for dependency injection.
#[async_trait]
pub trait PersonRepository: Repository<Person> {
    /// All persons aged 18 or older, in store order
    async fn find_adult_persons(&self, cancel: Option<&CancellationToken>)
        -> AppResult<Vec<Person>>;
}

/// Filter selecting adult persons
pub fn adult_filter() -> Filter {
    Filter::gte(fields::AGE, ADULT_AGE)
}

/// Concrete implementation of PersonRepository
pub struct PersonStore {
    inner: MongoRepository<Person>,
}

impl PersonStore {
    /// Create new repository instance
    pub fn new(
        client: Arc<dyn StoreClient>,
        settings: &MongoSettings,
        logger: Arc<dyn ErrorLogger>,
    ) -> AppResult<Self> {
        Ok(Self {
            inner: MongoRepository::new(client, settings, logger)?,
        })
    }
}

#[async_trait]
impl Repository<Person> for PersonStore {
    async fn create(&self, model: Person, cancel: Option<&CancellationToken>) -> bool {
        self.inner.create(model, cancel).await
    }

    async fn update(&self, model: Person, cancel: Option<&CancellationToken>) -> bool {
        self.inner.update(model, cancel).await
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<Option<Person>> {
        self.inner.find_by_id(id, cancel).await
    }

    async fn find_one(
        &self,
        filter: Filter,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<Option<Person>> {
        self.inner.find_one(filter, cancel).await
    }

    async fn find(
        &self,
        filter: Filter,
        sort: Option<Sort>,
        skip: Option<u64>,
        limit: Option<i64>,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<Vec<Person>> {
        self.inner.find(filter, sort, skip, limit, cancel).await
    }
}

#[async_trait]
impl PersonRepository for PersonStore {
    async fn find_adult_persons(
        &self,
        cancel: Option<&CancellationToken>,
    ) -> AppResult<Vec<Person>> {
        self.inner
            .find_all(adult_filter(), FindOptions::default(), cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::MockErrorLogger;
    use futures::stream::{self, StreamExt};
    use mockall::predicate::eq;

    use crate::store::{
        MockStoreClient, MockStoreCollection, MockStoreDatabase, StoreCollection, StoreDatabase,
    };

    fn store_with(collection: MockStoreCollection) -> PersonStore {
        let collection: Arc<dyn StoreCollection> = Arc::new(collection);
        let mut database = MockStoreDatabase::new();
        database
            .expect_collection()
            .returning(move |_| collection.clone());
        let database: Arc<dyn StoreDatabase> = Arc::new(database);

        let mut client = MockStoreClient::new();
        client
            .expect_database()
            .returning(move |_| database.clone());

        let mut logger = MockErrorLogger::new();
        logger.expect_log_error().never();

        PersonStore::new(
            Arc::new(client),
            &MongoSettings::new("people", "persons"),
            Arc::new(logger),
        )
        .unwrap()
    }

    #[test]
    fn test_adult_filter_renders_gte_18() {
        assert_eq!(adult_filter().to_json(), r#"{"age":{"$gte":18}}"#);
    }

    #[tokio::test]
    async fn test_find_adult_persons_uses_unpaged_adult_filter() {
        let adult = Person::new("Ada", "Lovelace", 36);
        let document = bson::to_document(&adult).unwrap();

        let mut collection = MockStoreCollection::new();
        collection
            .expect_find()
            .withf(|filter, options| {
                Filter::from_document(filter.clone()).to_json() == adult_filter().to_json()
                    && *options == FindOptions::default()
            })
            .times(1)
            .returning(move |_, _| Ok(stream::iter(vec![Ok(document.clone())]).boxed()));

        let store = store_with(collection);
        let found = store.find_adult_persons(None).await.unwrap();

        assert_eq!(found, vec![adult]);
    }

    #[tokio::test]
    async fn test_find_adult_persons_empty() {
        let mut collection = MockStoreCollection::new();
        collection
            .expect_find()
            .with(eq(adult_filter().into_document()), eq(FindOptions::default()))
            .returning(|_, _| Ok(stream::empty().boxed()));

        let store = store_with(collection);

        assert!(store.find_adult_persons(None).await.unwrap().is_empty());
    }
}
