//! Repositories Library
//!
//! Typed CRUD access to document-store collections.
//!
//! # Layers
//!
//! - **store**: store binding traits plus the MongoDB and in-memory bindings
//! - **query**: filter and sort values rendered for the store
//! - **repository**: the generic repository and the person repository
//! - **cancellation**: cancellation of in-flight store calls
//!
//! # Usage
//!
//! ```ignore
//! let settings = MongoSettings::from_env();
//! let store = Arc::new(MongoStore::connect(&settings).await?);
//! let persons = PersonStore::new(store, &settings, Arc::new(TracingErrorLogger::default()))?;
//!
//! if persons.create(Person::new("Ada", "Lovelace", 36), None).await {
//!     let adults = persons.find_adult_persons(None).await?;
//! }
//! ```

pub mod cancellation;
pub mod query;
pub mod repository;
pub mod store;

pub use cancellation::{with_cancellation, CancellationToken};
pub use query::{Filter, Sort};
pub use repository::{adult_filter, MongoRepository, PersonRepository, PersonStore, Repository};
pub use store::{MemoryStore, MongoStore, StoreClient, StoreCollection, StoreDatabase};
