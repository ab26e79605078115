//! Store configuration loaded from environment variables.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

// =============================================================================
// Defaults
// =============================================================================

/// Default MongoDB connection string
pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";

/// Default database name
pub const DEFAULT_MONGO_DB_NAME: &str = "people";

/// Default collection name
pub const DEFAULT_MONGO_COLLECTION_NAME: &str = "persons";

// =============================================================================
// Environment variables
// =============================================================================

pub const ENV_MONGO_URI: &str = "MONGO_URI";
pub const ENV_MONGO_DB_NAME: &str = "MONGO_DB_NAME";
pub const ENV_MONGO_COLLECTION_NAME: &str = "MONGO_COLLECTION_NAME";
pub const ENV_MONGO_APP_NAME: &str = "MONGO_APP_NAME";

/// Document store settings.
///
/// `db_name` and `collection_name` address the collection a repository works
/// on. `uri` and `app_name` are only read when opening a client.
#[derive(Clone, Deserialize, Serialize)]
pub struct MongoSettings {
    #[serde(skip_serializing)]
    pub uri: String,
    pub db_name: String,
    pub collection_name: String,
    #[serde(default)]
    pub app_name: Option<String>,
}

impl std::fmt::Debug for MongoSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoSettings")
            .field("uri", &"[REDACTED]")
            .field("db_name", &self.db_name)
            .field("collection_name", &self.collection_name)
            .field("app_name", &self.app_name)
            .finish()
    }
}

impl MongoSettings {
    /// Create settings for a collection on the default server.
    pub fn new(db_name: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            uri: DEFAULT_MONGO_URI.to_string(),
            db_name: db_name.into(),
            collection_name: collection_name.into(),
            app_name: None,
        }
    }

    /// Load settings from environment variables.
    ///
    /// Missing variables fall back to defaults. Call [`MongoSettings::validate`]
    /// (repositories do) before relying on the names.
    pub fn from_env() -> Self {
        Self {
            uri: env::var(ENV_MONGO_URI).unwrap_or_else(|_| DEFAULT_MONGO_URI.to_string()),
            db_name: env::var(ENV_MONGO_DB_NAME)
                .unwrap_or_else(|_| DEFAULT_MONGO_DB_NAME.to_string()),
            collection_name: env::var(ENV_MONGO_COLLECTION_NAME)
                .unwrap_or_else(|_| DEFAULT_MONGO_COLLECTION_NAME.to_string()),
            app_name: env::var(ENV_MONGO_APP_NAME).ok().filter(|name| !name.is_empty()),
        }
    }

    /// Use a different connection string.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Ensure the collection coordinates are usable.
    pub fn validate(&self) -> AppResult<()> {
        ensure_not_blank(&self.db_name, "db_name")?;
        ensure_not_blank(&self.collection_name, "collection_name")?;
        Ok(())
    }

    /// Fully qualified collection name (`db.collection`)
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.db_name, self.collection_name)
    }
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self::new(DEFAULT_MONGO_DB_NAME, DEFAULT_MONGO_COLLECTION_NAME)
    }
}

fn ensure_not_blank(value: &str, name: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::configuration(format!("{} must not be empty", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = MongoSettings::default();

        assert!(settings.validate().is_ok());
        assert_eq!(settings.namespace(), "people.persons");
    }

    #[test]
    fn test_empty_db_name_rejected() {
        let result = MongoSettings::new("", "persons").validate();

        assert!(matches!(result, Err(AppError::Configuration(msg)) if msg.contains("db_name")));
    }

    #[test]
    fn test_blank_collection_name_rejected() {
        let result = MongoSettings::new("people", "   ").validate();

        assert!(
            matches!(result, Err(AppError::Configuration(msg)) if msg.contains("collection_name"))
        );
    }

    #[test]
    fn test_debug_redacts_uri() {
        let settings = MongoSettings::default().with_uri("mongodb://user:secret@db:27017");
        let output = format!("{:?}", settings);

        assert!(!output.contains("secret"));
        assert!(output.contains("[REDACTED]"));
    }
}
