//! Entity capability shared by every persisted record.

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// Document field holding the entity identifier
pub const ID_FIELD: &str = "_id";

/// A persisted record with a unique identifier.
///
/// Implementors serialize their id into [`ID_FIELD`] as a BSON UUID binary,
/// usually with `#[serde(rename = "_id", with = "bson::serde_helpers::uuid_1_as_binary")]`,
/// so that id filters built by the repositories match stored documents.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Unique identifier of the record
    fn id(&self) -> Uuid;

    /// Whether the identifier has been assigned
    fn has_id(&self) -> bool {
        !self.id().is_nil()
    }
}
