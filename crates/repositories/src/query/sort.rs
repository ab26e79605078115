//! Sort specifications passed through to the store.

use bson::{Bson, Document};

/// Ordering of find results, rendered as a MongoDB sort document.
///
/// Keys apply in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sort(Document);

impl Sort {
    pub fn ascending(field: &str) -> Self {
        Self::default().then_ascending(field)
    }

    pub fn descending(field: &str) -> Self {
        Self::default().then_descending(field)
    }

    pub fn then_ascending(mut self, field: &str) -> Self {
        self.0.insert(field, Bson::Int32(1));
        self
    }

    pub fn then_descending(mut self, field: &str) -> Self {
        self.0.insert(field, Bson::Int32(-1));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<Sort> for Document {
    fn from(sort: Sort) -> Self {
        sort.into_document()
    }
}
