//! Filter values passed through to the store.

use bson::{Bson, Document};
use uuid::Uuid;

use domain::ID_FIELD;

/// Opaque query expression evaluated by the store.
///
/// Built from pure constructor functions and rendered to a BSON document in
/// MongoDB query syntax.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Document);

impl Filter {
    /// Filter matching every document
    pub fn empty() -> Self {
        Self(Document::new())
    }

    /// Use an already rendered query document
    pub fn from_document(document: Document) -> Self {
        Self(document)
    }

    /// Match the document with the given entity id
    pub fn by_id(id: Uuid) -> Self {
        Self::eq(ID_FIELD, bson::Uuid::from(id))
    }

    pub fn eq(field: &str, value: impl Into<Bson>) -> Self {
        Self::operator(field, "$eq", value.into())
    }

    pub fn ne(field: &str, value: impl Into<Bson>) -> Self {
        Self::operator(field, "$ne", value.into())
    }

    pub fn gt(field: &str, value: impl Into<Bson>) -> Self {
        Self::operator(field, "$gt", value.into())
    }

    pub fn gte(field: &str, value: impl Into<Bson>) -> Self {
        Self::operator(field, "$gte", value.into())
    }

    pub fn lt(field: &str, value: impl Into<Bson>) -> Self {
        Self::operator(field, "$lt", value.into())
    }

    pub fn lte(field: &str, value: impl Into<Bson>) -> Self {
        Self::operator(field, "$lte", value.into())
    }

    /// Match documents whose field equals any of `values`
    pub fn any_of<V: Into<Bson>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        Self::operator(field, "$in", Bson::Array(values))
    }

    /// Match documents whose field equals none of `values`
    pub fn none_of<V: Into<Bson>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        Self::operator(field, "$nin", Bson::Array(values))
    }

    pub fn exists(field: &str, exists: bool) -> Self {
        Self::operator(field, "$exists", Bson::Boolean(exists))
    }

    /// Match documents satisfying every filter
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::combine("$and", filters)
    }

    /// Match documents satisfying at least one filter
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::combine("$or", filters)
    }

    /// Conjunction of this filter with another
    pub fn and_also(self, other: Filter) -> Self {
        Self::and([self, other])
    }

    /// Rendered query document
    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    /// Render as relaxed extended JSON
    pub fn to_json(&self) -> String {
        Bson::Document(self.0.clone()).into_relaxed_extjson().to_string()
    }

    fn operator(field: &str, op: &str, value: Bson) -> Self {
        let mut condition = Document::new();
        condition.insert(op, value);
        let mut document = Document::new();
        document.insert(field, condition);
        Self(document)
    }

    fn combine(op: &str, filters: impl IntoIterator<Item = Filter>) -> Self {
        let clauses: Vec<Bson> = filters
            .into_iter()
            .filter(|filter| !filter.0.is_empty())
            .map(|filter| Bson::Document(filter.0))
            .collect();

        if clauses.is_empty() {
            return Self::empty();
        }

        let mut document = Document::new();
        document.insert(op, clauses);
        Self(document)
    }
}

impl From<Document> for Filter {
    fn from(document: Document) -> Self {
        Self::from_document(document)
    }
}

impl From<Filter> for Document {
    fn from(filter: Filter) -> Self {
        filter.into_document()
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_json())
    }
}
