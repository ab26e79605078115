//! Person domain entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::is_adult_age;
use crate::entity::Entity;

/// Document field names used when querying persons
pub mod fields {
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const AGE: &str = "age";
}

/// Person domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "_id", with = "bson::serde_helpers::uuid_1_as_binary")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

impl Person {
    /// Create a new person with a freshly generated id
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, age: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
        }
    }

    /// Check if the person is an adult
    pub fn is_adult(&self) -> bool {
        is_adult_age(self.age)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Person {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::spec::BinarySubtype;
    use bson::Bson;

    #[test]
    fn test_new_person_has_id() {
        let person = Person::new("Ada", "Lovelace", 36);

        assert!(person.has_id());
        assert_eq!(person.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_is_adult_boundary() {
        assert!(!Person::new("A", "B", 17).is_adult());
        assert!(Person::new("A", "B", 18).is_adult());
        assert!(Person::new("A", "B", 65).is_adult());
    }

    #[test]
    fn test_id_serializes_as_uuid_binary() {
        let person = Person::new("Grace", "Hopper", 85);
        let document = bson::to_document(&person).unwrap();

        match document.get("_id") {
            Some(Bson::Binary(binary)) => {
                assert_eq!(binary.subtype, BinarySubtype::Uuid);
                assert_eq!(binary.bytes, person.id.as_bytes().to_vec());
            }
            other => panic!("unexpected _id value: {:?}", other),
        }
        assert_eq!(document.get_i32(fields::AGE).unwrap(), 85);
        assert_eq!(document.get_str(fields::FIRST_NAME).unwrap(), "Grace");
    }

    #[test]
    fn test_document_roundtrip_preserves_person() {
        let person = Person::new("Alan", "Turing", 41);
        let document = bson::to_document(&person).unwrap();
        let restored: Person = bson::from_document(document).unwrap();

        assert_eq!(restored, person);
    }

    #[test]
    fn test_nil_id_is_reported() {
        let mut person = Person::new("No", "Id", 30);
        person.id = Uuid::nil();

        assert!(!person.has_id());
    }
}
