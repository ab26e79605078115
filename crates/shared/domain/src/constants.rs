//! Domain-level constants.
//!
//! These constants define business rules shared by entities and queries.

// =============================================================================
// Person
// =============================================================================

/// Minimum age at which a person counts as an adult
pub const ADULT_AGE: i32 = 18;

/// Check if an age qualifies as adult
pub fn is_adult_age(age: i32) -> bool {
    age >= ADULT_AGE
}
