//! Evaluation of MongoDB query and sort documents against in-memory documents.
//!
//! Supports the subset of the query language produced by
//! [`Filter`](crate::query::Filter): implicit equality, `$eq`, `$ne`, `$gt`,
//! `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$exists`, `$and`, `$or` and dotted
//! field paths.

use std::cmp::Ordering;

use bson::{Bson, Document};

use common::{AppError, AppResult};

/// Check whether `document` satisfies `filter`.
pub(crate) fn matches(document: &Document, filter: &Document) -> AppResult<bool> {
    for (key, condition) in filter {
        let satisfied = match key.as_str() {
            "$and" => all_clauses(document, clauses(key, condition)?)?,
            "$or" => any_clause(document, clauses(key, condition)?)?,
            op if op.starts_with('$') => {
                return Err(AppError::validation(format!(
                    "unsupported top-level operator {}",
                    op
                )))
            }
            field => field_matches(lookup(document, field), condition)?,
        };

        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Order two documents according to a sort document.
pub(crate) fn compare_by(left: &Document, right: &Document, sort: &Document) -> Ordering {
    for (field, direction) in sort {
        let ordering = compare_optional(lookup(left, field), lookup(right, field));
        let ordering = if is_descending(direction) {
            ordering.reverse()
        } else {
            ordering
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn clauses<'a>(op: &str, condition: &'a Bson) -> AppResult<&'a Vec<Bson>> {
    match condition {
        Bson::Array(clauses) => Ok(clauses),
        _ => Err(AppError::validation(format!("{} expects an array", op))),
    }
}

fn all_clauses(document: &Document, clauses: &[Bson]) -> AppResult<bool> {
    for clause in clauses {
        if !matches(document, clause_document(clause)?)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_clause(document: &Document, clauses: &[Bson]) -> AppResult<bool> {
    for clause in clauses {
        if matches(document, clause_document(clause)?)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn clause_document(clause: &Bson) -> AppResult<&Document> {
    clause
        .as_document()
        .ok_or_else(|| AppError::validation("logical clauses must be documents"))
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> AppResult<bool> {
    match condition {
        Bson::Document(operators) if is_operator_document(operators) => {
            for (op, operand) in operators {
                if !operator_matches(value, op, operand)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        expected => Ok(equals(value, expected)),
    }
}

fn operator_matches(value: Option<&Bson>, op: &str, operand: &Bson) -> AppResult<bool> {
    let satisfied = match op {
        "$eq" => equals(value, operand),
        "$ne" => !equals(value, operand),
        "$gt" => ordered(value, operand, |o| o == Ordering::Greater),
        "$gte" => ordered(value, operand, |o| o != Ordering::Less),
        "$lt" => ordered(value, operand, |o| o == Ordering::Less),
        "$lte" => ordered(value, operand, |o| o != Ordering::Greater),
        "$in" => clauses(op, operand)?.iter().any(|candidate| equals(value, candidate)),
        "$nin" => !clauses(op, operand)?.iter().any(|candidate| equals(value, candidate)),
        "$exists" => value.is_some() == truthy(operand),
        other => {
            return Err(AppError::validation(format!(
                "unsupported query operator {}",
                other
            )))
        }
    };
    Ok(satisfied)
}

fn is_operator_document(document: &Document) -> bool {
    document.keys().next().is_some_and(|key| key.starts_with('$'))
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_document()?.get(segment)?;
    }
    Some(current)
}

fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
    match (value, expected) {
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(actual), expected) => compare_values(actual, expected) == Some(Ordering::Equal),
    }
}

/// Comparison operators only match values of comparable types.
fn ordered(value: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    value
        .and_then(|actual| compare_values(actual, operand))
        .is_some_and(accept)
}

fn compare_values(left: &Bson, right: &Bson) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (as_number(left), as_number(right)) {
        return l.partial_cmp(&r);
    }

    match (left, right) {
        (Bson::String(l), Bson::String(r)) => Some(l.cmp(r)),
        (Bson::Boolean(l), Bson::Boolean(r)) => Some(l.cmp(r)),
        (Bson::DateTime(l), Bson::DateTime(r)) => Some(l.cmp(r)),
        (Bson::ObjectId(l), Bson::ObjectId(r)) => Some(l.cmp(r)),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        (l, r) if l == r => Some(Ordering::Equal),
        _ => None,
    }
}

fn compare_optional(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(l), Some(r)) => compare_values(l, r).unwrap_or_else(|| type_rank(l).cmp(&type_rank(r))),
    }
}

/// Cross-type ordering for sorts, following MongoDB's BSON comparison order.
fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::Null => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        _ => 12,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn is_descending(direction: &Bson) -> bool {
    as_number(direction).is_some_and(|d| d < 0.0)
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Null => false,
        other => as_number(other).map_or(true, |n| n != 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    use crate::query::{Filter, Sort};

    #[test]
    fn test_gte_matches_boundary() {
        let filter = Filter::gte("age", 18).into_document();

        assert!(!matches(&doc! { "age": 17 }, &filter).unwrap());
        assert!(matches(&doc! { "age": 18 }, &filter).unwrap());
        assert!(matches(&doc! { "age": 65_i64 }, &filter).unwrap());
    }

    #[test]
    fn test_missing_field_fails_comparison() {
        let filter = Filter::gte("age", 18).into_document();

        assert!(!matches(&doc! { "name": "x" }, &filter).unwrap());
    }

    #[test]
    fn test_implicit_equality_and_dotted_path() {
        let document = doc! { "address": { "city": "Oslo" }, "age": 30 };

        assert!(matches(&document, &doc! { "address.city": "Oslo", "age": 30.0 }).unwrap());
        assert!(!matches(&document, &doc! { "address.city": "Bergen" }).unwrap());
    }

    #[test]
    fn test_logical_operators() {
        let document = doc! { "age": 40, "last_name": "Doe" };
        let either = Filter::or([Filter::lt("age", 18), Filter::eq("last_name", "Doe")]);
        let both = Filter::and([Filter::lt("age", 18), Filter::eq("last_name", "Doe")]);

        assert!(matches(&document, either.as_document()).unwrap());
        assert!(!matches(&document, both.as_document()).unwrap());
    }

    #[test]
    fn test_set_and_existence_operators() {
        let document = doc! { "age": 20 };

        assert!(matches(&document, Filter::any_of("age", [20, 21]).as_document()).unwrap());
        assert!(!matches(&document, Filter::none_of("age", [20]).as_document()).unwrap());
        assert!(matches(&document, Filter::exists("email", false).as_document()).unwrap());
        assert!(matches(&document, Filter::ne("age", 21).as_document()).unwrap());
    }

    #[test]
    fn test_uuid_equality() {
        let id = uuid::Uuid::new_v4();
        let document = doc! { "_id": bson::Uuid::from(id) };

        assert!(matches(&document, Filter::by_id(id).as_document()).unwrap());
        assert!(!matches(&document, Filter::by_id(uuid::Uuid::new_v4()).as_document()).unwrap());
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let result = matches(&doc! { "age": 1 }, &doc! { "age": { "$regex": "1" } });

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_compare_by_sort_document() {
        let sort = Sort::descending("age").then_ascending("name").into_document();
        let older = doc! { "age": 50, "name": "b" };
        let younger = doc! { "age": 20, "name": "a" };
        let same_age = doc! { "age": 50, "name": "a" };

        assert_eq!(compare_by(&older, &younger, &sort), Ordering::Less);
        assert_eq!(compare_by(&same_age, &older, &sort), Ordering::Less);
    }
}
