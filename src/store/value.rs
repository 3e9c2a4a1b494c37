use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::store::timestamp::Timestamp;

/// The decoded fields of a single document.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A single document field value.
///
/// `ServerTimestamp` is a write-time sentinel: the store replaces it with the
/// timestamp it assigns to the write, so it never appears in a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Timestamp(Timestamp),
    String(String),
    ServerTimestamp,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            FieldValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    /// Total order over snapshot values, used when sorting query results.
    ///
    /// Values of different kinds order by type rank (null < boolean <
    /// integer < timestamp < string); the sentinel has no defined position
    /// in a snapshot and sorts first.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Boolean(left), FieldValue::Boolean(right)) => left.cmp(right),
            (FieldValue::Integer(left), FieldValue::Integer(right)) => left.cmp(right),
            (FieldValue::Timestamp(left), FieldValue::Timestamp(right)) => left.cmp(right),
            (FieldValue::String(left), FieldValue::String(right)) => left.cmp(right),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            FieldValue::ServerTimestamp => 0,
            FieldValue::Null => 1,
            FieldValue::Boolean(_) => 2,
            FieldValue::Integer(_) => 3,
            FieldValue::Timestamp(_) => 4,
            FieldValue::String(_) => 5,
        }
    }
}
