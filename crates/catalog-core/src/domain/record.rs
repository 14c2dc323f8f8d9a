use serde::{Deserialize, Serialize};

/// One entry of the registry.
///
/// `id` is the unique key. `price` is taken as given; the store performs no
/// validation on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub price: f64,
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// Zero-based index of a record in the insertion-ordered sequence.
///
/// `-1` is the sentinel for "duplicate on insert" and "absent on query";
/// it is a valid result, not an error.
pub type Position = i64;

/// Sentinel returned for duplicate inserts and missing queries.
pub const NOT_FOUND: Position = -1;

/// Linear scan for `id`. Returns the index or [`NOT_FOUND`].
pub fn position_of(records: &[Record], id: &str) -> Position {
    records
        .iter()
        .position(|r| r.id == id)
        .map_or(NOT_FOUND, |idx| idx as Position)
}
