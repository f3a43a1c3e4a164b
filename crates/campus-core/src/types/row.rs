//! The row representation exchanged with the data store.
//!
//! Rows are plain JSON objects; entities convert to and from rows with
//! serde so the store contract stays schema-free.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;
use crate::result::AppResult;

/// A single table row: a JSON object keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Serialize an entity into a row.
///
/// Fails if the entity does not serialize to a JSON object.
pub fn to_row<T: Serialize>(entity: &T) -> AppResult<Row> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::internal(format!(
            "entity serialized to {other:?}, expected an object"
        ))),
    }
}

/// Deserialize a row into a typed entity.
pub fn from_row<T: DeserializeOwned>(row: Row) -> AppResult<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Deserialize a sequence of rows into typed entities, preserving order.
pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> AppResult<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_row_roundtrip() {
        let sample = Sample {
            name: "orientation".to_string(),
            count: 3,
        };
        let row = to_row(&sample).expect("to_row");
        assert_eq!(row.get("name").and_then(Value::as_str), Some("orientation"));
        let back: Sample = from_row(row).expect("from_row");
        assert_eq!(back, sample);
    }

    #[test]
    fn test_non_object_is_rejected() {
        let result = to_row(&42u32);
        assert!(result.is_err());
    }
}
