use serde::Serializer;
use serde::ser::SerializeMap;

use super::model::FieldValue;

/// Serialize ordered `(key, value)` pairs as a map, preserving order.
pub fn serialize_fields_as_map<S>(fields: &[(String, FieldValue)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (k, v) in fields {
        map.serialize_entry(k, v)?;
    }
    map.end()
}
