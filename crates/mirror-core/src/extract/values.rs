//! Lookup primitives over parsed records.
//!
//! All lookups are lenient: a key that is absent, or a record that is not an
//! object, yields nothing rather than an error.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::Result;
use crate::error::ExtractionError;

/// Values of the requested top-level keys, in the record's own key order.
pub fn get_values<'a>(record: &'a Value, keys: &[&str]) -> Vec<&'a Value> {
    entries(record, keys).map(|(_, value)| value).collect()
}

/// Value of a single top-level key.
pub fn get_value<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    get_values(record, &[key]).into_iter().next()
}

/// String value of a single top-level key.
pub fn get_str<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    get_value(record, key).and_then(Value::as_str)
}

/// First element of the array stored under `key`.
pub fn first_in<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    get_value(record, key)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
}

/// Values of the requested dotted keys, in the record's own key order.
///
/// Each key may descend with `.`; see [`get_nested_value`].
pub fn get_nested_values(record: &Value, keys: &[&str]) -> Vec<Value> {
    let Some(object) = record.as_object() else {
        return Vec::new();
    };

    let mut values = Vec::new();
    for object_key in object.keys() {
        for key in keys {
            let head = key.split_once('.').map_or(*key, |(head, _)| head);
            if head == object_key.as_str() {
                if let Some(value) = get_nested_value(record, key) {
                    values.push(value);
                }
            }
        }
    }
    values
}

/// Resolve one dotted key.
///
/// When the segment before the first `.` holds an array, the rest of the path
/// is resolved against every element and the results are flattened one level
/// into a single array; elements missing the path are left out. A missing
/// segment anywhere yields `None`.
pub fn get_nested_value(record: &Value, dotted_key: &str) -> Option<Value> {
    let Some((head, rest)) = dotted_key.split_once('.') else {
        return get_value(record, dotted_key).cloned();
    };

    match get_value(record, head)? {
        Value::Array(items) => {
            let mut flattened = Vec::new();
            for item in items {
                match get_nested_value(item, rest) {
                    Some(Value::Array(inner)) => flattened.extend(inner),
                    Some(value) => flattened.push(value),
                    None => {}
                }
            }
            Some(Value::Array(flattened))
        }
        value => get_nested_value(value, rest),
    }
}

/// Append one typed row per record, built from only `fields`.
///
/// Fields a record lacks are left to the row type's defaults.
pub fn populate_array<T: DeserializeOwned>(
    target: &mut Vec<T>,
    records: &Value,
    fields: &[&str],
) -> Result<()> {
    let Some(records) = records.as_array() else {
        return Ok(());
    };

    target.reserve(records.len());
    for record in records {
        let row: Map<String, Value> = entries(record, fields)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let item = serde_json::from_value(Value::Object(row)).map_err(|e| {
            ExtractionError::Shape {
                field: fields.join(","),
                reason: e.to_string(),
            }
        })?;
        target.push(item);
    }
    Ok(())
}

/// Elements of an array value, or nothing.
pub fn rows(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

fn entries<'a, 'k>(
    record: &'a Value,
    keys: &'k [&'k str],
) -> impl Iterator<Item = (&'a String, &'a Value)> + use<'a, 'k> {
    record
        .as_object()
        .into_iter()
        .flat_map(|object| object.iter())
        .filter(move |(key, _)| keys.iter().any(|wanted| *wanted == key.as_str()))
}
