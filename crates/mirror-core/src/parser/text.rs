//! Repair of UTF-8 text that was decoded as Latin-1.

use std::borrow::Cow;

use serde_json::Value;

/// Reverse UTF-8-bytes-read-as-Latin-1 double encoding.
///
/// Every char is reinterpreted as one raw byte and the bytes are decoded as
/// UTF-8. Text that is plain ASCII, holds chars above U+00FF, or does not form
/// valid UTF-8 afterwards is returned unchanged.
pub fn repair_double_encoding(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }

    let bytes: Option<Vec<u8>> = text.chars().map(|c| u8::try_from(c).ok()).collect();

    match bytes.and_then(|b| String::from_utf8(b).ok()) {
        Some(repaired) => Cow::Owned(repaired),
        None => Cow::Borrowed(text),
    }
}

/// Apply [`repair_double_encoding`] to every string in a value tree, keys included.
pub fn repair_value(value: &mut Value) {
    match value {
        Value::String(s) => {
            let repaired = match repair_double_encoding(s) {
                Cow::Owned(repaired) => Some(repaired),
                Cow::Borrowed(_) => None,
            };
            if let Some(repaired) = repaired {
                *s = repaired;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(repair_value),
        Value::Object(map) => {
            let entries = std::mem::take(map);
            for (key, mut item) in entries {
                repair_value(&mut item);
                map.insert(repair_double_encoding(&key).into_owned(), item);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
