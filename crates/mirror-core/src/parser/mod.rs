//! Parsing of decoded entry text into one value shape.
//!
//! Tabular entries (delimited text with a header row) become an array of
//! row objects keyed by header name, in column order. Hierarchical entries
//! are parsed as-is into nested objects and arrays.

pub mod text;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::ParseError;
use crate::models::config::ExtractionConfig;

pub use text::{repair_double_encoding, repair_value};

/// Result type for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Source shape of a provider's export entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Delimited text with a header row (CSV).
    Tabular,
    /// Nested structured text (JSON).
    Hierarchical,
}

/// Parses entry text according to a [`SourceFormat`].
#[derive(Debug, Clone)]
pub struct ParserAdapter {
    repair_encoding: bool,
}

impl ParserAdapter {
    pub fn new() -> Self {
        Self {
            repair_encoding: true,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_encoding_repair(config.repair_double_encoding)
    }

    /// Set double-encoding repair of parsed strings.
    pub fn with_encoding_repair(mut self, repair: bool) -> Self {
        self.repair_encoding = repair;
        self
    }

    /// Parse text into a value.
    pub fn parse(&self, text: &str, format: SourceFormat) -> Result<Value> {
        let mut value = match format {
            SourceFormat::Tabular => parse_tabular(text)?,
            SourceFormat::Hierarchical => serde_json::from_str(text)?,
        };

        if self.repair_encoding {
            repair_value(&mut value);
        }

        Ok(value)
    }
}

impl Default for ParserAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse CSV with a header row into an array of row objects.
///
/// Every cell stays a string. Short rows simply lack the trailing columns;
/// cells beyond the header are dropped.
pub fn parse_tabular(text: &str) -> Result<Value> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(Value::Object(row));
    }

    trace!("Parsed {} tabular rows", rows.len());
    Ok(Value::Array(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_tabular_rows() {
        let text = "id,permalink,date,subreddit\n\
                    c1,/r/rust/comments/a,2021-03-04 12:00:00 UTC,rust\n\
                    c2,\"/r/learnprogramming/comments/b\",2021-03-05 08:30:00 UTC,learnprogramming\n";

        let value = ParserAdapter::new().parse(text, SourceFormat::Tabular).unwrap();

        assert_eq!(
            value,
            json!([
                {"id": "c1", "permalink": "/r/rust/comments/a", "date": "2021-03-04 12:00:00 UTC", "subreddit": "rust"},
                {"id": "c2", "permalink": "/r/learnprogramming/comments/b", "date": "2021-03-05 08:30:00 UTC", "subreddit": "learnprogramming"}
            ])
        );
        let keys: Vec<_> = value[0].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "permalink", "date", "subreddit"]);
    }

    #[test]
    fn test_parse_tabular_short_rows_and_empty() {
        let value = parse_tabular("a,b,c\n1,2\n").unwrap();
        assert_eq!(value, json!([{"a": "1", "b": "2"}]));

        assert_eq!(parse_tabular("a,b\n").unwrap(), json!([]));
        assert_eq!(parse_tabular("").unwrap(), json!([]));
    }

    #[test]
    fn test_parse_hierarchical() {
        let text = r#"{"ig_stories": [{"creation_timestamp": 1700000000, "title": ""}]}"#;

        let value = ParserAdapter::new()
            .parse(text, SourceFormat::Hierarchical)
            .unwrap();

        assert_eq!(value["ig_stories"][0]["creation_timestamp"], 1700000000);
    }

    #[test]
    fn test_parse_repairs_encoding_when_enabled() {
        let text = r#"{"name": "JosÃ©"}"#;

        let repaired = ParserAdapter::new()
            .parse(text, SourceFormat::Hierarchical)
            .unwrap();
        assert_eq!(repaired["name"], "José");

        let raw = ParserAdapter::new()
            .with_encoding_repair(false)
            .parse(text, SourceFormat::Hierarchical)
            .unwrap();
        assert_eq!(raw["name"], "Jos\u{00c3}\u{00a9}");
    }

    #[test]
    fn test_malformed_json() {
        let err = ParserAdapter::new()
            .parse("{\"a\": ", SourceFormat::Hierarchical)
            .unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }
}
