//! Object-created event notifications.

use serde_json::Value;
use thiserror::Error;

/// Errors for notifications that do not name an object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("Invalid event structure")]
    InvalidStructure,

    #[error("Missing key in event data: '{0}'")]
    MissingKey(&'static str),
}

/// The object a notification reports, taken from its first record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectCreated {
    pub bucket: String,
    /// Object key exactly as received.
    pub key: String,
}

/// Parses a notification of the form
/// `{"Records":[{"s3":{"bucket":{"name":..},"object":{"key":..}}}]}`.
///
/// Only the first record is used. A body that is not a JSON object, or whose
/// `Records` is absent, empty or not an array, is an invalid structure. Fields
/// are looked up in the order `s3`, `bucket`, `name`, `object`, `key` and the
/// first missing one is reported.
pub fn parse_event(body: &[u8]) -> Result<ObjectCreated, EventError> {
    let event: Value = serde_json::from_slice(body).map_err(|_| EventError::InvalidStructure)?;

    let record = event
        .get("Records")
        .and_then(Value::as_array)
        .and_then(|records| records.first())
        .ok_or(EventError::InvalidStructure)?;

    let s3 = field(record, "s3")?;
    let bucket = string_field(field(s3, "bucket")?, "name")?;
    let key = string_field(field(s3, "object")?, "key")?;

    Ok(ObjectCreated { bucket, key })
}

fn field<'a>(value: &'a Value, name: &'static str) -> Result<&'a Value, EventError> {
    value.get(name).ok_or(EventError::MissingKey(name))
}

fn string_field(value: &Value, name: &'static str) -> Result<String, EventError> {
    field(value, name)?
        .as_str()
        .map(str::to_owned)
        .ok_or(EventError::InvalidStructure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_record() {
        let body = br#"{
            "Records": [
                { "s3": { "bucket": { "name": "landing" }, "object": { "key": "people/LOAD0001.csv" } } },
                { "s3": { "bucket": { "name": "other" }, "object": { "key": "ignored.csv" } } }
            ]
        }"#;

        assert_eq!(
            parse_event(body).unwrap(),
            ObjectCreated {
                bucket: "landing".to_string(),
                key: "people/LOAD0001.csv".to_string(),
            }
        );
    }

    #[test]
    fn test_keys_are_not_decoded() {
        let body = br#"{"Records":[{"s3":{"bucket":{"name":"b"},"object":{"key":"a+b%3D.csv"}}}]}"#;

        assert_eq!(parse_event(body).unwrap().key, "a+b%3D.csv");
    }

    #[test]
    fn test_invalid_structure() {
        let bodies: [&[u8]; 6] = [
            b"not json",
            b"[]",
            b"{}",
            br#"{"Records":[]}"#,
            br#"{"Records":{}}"#,
            br#"{"Records":[{"s3":{"bucket":{"name":7},"object":{"key":"k"}}}]}"#,
        ];

        for body in bodies {
            assert_eq!(parse_event(body), Err(EventError::InvalidStructure));
        }
    }

    #[test]
    fn test_missing_keys_are_named() {
        let cases: [(&[u8], &str); 5] = [
            (br#"{"Records":[{}]}"#, "s3"),
            (br#"{"Records":[{"s3":{"object":{"key":"k"}}}]}"#, "bucket"),
            (br#"{"Records":[{"s3":{"bucket":{},"object":{"key":"k"}}}]}"#, "name"),
            (br#"{"Records":[{"s3":{"bucket":{"name":"b"}}}]}"#, "object"),
            (br#"{"Records":[{"s3":{"bucket":{"name":"b"},"object":{}}}]}"#, "key"),
        ];

        for (body, missing) in cases {
            assert_eq!(parse_event(body), Err(EventError::MissingKey(missing)));
        }

        assert_eq!(
            EventError::MissingKey("key").to_string(),
            "Missing key in event data: 'key'"
        );
    }
}
