//! JSON envelopes: every payload travels under a named key such as
//! `{"ticket": {...}}` or `{"tickets": [...], "next_page": "..."}`.

use crate::error::{ApiError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NEXT_PAGE: &str = "next_page";
const PREVIOUS_PAGE: &str = "previous_page";
const COUNT: &str = "count";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    fields: Map<String, Value>,
}

impl Envelope {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Place `value` under `key`. Use the singular key for one resource and the
    /// plural key for a batch.
    pub fn wrap<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| ApiError::Encoding(format!("`{key}` payload: {e}")))?;
        let mut fields = Map::new();
        fields.insert(key.to_string(), value);
        Ok(Self { fields })
    }

    /// Parse a response body. Anything but a JSON object is a protocol error.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }
        match serde_json::from_slice(body) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(other) => Err(ApiError::Protocol(format!(
                "expected a JSON object, got {}",
                kind(&other)
            ))),
            Err(e) => Err(ApiError::Protocol(format!("invalid JSON body: {e}"))),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| !v.is_null())
    }

    /// Decode the resource the endpoint guarantees under `key`.
    pub fn single<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.take(key)?
            .ok_or_else(|| ApiError::Protocol(format!("response is missing the `{key}` key")))
    }

    /// Decode the collection under `key`.
    pub fn collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        self.single(key)
    }

    /// Decode `key` when present; `None` if the key is missing or `null`.
    pub fn take<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| ApiError::Protocol(format!("malformed `{key}`: {e}"))),
        }
    }

    pub fn next_page(&self) -> Option<&str> {
        self.str_field(NEXT_PAGE)
    }

    pub fn previous_page(&self) -> Option<&str> {
        self.str_field(PREVIOUS_PAGE)
    }

    pub fn count(&self) -> Option<u64> {
        self.fields.get(COUNT).and_then(Value::as_u64)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.fields).map_err(|e| ApiError::Encoding(e.to_string()))
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use serde_json::json;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        #[serde(default, skip_serializing_if = "Field::is_absent")]
        id: Field<u64>,
        #[serde(default, skip_serializing_if = "Field::is_absent")]
        name: Field<String>,
    }

    #[test]
    fn test_wrap_uses_single_key() {
        let item = Item {
            name: "printer".into(),
            ..Default::default()
        };
        let envelope = Envelope::wrap("item", &item).unwrap();
        let body: Value = serde_json::from_slice(&envelope.to_vec().unwrap()).unwrap();
        assert_eq!(body, json!({"item": {"name": "printer"}}));
    }

    #[test]
    fn test_wrap_then_unwrap_preserves_presence() {
        let item = Item {
            id: Field::Null,
            name: "printer".into(),
        };
        let envelope = Envelope::wrap("item", &item).unwrap();
        let reparsed = Envelope::from_slice(&envelope.to_vec().unwrap()).unwrap();
        assert_eq!(reparsed.single::<Item>("item").unwrap(), item);

        let batch = vec![Item::default(), item.clone()];
        let envelope = Envelope::wrap("items", &batch).unwrap();
        assert!(!envelope.contains("item"));
        assert_eq!(envelope.collection::<Item>("items").unwrap(), batch);
    }

    #[test]
    fn test_missing_key_is_protocol_error() {
        let envelope = Envelope::from_slice(br#"{"other": {}}"#).unwrap();
        let err = envelope.single::<Item>("item").unwrap_err();
        assert!(matches!(err, ApiError::Protocol(msg) if msg.contains("`item`")));

        let envelope = Envelope::from_slice(br#"{"item": null}"#).unwrap();
        assert!(matches!(
            envelope.single::<Item>("item"),
            Err(ApiError::Protocol(_))
        ));
    }

    #[test]
    fn test_non_object_bodies() {
        assert_eq!(Envelope::from_slice(b"  ").unwrap(), Envelope::empty());
        assert!(matches!(
            Envelope::from_slice(b"[1,2]"),
            Err(ApiError::Protocol(msg)) if msg.contains("an array")
        ));
        assert!(matches!(
            Envelope::from_slice(b"<html>"),
            Err(ApiError::Protocol(_))
        ));
    }

    #[test]
    fn test_pagination_metadata() {
        let envelope = Envelope::from_slice(
            br#"{"items": [], "next_page": "https://x.example.com/api?page=2", "previous_page": null, "count": 42}"#,
        )
        .unwrap();
        assert_eq!(envelope.next_page(), Some("https://x.example.com/api?page=2"));
        assert_eq!(envelope.previous_page(), None);
        assert_eq!(envelope.count(), Some(42));
    }

    #[test]
    fn test_malformed_resource_is_protocol_error() {
        let envelope = Envelope::from_slice(br#"{"item": {"id": "abc"}}"#).unwrap();
        assert!(matches!(
            envelope.single::<Item>("item"),
            Err(ApiError::Protocol(msg)) if msg.contains("malformed")
        ));
    }
}
