//! Tri-state resource fields.
//!
//! Every resource attribute is a [`Field`], which keeps apart a value the API
//! never sent (or the caller does not want to send) from one explicitly set to
//! `null`. Resource structs pair it with
//! `#[serde(default, skip_serializing_if = "Field::is_absent")]` so that:
//!
//! * a key missing from a response decodes to [`Field::Absent`],
//! * `"key": null` decodes to [`Field::Null`],
//! * only non-absent fields are written to request bodies.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Field<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Value(v) => Field::Value(v),
        }
    }

    /// The value, if one was set. `Absent` and `Null` both map to `None`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Field<U> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Value(v) => Field::Value(f(v)),
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl From<&str> for Field<String> {
    fn from(value: &str) -> Self {
        Field::Value(value.to_string())
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => v.serialize(serializer),
            // Absent is normally skipped by the container attribute.
            Field::Absent | Field::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Field::Value(v),
            None => Field::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(default, skip_serializing_if = "Field::is_absent")]
        status: Field<String>,
        #[serde(default, skip_serializing_if = "Field::is_absent")]
        assignee_id: Field<u64>,
        #[serde(default, skip_serializing_if = "Field::is_absent")]
        tags: Field<Vec<String>>,
    }

    #[test]
    fn test_absent_fields_are_not_serialized() {
        let sample = Sample {
            status: "solved".into(),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&sample).unwrap(), json!({"status": "solved"}));
    }

    #[test]
    fn test_null_is_serialized_as_null() {
        let sample = Sample {
            assignee_id: Field::Null,
            tags: Field::Value(vec![]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&sample).unwrap(),
            json!({"assignee_id": null, "tags": []})
        );
    }

    #[test]
    fn test_decode_distinguishes_missing_from_null() {
        let sample: Sample =
            serde_json::from_value(json!({"assignee_id": null, "tags": ["vip"]})).unwrap();
        assert_eq!(sample.status, Field::Absent);
        assert_eq!(sample.assignee_id, Field::Null);
        assert_eq!(sample.tags, Field::Value(vec!["vip".to_string()]));
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let result: Result<Sample, _> = serde_json::from_value(json!({"assignee_id": "nope"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_accessors() {
        let field: Field<u64> = 7.into();
        assert_eq!(field.value(), Some(&7));
        assert_eq!(field.as_ref().map(|v| v * 2), Field::Value(14));
        assert!(Field::<u64>::Null.is_present());
        assert_eq!(Field::<u64>::Null.into_option(), None);
        assert!(Field::<u64>::default().is_absent());
    }
}
