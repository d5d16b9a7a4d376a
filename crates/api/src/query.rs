//! List options and their query string encoding.

use crate::error::{ApiError, Result};
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

/// Page-number pagination shared by every list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Encode an options struct as a query string.
///
/// The value must serialize to a flat object. `null` entries are skipped and
/// arrays are comma-joined; an empty array still emits its key with an empty
/// value. Keys are emitted in sorted order.
pub fn encode<T: Serialize + ?Sized>(options: &T) -> Result<String> {
    let value = serde_json::to_value(options)
        .map_err(|e| ApiError::Encoding(format!("list options: {e}")))?;

    let map = match value {
        Value::Null => return Ok(String::new()),
        Value::Object(map) => map,
        other => {
            return Err(ApiError::Encoding(format!(
                "list options must be a struct, got {other}"
            )))
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        if let Some(rendered) = render(&key, value)? {
            pairs.push((key, rendered));
        }
    }
    pairs.sort();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.extend_pairs(pairs);
    Ok(serializer.finish())
}

fn render(key: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => {
            let parts = items
                .into_iter()
                .map(|item| scalar(key, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(parts.join(",")))
        }
        other => scalar(key, other).map(Some),
    }
}

fn scalar(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ApiError::Encoding(format!(
            "query parameter `{key}` has unsupported value {other}"
        ))),
    }
}
