//! Decoding of raw ledger entities into response-safe records.
//!
//! The entity shape returned by the ledger has drifted across upstream
//! versions, so the key field is resolved through an ordered fallback chain
//! instead of a single strict field. A missing key is propagated as `None`,
//! never an error.

use std::collections::BTreeMap;

use base64::prelude::{Engine, BASE64_STANDARD};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Attribute;

/// One ledger entity as returned over the wire, with every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawEntity {
    pub entity_key: Option<Value>,
    pub key: Option<Value>,
    pub id: Option<Value>,
    pub attributes: Option<Vec<Attribute>>,
    #[serde(deserialize_with = "deserialize_payload")]
    pub payload: Option<Vec<u8>>,
    pub expires_at_block: Option<Value>,
}

/// Payload bytes arrive either base64-encoded or as a plain byte array.
fn deserialize_payload<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(encoded)) => BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(Value::Array(items)) => {
            let mut bytes = Vec::with_capacity(items.len());
            for item in items {
                let byte = item
                    .as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| serde::de::Error::custom("payload element is not a byte"))?;
                bytes.push(byte);
            }
            Ok(Some(bytes))
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "unsupported payload encoding: {}",
            other
        ))),
    }
}

/// Resolves the canonical entity key: `entityKey`, then `key`, then `id`
/// (string-typed only), then an `entityKey` attribute.
pub fn extract_entity_key(entity: &RawEntity) -> Option<String> {
    for candidate in [&entity.entity_key, &entity.key, &entity.id] {
        if let Some(Value::String(key)) = candidate {
            return Some(key.clone());
        }
    }

    entity
        .attributes
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|attr| attr.key == "entityKey")
        .map(|attr| attr.value.clone())
}

/// Decoded entity payload: JSON when it parses, otherwise the raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Json(Value),
    Text(String),
}

/// JSON-friendly projection of a ledger entity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEntity {
    pub entity_key: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub payload: Option<PayloadValue>,
    /// Decimal string so arbitrary-precision block numbers survive JSON.
    pub expires_at_block: Option<String>,
}

pub fn normalize_entity(entity: &RawEntity) -> NormalizedEntity {
    let mut attributes = BTreeMap::new();
    for attr in entity.attributes.as_deref().unwrap_or_default() {
        // duplicate keys: last occurrence wins
        attributes.insert(attr.key.clone(), attr.value.clone());
    }

    let payload = entity.payload.as_deref().map(decode_payload);

    let expires_at_block = match &entity.expires_at_block {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };

    NormalizedEntity {
        entity_key: extract_entity_key(entity),
        attributes,
        payload,
        expires_at_block,
    }
}

/// Two-stage decode that never fails: lossy UTF-8, then JSON with a
/// plain-text fallback.
pub fn decode_payload(bytes: &[u8]) -> PayloadValue {
    let text = String::from_utf8_lossy(bytes).into_owned();
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => PayloadValue::Json(value),
        Err(_) => PayloadValue::Text(text),
    }
}
