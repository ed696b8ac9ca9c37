use std::collections::BTreeMap;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// SHA-256 of a request payload, hex encoded.
///
/// JSON payloads are canonicalised first (object keys sorted, no
/// insignificant whitespace) so that two encodings of the same document
/// share a fingerprint. Anything else is hashed byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_body(body: &[u8]) -> Self {
        let canonical = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| serde_json::to_vec(&canonicalize(value)).ok());
        let digest = Sha256::digest(canonical.as_deref().unwrap_or(body));
        Self(hex::encode(digest))
    }

    /// Restores a fingerprint that was previously stored with [`Fingerprint::as_str`].
    pub fn from_stored(hex: String) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let sorted: BTreeMap<String, Value> = object
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
