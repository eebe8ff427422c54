//! Vault response shapes and the values extracted from them.

use crate::error::{VaultError, VaultResult};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Raw response of a logical read, before any engine-specific unwrapping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSecret {
    /// Response body `data` field, shape depends on the engine
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    /// Non-fatal warnings attached by Vault
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
    /// Lease ID, empty for static secrets
    #[serde(default)]
    pub lease_id: String,
    /// Lease duration in seconds
    #[serde(default)]
    pub lease_duration: u64,
    /// Whether the lease is renewable
    #[serde(default)]
    pub renewable: bool,
}

impl RawSecret {
    /// Build a response carrying only a `data` object.
    #[must_use]
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Warnings, or an empty slice.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        self.warnings.as_deref().unwrap_or_default()
    }
}

/// Flat field map of one secret.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretEntry {
    fields: Map<String, Value>,
}

impl SecretEntry {
    /// Wrap an extracted payload.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Field value as a string.
    ///
    /// Strings are returned as-is, other JSON values as compact JSON text.
    /// Absent and `null` fields yield `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the entry has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Response of `auth/token/lookup-self`.
///
/// Fields decode on demand: the TTL on every tick, the renewable flag only
/// when a renewal is due.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenLookup {
    /// Token metadata
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl TokenLookup {
    /// Build a lookup response from its two meaningful fields.
    #[must_use]
    pub fn new(ttl: impl Into<Value>, renewable: bool) -> Self {
        let mut data = Map::new();
        data.insert("ttl".to_string(), ttl.into());
        data.insert("renewable".to_string(), Value::Bool(renewable));
        Self { data }
    }

    /// Remaining TTL in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::TtlDecode`] when the field is missing or not an
    /// integer.
    pub fn ttl(&self) -> VaultResult<i64> {
        match self.data.get("ttl") {
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| VaultError::TtlDecode(format!("{n} is not an integer"))),
            Some(Value::String(s)) => s
                .parse()
                .map_err(|e| VaultError::TtlDecode(format!("{s:?}: {e}"))),
            Some(other) => Err(VaultError::TtlDecode(format!("unexpected value {other}"))),
            None => Err(VaultError::TtlDecode("ttl field missing".to_string())),
        }
    }

    /// Whether Vault reports the token as renewable. A missing flag means no.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::MalformedResponse`] when the flag is neither a
    /// boolean nor a boolean string.
    pub fn renewable(&self) -> VaultResult<bool> {
        match self.data.get("renewable") {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => s.parse().map_err(|_| {
                VaultError::MalformedResponse(format!("renewable flag {s:?} is not a boolean"))
            }),
            Some(other) => Err(VaultError::MalformedResponse(format!(
                "renewable flag {other} is not a boolean"
            ))),
        }
    }
}

/// Response of `auth/token/renew-self`.
#[derive(Debug, Deserialize)]
pub struct RenewResponse {
    /// Renewed auth block
    pub auth: Option<AuthData>,
}

/// Auth block of a renewal.
#[derive(Debug, Deserialize)]
pub struct AuthData {
    /// Token value, unchanged by a renewal in practice
    pub client_token: String,
    /// New TTL in seconds
    #[serde(default)]
    pub lease_duration: u64,
    /// Whether the token can be renewed again
    #[serde(default)]
    pub renewable: bool,
}

/// Response of `sys/health`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    /// Cluster name
    #[serde(default)]
    pub cluster_name: String,
    /// Cluster ID
    #[serde(default)]
    pub cluster_id: String,
    /// Server version
    #[serde(default)]
    pub version: String,
    /// Whether the barrier is sealed
    #[serde(default)]
    pub sealed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup(data: Value) -> TokenLookup {
        serde_json::from_value(json!({ "data": data })).unwrap()
    }

    #[test]
    fn test_ttl_from_number() {
        assert_eq!(lookup(json!({ "ttl": 42 })).ttl().unwrap(), 42);
    }

    #[test]
    fn test_ttl_from_numeric_string() {
        assert_eq!(lookup(json!({ "ttl": "42" })).ttl().unwrap(), 42);
    }

    #[test]
    fn test_ttl_decode_errors() {
        for data in [
            json!({}),
            json!({ "ttl": 1.5 }),
            json!({ "ttl": "soon" }),
            json!({ "ttl": true }),
        ] {
            let err = lookup(data).ttl().unwrap_err();
            assert!(matches!(err, VaultError::TtlDecode(_)));
        }
    }

    #[test]
    fn test_renewable_flag() {
        assert!(lookup(json!({ "renewable": true })).renewable().unwrap());
        assert!(lookup(json!({ "renewable": "true" })).renewable().unwrap());
        assert!(!lookup(json!({})).renewable().unwrap());
        assert!(matches!(
            lookup(json!({ "renewable": 1 })).renewable(),
            Err(VaultError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_ttl_decodes_without_renewable_flag() {
        let lookup = lookup(json!({ "ttl": 10, "renewable": 1 }));
        assert_eq!(lookup.ttl().unwrap(), 10);
        assert!(lookup.renewable().is_err());
    }

    #[test]
    fn test_entry_values() {
        let Value::Object(fields) = json!({
            "password": "abc",
            "port": 5432,
            "nothing": null,
        }) else {
            unreachable!()
        };
        let entry = SecretEntry::new(fields);
        assert_eq!(entry.get("password").as_deref(), Some("abc"));
        assert_eq!(entry.get("port").as_deref(), Some("5432"));
        assert_eq!(entry.get("nothing"), None);
        assert_eq!(entry.get("absent"), None);
        assert_eq!(entry.len(), 3);
    }

    #[test]
    fn test_raw_secret_defaults() {
        let raw: RawSecret = serde_json::from_value(json!({ "warnings": ["w1"] })).unwrap();
        assert!(raw.data.is_none());
        assert_eq!(raw.warnings(), ["w1".to_string()]);
    }
}
