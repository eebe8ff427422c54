//! KV engine response shapes.
//!
//! KV v1 returns the secret fields directly under `data`. KV v2 wraps them
//! in a versioned envelope: `data.data` holds the fields and `data.metadata`
//! the version information.

use crate::{
    error::VaultError,
    secrets::{RawSecret, SecretEntry},
};
use serde_json::Value;
use std::str::FromStr;

/// Supported secret engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    /// Key/value version 1, flat payload
    Kv1,
    /// Key/value version 2, payload nested under `data.data`
    Kv2,
}

impl Engine {
    /// Configuration name of the engine.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kv1 => "kv1",
            Self::Kv2 => "kv2",
        }
    }

    /// Extract the flat payload, or `None` when the response has none.
    ///
    /// A response shaped for the other engine yields `None` rather than an
    /// error.
    #[must_use]
    pub fn extract(self, secret: &RawSecret) -> Option<SecretEntry> {
        let data = secret.data.as_ref()?;
        match self {
            Self::Kv1 => Some(SecretEntry::new(data.clone())),
            Self::Kv2 => match data.get("data")? {
                Value::Object(fields) => Some(SecretEntry::new(fields.clone())),
                _ => None,
            },
        }
    }
}

impl FromStr for Engine {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kv1" => Ok(Self::Kv1),
            "kv2" => Ok(Self::Kv2),
            other => Err(VaultError::invalid_config(format!(
                "unsupported vault engine {other:?}, expected kv1 or kv2"
            ))),
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
