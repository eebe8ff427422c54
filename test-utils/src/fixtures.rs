//! Test fixtures with sample Vault responses.

use serde_json::{Map, Value, json};
use vault_backend::RawSecret;

fn fields(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
        .collect()
}

fn decode(body: Value) -> RawSecret {
    serde_json::from_value(body).unwrap_or_default()
}

/// KV v1 read response body.
#[must_use]
pub fn kv1_body(pairs: &[(&str, &str)]) -> Value {
    json!({
        "request_id": "5e246671-ec05-6fc8-9f93-4fe4512f34ab",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 2_764_800,
        "data": fields(pairs),
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

/// KV v2 read response body.
#[must_use]
pub fn kv2_body(pairs: &[(&str, &str)]) -> Value {
    json!({
        "request_id": "1f1bdd3c-7c7f-1c3d-8f1a-9d6e0c2a7b41",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": {
            "data": fields(pairs),
            "metadata": {
                "created_time": "2024-03-01T10:00:00.000000Z",
                "custom_metadata": null,
                "deletion_time": "",
                "destroyed": false,
                "version": 2
            }
        },
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

/// KV v1 read response.
#[must_use]
pub fn kv1_secret(pairs: &[(&str, &str)]) -> RawSecret {
    decode(kv1_body(pairs))
}

/// KV v2 read response.
#[must_use]
pub fn kv2_secret(pairs: &[(&str, &str)]) -> RawSecret {
    decode(kv2_body(pairs))
}

/// KV v2 response for a soft-deleted version: envelope present, payload null.
#[must_use]
pub fn kv2_deleted_secret() -> RawSecret {
    decode(json!({
        "data": {
            "data": null,
            "metadata": {
                "created_time": "2024-03-01T10:00:00.000000Z",
                "deletion_time": "2024-03-02T10:00:00.000000Z",
                "destroyed": false,
                "version": 3
            }
        }
    }))
}

/// Response with warnings only, as returned for a path outside a mount.
#[must_use]
pub fn warnings_only_secret(warnings: &[&str]) -> RawSecret {
    RawSecret {
        warnings: Some(warnings.iter().map(ToString::to_string).collect()),
        ..RawSecret::default()
    }
}

/// `auth/token/lookup-self` response body.
#[must_use]
pub fn lookup_self_body(ttl: i64, renewable: bool) -> Value {
    json!({
        "request_id": "8f4c9a7e-0000-4a1b-b2c3-d4e5f6a7b8c9",
        "data": {
            "accessor": "8609694a-cdbc-db9b-d345-e782dbb562ed",
            "creation_ttl": 2_764_800,
            "display_name": "token",
            "expire_time": "2024-03-01T10:00:00.000000Z",
            "policies": ["default", "secrets-manager"],
            "renewable": renewable,
            "ttl": ttl,
            "type": "service"
        }
    })
}

/// `auth/token/renew-self` response body.
#[must_use]
pub fn renew_self_body(client_token: &str, lease_duration: u64) -> Value {
    json!({
        "auth": {
            "client_token": client_token,
            "policies": ["default", "secrets-manager"],
            "lease_duration": lease_duration,
            "renewable": true
        }
    })
}

/// `sys/health` response body.
#[must_use]
pub fn health_body() -> Value {
    json!({
        "initialized": true,
        "sealed": false,
        "standby": false,
        "server_time_utc": 1_709_287_200,
        "version": "1.15.4",
        "cluster_name": "vault-cluster-e2e",
        "cluster_id": "5b6e2f0c-1b0a-4c2e-9a3b-7f2d1e0c9b8a"
    })
}
