//! Shared proptest generators.

use proptest::prelude::*;
use std::time::Duration;
use vault_backend::Engine;

/// Token TTLs as Vault reports them, in seconds.
pub fn ttl_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(0_i64),
        1_i64..=60,
        0_i64..=2_764_800,
    ]
}

/// Renewal thresholds in seconds.
pub fn threshold_strategy() -> impl Strategy<Value = i64> {
    0_i64..=86_400
}

/// Renewal increments in seconds.
pub fn increment_strategy() -> impl Strategy<Value = u64> {
    1_u64..=2_764_800
}

/// Polling periods.
pub fn polling_period_strategy() -> impl Strategy<Value = Duration> {
    (1_u64..=3_600).prop_map(Duration::from_secs)
}

/// Either supported engine.
pub fn engine_strategy() -> impl Strategy<Value = Engine> {
    prop_oneof![Just(Engine::Kv1), Just(Engine::Kv2)]
}

/// Secret field names.
pub fn secret_key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

/// Secret field values.
pub fn secret_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!@#$%^&*]{1,64}"
}

/// Secret paths.
pub fn secret_path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("secret/data/app".to_string()),
        Just("kv/database".to_string()),
        prop::collection::vec("[a-z][a-z0-9]{2,10}", 1..4)
            .prop_map(|segments| format!("secret/{}", segments.join("/"))),
    ]
}
