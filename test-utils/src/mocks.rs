//! Mock implementations for testing.
//!
//! [`MockStoreClient`] answers from scripted results and records every call
//! so tests can assert on what the supervisor or reader asked for.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use vault_backend::{RawSecret, StoreClient, TokenLookup, VaultError, VaultResult};

/// Scripted in-memory store client.
///
/// Lookups are consumed in order; once the script runs out every further
/// lookup fails. Renewals succeed unless a failure was scripted.
#[derive(Debug, Default)]
pub struct MockStoreClient {
    lookups: Mutex<VecDeque<VaultResult<TokenLookup>>>,
    renewals: Mutex<VecDeque<VaultResult<()>>>,
    secrets: Mutex<HashMap<String, RawSecret>>,
    read_error: Mutex<Option<String>>,
    calls: Mutex<Calls>,
}

#[derive(Debug, Default)]
struct Calls {
    lookups: usize,
    renew_increments: Vec<u64>,
    reads: Vec<String>,
}

impl MockStoreClient {
    /// Create a new mock store client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful lookup.
    #[must_use]
    pub fn with_lookup(self, ttl: i64, renewable: bool) -> Self {
        self.push_lookup(Ok(TokenLookup::new(ttl, renewable)));
        self
    }

    /// Queue a lookup returning a raw response.
    #[must_use]
    pub fn with_raw_lookup(self, lookup: TokenLookup) -> Self {
        self.push_lookup(Ok(lookup));
        self
    }

    /// Queue a failed lookup.
    #[must_use]
    pub fn with_lookup_error(self, msg: &str) -> Self {
        self.push_lookup(Err(VaultError::unavailable(msg)));
        self
    }

    /// Queue a failed renewal.
    #[must_use]
    pub fn with_renew_error(self, msg: &str) -> Self {
        lock(&self.renewals).push_back(Err(VaultError::unavailable(msg)));
        self
    }

    /// Store a raw response at `path`.
    #[must_use]
    pub fn with_secret(self, path: &str, secret: RawSecret) -> Self {
        lock(&self.secrets).insert(path.to_string(), secret);
        self
    }

    /// Make every read fail.
    #[must_use]
    pub fn with_read_error(self, msg: &str) -> Self {
        *lock(&self.read_error) = Some(msg.to_string());
        self
    }

    fn push_lookup(&self, result: VaultResult<TokenLookup>) {
        lock(&self.lookups).push_back(result);
    }

    /// Number of lookups issued.
    #[must_use]
    pub fn lookup_calls(&self) -> usize {
        lock(&self.calls).lookups
    }

    /// Increments of every renewal issued, in order.
    #[must_use]
    pub fn renew_calls(&self) -> Vec<u64> {
        lock(&self.calls).renew_increments.clone()
    }

    /// Paths of every read issued, in order.
    #[must_use]
    pub fn read_calls(&self) -> Vec<String> {
        lock(&self.calls).reads.clone()
    }

    /// Total number of store calls of any kind.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        let calls = lock(&self.calls);
        calls.lookups + calls.renew_increments.len() + calls.reads.len()
    }
}

#[async_trait]
impl StoreClient for MockStoreClient {
    async fn lookup_self(&self) -> VaultResult<TokenLookup> {
        lock(&self.calls).lookups += 1;
        lock(&self.lookups)
            .pop_front()
            .unwrap_or_else(|| Err(VaultError::unavailable("no scripted lookup")))
    }

    async fn renew_self(&self, increment: u64) -> VaultResult<()> {
        lock(&self.calls).renew_increments.push(increment);
        lock(&self.renewals).pop_front().unwrap_or(Ok(()))
    }

    async fn read(&self, path: &str) -> VaultResult<Option<RawSecret>> {
        lock(&self.calls).reads.push(path.to_string());
        if let Some(msg) = lock(&self.read_error).as_ref() {
            return Err(VaultError::unavailable(msg.clone()));
        }
        Ok(lock(&self.secrets).get(path).cloned())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
