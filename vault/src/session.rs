//! Authenticated session state shared by every store call.

use arc_swap::ArcSwap;
use secrecy::SecretString;
use std::sync::Arc;

/// Base address plus the current token.
///
/// The token lives in a single atomically replaced slot: readers take a
/// snapshot, the renewal step swaps in a whole new value.
#[derive(Debug)]
pub struct Session {
    addr: String,
    token: ArcSwap<SecretString>,
}

impl Session {
    /// Create a session for `addr` authenticated with `token`.
    #[must_use]
    pub fn new(addr: impl Into<String>, token: SecretString) -> Self {
        Self {
            addr: addr.into().trim_end_matches('/').to_string(),
            token: ArcSwap::from_pointee(token),
        }
    }

    /// Base address without trailing slash.
    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Snapshot of the current token.
    #[must_use]
    pub fn token(&self) -> Arc<SecretString> {
        self.token.load_full()
    }

    /// Replace the token.
    pub fn replace_token(&self, token: SecretString) {
        self.token.store(Arc::new(token));
    }
}
