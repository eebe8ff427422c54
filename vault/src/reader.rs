//! Engine-aware single key secret reads.

use crate::{
    client::StoreClient,
    engine::Engine,
    error::{VaultError, VaultResult},
    metrics::VaultMetrics,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Field read when the caller does not name one.
pub const DEFAULT_SECRET_KEY: &str = "data";

/// Reads one field of one secret.
pub struct SecretReader {
    client: Arc<dyn StoreClient>,
    engine: Engine,
    metrics: Arc<VaultMetrics>,
}

impl SecretReader {
    /// Create a reader for secrets stored with `engine`.
    #[must_use]
    pub fn new(client: Arc<dyn StoreClient>, engine: Engine, metrics: Arc<VaultMetrics>) -> Self {
        Self {
            client,
            engine,
            metrics,
        }
    }

    /// Engine used for payload extraction.
    #[must_use]
    pub const fn engine(&self) -> Engine {
        self.engine
    }

    /// Read `key` of the secret at `path`. An empty key reads
    /// [`DEFAULT_SECRET_KEY`].
    ///
    /// # Errors
    ///
    /// - [`VaultError::StoreUnavailable`] when the read itself fails.
    /// - [`VaultError::SecretNotFound`] when there is no secret at `path`,
    ///   the engine finds no payload, or the payload lacks `key`.
    #[instrument(skip(self), fields(engine = %self.engine))]
    pub async fn read_secret(&self, path: &str, key: &str) -> VaultResult<String> {
        let key = if key.is_empty() { DEFAULT_SECRET_KEY } else { key };

        self.lookup(path, key)
            .await
            .inspect_err(|e| self.metrics.record_read_error(path, key, e.kind()))
    }

    async fn lookup(&self, path: &str, key: &str) -> VaultResult<String> {
        let secret = self
            .client
            .read(path)
            .await
            .map_err(VaultError::into_unavailable)?;
        let Some(secret) = secret else {
            debug!(path, "No secret at path");
            return Err(VaultError::not_found(path, key));
        };

        let Some(entry) = self.engine.extract(&secret) else {
            for warning in secret.warnings() {
                warn!(path, warning = %warning, "Vault warning");
            }
            return Err(VaultError::not_found(path, key));
        };

        entry.get(key).ok_or_else(|| VaultError::not_found(path, key))
    }
}
