//! Startup wiring: connect, check health, start the supervisor.

use crate::{
    client::{StoreClient, VaultClient},
    config::VaultConfig,
    error::VaultResult,
    metrics::VaultMetrics,
    reader::SecretReader,
    session::Session,
    supervisor::{SupervisorExit, TokenSupervisor},
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// A connected Vault backend with a running token supervisor.
pub struct VaultBackend {
    client: Arc<VaultClient>,
    reader: SecretReader,
    supervisor: JoinHandle<SupervisorExit>,
}

impl VaultBackend {
    /// Connect to Vault and start renewing the configured token.
    ///
    /// The supervisor stops when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`crate::VaultError::InvalidConfig`] for an invalid renewal
    /// policy and [`crate::VaultError::StoreUnavailable`] when the health
    /// check fails.
    #[instrument(skip_all, fields(addr = %config.addr, engine = %config.engine))]
    pub async fn connect(
        config: &VaultConfig,
        metrics: Arc<VaultMetrics>,
        cancel: CancellationToken,
    ) -> VaultResult<Self> {
        let policy = config.renewal_policy()?;
        let client = VaultClient::new(config)?;

        let health = client
            .health()
            .await
            .inspect_err(|e| debug!(error = %e, "Could not contact Vault"))?;
        info!(
            cluster_name = %health.cluster_name,
            version = %health.version,
            "Successfully logged into Vault cluster"
        );
        metrics.set_info(
            &config.addr,
            &health.version,
            config.engine.as_str(),
            &health.cluster_id,
            &health.cluster_name,
        );

        let client = Arc::new(client);
        let store: Arc<dyn StoreClient> = client.clone();
        let supervisor =
            TokenSupervisor::new(Arc::clone(&store), policy, Arc::clone(&metrics)).start(cancel);
        let reader = SecretReader::new(store, config.engine, metrics);

        Ok(Self {
            client,
            reader,
            supervisor,
        })
    }

    /// Read one field of one secret. See [`SecretReader::read_secret`].
    ///
    /// # Errors
    ///
    /// Same as [`SecretReader::read_secret`].
    pub async fn read_secret(&self, path: &str, key: &str) -> VaultResult<String> {
        self.reader.read_secret(path, key).await
    }

    /// Shared session state.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        self.client.session()
    }

    /// Whether the supervisor run has ended.
    #[must_use]
    pub fn supervisor_finished(&self) -> bool {
        self.supervisor.is_finished()
    }

    /// Wait for the supervisor run to end.
    ///
    /// # Errors
    ///
    /// Returns the join error if the supervisor task panicked.
    pub async fn join_supervisor(self) -> Result<SupervisorExit, tokio::task::JoinError> {
        self.supervisor.await
    }
}
