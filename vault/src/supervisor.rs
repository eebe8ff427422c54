//! Token lifecycle supervisor.
//!
//! A background task that looks up the current token every polling period
//! and renews it once its TTL drops below the configured threshold.
//!
//! The loop ends on the first of:
//! - cancellation while waiting for the next tick,
//! - a lookup, decode or renewal failure,
//! - a lookup that finds the token healthy (TTL at or above the threshold).
//!
//! The last case means one supervisor run guards the token only until it is
//! seen healthy; the host starts a new run for the next cycle.

use crate::{
    client::StoreClient,
    config::RenewalPolicy,
    error::{VaultError, VaultResult},
    metrics::VaultMetrics,
    secrets::TokenLookup,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Token was below the threshold and got renewed
    Renewed,
    /// Token was at or above the threshold
    Healthy,
}

/// Why a supervisor run ended.
#[derive(Debug)]
pub enum SupervisorExit {
    /// Cancellation fired while waiting for the next tick
    Cancelled,
    /// The token was found healthy
    Healthy,
    /// A lookup, decode or renewal failure
    Failed(VaultError),
}

/// Token renewal supervisor.
pub struct TokenSupervisor {
    client: Arc<dyn StoreClient>,
    policy: RenewalPolicy,
    metrics: Arc<VaultMetrics>,
}

impl TokenSupervisor {
    /// Create a supervisor.
    #[must_use]
    pub fn new(
        client: Arc<dyn StoreClient>,
        policy: RenewalPolicy,
        metrics: Arc<VaultMetrics>,
    ) -> Self {
        Self {
            client,
            policy,
            metrics,
        }
    }

    /// Renewal policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RenewalPolicy {
        &self.policy
    }

    /// Spawn the loop and return immediately.
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<SupervisorExit> {
        tokio::spawn(self.run(cancel))
    }

    /// Run the loop to completion on the current task.
    pub async fn run(self, cancel: CancellationToken) -> SupervisorExit {
        let period = self.policy.polling_period();
        info!(
            polling_period_secs = period.as_secs_f64(),
            ttl_threshold = self.policy.ttl_threshold(),
            renewal_increment = self.policy.renewal_increment(),
            "Starting token renewal supervisor"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("Gracefully shutting down token renewal supervisor");
                    return SupervisorExit::Cancelled;
                }
                () = tokio::time::sleep(period) => {}
            }

            match self.tick().await {
                Ok(TickOutcome::Renewed) => {}
                Ok(TickOutcome::Healthy) => {
                    info!("Token is healthy, stopping token renewal supervisor");
                    return SupervisorExit::Healthy;
                }
                Err(e) => {
                    error!(error = %e, kind = %e.kind(), "Token renewal supervisor stopped");
                    return SupervisorExit::Failed(e);
                }
            }
        }
    }

    /// One polling step: look up, decide, renew if needed.
    ///
    /// # Errors
    ///
    /// Returns the lookup, decode or renewal failure.
    #[instrument(skip(self))]
    pub async fn tick(&self) -> VaultResult<TickOutcome> {
        let (lookup, ttl) = self.lookup_ttl().await?;

        if !self.should_renew(ttl) {
            debug!(ttl, "Token TTL above renewal threshold");
            return Ok(TickOutcome::Healthy);
        }

        warn!(ttl, "Token is close to expiring");
        self.renew_token(&lookup).await?;
        info!("Token renewed successfully");
        Ok(TickOutcome::Renewed)
    }

    /// Look up the token and decode its TTL.
    ///
    /// # Errors
    ///
    /// Returns the store failure, or [`VaultError::TtlDecode`] for a
    /// malformed TTL.
    pub async fn lookup_ttl(&self) -> VaultResult<(TokenLookup, i64)> {
        let lookup = self
            .client
            .lookup_self()
            .await
            .map_err(VaultError::into_unavailable)
            .inspect_err(|e| {
                error!(error = %e, "Error checking token with lookup self");
                self.metrics.record_lookup_error(e.kind());
            })?;
        let ttl = lookup.ttl().inspect_err(|e| {
            error!(error = %e, "Error decoding token TTL");
            self.metrics.record_lookup_error(e.kind());
        })?;

        self.metrics.record_token_ttl(ttl);
        Ok((lookup, ttl))
    }

    /// Whether `ttl` is below the threshold. Also updates the expired gauge.
    #[must_use]
    pub fn should_renew(&self, ttl: i64) -> bool {
        let renew = self.policy.should_renew(ttl);
        self.metrics.record_token_expired(renew);
        renew
    }

    /// Renew the token by the configured increment.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::TokenNotRenewable`] without calling the store
    /// when the token cannot be extended, [`VaultError::MalformedResponse`]
    /// when its renewable flag is unreadable, or the store failure.
    pub async fn renew_token(&self, lookup: &TokenLookup) -> VaultResult<()> {
        let renewable = lookup.renewable().inspect_err(|e| {
            error!(error = %e, "Error checking whether token is renewable");
            self.metrics.record_renew_error(e.kind());
        })?;
        if !renewable {
            self.metrics
                .record_renew_error(VaultError::TokenNotRenewable.kind());
            return Err(VaultError::TokenNotRenewable);
        }

        self.metrics.record_renew_attempt();
        self.client
            .renew_self(self.policy.renewal_increment())
            .await
            .map_err(VaultError::into_unavailable)
            .inspect_err(|e| {
                error!(error = %e, "Failed to renew token");
                self.metrics.record_renew_error(e.kind());
            })?;

        self.metrics.record_renew_success();
        Ok(())
    }
}
