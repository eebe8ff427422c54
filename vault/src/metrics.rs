//! Prometheus metrics for token lifecycle and secret reads.
//!
//! Collectors are registered into a caller-provided registry and handed to
//! the supervisor and reader, so nothing here is process-global. Updates
//! after registration cannot fail.

use crate::error::ErrorKind;
use prometheus::{IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry};

const NAMESPACE: &str = "secrets_manager";
const SUBSYSTEM: &str = "vault";

/// Vault backend metrics.
#[derive(Debug, Clone)]
pub struct VaultMetrics {
    /// Static backend information, always 1
    pub info: IntGaugeVec,
    /// Last observed token TTL in seconds
    pub token_ttl: IntGauge,
    /// 1 when the last lookup found the token below the renewal threshold
    pub token_expired: IntGauge,
    /// Token lookup failures by error kind
    pub token_lookup_errors: IntCounterVec,
    /// Renewal attempts
    pub token_renew_attempts: IntCounter,
    /// Successful renewals
    pub token_renew_successes: IntCounter,
    /// Renewal failures by error kind
    pub token_renew_errors: IntCounterVec,
    /// Secret read failures by path, key and error kind
    pub secret_read_errors: IntCounterVec,
}

impl VaultMetrics {
    /// Create and register every collector.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector with the same name is already
    /// registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let info = IntGaugeVec::new(
            opts("info", "Vault backend information"),
            &[
                "vault_url",
                "vault_version",
                "vault_engine",
                "vault_cluster_id",
                "vault_cluster_name",
            ],
        )?;
        registry.register(Box::new(info.clone()))?;

        let token_ttl = IntGauge::with_opts(opts("token_ttl", "Vault token TTL in seconds"))?;
        registry.register(Box::new(token_ttl.clone()))?;

        let token_expired = IntGauge::with_opts(opts(
            "token_expired",
            "Whether the Vault token is below the renewal threshold",
        ))?;
        registry.register(Box::new(token_expired.clone()))?;

        let token_lookup_errors = IntCounterVec::new(
            opts("token_lookup_errors_total", "Vault token lookup errors"),
            &["error"],
        )?;
        registry.register(Box::new(token_lookup_errors.clone()))?;

        let token_renew_attempts = IntCounter::with_opts(opts(
            "token_renew_attempts_total",
            "Vault token renewal attempts",
        ))?;
        registry.register(Box::new(token_renew_attempts.clone()))?;

        let token_renew_successes = IntCounter::with_opts(opts(
            "token_renew_successes_total",
            "Successful Vault token renewals",
        ))?;
        registry.register(Box::new(token_renew_successes.clone()))?;

        let token_renew_errors = IntCounterVec::new(
            opts("token_renew_errors_total", "Vault token renewal errors"),
            &["error"],
        )?;
        registry.register(Box::new(token_renew_errors.clone()))?;

        let secret_read_errors = IntCounterVec::new(
            opts("secret_read_errors_total", "Vault secret read errors"),
            &["path", "key", "error"],
        )?;
        registry.register(Box::new(secret_read_errors.clone()))?;

        Ok(Self {
            info,
            token_ttl,
            token_expired,
            token_lookup_errors,
            token_renew_attempts,
            token_renew_successes,
            token_renew_errors,
            secret_read_errors,
        })
    }

    /// Record backend information.
    pub fn set_info(&self, url: &str, version: &str, engine: &str, cluster_id: &str, cluster_name: &str) {
        self.info
            .with_label_values(&[url, version, engine, cluster_id, cluster_name])
            .set(1);
    }

    /// Record the observed token TTL.
    pub fn record_token_ttl(&self, ttl: i64) {
        self.token_ttl.set(ttl);
    }

    /// Record whether the token needs renewal.
    pub fn record_token_expired(&self, expired: bool) {
        self.token_expired.set(i64::from(expired));
    }

    /// Record a failed token lookup.
    pub fn record_lookup_error(&self, kind: ErrorKind) {
        self.token_lookup_errors
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    /// Record a renewal attempt.
    pub fn record_renew_attempt(&self) {
        self.token_renew_attempts.inc();
    }

    /// Record a successful renewal.
    pub fn record_renew_success(&self) {
        self.token_renew_successes.inc();
    }

    /// Record a failed renewal.
    pub fn record_renew_error(&self, kind: ErrorKind) {
        self.token_renew_errors
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    /// Record a failed secret read.
    pub fn record_read_error(&self, path: &str, key: &str, kind: ErrorKind) {
        self.secret_read_errors
            .with_label_values(&[path, key, kind.as_str()])
            .inc();
    }
}

fn opts(name: &str, help: &str) -> Opts {
    Opts::new(name, help).namespace(NAMESPACE).subsystem(SUBSYSTEM)
}
