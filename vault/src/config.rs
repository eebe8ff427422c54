//! Vault backend configuration.

use crate::{
    engine::Engine,
    error::{VaultError, VaultResult},
};
use secrecy::SecretString;
use std::{str::FromStr, time::Duration};

/// Vault backend configuration.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault server address
    pub addr: String,
    /// Initial client token
    pub token: SecretString,
    /// KV engine the mounted secrets use
    pub engine: Engine,
    /// How often the supervisor looks up the token
    pub token_polling_period: Duration,
    /// TTL (seconds) below which the token is renewed
    pub max_token_ttl: i64,
    /// Seconds requested on each renewal
    pub renew_ttl_increment: u64,
    /// Request timeout, also the upper bound of a renewal call
    pub timeout: Duration,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: std::env::var("VAULT_ADDR")
                .unwrap_or_else(|_| "https://127.0.0.1:8200".to_string()),
            token: SecretString::from(std::env::var("VAULT_TOKEN").unwrap_or_default()),
            engine: Engine::Kv2,
            token_polling_period: Duration::from_secs(15),
            max_token_ttl: 300,
            renew_ttl_increment: 600,
            timeout: Duration::from_secs(30),
        }
    }
}

impl VaultConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(addr: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            token: SecretString::from(token.into()),
            ..Default::default()
        }
    }

    /// Load every setting from the environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] when a variable is present but
    /// cannot be parsed, or when the resulting renewal policy is invalid.
    pub fn from_env() -> VaultResult<Self> {
        let defaults = Self::default();
        let config = Self {
            engine: env_or("VAULT_ENGINE", defaults.engine)?,
            token_polling_period: Duration::from_secs(env_or(
                "VAULT_TOKEN_POLLING_PERIOD_SECS",
                defaults.token_polling_period.as_secs(),
            )?),
            max_token_ttl: env_or("VAULT_MAX_TOKEN_TTL", defaults.max_token_ttl)?,
            renew_ttl_increment: env_or(
                "VAULT_RENEW_TTL_INCREMENT",
                defaults.renew_ttl_increment,
            )?,
            timeout: Duration::from_secs(env_or("VAULT_TIMEOUT_SECS", defaults.timeout.as_secs())?),
            ..defaults
        };
        config.renewal_policy()?;
        Ok(config)
    }

    /// Set the engine.
    #[must_use]
    pub const fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    /// Set the token polling period.
    #[must_use]
    pub const fn with_token_polling_period(mut self, period: Duration) -> Self {
        self.token_polling_period = period;
        self
    }

    /// Set the renewal threshold in seconds.
    #[must_use]
    pub const fn with_max_token_ttl(mut self, ttl: i64) -> Self {
        self.max_token_ttl = ttl;
        self
    }

    /// Set the renewal increment in seconds.
    #[must_use]
    pub const fn with_renew_ttl_increment(mut self, increment: u64) -> Self {
        self.renew_ttl_increment = increment;
        self
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the renewal settings and freeze them into a policy.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] for a zero polling period, a
    /// negative threshold or a zero increment.
    pub fn renewal_policy(&self) -> VaultResult<RenewalPolicy> {
        RenewalPolicy::new(
            self.token_polling_period,
            self.max_token_ttl,
            self.renew_ttl_increment,
        )
    }
}

/// Immutable token renewal settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    polling_period: Duration,
    ttl_threshold: i64,
    renewal_increment: u64,
}

impl RenewalPolicy {
    /// Build a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] if any field is out of range.
    pub fn new(
        polling_period: Duration,
        ttl_threshold: i64,
        renewal_increment: u64,
    ) -> VaultResult<Self> {
        if polling_period.is_zero() {
            return Err(VaultError::invalid_config(
                "token polling period must be greater than zero",
            ));
        }
        if ttl_threshold < 0 {
            return Err(VaultError::invalid_config(format!(
                "max token ttl must not be negative, got {ttl_threshold}"
            )));
        }
        if renewal_increment == 0 {
            return Err(VaultError::invalid_config(
                "renew ttl increment must be greater than zero",
            ));
        }
        Ok(Self {
            polling_period,
            ttl_threshold,
            renewal_increment,
        })
    }

    /// Delay between two token lookups.
    #[must_use]
    pub const fn polling_period(&self) -> Duration {
        self.polling_period
    }

    /// TTL in seconds below which renewal triggers.
    #[must_use]
    pub const fn ttl_threshold(&self) -> i64 {
        self.ttl_threshold
    }

    /// Seconds requested per renewal.
    #[must_use]
    pub const fn renewal_increment(&self) -> u64 {
        self.renewal_increment
    }

    /// Whether a token with `ttl` seconds left must be renewed.
    #[must_use]
    pub const fn should_renew(&self, ttl: i64) -> bool {
        ttl < self.ttl_threshold
    }
}

fn env_or<T>(name: &str, default: T) -> VaultResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| VaultError::invalid_config(format!("{name}={raw}: {e}"))),
        Err(_) => Ok(default),
    }
}
