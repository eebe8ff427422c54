//! HashiCorp Vault backend for the secrets manager.
//!
//! Keeps one Vault token alive and reads single secret fields regardless of
//! the KV engine version.
//!
//! - [`TokenSupervisor`] polls the token TTL and renews it below a threshold.
//! - [`SecretReader`] reads one key of one secret through an [`Engine`].
//! - [`VaultBackend`] wires both to a [`VaultClient`] at startup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod reader;
pub mod secrets;
pub mod session;
pub mod supervisor;

pub use backend::VaultBackend;
pub use client::{StoreClient, VaultClient};
pub use config::{RenewalPolicy, VaultConfig};
pub use engine::Engine;
pub use error::{ErrorKind, VaultError, VaultResult};
pub use metrics::VaultMetrics;
pub use reader::{DEFAULT_SECRET_KEY, SecretReader};
pub use secrets::{RawSecret, SecretEntry, TokenLookup};
pub use session::Session;
pub use supervisor::{SupervisorExit, TickOutcome, TokenSupervisor};
