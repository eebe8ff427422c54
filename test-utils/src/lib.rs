//! Shared test utilities for the Vault backend.
//!
//! This crate provides:
//! - A scripted mock of the store client
//! - Sample Vault response bodies
//! - Proptest generators for policy and secret inputs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
pub use mocks::MockStoreClient;
