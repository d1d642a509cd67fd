// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the certsync boundaries.
//!
//! This module provides specialized error types for:
//! - Configuration loading and validation
//! - DNS resolution of domain names
//! - Certificate issuance and renewal via certbot
//! - Domain record storage
//!
//! Resolution failures are deliberately typed rather than folded into a
//! catch-all: the reconciler treats every variant the same way (the domain is
//! simply not verified this cycle), but tests and logs can still tell an
//! NXDOMAIN from a timeout.

use thiserror::Error;

/// Errors raised while loading [`crate::config::Settings`] from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set or is empty.
    #[error("Required environment variable '{name}' is not set")]
    MissingVariable {
        /// The environment variable name
        name: &'static str,
    },

    /// A variable is set but its value fails validation.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue {
        /// The environment variable name
        name: &'static str,
        /// Explanation of what is invalid
        reason: String,
    },
}

/// Errors that can occur while resolving a domain name.
///
/// Every variant folds into the unverified path of the reconciliation
/// policy; the distinction exists for logging and tests.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// The name does not exist or has no A records (NXDOMAIN / empty answer).
    #[error("No address records found for '{name}'")]
    NotFound {
        /// The domain name that was queried
        name: String,
    },

    /// The query timed out before any nameserver answered.
    #[error("Resolution of '{name}' timed out")]
    Timeout {
        /// The domain name that was queried
        name: String,
    },

    /// The resolver could not reach any nameserver, or the query failed
    /// for a reason other than the name being absent.
    #[error("Resolution of '{name}' failed: {reason}")]
    Unreachable {
        /// The domain name that was queried
        name: String,
        /// Underlying resolver error message
        reason: String,
    },
}

/// Errors that can occur during certificate issuance or renewal.
#[derive(Error, Debug)]
pub enum CertError {
    /// The ACME client binary could not be spawned.
    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        /// The command that could not be started
        command: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The ACME client exited with a non-zero status.
    #[error("Certificate request for '{name}' failed (exit {code:?}): {stderr}")]
    IssuanceFailed {
        /// The domain the certificate was requested for
        name: String,
        /// Process exit code, if the process exited normally
        code: Option<i32>,
        /// Captured standard error output
        stderr: String,
    },

    /// Issuance reported success but the expected certificate files are missing.
    #[error("Certificate artifacts for '{name}' missing at {path}")]
    MissingArtifacts {
        /// The domain the certificate was requested for
        name: String,
        /// The live directory that was expected to hold the artifacts
        path: String,
    },

    /// Copying certificate files into the serving directory failed.
    #[error("Failed to install certificate for '{name}': {source}")]
    InstallFailed {
        /// The domain the certificate was requested for
        name: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the domain record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database connection, query, or transaction failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored value could not be decoded into the domain model.
    #[error("Corrupt record for '{name}': {reason}")]
    CorruptRecord {
        /// The domain record that failed to decode
        name: String,
        /// Explanation of what failed to parse
        reason: String,
    },

    /// Filesystem error while preparing the database location.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Composite error type for the certsync daemon.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// DNS resolution failure
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Certificate operation failure
    #[error(transparent)]
    Cert(#[from] CertError),

    /// Domain record store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolveError {
    /// Returns the domain name the failed query was for.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::NotFound { name } | Self::Timeout { name } | Self::Unreachable { name, .. } => {
                name
            }
        }
    }
}
