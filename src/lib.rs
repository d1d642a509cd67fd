// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Certsync - Domain & Certificate Reconciliation Daemon
//!
//! Certsync is a small operational daemon that keeps a set of hosted domains
//! in sync with the infrastructure that serves them. On a periodic schedule it
//! verifies that each domain still resolves to the configured master IP
//! address and, for verified domains, ensures a valid TLS certificate exists,
//! renewing it every 30 days.
//!
//! ## Overview
//!
//! Each reconciliation pass:
//!
//! - Loads all domain records that are due for a check
//! - Resolves each domain and compares the answer to the master IP
//! - Issues or renews certificates for verified domains
//! - Backs off the next check for unverified domains, stopping a domain
//!   permanently after 700 consecutive failures
//! - Commits the whole batch in a single database transaction
//!
//! ## Modules
//!
//! - [`domain`] - The domain record model and scheduling state
//! - [`reconciler`] - The per-record check policy and the pass driver
//! - [`resolver`] - DNS resolution boundary (system resolver via Hickory)
//! - [`certs`] - Certificate issuance boundary (certbot webroot flow)
//! - [`store`] - SQLite-backed domain record store
//! - [`config`] - Environment-driven settings with startup validation
//!
//! ## Example
//!
//! ```rust,no_run
//! use certsync::config::Settings;
//! use certsync::reconciler::Reconciler;
//! use certsync::resolver::SystemResolver;
//! use certsync::certs::CertbotIssuer;
//! use certsync::store::SqliteStore;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let store = SqliteStore::new(Path::new("/var/lib/certsync/domains.db")).await?;
//! let issuer = CertbotIssuer::new(&settings);
//! let reconciler = Reconciler::new(
//!     settings.master_ip,
//!     Arc::new(SystemResolver::new()),
//!     Arc::new(issuer),
//! );
//! let summary = reconciler.run_pass(&store, chrono::Utc::now()).await?;
//! println!("checked {} domains", summary.checked);
//! # Ok(())
//! # }
//! ```

pub mod certs;
pub mod config;
pub mod constants;
pub mod domain;
pub mod errors;
pub mod metrics;
pub mod reconciler;
pub mod resolver;
pub mod store;

#[cfg(test)]
mod certs_tests;
#[cfg(test)]
mod domain_tests;
#[cfg(test)]
mod errors_tests;
