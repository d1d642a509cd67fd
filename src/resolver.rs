// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS resolution boundary.
//!
//! The reconciler only needs one question answered: what IP address does this
//! hostname currently resolve to? The [`Resolve`] trait keeps that seam
//! mockable; [`SystemResolver`] is the production implementation on top of
//! Hickory's tokio resolver using the host system DNS configuration.

use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    proto::ProtoErrorKind,
    ResolveError as HickoryError, TokioResolver,
};
use tracing::warn;

use crate::errors::ResolveError;

/// Capability to resolve a hostname to an IP address.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Resolve `name` to a single IP address.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] describing why no address was obtained.
    async fn resolve(&self, name: &str) -> Result<IpAddr, ResolveError>;
}

/// Production resolver backed by the host system DNS configuration
/// (e.g. `/etc/resolv.conf`), falling back to Hickory's default upstream
/// set if the system configuration cannot be loaded.
pub struct SystemResolver {
    inner: TokioResolver,
}

impl SystemResolver {
    /// Build a resolver from the system configuration.
    #[must_use]
    pub fn new() -> Self {
        let inner = match TokioResolver::builder_tokio() {
            Ok(builder) => builder.build(),
            Err(e) => {
                warn!("Failed to load system DNS configuration, falling back to defaults: {e}");
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .with_options(ResolverOpts::default())
                .build()
            }
        };
        Self { inner }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resolve for SystemResolver {
    async fn resolve(&self, name: &str) -> Result<IpAddr, ResolveError> {
        let lookup = self
            .inner
            .lookup_ip(name)
            .await
            .map_err(|e| classify_error(name, &e))?;

        lookup.iter().next().ok_or_else(|| ResolveError::NotFound {
            name: name.to_string(),
        })
    }
}

/// Map a Hickory resolver error onto the boundary error type.
fn classify_error(name: &str, err: &HickoryError) -> ResolveError {
    if let Some(proto) = err.proto() {
        match proto.kind() {
            ProtoErrorKind::NoRecordsFound { .. } => {
                return ResolveError::NotFound {
                    name: name.to_string(),
                }
            }
            ProtoErrorKind::Timeout => {
                return ResolveError::Timeout {
                    name: name.to_string(),
                }
            }
            _ => {}
        }
    }
    ResolveError::Unreachable {
        name: name.to_string(),
        reason: err.to_string(),
    }
}
