// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain reconciliation logic.
//!
//! This module implements the state-transition policy over domain records:
//! the DNS-verification outcome of a domain decides its next check time, its
//! error counter, and whether certificate work happens this cycle.
//!
//! # Per-record policy
//!
//! 1. A record with 700 or more consecutive errors is stopped permanently
//!    and its certificate status cleared; nothing else runs for it.
//! 2. Otherwise the domain is resolved; any failure counts as unverified.
//! 3. A verified domain (resolves to the master IP) gets certificate work —
//!    renewal after 30 days for issued certs, first issuance otherwise —
//!    then is re-checked in 60 minutes with its error counter reset.
//! 4. An unverified domain is retried in 1 minute for the first 60 errors,
//!    then every 15 minutes.
//!
//! The whole pass is committed as one database transaction: a store failure
//! means no record of the pass persists. A certificate failure, by contrast,
//! only skips that domain's certificate fields and the pass continues; the
//! domain retries on its next eligible cycle.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::certs::IssueCert;
use crate::constants::{
    FAST_RETRY_ERROR_LIMIT, FAST_RETRY_MINUTES, SLOW_RETRY_MINUTES, STOP_ERROR_THRESHOLD,
    VERIFIED_CHECK_MINUTES,
};
use crate::domain::{CertStatus, Domain};
use crate::errors::StoreError;
use crate::metrics;
use crate::resolver::Resolve;
use crate::store::DomainStore;

/// Outcome of checking a single domain record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The record hit the error threshold and was stopped.
    Stopped,
    /// The record resolved to the master IP.
    Verified,
    /// The record failed to resolve, or resolved elsewhere.
    Unverified,
}

impl CheckOutcome {
    /// Label used for the per-outcome metrics counter.
    #[must_use]
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Verified => "verified",
            Self::Unverified => "unverified",
        }
    }
}

/// Counters for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Records that were due and processed.
    pub checked: usize,
    /// Records that resolved to the master IP.
    pub verified: usize,
    /// Records that failed verification this cycle.
    pub unverified: usize,
    /// Records stopped at the error threshold.
    pub stopped: usize,
    /// First-time certificate issuances that succeeded.
    pub certs_created: usize,
    /// Certificate renewals that succeeded.
    pub certs_renewed: usize,
}

/// Compute the next check time for a domain that failed verification.
///
/// Returns 1 minute from `now` while the (pre-increment) error counter is at
/// or below the fast-retry limit, 15 minutes afterwards.
#[must_use]
pub fn next_try_date(domain: &Domain, now: DateTime<Utc>) -> DateTime<Utc> {
    if domain.ip_errs <= FAST_RETRY_ERROR_LIMIT {
        now + Duration::minutes(FAST_RETRY_MINUTES)
    } else {
        now + Duration::minutes(SLOW_RETRY_MINUTES)
    }
}

/// Drives reconciliation passes over the domain record set.
pub struct Reconciler {
    master_ip: IpAddr,
    resolver: Arc<dyn Resolve>,
    issuer: Arc<dyn IssueCert>,
}

impl Reconciler {
    /// Create a reconciler that verifies domains against `master_ip`.
    #[must_use]
    pub fn new(master_ip: IpAddr, resolver: Arc<dyn Resolve>, issuer: Arc<dyn IssueCert>) -> Self {
        Self {
            master_ip,
            resolver,
            issuer,
        }
    }

    /// Run one reconciliation pass at `now`.
    ///
    /// Loads every due record from `store`, applies the per-record policy,
    /// and commits the mutated batch in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if loading or committing the batch fails; in
    /// the commit case none of the pass's mutations persist.
    pub async fn run_pass<S>(&self, store: &S, now: DateTime<Utc>) -> Result<PassSummary, StoreError>
    where
        S: DomainStore + ?Sized,
    {
        let start = std::time::Instant::now();
        let mut domains = store.load_due(now).await?;
        debug!(due = domains.len(), "Loaded due domain records");

        let mut summary = PassSummary {
            checked: domains.len(),
            ..PassSummary::default()
        };

        for domain in &mut domains {
            let outcome = self.check_domain(domain, now, &mut summary).await;
            metrics::record_domain_checked(outcome.as_label());
            match outcome {
                CheckOutcome::Stopped => summary.stopped += 1,
                CheckOutcome::Verified => summary.verified += 1,
                CheckOutcome::Unverified => summary.unverified += 1,
            }
        }

        store.commit(&domains).await?;
        metrics::record_pass(start.elapsed());

        info!(
            checked = summary.checked,
            verified = summary.verified,
            unverified = summary.unverified,
            stopped = summary.stopped,
            certs_created = summary.certs_created,
            certs_renewed = summary.certs_renewed,
            "Reconciliation pass complete"
        );

        Ok(summary)
    }

    /// Apply the per-record policy to one domain, mutating it in place.
    async fn check_domain(
        &self,
        domain: &mut Domain,
        now: DateTime<Utc>,
        summary: &mut PassSummary,
    ) -> CheckOutcome {
        // Stop the domain once the error threshold is reached (roughly one
        // week of retries). No resolution or certificate work this cycle.
        if domain.ip_errs >= STOP_ERROR_THRESHOLD {
            info!(domain = %domain.name, errors = domain.ip_errs, "Domain stopping");
            domain.stopped = true;
            domain.cert_status = CertStatus::Unset;
            metrics::record_domain_stopped();
            return CheckOutcome::Stopped;
        }

        let resolved = match self.resolver.resolve(&domain.name).await {
            Ok(ip) => Some(ip),
            Err(e) => {
                debug!(domain = %domain.name, error = %e, "Resolution failed");
                None
            }
        };

        if resolved == Some(self.master_ip) {
            self.ensure_certificate(domain, now, summary).await;

            // Visit this domain again in an hour.
            domain.next_ip_check = now + Duration::minutes(VERIFIED_CHECK_MINUTES);
            domain.ip_errs = 0;
            CheckOutcome::Verified
        } else {
            domain.next_ip_check = next_try_date(domain, now);
            domain.ip_errs += 1;
            CheckOutcome::Unverified
        }
    }

    /// Certificate work for a verified domain: renewal for issued certs past
    /// the renewal age, first issuance for domains without one.
    ///
    /// Issuer failures are recoverable: the record's certificate fields stay
    /// untouched and the domain retries on its next eligible cycle.
    async fn ensure_certificate(
        &self,
        domain: &mut Domain,
        now: DateTime<Utc>,
        summary: &mut PassSummary,
    ) {
        if domain.cert_due_for_renewal(now) {
            match self.issuer.create_cert(&domain.name).await {
                Ok(()) => {
                    domain.cert_date = Some(now);
                    summary.certs_renewed += 1;
                    metrics::record_certificate("renewed");
                    info!(domain = %domain.name, "Domain certificate renewed");
                }
                Err(e) => {
                    warn!(domain = %domain.name, error = %e, "Certificate renewal failed");
                }
            }
        }

        if domain.cert_status == CertStatus::Unset {
            match self.issuer.create_cert(&domain.name).await {
                Ok(()) => {
                    domain.cert_status = CertStatus::Issued;
                    domain.cert_date = Some(now);
                    summary.certs_created += 1;
                    metrics::record_certificate("created");
                    info!(domain = %domain.name, "Domain certificate created");
                }
                Err(e) => {
                    warn!(domain = %domain.name, error = %e, "Certificate creation failed");
                }
            }
        }
    }
}
