// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The domain record model.
//!
//! A [`Domain`] is the unit the reconciler operates on. Records are created
//! and deleted by the hosting control plane; this daemon only mutates the
//! scheduling fields (`ip_errs`, `next_ip_check`), the certificate fields
//! (`cert_status`, `cert_date`) and the stop flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::CERT_RENEWAL_DAYS;

/// Certificate state of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CertStatus {
    /// No certificate has been issued yet.
    #[default]
    Unset,
    /// A certificate has been issued and is being kept renewed.
    Issued,
}

impl CertStatus {
    /// Integer column representation (0 = unset, 1 = issued).
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Unset => 0,
            Self::Issued => 1,
        }
    }

    /// Decode the integer column representation. Any non-zero value is
    /// treated as issued.
    #[must_use]
    pub fn from_i32(value: i32) -> Self {
        if value == 0 {
            Self::Unset
        } else {
            Self::Issued
        }
    }
}

/// A managed domain and its reconciliation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Hostname, unique identifier of the record.
    pub name: String,
    /// Permanently excluded from checks. Monotonic: once set, this daemon
    /// never clears it.
    pub stopped: bool,
    /// Consecutive failed or mismatched resolution attempts. Resets to zero
    /// only on a verified resolution.
    pub ip_errs: u32,
    /// The record is eligible for processing once this is in the past.
    pub next_ip_check: DateTime<Utc>,
    /// Certificate state.
    pub cert_status: CertStatus,
    /// Time of the last successful issuance or renewal, if any.
    pub cert_date: Option<DateTime<Utc>>,
}

impl Domain {
    /// Create a fresh record for a newly enrolled domain, due immediately.
    #[must_use]
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            stopped: false,
            ip_errs: 0,
            // One second in the past so the very next pass picks it up.
            next_ip_check: now - chrono::Duration::seconds(1),
            cert_status: CertStatus::Unset,
            cert_date: None,
        }
    }

    /// Whether this record is due for a check.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.stopped && self.next_ip_check < now
    }

    /// Whether an issued certificate is old enough to renew.
    ///
    /// Only meaningful for [`CertStatus::Issued`] records; a missing
    /// `cert_date` on an issued record is treated as renewable immediately.
    #[must_use]
    pub fn cert_due_for_renewal(&self, now: DateTime<Utc>) -> bool {
        if self.cert_status != CertStatus::Issued {
            return false;
        }
        match self.cert_date {
            Some(issued) => (now - issued).num_days() >= CERT_RENEWAL_DAYS,
            None => true,
        }
    }
}
