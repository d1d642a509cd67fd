// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the certsync daemon.
//!
//! This module contains all numeric constants used by the reconciliation
//! policy, organized by category for easy maintenance.

// ============================================================================
// Stop Policy
// ============================================================================

/// Consecutive resolution errors after which a domain is permanently stopped.
///
/// At the fast/slow retry cadence below this works out to roughly one week
/// of attempts before giving up on a domain.
pub const STOP_ERROR_THRESHOLD: u32 = 700;

// ============================================================================
// Check Scheduling
// ============================================================================

/// Error count up to which failed domains are retried at the fast cadence.
pub const FAST_RETRY_ERROR_LIMIT: u32 = 60;

/// Retry interval for recently failed domains (minutes).
pub const FAST_RETRY_MINUTES: i64 = 1;

/// Retry interval once a domain has exceeded the fast-retry error limit (minutes).
pub const SLOW_RETRY_MINUTES: i64 = 15;

/// Re-check interval for verified domains (minutes).
pub const VERIFIED_CHECK_MINUTES: i64 = 60;

// ============================================================================
// Certificate Lifecycle
// ============================================================================

/// Age in days at which an issued certificate is renewed.
pub const CERT_RENEWAL_DAYS: i64 = 30;

// ============================================================================
// Daemon Defaults
// ============================================================================

/// Default interval between reconciliation passes (seconds).
pub const DEFAULT_PASS_INTERVAL_SECS: u64 = 60;

/// Default SQLite database path.
pub const DEFAULT_DB_PATH: &str = "/var/lib/certsync/domains.db";
