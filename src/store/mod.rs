// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! SQLite-backed domain record store using `SeaORM`.
//!
//! The reconciler talks to storage through the [`DomainStore`] trait: load
//! the records due for a check, then persist the mutated batch in one
//! transaction. [`SqliteStore`] is the production implementation, backed by
//! a local SQLite database file that the hosting control plane also writes
//! new records into.

pub(crate) mod entity;
mod migration;


use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use crate::domain::{CertStatus, Domain};
use crate::errors::StoreError;

use migration::Migrator;

/// Storage boundary for domain records.
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Load all records eligible for a check at `now`: not stopped, and
    /// `next_ip_check` in the past.
    async fn load_due(&self, now: DateTime<Utc>) -> Result<Vec<Domain>, StoreError>;

    /// Persist a batch of mutated records atomically. Either every record in
    /// the batch is written or none is.
    async fn commit(&self, domains: &[Domain]) -> Result<(), StoreError>;
}

/// SQLite-backed [`DomainStore`].
pub struct SqliteStore {
    db: DatabaseConnection,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and bring the schema up to
    /// date.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if directory creation, the connection, or the
    /// migration fails.
    pub async fn new(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        Self::connect(&db_url).await
    }

    /// Open an in-memory database. Used by tests and dry runs.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the connection or the migration fails.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }

    async fn connect(db_url: &str) -> Result<Self, StoreError> {
        let db = Database::connect(db_url).await?;
        Migrator::up(&db, None).await?;
        Ok(Self { db })
    }

    /// Insert a newly enrolled domain record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the insert fails (including a duplicate
    /// name).
    pub async fn add_domain(&self, domain: &Domain) -> Result<(), StoreError> {
        domain_to_active_model(domain).insert(&self.db).await?;
        Ok(())
    }

    /// Fetch a single record by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or the row is corrupt.
    pub async fn get(&self, name: &str) -> Result<Option<Domain>, StoreError> {
        let row = entity::Entity::find_by_id(name.to_string())
            .one(&self.db)
            .await?;
        row.map(model_to_domain).transpose()
    }
}

#[async_trait]
impl DomainStore for SqliteStore {
    async fn load_due(&self, now: DateTime<Utc>) -> Result<Vec<Domain>, StoreError> {
        let rows = entity::Entity::find()
            .filter(entity::Column::Stopped.eq(0))
            .filter(entity::Column::NextIpCheck.lt(encode_ts(now)))
            .order_by_asc(entity::Column::Name)
            .all(&self.db)
            .await?;

        rows.into_iter().map(model_to_domain).collect()
    }

    async fn commit(&self, domains: &[Domain]) -> Result<(), StoreError> {
        if domains.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        for domain in domains {
            domain_to_active_model(domain).update(&txn).await?;
        }
        txn.commit().await?;
        Ok(())
    }
}

/// Encode a timestamp as a fixed-width RFC 3339 UTC string.
///
/// Whole-second precision and a `Z` suffix keep the encoding
/// lexicographically ordered, which the `load_due` filter relies on.
fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn decode_ts(raw: &str, name: &str, field: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRecord {
            name: name.to_string(),
            reason: format!("invalid {field}: {e}"),
        })
}

fn model_to_domain(model: entity::Model) -> Result<Domain, StoreError> {
    let next_ip_check = decode_ts(&model.next_ip_check, &model.name, "next_ip_check")?;
    let cert_date = model
        .cert_date
        .as_deref()
        .map(|raw| decode_ts(raw, &model.name, "cert_date"))
        .transpose()?;

    let ip_errs = u32::try_from(model.ip_errs).map_err(|_| StoreError::CorruptRecord {
        name: model.name.clone(),
        reason: format!("negative ip_errs: {}", model.ip_errs),
    })?;

    Ok(Domain {
        name: model.name,
        stopped: model.stopped != 0,
        ip_errs,
        next_ip_check,
        cert_status: CertStatus::from_i32(model.cert_status),
        cert_date,
    })
}

fn domain_to_active_model(domain: &Domain) -> entity::ActiveModel {
    entity::ActiveModel {
        name: Set(domain.name.clone()),
        stopped: Set(i32::from(domain.stopped)),
        ip_errs: Set(i32::try_from(domain.ip_errs).unwrap_or(i32::MAX)),
        next_ip_check: Set(encode_ts(domain.next_ip_check)),
        cert_status: Set(domain.cert_status.as_i32()),
        cert_date: Set(domain.cert_date.map(encode_ts)),
    }
}
