// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `SeaORM` entity for the `domains` table.
//!
//! Timestamps are stored as RFC 3339 strings in UTC with whole-second
//! precision, which keeps them lexicographically comparable in SQL.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "domains")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub stopped: i32,
    pub ip_errs: i32,
    pub next_ip_check: String,
    pub cert_status: i32,
    pub cert_date: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
