// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Schema migrations for the domain store.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateDomainsTable)]
    }
}

#[derive(DeriveMigrationName)]
struct CreateDomainsTable;

#[async_trait::async_trait]
impl MigrationTrait for CreateDomainsTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Domains::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Domains::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Domains::Stopped)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Domains::IpErrs)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Domains::NextIpCheck).string().not_null())
                    .col(
                        ColumnDef::new(Domains::CertStatus)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Domains::CertDate).string().null())
                    .to_owned(),
            )
            .await?;

        // The hot query filters on (stopped, next_ip_check).
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_domains_due")
                    .table(Domains::Table)
                    .col(Domains::Stopped)
                    .col(Domains::NextIpCheck)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Domains {
    Table,
    Name,
    Stopped,
    IpErrs,
    NextIpCheck,
    CertStatus,
    CertDate,
}
