//! Migration: products, price profiles and customers.

use sea_orm_migration::prelude::*;

use super::m20240301_000001_create_sellers_and_sessions::Sellers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Products::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Products::Unit).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Products::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PriceProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceProfiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PriceProfiles::Kind).string_len(8).not_null())
                    .col(ColumnDef::new(PriceProfiles::Name).string().not_null())
                    .col(ColumnDef::new(PriceProfiles::SellerId).uuid().null())
                    .col(
                        ColumnDef::new(PriceProfiles::EffectiveFrom)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceProfiles::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PriceProfiles::Items).json_binary().not_null())
                    .col(
                        ColumnDef::new(PriceProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_profiles_seller_id")
                            .from(PriceProfiles::Table, PriceProfiles::SellerId)
                            .to(Sellers::Table, Sellers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_price_profiles_scope")
                    .table(PriceProfiles::Table)
                    .col(PriceProfiles::Kind)
                    .col(PriceProfiles::SellerId)
                    .col(PriceProfiles::IsActive)
                    .to_owned(),
            )
            .await?;

        // At most one active profile per (kind, seller) scope
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_price_profiles_active_scope \
                 ON price_profiles (kind, COALESCE(seller_id, '00000000-0000-0000-0000-000000000000'::uuid)) \
                 WHERE is_active",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(Customers::Email).string().null())
                    .col(ColumnDef::new(Customers::Notes).text().null())
                    .col(
                        ColumnDef::new(Customers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Customers::OrderCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::TotalSpentAmount)
                            .decimal_len(20, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::LastOrderAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Customers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customers_phone")
                    .table(Customers::Table)
                    .col(Customers::Phone)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PriceProfiles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Unit,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PriceProfiles {
    Table,
    Id,
    Kind,
    Name,
    SellerId,
    EffectiveFrom,
    IsActive,
    Items,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Customers {
    Table,
    Id,
    Name,
    Phone,
    Email,
    Notes,
    IsActive,
    OrderCount,
    TotalSpentAmount,
    LastOrderAt,
    CreatedAt,
    UpdatedAt,
}
