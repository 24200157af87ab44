//! Migration: sellers and their login sessions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sellers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sellers::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Sellers::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Sellers::DisplayName).string().not_null())
                    .col(ColumnDef::new(Sellers::Role).string().not_null())
                    .col(
                        ColumnDef::new(Sellers::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Sellers::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Sellers::MustChangePassword)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sellers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sellers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SellerSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SellerSessions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SellerSessions::SellerId).uuid().not_null())
                    .col(
                        ColumnDef::new(SellerSessions::TokenHash)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SellerSessions::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SellerSessions::LastSeenAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SellerSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SellerSessions::UserAgent).string().null())
                    .col(ColumnDef::new(SellerSessions::IpAddress).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seller_sessions_seller_id")
                            .from(SellerSessions::Table, SellerSessions::SellerId)
                            .to(Sellers::Table, Sellers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Sweeps delete by expiry
        manager
            .create_index(
                Index::create()
                    .name("idx_seller_sessions_expires_at")
                    .table(SellerSessions::Table)
                    .col(SellerSessions::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_seller_sessions_seller_id")
                    .table(SellerSessions::Table)
                    .col(SellerSessions::SellerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SellerSessions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Sellers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Sellers {
    Table,
    Id,
    Username,
    DisplayName,
    Role,
    IsEnabled,
    PasswordHash,
    MustChangePassword,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SellerSessions {
    Table,
    Id,
    SellerId,
    TokenHash,
    ExpiresAt,
    LastSeenAt,
    CreatedAt,
    UserAgent,
    IpAddress,
}
