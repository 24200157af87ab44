//! Migration: orders with flattened approval and discount columns.

use sea_orm_migration::prelude::*;

use super::m20240301_000001_create_sellers_and_sessions::Sellers;
use super::m20240301_000002_create_catalog_and_customers::Customers;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn money(col: Orders) -> ColumnDef {
    ColumnDef::new(col).decimal_len(20, 4).not_null().to_owned()
}

fn timestamp(col: Orders) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn optional_timestamp(col: Orders) -> ColumnDef {
    ColumnDef::new(col).timestamp_with_time_zone().null().to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Orders::Code)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Orders::SellerId).uuid().not_null())
                    .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Orders::CustomerName).string().not_null())
                    .col(ColumnDef::new(Orders::DeliveryDate).date().not_null())
                    .col(ColumnDef::new(Orders::Note).text().null())
                    .col(ColumnDef::new(Orders::CostProfile).json_binary().not_null())
                    .col(ColumnDef::new(Orders::SaleProfile).json_binary().not_null())
                    .col(ColumnDef::new(Orders::Items).json_binary().not_null())
                    .col(&mut money(Orders::TotalWeightKg))
                    .col(&mut money(Orders::TotalCostAmount))
                    .col(&mut money(Orders::BaseSaleAmount))
                    .col(&mut money(Orders::TotalSaleAmount))
                    .col(&mut money(Orders::TotalProfitAmount))
                    .col(
                        ColumnDef::new(Orders::FulfillmentStatus)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::SupplierPaymentStatus)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::CollectionStatus)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::RequiresAdminApproval)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Orders::ApprovalStatus)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(&mut timestamp(Orders::ApprovalRequestedAt))
                    .col(&mut optional_timestamp(Orders::ApprovalReviewedAt))
                    .col(ColumnDef::new(Orders::ApprovalReviewedBy).uuid().null())
                    .col(ColumnDef::new(Orders::ApprovalNote).text().null())
                    .col(
                        ColumnDef::new(Orders::DiscountStatus)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::DiscountPercent)
                            .decimal_len(5, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Orders::DiscountAmount)
                            .decimal_len(20, 4)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Orders::DiscountSaleAmount)
                            .decimal_len(20, 4)
                            .null(),
                    )
                    .col(ColumnDef::new(Orders::DiscountReason).text().null())
                    .col(ColumnDef::new(Orders::DiscountRequestedBy).uuid().null())
                    .col(&mut optional_timestamp(Orders::DiscountRequestedAt))
                    .col(ColumnDef::new(Orders::DiscountReviewedBy).uuid().null())
                    .col(&mut optional_timestamp(Orders::DiscountReviewedAt))
                    .col(ColumnDef::new(Orders::DiscountReviewNote).text().null())
                    .col(&mut timestamp(Orders::CreatedAt))
                    .col(&mut timestamp(Orders::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_seller_id")
                            .from(Orders::Table, Orders::SellerId)
                            .to(Sellers::Table, Sellers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_customer_id")
                            .from(Orders::Table, Orders::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_seller_created_at")
                    .table(Orders::Table)
                    .col(Orders::SellerId)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_customer_id")
                    .table(Orders::Table)
                    .col(Orders::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_created_at")
                    .table(Orders::Table)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum Orders {
    Table,
    Id,
    Code,
    SellerId,
    CustomerId,
    CustomerName,
    DeliveryDate,
    Note,
    CostProfile,
    SaleProfile,
    Items,
    TotalWeightKg,
    TotalCostAmount,
    BaseSaleAmount,
    TotalSaleAmount,
    TotalProfitAmount,
    FulfillmentStatus,
    SupplierPaymentStatus,
    CollectionStatus,
    RequiresAdminApproval,
    ApprovalStatus,
    ApprovalRequestedAt,
    ApprovalReviewedAt,
    ApprovalReviewedBy,
    ApprovalNote,
    DiscountStatus,
    DiscountPercent,
    DiscountAmount,
    DiscountSaleAmount,
    DiscountReason,
    DiscountRequestedBy,
    DiscountRequestedAt,
    DiscountReviewedBy,
    DiscountReviewedAt,
    DiscountReviewNote,
    CreatedAt,
    UpdatedAt,
}
