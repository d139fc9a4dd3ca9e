//! Migration to create the offers table.
//!
//! Offers belong to a brand and are removed together with it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Offers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Offers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Offers::BrandId).uuid().not_null())
                    .col(ColumnDef::new(Offers::Title).text().not_null())
                    .col(ColumnDef::new(Offers::Description).text().not_null())
                    .col(
                        ColumnDef::new(Offers::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Offers::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Offers::CouponCode).text().null())
                    .col(ColumnDef::new(Offers::DiscountPercent).integer().null())
                    .col(
                        ColumnDef::new(Offers::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Offers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Offers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offers_brand_id")
                            .from(Offers::Table, Offers::BrandId)
                            .to(Brands::Table, Brands::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_offers_brand_id")
                    .table(Offers::Table)
                    .col(Offers::BrandId)
                    .to_owned(),
            )
            .await?;

        // Supports the effective-offer filter (active, start_date, end_date)
        manager
            .create_index(
                Index::create()
                    .name("idx_offers_active_window")
                    .table(Offers::Table)
                    .col(Offers::Active)
                    .col(Offers::StartDate)
                    .col(Offers::EndDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_offers_active_window").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_offers_brand_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Offers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Offers {
    Table,
    Id,
    BrandId,
    Title,
    Description,
    StartDate,
    EndDate,
    CouponCode,
    DiscountPercent,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Brands {
    Table,
    Id,
}
