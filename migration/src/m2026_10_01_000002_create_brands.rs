//! Migration to create the brands table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Brands::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Brands::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Brands::Name).text().not_null())
                    .col(ColumnDef::new(Brands::Description).text().not_null())
                    .col(ColumnDef::new(Brands::Logo).text().not_null())
                    .col(ColumnDef::new(Brands::Location).text().null())
                    .col(
                        ColumnDef::new(Brands::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Brands::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Public listing sorts by name, the admin listing by creation time
        manager
            .create_index(
                Index::create()
                    .name("idx_brands_name")
                    .table(Brands::Table)
                    .col(Brands::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_brands_created_at")
                    .table(Brands::Table)
                    .col(Brands::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_brands_created_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_brands_name").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Brands::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Brands {
    Table,
    Id,
    Name,
    Description,
    Logo,
    Location,
    CreatedAt,
    UpdatedAt,
}
