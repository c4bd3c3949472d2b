use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .col(ColumnDef::new(Items::Description).string().not_null())
                    .col(ColumnDef::new(Items::Category).string().not_null())
                    .col(ColumnDef::new(Items::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(Items::Price)
                            .decimal_len(16, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Items::Sku).string().not_null())
                    .col(
                        ColumnDef::new(Items::LowStockThreshold)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Items::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Uniqueness lives here, not in service-level pre-checks. SKUs are
        // unique across all owners.
        manager
            .create_index(
                Index::create()
                    .name("idx_items_sku_unique")
                    .table(Items::Table)
                    .col(Items::Sku)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Every listing and stats query narrows by owner first.
        manager
            .create_index(
                Index::create()
                    .name("idx_items_owner")
                    .table(Items::Table)
                    .col(Items::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_category")
                    .table(Items::Table)
                    .col(Items::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
    Name,
    Description,
    Category,
    Quantity,
    Price,
    Sku,
    LowStockThreshold,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}
