use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create products table
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(string(Products::Name))
                    .col(text(Products::Description))
                    .col(decimal(Products::Price).decimal_len(12, 3))
                    .col(string(Products::Category))
                    .col(string(Products::Gender).string_len(16))
                    .col(json(Products::Images))
                    .col(json(Products::Sizes))
                    .col(json(Products::Colors))
                    .col(integer(Products::StockQuantity).default(0))
                    .col(boolean(Products::IsFeatured).default(false))
                    .col(timestamp_with_time_zone(Products::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create orders table
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(pk_auto(Orders::Id))
                    .col(string(Orders::CustomerFullName))
                    .col(string(Orders::CustomerEmail))
                    .col(string(Orders::Phone))
                    .col(text(Orders::ShippingAddress))
                    .col(decimal(Orders::TotalAmount).decimal_len(12, 3))
                    .col(string(Orders::Status).string_len(16).default("pending"))
                    .col(timestamp_with_time_zone(Orders::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create order_items table
        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(pk_auto(OrderItems::Id))
                    .col(integer(OrderItems::OrderId))
                    .col(integer_null(OrderItems::ProductId))
                    .col(string(OrderItems::Name))
                    .col(string(OrderItems::Size))
                    .col(string(OrderItems::Color))
                    .col(integer(OrderItems::Quantity))
                    .col(decimal(OrderItems::Price).decimal_len(12, 3))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_product")
                            .from(OrderItems::Table, OrderItems::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_items_order_id")
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .to_owned(),
            )
            .await?;

        // Create admin_users table
        manager
            .create_table(
                Table::create()
                    .table(AdminUsers::Table)
                    .if_not_exists()
                    .col(pk_auto(AdminUsers::Id))
                    .col(string(AdminUsers::Email).unique_key())
                    .col(string(AdminUsers::FullName))
                    .col(string(AdminUsers::PasswordHash))
                    .col(string(AdminUsers::Role).string_len(16).default("admin"))
                    .col(boolean(AdminUsers::IsApproved).default(false))
                    .col(timestamp_with_time_zone(AdminUsers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Price,
    Category,
    Gender,
    Images,
    Sizes,
    Colors,
    StockQuantity,
    IsFeatured,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    CustomerFullName,
    CustomerEmail,
    Phone,
    ShippingAddress,
    TotalAmount,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    Name,
    Size,
    Color,
    Quantity,
    Price,
}

#[derive(DeriveIden)]
enum AdminUsers {
    Table,
    Id,
    Email,
    FullName,
    PasswordHash,
    Role,
    IsApproved,
    CreatedAt,
}
