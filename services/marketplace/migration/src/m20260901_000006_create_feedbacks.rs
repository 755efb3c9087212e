use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feedbacks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Feedbacks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Feedbacks::PropertyId).uuid().not_null())
                    .col(ColumnDef::new(Feedbacks::UserId).uuid().not_null())
                    .col(ColumnDef::new(Feedbacks::BookingId).uuid().not_null())
                    .col(ColumnDef::new(Feedbacks::Rating).small_integer().not_null())
                    .col(ColumnDef::new(Feedbacks::Comment).text())
                    .col(
                        ColumnDef::new(Feedbacks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Feedbacks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Feedbacks::Table, Feedbacks::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Feedbacks::Table, Feedbacks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Feedbacks::Table)
                    .col(Feedbacks::PropertyId)
                    .name("idx_feedbacks_property_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedbacks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Feedbacks {
    Table,
    Id,
    PropertyId,
    UserId,
    BookingId,
    Rating,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Properties {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
