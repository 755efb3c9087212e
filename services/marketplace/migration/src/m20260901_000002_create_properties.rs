use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Properties::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Properties::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Properties::Name).string().not_null())
                    .col(ColumnDef::new(Properties::Description).text().not_null())
                    .col(ColumnDef::new(Properties::Amenities).json_binary().not_null())
                    .col(ColumnDef::new(Properties::PricePerNight).double().not_null())
                    .col(ColumnDef::new(Properties::Location).string().not_null())
                    .col(ColumnDef::new(Properties::State).string().not_null())
                    .col(ColumnDef::new(Properties::PropertyType).string().not_null())
                    .col(ColumnDef::new(Properties::Guests).integer().not_null())
                    .col(
                        ColumnDef::new(Properties::PropertyImages)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Properties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Properties::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Properties::Table, Properties::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Properties::Table)
                    .col(Properties::OwnerId)
                    .name("idx_properties_owner_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Properties {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    Amenities,
    PricePerNight,
    Location,
    State,
    PropertyType,
    Guests,
    PropertyImages,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
