use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::GuestId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::PropertyId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::Price).string().not_null())
                    .col(ColumnDef::new(Bookings::TotalGuests).string().not_null())
                    .col(
                        ColumnDef::new(Bookings::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Bookings::AgentPaypalEmail).string())
                    .col(ColumnDef::new(Bookings::PaymentInstruction).text())
                    .col(ColumnDef::new(Bookings::UserTransactionId).string())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Bookings::Table, Bookings::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Bookings::Table, Bookings::GuestId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Bookings::Table, Bookings::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Overlap checks scan one property's ranges.
        manager
            .create_index(
                Index::create()
                    .table(Bookings::Table)
                    .col(Bookings::PropertyId)
                    .col(Bookings::StartDate)
                    .col(Bookings::EndDate)
                    .name("idx_bookings_property_id_dates")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Bookings::Table)
                    .col(Bookings::GuestId)
                    .name("idx_bookings_guest_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Bookings::Table)
                    .col(Bookings::OwnerId)
                    .col((Bookings::CreatedAt, IndexOrder::Desc))
                    .name("idx_bookings_owner_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Bookings {
    Table,
    Id,
    GuestId,
    OwnerId,
    PropertyId,
    Price,
    TotalGuests,
    StartDate,
    EndDate,
    Status,
    AgentPaypalEmail,
    PaymentInstruction,
    UserTransactionId,
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
